pub mod consolidate;
pub mod duas;
pub mod enrich;
pub mod error;
pub mod models;
pub mod normalize;
pub mod organize;
pub mod output;
pub mod percepciones;
pub mod pipeline;
pub mod progress;
pub mod rates;
pub mod reader;
pub mod table;

pub use comex_pdf_layout::{QualityMode, ReadOptions};
pub use error::{ComexError, DocumentError};
pub use models::{AccountingCodes, PipelineOptions, UploadedPdf};
pub use output::OutputFormat;
pub use pipeline::{process_duas, process_percepciones};
pub use progress::{NoProgress, Progress};
pub use rates::ExchangeRateTable;
pub use reader::{DocumentReader, LopdfReader};
pub use table::{Cell, Table};
