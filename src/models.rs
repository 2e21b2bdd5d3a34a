use comex_pdf_layout::ReadOptions;

use crate::error::ComexError;
use crate::table::Cell;

/// Error written for a document whose declaration number was not found.
pub const DUAS_UNREADABLE: &str = "File can't be read";
/// Error written for a document whose liquidation number was not found.
pub const PERCEPCION_UNREADABLE: &str = "Can't read the file";

/// Columns produced by the DUAS pipeline; DUAS row scanners never read
/// business values from these.
pub const DUAS_RESERVED_COLUMNS: [&str; 10] = [
    "source_file",
    "CONCEPTO",
    "Error",
    "Declaracion",
    "Fecha",
    "Ad_Valorem",
    "Imp_Prom_Municipal",
    "Imp_Gene_a_las_Ventas",
    "Percepcion",
    "PEC",
];

pub const DUAS_COLUMNS: [&str; 16] = [
    "source_file",
    "COD PROVEEDOR",
    "Declaracion",
    "Fecha",
    "Ad_Valorem",
    "Imp_Prom_Municipal",
    "Imp_Gene_a_las_Ventas",
    "IGV",
    "Percepcion",
    "PEC",
    "Tasa",
    "COD Moneda",
    "Cód. de Autorización",
    "Tipo de Factura",
    "Cuenta",
    "Error",
];

pub const PERCEPCIONES_COLUMNS: [&str; 12] = [
    "Source_File",
    "COD PROVEEDOR",
    "No_Liquidacion",
    "Fecha",
    "CDA",
    "Monto",
    "Tasa",
    "COD MONEDA",
    "Cód. de Autorización",
    "Tipo de Factura",
    "Cuenta",
    "Error",
];

/// One uploaded document: its display name and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPdf {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedPdf {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Fixed accounting literals stamped on every record that has a key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountingCodes {
    pub supplier: String,
    pub currency: String,
    pub authorization: String,
    pub invoice_type: String,
    pub account: String,
}

impl AccountingCodes {
    #[must_use]
    pub fn duas() -> Self {
        Self {
            supplier: "13131295".to_string(),
            currency: "01".to_string(),
            authorization: "50".to_string(),
            invoice_type: "12".to_string(),
            account: "421202".to_string(),
        }
    }

    #[must_use]
    pub fn percepciones() -> Self {
        Self {
            supplier: "13131295".to_string(),
            currency: "00".to_string(),
            authorization: "54".to_string(),
            invoice_type: "12".to_string(),
            account: "421201".to_string(),
        }
    }
}

/// Settings of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    pub read: ReadOptions,
    pub codes: AccountingCodes,
}

impl PipelineOptions {
    #[must_use]
    pub fn duas() -> Self {
        Self {
            read: ReadOptions::default(),
            codes: AccountingCodes::duas(),
        }
    }

    #[must_use]
    pub fn percepciones() -> Self {
        Self {
            read: ReadOptions::default(),
            codes: AccountingCodes::percepciones(),
        }
    }

    /// # Errors
    ///
    /// Fails when the read options are out of range.
    pub fn validate(&self) -> Result<(), ComexError> {
        self.read.validate()?;
        Ok(())
    }
}

/// Business fields pulled out of one DUAS table row. Amounts stay as raw
/// text until normalized.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DuasRow {
    pub source_file: String,
    pub concepto: String,
    pub declaracion: String,
    pub fecha: String,
    pub ad_valorem: Cell,
    pub imp_prom_municipal: Cell,
    pub imp_gene_a_las_ventas: Cell,
    pub percepcion: Cell,
    pub pec: String,
    pub error: String,
}

impl DuasRow {
    /// Row standing for a document that produced nothing else.
    pub fn failed(source_file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            error: error.into(),
            ..Self::default()
        }
    }
}

/// Business fields pulled out of one text line of a Percepciones receipt.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PercepcionRow {
    pub source_file: String,
    pub no_liquidacion: String,
    pub cda: String,
    pub fecha: String,
    pub monto: Cell,
    pub error: String,
}

impl PercepcionRow {
    pub fn failed(source_file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            error: error.into(),
            ..Self::default()
        }
    }
}

/// Final DUAS record for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DuasRecord {
    pub source_file: String,
    pub declaracion: String,
    pub fecha: String,
    pub ad_valorem: Option<f64>,
    pub imp_prom_municipal: Option<f64>,
    pub imp_gene_a_las_ventas: Option<f64>,
    pub igv: f64,
    pub percepcion: Option<f64>,
    pub pec: String,
    /// `None` when no rate table was supplied; `Some(None)` on a date miss.
    pub tasa: Option<Option<f64>>,
    pub codes: Option<AccountingCodes>,
    pub error: String,
}

/// Final Percepciones record for one document.
#[derive(Debug, Clone, PartialEq)]
pub struct PercepcionRecord {
    pub source_file: String,
    pub no_liquidacion: String,
    pub fecha: String,
    pub cda: String,
    pub monto: Option<f64>,
    pub tasa: f64,
    pub codes: Option<AccountingCodes>,
    pub error: String,
}
