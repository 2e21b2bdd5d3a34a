use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

fn finish_document(mut doc: Document, pages: Vec<Vec<Operation>>) -> FixtureResult<Vec<u8>> {
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut page_ids = Vec::new();
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| (*id).into()).collect::<Vec<_>>(),
            "Count" => i64::try_from(page_ids.len())?,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// One page per entry; every span is drawn at its own position, lines 16pt
/// apart and spans 150pt apart. An empty span leaves its slot blank.
pub fn span_pdf(pages: &[Vec<Vec<&str>>]) -> FixtureResult<Vec<u8>> {
    let doc = Document::with_version("1.5");
    let mut page_operations = Vec::new();

    for lines in pages {
        let mut operations = Vec::new();
        for (row, spans) in lines.iter().enumerate() {
            let y = 780 - 16 * i64::try_from(row)?;
            for (column, span) in spans.iter().enumerate() {
                let x = 50 + 150 * i64::try_from(column)?;
                operations.push(Operation::new("BT", vec![]));
                operations.push(Operation::new("Tf", vec!["F1".into(), 9.into()]));
                operations.push(Operation::new(
                    "Tm",
                    vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*span)]));
                operations.push(Operation::new("ET", vec![]));
            }
        }
        page_operations.push(operations);
    }

    finish_document(doc, page_operations)
}

/// One page per entry; each line is a single show-text operation advanced
/// with `T*`.
pub fn text_pdf(pages: &[Vec<&str>]) -> FixtureResult<Vec<u8>> {
    let doc = Document::with_version("1.5");
    let mut page_operations = Vec::new();

    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("TL", vec![16.into()]),
            Operation::new("Td", vec![50.into(), 780.into()]),
        ];
        for (index, line) in lines.iter().enumerate() {
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            if index + 1 < lines.len() {
                operations.push(Operation::new("T*", vec![]));
            }
        }
        operations.push(Operation::new("ET", vec![]));
        page_operations.push(operations);
    }

    finish_document(doc, page_operations)
}

/// A single page where each line is one text object at x 50. Every chunk is
/// a separate `Tj`; a chunk with a non-zero offset is first moved that far
/// right of the line start with `Td`, the others follow the previous chunk.
pub fn chunked_pdf(lines: &[Vec<(i64, &str)>]) -> FixtureResult<Vec<u8>> {
    let doc = Document::with_version("1.5");
    let mut operations = Vec::new();

    for (row, chunks) in lines.iter().enumerate() {
        let y = 780 - 16 * i64::try_from(row)?;
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new("Tf", vec!["F1".into(), 8.into()]));
        operations.push(Operation::new("Td", vec![50.into(), y.into()]));
        let mut line_x = 0;
        for (offset, chunk) in chunks {
            if *offset != 0 {
                operations.push(Operation::new("Td", vec![(offset - line_x).into(), 0.into()]));
                line_x = *offset;
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*chunk)]));
        }
        operations.push(Operation::new("ET", vec![]));
    }

    finish_document(doc, vec![operations])
}
