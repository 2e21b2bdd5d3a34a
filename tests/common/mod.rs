use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};

pub type FixtureResult<T> = Result<T, Box<dyn std::error::Error>>;

/// A single-page PDF drawing every span at its own position. Lines sit 16pt
/// apart and spans 150pt apart, so each span lands in its own cell; an empty
/// span draws nothing and leaves its cell blank.
pub fn page_pdf(lines: &[&[&str]]) -> FixtureResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut operations = Vec::new();
    for (row, spans) in lines.iter().enumerate() {
        let y = 800 - 16 * i64::try_from(row)?;
        for (column, span) in spans.iter().enumerate() {
            let x = 40 + 150 * i64::try_from(column)?;
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 8.into()]),
                Operation::new(
                    "Tm",
                    vec![1.into(), 0.into(), 0.into(), 1.into(), x.into(), y.into()],
                ),
                Operation::new("Tj", vec![Object::string_literal(*span)]),
                Operation::new("ET", vec![]),
            ]);
        }
    }

    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 1400.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// First page of a DUAS declaration for `declaration`, issued on `date`.
/// Amounts sit in the eighth column with nothing drawn between them and the
/// concept.
pub fn duas_pdf(declaration: &str, date: &str) -> FixtureResult<Vec<u8>> {
    duas_pdf_with(declaration, date, &[])
}

/// Like [`duas_pdf`], with `extra` rows drawn after the amounts.
pub fn duas_pdf_with(declaration: &str, date: &str, extra: &[&[&str]]) -> FixtureResult<Vec<u8>> {
    let order = format!("No Declaracion {declaration}");
    let fecha = format!("6.2 Fecha {date}");
    let order_row = ["No ORDEN 1", order.as_str()];
    let mut lines: Vec<&[&str]> = vec![
        &["XML CRAMIREZ", "DETALLE"],
        &order_row,
        &["4.1 Ad/Valorem", "", "", "", "", "", "", "1.250,00"],
        &["4.5 Imp.Prom.Municipal", "", "", "", "", "", "", "210,50"],
    ];
    let sales_tax = ["4.6 Imp.Gene.a las Ventas", &fecha, "", "", "", "", "", "840,00"];
    lines.push(&sales_tax);
    lines.extend_from_slice(extra);
    page_pdf(&lines)
}

/// First page of a Percepciones receipt.
pub fn percepcion_pdf() -> FixtureResult<Vec<u8>> {
    page_pdf(&[
        &["NUMERO DE LIQUIDACION", "118-016559-26"],
        &["C.D.A.", "18 010 016559"],
        &["EMITIDO DE FECHA: 15/03/2024"],
        &["SUNAT PERCEPCION IGV"],
        &["8.428,74"],
    ])
}
