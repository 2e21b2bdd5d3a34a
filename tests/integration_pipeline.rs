mod common;

use comex_pdf_reader::{
    AccountingCodes, Cell, ExchangeRateTable, LopdfReader, NoProgress, Table, UploadedPdf,
    process_duas, process_percepciones,
};
use pretty_assertions::assert_eq;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn rendered(table: &Table, row: usize, column: &str) -> String {
    table.cell(row, column).map(Cell::render).unwrap_or_default()
}

fn rates() -> Result<ExchangeRateTable, Box<dyn std::error::Error>> {
    let csv = "Data,Venta\n15/03/2024,3.718\n18/03/2024,3.702\n";
    Ok(ExchangeRateTable::from_csv_reader(csv.as_bytes())?)
}

#[test]
fn duas_pdf_yields_one_consolidated_row() -> TestResult {
    let documents = vec![UploadedPdf::new(
        "DUA PEC 321.pdf",
        common::duas_pdf("118-0165-10-016559", "15/03/2024")?,
    )];

    let table = process_duas(
        &documents,
        &LopdfReader::default(),
        None,
        &AccountingCodes::duas(),
        &mut NoProgress,
    )
    .ok_or("non-empty upload should yield a table")?;

    assert_eq!(table.len(), 1);
    assert_eq!(rendered(&table, 0, "source_file"), "DUA PEC 321.pdf");
    assert_eq!(rendered(&table, 0, "Declaracion"), "118-016559");
    assert_eq!(rendered(&table, 0, "Fecha"), "150324");
    assert_eq!(table.cell(0, "Ad_Valorem"), Some(&Cell::Number(1250.0)));
    assert_eq!(table.cell(0, "Imp_Prom_Municipal"), Some(&Cell::Number(210.5)));
    assert_eq!(table.cell(0, "Imp_Gene_a_las_Ventas"), Some(&Cell::Number(840.0)));
    assert_eq!(table.cell(0, "IGV"), Some(&Cell::Number(1050.5)));
    assert_eq!(rendered(&table, 0, "PEC"), "PEC 321");
    assert_eq!(rendered(&table, 0, "Error"), "");
    assert!(table.column_index("Tasa").is_none());
    Ok(())
}

#[test]
fn single_cell_importe_row_carries_the_pec() -> TestResult {
    let documents = vec![UploadedPdf::new(
        "dua.pdf",
        common::duas_pdf_with(
            "118-0165-10-016559",
            "15/03/2024",
            &[
                &["IMPORTE TOTAL PEC 555"],
                &["4.7 Derechos Antidumping", "", "", "", "", "", "", "0,00"],
            ],
        )?,
    )];

    let table = process_duas(
        &documents,
        &LopdfReader::default(),
        None,
        &AccountingCodes::duas(),
        &mut NoProgress,
    )
    .ok_or("non-empty upload should yield a table")?;

    assert_eq!(table.len(), 1);
    assert_eq!(rendered(&table, 0, "PEC"), "PEC 555");
    assert_eq!(table.cell(0, "Ad_Valorem"), Some(&Cell::Number(1250.0)));
    assert_eq!(table.cell(0, "IGV"), Some(&Cell::Number(1050.5)));
    assert_eq!(rendered(&table, 0, "Error"), "");
    Ok(())
}

#[test]
fn one_corrupt_file_among_three_is_reported_once() -> TestResult {
    let documents = vec![
        UploadedPdf::new("a.pdf", common::duas_pdf("118-0165-10-016559", "15/03/2024")?),
        UploadedPdf::new("b.pdf", b"%PDF-1.5\nthis is not a pdf body".to_vec()),
        UploadedPdf::new("c.pdf", common::duas_pdf("235-2024-10-123456", "18/03/2024")?),
    ];

    let table = process_duas(
        &documents,
        &LopdfReader::default(),
        None,
        &AccountingCodes::duas(),
        &mut NoProgress,
    )
    .ok_or("non-empty upload should yield a table")?;

    assert_eq!(table.len(), 3);
    let sources = (0..3).map(|row| rendered(&table, row, "source_file")).collect::<Vec<_>>();
    assert_eq!(sources, vec!["a.pdf", "b.pdf", "c.pdf"]);

    let errors = (0..3).map(|row| rendered(&table, row, "Error")).collect::<Vec<_>>();
    assert_eq!(errors.iter().filter(|error| !error.is_empty()).count(), 1);
    assert!(errors[1].starts_with("Error reading the PDF"));
    assert_eq!(rendered(&table, 1, "Cuenta"), "");
    assert_eq!(rendered(&table, 2, "Declaracion"), "235-123456");
    Ok(())
}

#[test]
fn rates_join_on_the_declaration_date() -> TestResult {
    let rates = rates()?;
    let documents = vec![
        UploadedPdf::new("hit.pdf", common::duas_pdf("118-0165-10-016559", "15/03/2024")?),
        UploadedPdf::new("miss.pdf", common::duas_pdf("118-0165-10-016560", "16/03/2024")?),
    ];

    let table = process_duas(
        &documents,
        &LopdfReader::default(),
        Some(&rates),
        &AccountingCodes::duas(),
        &mut NoProgress,
    )
    .ok_or("non-empty upload should yield a table")?;

    assert_eq!(table.cell(0, "Tasa"), Some(&Cell::Number(3.718)));
    assert_eq!(table.cell(1, "Tasa"), Some(&Cell::Missing));
    assert_eq!(rendered(&table, 1, "Error"), "");
    Ok(())
}

#[test]
fn percepcion_pdf_yields_business_fields() -> TestResult {
    let documents = vec![UploadedPdf::new("perc-1.pdf", common::percepcion_pdf()?)];
    let mut seen = Vec::new();
    let mut progress = |index: usize, total: usize, name: &str| {
        seen.push((index, total, name.to_string()));
    };

    let table = process_percepciones(
        &documents,
        &LopdfReader::default(),
        &AccountingCodes::percepciones(),
        &mut progress,
    )
    .ok_or("non-empty upload should yield a table")?;

    assert_eq!(seen, vec![(1, 1, "perc-1.pdf".to_string())]);
    assert_eq!(table.headers[0], "Source_File");
    assert_eq!(rendered(&table, 0, "No_Liquidacion"), "118-016559");
    assert_eq!(rendered(&table, 0, "CDA"), "18-016559");
    assert_eq!(rendered(&table, 0, "Fecha"), "150324");
    assert_eq!(table.cell(0, "Monto"), Some(&Cell::Number(8428.74)));
    assert_eq!(rendered(&table, 0, "Tasa"), "1.00");
    assert_eq!(rendered(&table, 0, "Error"), "");
    Ok(())
}

#[test]
fn duas_page_read_as_percepcion_is_flagged() -> TestResult {
    let documents = vec![UploadedPdf::new(
        "wrong-kind.pdf",
        common::duas_pdf("118-0165-10-016559", "15/03/2024")?,
    )];

    let table = process_percepciones(
        &documents,
        &LopdfReader::default(),
        &AccountingCodes::percepciones(),
        &mut NoProgress,
    )
    .ok_or("non-empty upload should yield a table")?;

    assert_eq!(table.len(), 1);
    assert_eq!(rendered(&table, 0, "Error"), "Can't read the file");
    assert_eq!(rendered(&table, 0, "Cuenta"), "");
    Ok(())
}
