// 📤 Export - workbook, import template, sales ledger CSV
//
// All three produce bytes/strings in memory; the `write_*` helpers put them
// on disk under the fixed file names.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rust_xlsxwriter::Workbook;
use tracing::info;

use crate::columns;
use crate::error::{PortfolioError, PortfolioResult};
use crate::records::{DomainRecord, DomainStatus, Sale};

pub const DOMAINS_SHEET_NAME: &str = "Domaines";
pub const TEMPLATE_SHEET_NAME: &str = "Template";
pub const TEMPLATE_FILE_NAME: &str = "template_domains.xlsx";
pub const SALES_CSV_FILE_NAME: &str = "sales-history.csv";

/// `domains_<YYYY-MM-DD>.xlsx`
pub fn export_file_name(date: NaiveDate) -> String {
    format!("domains_{}.xlsx", date.format("%Y-%m-%d"))
}

// ============================================================================
// WORKBOOKS
// ============================================================================

enum SheetCell {
    Text(String),
    Number(f64),
}

fn domain_row(domain: &DomainRecord) -> Vec<SheetCell> {
    vec![
        SheetCell::Text(domain.name.clone()),
        SheetCell::Text(domain.registrar.clone()),
        SheetCell::Text(domain.category.clone()),
        SheetCell::Text(domain.purchase_date.to_string()),
        SheetCell::Text(domain.expiration_date.to_string()),
        SheetCell::Text(domain.status.as_str().to_string()),
        SheetCell::Number(domain.purchase_price),
        SheetCell::Number(domain.sale_price.unwrap_or(0.0)),
        SheetCell::Text(domain.sale_date.map(|d| d.to_string()).unwrap_or_default()),
        SheetCell::Text(domain.buyer.clone().unwrap_or_default()),
    ]
}

fn template_row() -> Vec<SheetCell> {
    vec![
        SheetCell::Text("exemple.com".to_string()),
        SheetCell::Text("GoDaddy".to_string()),
        SheetCell::Text("Business".to_string()),
        SheetCell::Text("2024-01-01".to_string()),
        SheetCell::Text("2025-01-01".to_string()),
        SheetCell::Text(DomainStatus::Active.as_str().to_string()),
        SheetCell::Number(15.0),
        SheetCell::Number(0.0),
        SheetCell::Text(String::new()),
        SheetCell::Text(String::new()),
    ]
}

fn build_workbook(sheet_name: &str, rows: &[Vec<SheetCell>]) -> PortfolioResult<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    worksheet
        .set_name(sheet_name)
        .map_err(|e| PortfolioError::Export(format!("Failed to name sheet '{}': {}", sheet_name, e)))?;

    for (col, header) in columns::DOMAIN_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(|e| PortfolioError::Export(format!("Failed to write header '{}': {}", header, e)))?;
    }

    for (i, cells) in rows.iter().enumerate() {
        let r = (i + 1) as u32;

        for (col, cell) in cells.iter().enumerate() {
            let written = match cell {
                // Empty strings stay blank cells
                SheetCell::Text(text) if text.is_empty() => continue,
                SheetCell::Text(text) => worksheet.write_string(r, col as u16, text).map(|_| ()),
                SheetCell::Number(value) => worksheet.write_number(r, col as u16, *value).map(|_| ()),
            };
            written.map_err(|e| {
                PortfolioError::Export(format!("Failed to write row {} column {}: {}", r, col, e))
            })?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| PortfolioError::Export(format!("Failed to save workbook: {}", e)))
}

/// One row per domain, in collection order, on a sheet named "Domaines"
pub fn domains_workbook(domains: &[DomainRecord]) -> PortfolioResult<Vec<u8>> {
    let rows: Vec<Vec<SheetCell>> = domains.iter().map(domain_row).collect();
    build_workbook(DOMAINS_SHEET_NAME, &rows)
}

/// Header row plus one example row, on a sheet named "Template"
pub fn template_workbook() -> PortfolioResult<Vec<u8>> {
    build_workbook(TEMPLATE_SHEET_NAME, &[template_row()])
}

// ============================================================================
// SALES CSV
// ============================================================================

/// Whole numbers print without decimals ("150"), others as-is ("12.5")
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Sales ledger as CSV. Fields are written unquoted, so a comma inside a
/// buyer name shifts the columns of that line.
pub fn sales_csv(sales: &[Sale]) -> PortfolioResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let csv_err = |e: csv::Error| PortfolioError::Export(format!("Failed to write CSV: {}", e));

    wtr.write_record(columns::SALES_HEADERS).map_err(csv_err)?;

    for sale in sales {
        wtr.write_record([
            sale.domain_name.clone(),
            sale.sale_date.to_string(),
            format_amount(sale.sale_price),
            sale.buyer.clone(),
        ])
        .map_err(csv_err)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| PortfolioError::Export(format!("Failed to flush CSV: {}", e)))?;

    String::from_utf8(bytes).map_err(|e| PortfolioError::Export(e.to_string()))
}

// ============================================================================
// FILES
// ============================================================================

fn write_bytes(path: &Path, bytes: &[u8]) -> PortfolioResult<()> {
    std::fs::write(path, bytes)
        .map_err(|e| PortfolioError::Export(format!("cannot write {}: {}", path.display(), e)))
}

/// Writes `domains_<date>.xlsx` into `dir` and returns its path
pub fn write_domains_workbook(
    dir: &Path,
    domains: &[DomainRecord],
    date: NaiveDate,
) -> PortfolioResult<PathBuf> {
    let path = dir.join(export_file_name(date));
    write_bytes(&path, &domains_workbook(domains)?)?;
    info!(path = %path.display(), domains = domains.len(), "workbook exported");
    Ok(path)
}

pub fn write_template(path: &Path) -> PortfolioResult<()> {
    write_bytes(path, &template_workbook()?)?;
    info!(path = %path.display(), "template written");
    Ok(())
}

/// Writes `sales-history.csv` into `dir` and returns its path
pub fn write_sales_csv(dir: &Path, sales: &[Sale]) -> PortfolioResult<PathBuf> {
    let path = dir.join(SALES_CSV_FILE_NAME);
    write_bytes(&path, sales_csv(sales)?.as_bytes())?;
    info!(path = %path.display(), sales = sales.len(), "sales ledger exported");
    Ok(path)
}
