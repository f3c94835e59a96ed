// 📥 Import Normalizer - loosely-typed rows → NewDomain
//
// Two input shapes:
//   1. Spreadsheet rows (header → cell text), from a workbook or a CSV file
//   2. Line-delimited text, one domain name per line
//
// Normalization never fails per row: bad values fall back to defaults and
// rows without a name are dropped. Decoding the file can fail, and then
// nothing is returned at all.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::columns;
use crate::derivation::compute_expiration;
use crate::error::{PortfolioError, PortfolioResult};
use crate::records::{DomainStatus, NewDomain, NewSale};
use crate::settings::{CustomLists, ImportDefaults};

/// One spreadsheet row: column header → cell text
pub type SpreadsheetRow = HashMap<String, String>;

// ============================================================================
// SOURCE DETECTION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportSource {
    Workbook,
    Csv,
    Text,
}

impl ImportSource {
    /// Detect from file extension. Unknown extensions are treated as text.
    pub fn detect(file_name: &str) -> ImportSource {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => ImportSource::Workbook,
            "csv" => ImportSource::Csv,
            _ => ImportSource::Text,
        }
    }
}

/// Result of decoding + normalizing one file
#[derive(Debug, Clone, Serialize)]
pub struct ImportBatch {
    pub source_name: String,
    pub source: ImportSource,

    /// SHA-256 of the raw bytes, for tracing which file produced which records
    pub digest: String,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub domains: Vec<NewDomain>,
}

// ============================================================================
// NORMALIZER
// ============================================================================

pub struct ImportNormalizer {
    registrars: Vec<String>,
    categories: Vec<String>,
    defaults: ImportDefaults,
    today: NaiveDate,
}

impl ImportNormalizer {
    pub fn new(lists: &CustomLists, defaults: &ImportDefaults) -> Self {
        ImportNormalizer {
            registrars: lists.registrars.clone(),
            categories: lists.categories.clone(),
            defaults: defaults.clone(),
            today: Local::now().date_naive(),
        }
    }

    /// Pin "today" (purchase-date default) for deterministic imports
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Head of the allowed list, or the configured fallback when empty
    pub fn default_registrar(&self) -> &str {
        self.registrars
            .first()
            .map(String::as_str)
            .unwrap_or(&self.defaults.fallback_registrar)
    }

    pub fn default_category(&self) -> &str {
        self.categories
            .first()
            .map(String::as_str)
            .unwrap_or(&self.defaults.fallback_category)
    }

    /// Normalize spreadsheet rows. Rows with an empty name are dropped.
    pub fn normalize_rows(&self, rows: &[SpreadsheetRow]) -> Vec<NewDomain> {
        rows.iter().filter_map(|row| self.normalize_row(row)).collect()
    }

    pub fn normalize_row(&self, row: &SpreadsheetRow) -> Option<NewDomain> {
        let name = cell(row, columns::NAME)?;

        let registrar = match cell(row, columns::REGISTRAR) {
            Some(value) if self.registrars.iter().any(|r| r == value) => value.to_string(),
            _ => self.default_registrar().to_string(),
        };

        let category = match cell(row, columns::CATEGORY) {
            Some(value) if self.categories.iter().any(|c| c == value) => value.to_string(),
            _ => self.default_category().to_string(),
        };

        let status = match cell(row, columns::STATUS) {
            None => DomainStatus::Active,
            Some(label) => DomainStatus::parse_label(label).unwrap_or_else(|| {
                warn!(domain = name, status = label, "unknown status, using active");
                DomainStatus::Active
            }),
        };

        let purchase_date = cell(row, columns::PURCHASE_DATE)
            .and_then(|value| self.date_or_warn(name, columns::PURCHASE_DATE, value))
            .unwrap_or(self.today);

        let expiration_date = cell(row, columns::EXPIRATION_DATE)
            .and_then(|value| self.date_or_warn(name, columns::EXPIRATION_DATE, value))
            .or_else(|| compute_expiration(Some(purchase_date)));

        // Sale fields stay absent unless the row carries a sale
        let sale_price = amount(row, columns::SALE_PRICE);
        let sale_price = (status == DomainStatus::Sold || sale_price > 0.0).then_some(sale_price);

        Some(NewDomain {
            name: name.to_string(),
            registrar,
            category,
            purchase_date: Some(purchase_date),
            expiration_date,
            status,
            purchase_price: amount(row, columns::PURCHASE_PRICE),
            sale_price,
            sale_date: cell(row, columns::SALE_DATE).and_then(parse_date),
            buyer: cell(row, columns::BUYER).map(str::to_string),
        })
    }

    /// One domain per non-blank line
    pub fn normalize_text(&self, text: &str) -> Vec<NewDomain> {
        let expiration = compute_expiration(Some(self.today));

        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|name| NewDomain {
                name: name.to_string(),
                registrar: self.default_registrar().to_string(),
                category: self.default_category().to_string(),
                purchase_date: Some(self.today),
                expiration_date: expiration,
                status: DomainStatus::Active,
                purchase_price: 0.0,
                sale_price: None,
                sale_date: None,
                buyer: None,
            })
            .collect()
    }

    fn date_or_warn(&self, domain: &str, column: &str, value: &str) -> Option<NaiveDate> {
        let parsed = parse_date(value);
        if parsed.is_none() {
            warn!(domain, column, value, "unreadable date, using default");
        }
        parsed
    }
}

/// Non-empty trimmed cell text
fn cell<'a>(row: &'a SpreadsheetRow, column: &str) -> Option<&'a str> {
    row.get(column).map(|v| v.trim()).filter(|v| !v.is_empty())
}

fn amount(row: &SpreadsheetRow, column: &str) -> f64 {
    cell(row, column).map(parse_amount).unwrap_or(0.0)
}

// ============================================================================
// VALUE PARSING
// ============================================================================

/// Lenient amount parsing: leading numeric prefix ("15€" → 15), comma as
/// decimal separator, 0 on failure. Negative amounts clamp to 0.
///
/// Spaces are thousands separators ("1 500"). When both `.` and `,` appear,
/// the last one is the decimal separator ("1.234,56" and "1,234.56").
pub fn parse_amount(raw: &str) -> f64 {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = match (compact.rfind('.'), compact.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (None, Some(_)) => compact.replace(',', "."),
        _ => compact,
    };

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, ch) in normalized.char_indices() {
        match ch {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + ch.len_utf8();
    }

    if !seen_digit {
        return 0.0;
    }

    match normalized[..end].trim_end_matches('.').parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        Ok(value) if value < 0.0 => {
            warn!(value, "negative amount clamped to 0");
            0.0
        }
        _ => 0.0,
    }
}

/// Accepts `YYYY-MM-DD` (optionally followed by a time), `DD/MM/YYYY`, or an
/// Excel serial day number from 1910 on. A bare year such as `2023` is not a
/// date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();

    if let Some(head) = value.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d") {
            return Some(date);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%d/%m/%Y") {
        return Some(date);
    }

    excel_serial_date(value)
}

/// Serials below this (1910) are more likely a bare year or a count than a date
const MIN_EXCEL_SERIAL: f64 = 3653.0;
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

fn excel_serial_date(value: &str) -> Option<NaiveDate> {
    if !value.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }

    let serial: f64 = value.parse().ok()?;
    if !(MIN_EXCEL_SERIAL..MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }

    // Excel day 0 is 1899-12-30 once its 1900 leap-year bug is accounted for
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))
}

// ============================================================================
// DECODERS
// ============================================================================

/// Rows of the first sheet of a workbook (xlsx, xls, ods)
pub fn decode_workbook(bytes: &[u8]) -> PortfolioResult<Vec<SpreadsheetRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| PortfolioError::ImportDecode(format!("not a readable workbook: {}", e)))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| PortfolioError::ImportDecode("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| PortfolioError::ImportDecode(format!("sheet '{}': {}", sheet_name, e)))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(cell_text).collect(),
        None => return Ok(Vec::new()),
    };

    Ok(rows
        .map(|cells| zip_row(&headers, cells.iter().map(cell_text)))
        .filter(|row| !row.is_empty())
        .collect())
}

/// Rows of a CSV file whose first line is the header
pub fn decode_csv_rows<R: Read>(reader: R) -> PortfolioResult<Vec<SpreadsheetRow>> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| PortfolioError::ImportDecode(format!("unreadable CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| PortfolioError::ImportDecode(format!("unreadable CSV row: {}", e)))?;
        let row = zip_row(&headers, record.iter().map(|v| v.trim().to_string()));
        if !row.is_empty() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Sales ledger CSV (same header as the ledger export).
///
/// Entries without a domain name or a readable sale date are skipped.
pub fn decode_sales_csv<R: Read>(reader: R) -> PortfolioResult<Vec<NewSale>> {
    let rows = decode_csv_rows(reader)?;

    Ok(rows
        .iter()
        .filter_map(|row| {
            let domain_name = cell(row, columns::NAME)?;
            let sale_date = match cell(row, columns::SALE_DATE).and_then(parse_date) {
                Some(date) => date,
                None => {
                    warn!(domain = domain_name, "sale without a readable date skipped");
                    return None;
                }
            };

            Some(NewSale {
                domain_name: domain_name.to_string(),
                sale_date,
                sale_price: amount(row, columns::SALE_PRICE),
                buyer: cell(row, columns::BUYER).unwrap_or("").to_string(),
            })
        })
        .collect())
}

fn zip_row(headers: &[String], values: impl Iterator<Item = String>) -> SpreadsheetRow {
    headers
        .iter()
        .zip(values)
        .filter(|(header, value)| !header.is_empty() && !value.is_empty())
        .map(|(header, value)| (header.clone(), value))
        .collect()
}

fn cell_text(data: &Data) -> String {
    match data {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => format_number(*f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => datetime.date().to_string(),
            None => format_number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ============================================================================
// FILE ENTRY POINTS
// ============================================================================

/// Decode and normalize raw file bytes. Nothing reaches the store here; the
/// caller hands `batch.domains` to `bulk_create_domains`.
pub fn import_bytes(
    source_name: &str,
    bytes: &[u8],
    normalizer: &ImportNormalizer,
) -> PortfolioResult<ImportBatch> {
    let source = ImportSource::detect(source_name);

    let (rows_read, domains) = match source {
        ImportSource::Workbook => {
            let rows = decode_workbook(bytes)?;
            (rows.len(), normalizer.normalize_rows(&rows))
        }
        ImportSource::Csv => {
            let rows = decode_csv_rows(bytes)?;
            (rows.len(), normalizer.normalize_rows(&rows))
        }
        ImportSource::Text => {
            let text = std::str::from_utf8(bytes)
                .map_err(|e| PortfolioError::ImportDecode(format!("text is not UTF-8: {}", e)))?;
            let domains = normalizer.normalize_text(text);
            (domains.len(), domains)
        }
    };

    let batch = ImportBatch {
        source_name: source_name.to_string(),
        source,
        digest: format!("{:x}", Sha256::digest(bytes)),
        rows_read,
        rows_dropped: rows_read - domains.len(),
        domains,
    };

    info!(
        source = %batch.source_name,
        rows = batch.rows_read,
        dropped = batch.rows_dropped,
        "import decoded"
    );

    Ok(batch)
}

pub fn import_file(path: &Path, normalizer: &ImportNormalizer) -> PortfolioResult<ImportBatch> {
    let bytes = std::fs::read(path)
        .map_err(|e| PortfolioError::ImportDecode(format!("cannot read {}: {}", path.display(), e)))?;

    let source_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("import");

    import_bytes(source_name, &bytes, normalizer)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn normalizer() -> ImportNormalizer {
        ImportNormalizer::new(&CustomLists::default(), &ImportDefaults::default())
            .with_today(date(2026, 10, 16))
    }

    fn row(pairs: &[(&str, &str)]) -> SpreadsheetRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_row() {
        let domains = normalizer().normalize_rows(&[row(&[
            ("Nom de domaine", "exemple.com"),
            ("Registrar", "OVH"),
            ("Catégorie", "Blog"),
            ("Date d'achat", "2023-01-15"),
            ("Date d'expiration", "2025-01-15"),
            ("Statut", "for-sale"),
            ("Prix d'achat", "15"),
            ("Prix de vente", "0"),
            ("Acheteur", "Jean Dupont"),
        ])]);

        assert_eq!(domains.len(), 1);
        let d = &domains[0];
        assert_eq!(d.name, "exemple.com");
        assert_eq!(d.registrar, "OVH");
        assert_eq!(d.category, "Blog");
        assert_eq!(d.purchase_date, Some(date(2023, 1, 15)));
        assert_eq!(d.expiration_date, Some(date(2025, 1, 15)));
        assert_eq!(d.status, DomainStatus::ForSale);
        assert_eq!(d.purchase_price, 15.0);
        assert_eq!(d.buyer.as_deref(), Some("Jean Dupont"));
        assert_eq!(d.sale_date, None);
    }

    #[test]
    fn test_invalid_status_becomes_active() {
        let domains = normalizer().normalize_rows(&[row(&[
            ("Nom de domaine", "exemple.com"),
            ("Statut", "invalide"),
        ])]);

        assert_eq!(domains[0].status, DomainStatus::Active);
    }

    #[test]
    fn test_empty_names_are_dropped() {
        let rows = vec![
            row(&[("Nom de domaine", "a.com")]),
            row(&[("Nom de domaine", "")]),
            row(&[("Nom de domaine", "b.com")]),
            row(&[("Registrar", "OVH")]),
            row(&[("Nom de domaine", "   ")]),
        ];

        let domains = normalizer().normalize_rows(&rows);
        assert_eq!(domains.len(), rows.len() - 3);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let domains = normalizer().normalize_rows(&[row(&[
            ("Nom de domaine", "exemple.com"),
            ("Registrar", "Unknown Registrar"),
            ("Prix d'achat", "abc"),
        ])]);

        let d = &domains[0];
        assert_eq!(d.registrar, "GoDaddy");
        assert_eq!(d.category, "Business");
        assert_eq!(d.status, DomainStatus::Active);
        assert_eq!(d.purchase_date, Some(date(2026, 10, 16)));
        assert_eq!(d.expiration_date, Some(date(2027, 10, 16)));
        assert_eq!(d.purchase_price, 0.0);
    }

    #[test]
    fn test_registrar_matching_is_case_sensitive() {
        let domains = normalizer().normalize_rows(&[row(&[
            ("Nom de domaine", "exemple.com"),
            ("Registrar", "ovh"),
        ])]);

        assert_eq!(domains[0].registrar, "GoDaddy");
    }

    #[test]
    fn test_empty_lists_use_configured_fallback() {
        let lists = CustomLists {
            registrars: vec![],
            categories: vec![],
            evaluation_tools: vec![],
        };
        let defaults = ImportDefaults {
            fallback_registrar: "Gandi".to_string(),
            fallback_category: "Portfolio".to_string(),
        };
        let normalizer = ImportNormalizer::new(&lists, &defaults).with_today(date(2026, 10, 16));

        let domains = normalizer.normalize_text("exemple.com\n");
        assert_eq!(domains[0].registrar, "Gandi");
        assert_eq!(domains[0].category, "Portfolio");

        let default_fallback =
            ImportNormalizer::new(&lists, &ImportDefaults::default()).with_today(date(2026, 10, 16));
        assert_eq!(default_fallback.default_registrar(), "GoDaddy");
        assert_eq!(default_fallback.default_category(), "Business");
    }

    #[test]
    fn test_missing_expiration_derives_from_purchase() {
        let domains = normalizer().normalize_rows(&[row(&[
            ("Nom de domaine", "exemple.com"),
            ("Date d'achat", "2024-02-29"),
        ])]);

        assert_eq!(domains[0].expiration_date, Some(date(2025, 2, 28)));
    }

    #[test]
    fn test_text_import() {
        let text = "  exemple.com \n\n monsite.fr\r\n   \nthird.io";
        let domains = normalizer().normalize_text(text);

        let names: Vec<&str> = domains.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["exemple.com", "monsite.fr", "third.io"]);

        for d in &domains {
            assert_eq!(d.purchase_date, Some(date(2026, 10, 16)));
            assert_eq!(d.expiration_date, Some(date(2027, 10, 16)));
            assert_eq!(d.status, DomainStatus::Active);
            assert_eq!(d.purchase_price, 0.0);
            assert_eq!(d.registrar, "GoDaddy");
            assert_eq!(d.category, "Business");
        }

        assert!(normalizer().normalize_text("  \n \n").is_empty());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("15"), 15.0);
        assert_eq!(parse_amount(" 12.50 "), 12.5);
        assert_eq!(parse_amount("12,50"), 12.5);
        assert_eq!(parse_amount("1,234.50"), 1234.5);
        assert_eq!(parse_amount("15€"), 15.0);
        assert_eq!(parse_amount("abc"), 0.0);
        assert_eq!(parse_amount(""), 0.0);
        assert_eq!(parse_amount("-20"), 0.0);
        assert_eq!(parse_amount("7."), 7.0);
    }

    #[test]
    fn test_parse_amount_mixed_separators() {
        assert_eq!(parse_amount("1.234,56"), 1234.56);
        assert_eq!(parse_amount("1,234.56"), 1234.56);
        assert_eq!(parse_amount("1.234.567,89"), 1234567.89);
        assert_eq!(parse_amount("1 500"), 1500.0);
        assert_eq!(parse_amount("1\u{a0}500,25 €"), 1500.25);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2024-01-01"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date("2024-01-01T00:00:00.000Z"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date("15/01/2023"), Some(date(2023, 1, 15)));
        assert_eq!(parse_date("45292"), Some(date(2024, 1, 1)));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_bare_year_is_not_a_date() {
        assert_eq!(parse_date("2023"), None);
        assert_eq!(parse_date("12"), None);
        assert_eq!(parse_date("-45292"), None);

        let domains = normalizer().normalize_rows(&[row(&[
            ("Nom de domaine", "exemple.com"),
            ("Date d'achat", "2023"),
        ])]);

        assert_eq!(domains[0].purchase_date, Some(date(2026, 10, 16)));
        assert_eq!(domains[0].expiration_date, Some(date(2027, 10, 16)));
    }

    #[test]
    fn test_decode_csv_rows() {
        let csv = "Nom de domaine,Registrar,Statut\nexemple.com,OVH,sold\n,,\nmonsite.fr,Gandi,\n";
        let rows = decode_csv_rows(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("Registrar").map(String::as_str), Some("OVH"));
        assert!(!rows[1].contains_key("Statut"));
    }

    #[test]
    fn test_decode_sales_csv() {
        let csv = "Nom de domaine,Date de vente,Prix de vente,Acheteur\n\
                   monsite.fr,2024-01-10,150,Jean Dupont\n\
                   nodate.com,,20,Someone\n";
        let sales = decode_sales_csv(csv.as_bytes()).unwrap();

        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].domain_name, "monsite.fr");
        assert_eq!(sales[0].sale_date, date(2024, 1, 10));
        assert_eq!(sales[0].sale_price, 150.0);
    }

    #[test]
    fn test_decode_garbage_workbook_fails() {
        let err = decode_workbook(b"definitely not a spreadsheet").unwrap_err();
        assert!(matches!(err, PortfolioError::ImportDecode(_)));
    }

    #[test]
    fn test_import_bytes_text() {
        let batch = import_bytes("bulk.txt", b"a.com\nb.com\n", &normalizer()).unwrap();

        assert_eq!(batch.source, ImportSource::Text);
        assert_eq!(batch.domains.len(), 2);
        assert_eq!(batch.rows_dropped, 0);
        assert_eq!(batch.digest.len(), 64);
    }

    #[test]
    fn test_import_source_detection() {
        assert_eq!(ImportSource::detect("domains_2024-01-01.xlsx"), ImportSource::Workbook);
        assert_eq!(ImportSource::detect("LIST.CSV"), ImportSource::Csv);
        assert_eq!(ImportSource::detect("bulk.txt"), ImportSource::Text);
        assert_eq!(ImportSource::detect("noextension"), ImportSource::Text);
    }
}
