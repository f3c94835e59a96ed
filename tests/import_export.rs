use chrono::NaiveDate;
use domain_portfolio::export::{write_domains_workbook, write_sales_csv, write_template};
use domain_portfolio::{
    decode_sales_csv, import_file, CustomLists, DomainStatus, ImportDefaults, ImportNormalizer,
    ImportSource, NewDomain, PortfolioStore, SALES_CSV_FILE_NAME, TEMPLATE_FILE_NAME,
};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn normalizer() -> ImportNormalizer {
    ImportNormalizer::new(&CustomLists::default(), &ImportDefaults::default())
        .with_today(date(2026, 10, 16))
}

#[test]
fn template_imports_as_one_example_domain() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(TEMPLATE_FILE_NAME);

    write_template(&path).unwrap();
    let batch = import_file(&path, &normalizer()).unwrap();

    assert_eq!(batch.source, ImportSource::Workbook);
    assert_eq!(batch.domains.len(), 1);

    let d = &batch.domains[0];
    assert_eq!(d.name, "exemple.com");
    assert_eq!(d.registrar, "GoDaddy");
    assert_eq!(d.category, "Business");
    assert_eq!(d.purchase_date, Some(date(2024, 1, 1)));
    assert_eq!(d.expiration_date, Some(date(2025, 1, 1)));
    assert_eq!(d.status, DomainStatus::Active);
    assert_eq!(d.purchase_price, 15.0);
}

#[test]
fn exported_workbook_reimports_the_same_portfolio() {
    let dir = TempDir::new().unwrap();
    let store = PortfolioStore::with_demo_data("test").unwrap();

    let path = write_domains_workbook(dir.path(), store.domains(), date(2024, 5, 1)).unwrap();
    assert!(path.ends_with("domains_2024-05-01.xlsx"));

    let batch = import_file(&path, &normalizer()).unwrap();
    let mut reimported = PortfolioStore::new();
    let created = reimported.bulk_create_domains(batch.domains).unwrap();

    assert_eq!(created.len(), store.domains().len());
    for (original, copy) in store.domains().iter().zip(&created) {
        assert_eq!(copy.name, original.name);
        assert_eq!(copy.registrar, original.registrar);
        assert_eq!(copy.category, original.category);
        assert_eq!(copy.purchase_date, original.purchase_date);
        assert_eq!(copy.expiration_date, original.expiration_date);
        assert_eq!(copy.status, original.status);
        assert_eq!(copy.purchase_price, original.purchase_price);
    }
}

#[test]
fn sales_ledger_file_reads_back() {
    let dir = TempDir::new().unwrap();
    let store = PortfolioStore::with_demo_data("test").unwrap();

    let path = write_sales_csv(dir.path(), store.sales()).unwrap();
    assert!(path.ends_with(SALES_CSV_FILE_NAME));

    let file = std::fs::File::open(&path).unwrap();
    let sales = decode_sales_csv(file).unwrap();

    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].domain_name, "monsite.fr");
    assert_eq!(sales[0].sale_price, 150.0);
    assert_eq!(sales[0].buyer, "Jean Dupont");
}

#[test]
fn csv_file_with_export_headers_imports() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("domains.csv");
    std::fs::write(
        &path,
        "Nom de domaine,Registrar,Catégorie,Date d'achat,Statut,Prix d'achat\n\
         exemple.com,OVH,Blog,15/01/2023,invalide,\"12,50\"\n\
         ,OVH,Blog,2023-01-15,active,3\n\
         monsite.fr,Unknown,Nope,,sold,\n",
    )
    .unwrap();

    let batch = import_file(&path, &normalizer()).unwrap();

    assert_eq!(batch.source, ImportSource::Csv);
    assert_eq!(batch.rows_read, 3);
    assert_eq!(batch.rows_dropped, 1);

    let first = &batch.domains[0];
    assert_eq!(first.purchase_date, Some(date(2023, 1, 15)));
    assert_eq!(first.expiration_date, Some(date(2024, 1, 15)));
    assert_eq!(first.status, DomainStatus::Active);
    assert_eq!(first.purchase_price, 12.5);

    let second = &batch.domains[1];
    assert_eq!(second.registrar, "GoDaddy");
    assert_eq!(second.category, "Business");
    assert_eq!(second.status, DomainStatus::Sold);
    assert_eq!(second.purchase_date, Some(date(2026, 10, 16)));
}

#[test]
fn text_file_imports_one_domain_per_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bulk.txt");
    std::fs::write(&path, "alpha.com\n\n  beta.fr  \n").unwrap();

    let batch = import_file(&path, &normalizer()).unwrap();
    let names: Vec<&str> = batch.domains.iter().map(|d| d.name.as_str()).collect();

    assert_eq!(names, vec!["alpha.com", "beta.fr"]);
}

#[test]
fn unreadable_workbook_imports_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"PK not really a zip").unwrap();

    let mut store = PortfolioStore::new();
    store.create_domain(NewDomain::new("existing.com", date(2024, 1, 1))).unwrap();

    assert!(import_file(&path, &normalizer()).is_err());
    assert_eq!(store.domains().len(), 1);
}

#[test]
fn missing_file_is_a_decode_error() {
    let dir = TempDir::new().unwrap();
    let err = import_file(&dir.path().join("absent.xlsx"), &normalizer()).unwrap_err();
    assert!(err.to_string().starts_with("import failed"));
}
