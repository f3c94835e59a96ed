// Spreadsheet column headers shared by export and import.
// Import matches these strings exactly (case-sensitive).

pub const NAME: &str = "Nom de domaine";
pub const REGISTRAR: &str = "Registrar";
pub const CATEGORY: &str = "Catégorie";
pub const PURCHASE_DATE: &str = "Date d'achat";
pub const EXPIRATION_DATE: &str = "Date d'expiration";
pub const STATUS: &str = "Statut";
pub const PURCHASE_PRICE: &str = "Prix d'achat";
pub const SALE_PRICE: &str = "Prix de vente";
pub const SALE_DATE: &str = "Date de vente";
pub const BUYER: &str = "Acheteur";

/// Domain sheet columns, in export order
pub const DOMAIN_HEADERS: [&str; 10] = [
    NAME,
    REGISTRAR,
    CATEGORY,
    PURCHASE_DATE,
    EXPIRATION_DATE,
    STATUS,
    PURCHASE_PRICE,
    SALE_PRICE,
    SALE_DATE,
    BUYER,
];

/// Sales ledger CSV columns
pub const SALES_HEADERS: [&str; 4] = [NAME, SALE_DATE, SALE_PRICE, BUYER];
