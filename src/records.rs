// 🗂️ Record Model - domains, evaluations, sales
//
// Identity (id) is assigned by the store and never changes.
// Values (name, prices, dates) change only through explicit edits.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::derivation::compute_expiration;

// ============================================================================
// DOMAIN STATUS
// ============================================================================

/// Lifecycle status of a domain. Purely user-set: nothing transitions it
/// automatically (not even expiration or a sale ledger entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainStatus {
    #[default]
    Active,
    ForSale,
    Sold,
    Expired,
}

impl DomainStatus {
    pub const ALL: [DomainStatus; 4] = [
        DomainStatus::Active,
        DomainStatus::ForSale,
        DomainStatus::Sold,
        DomainStatus::Expired,
    ];

    /// Boundary literal used in exports, imports and the API
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainStatus::Active => "active",
            DomainStatus::ForSale => "for-sale",
            DomainStatus::Sold => "sold",
            DomainStatus::Expired => "expired",
        }
    }

    /// Parse a status label.
    ///
    /// Accepts the boundary literals plus the French labels older
    /// spreadsheets carry ("actif", "en-vente", "vendu", "expire").
    /// Anything else is `None`; callers decide the fallback.
    pub fn parse_label(label: &str) -> Option<DomainStatus> {
        match label.trim().to_lowercase().as_str() {
            "active" | "actif" => Some(DomainStatus::Active),
            "for-sale" | "en-vente" => Some(DomainStatus::ForSale),
            "sold" | "vendu" => Some(DomainStatus::Sold),
            "expired" | "expire" | "expiré" => Some(DomainStatus::Expired),
            _ => None,
        }
    }
}

impl std::fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DOMAIN RECORD
// ============================================================================

/// One tracked domain name and its commercial metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecord {
    /// May be omitted in update bodies, where the path id is used
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub registrar: String,
    pub category: String,
    pub purchase_date: NaiveDate,

    /// Stored, not recomputed on read. Editing `purchase_date` leaves it
    /// alone unless `rederive_expiration` is called.
    pub expiration_date: NaiveDate,

    #[serde(default)]
    pub status: DomainStatus,

    #[serde(default)]
    pub purchase_price: f64,

    // Meaningful only when status = sold
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyer: Option<String>,
}

impl DomainRecord {
    pub fn is_sold(&self) -> bool {
        self.status == DomainStatus::Sold
    }

    /// Recompute the expiration date from the current purchase date
    pub fn rederive_expiration(&mut self) {
        if let Some(expiration) = compute_expiration(Some(self.purchase_date)) {
            self.expiration_date = expiration;
        }
    }

    /// Days left before expiration, negative once expired
    pub fn days_until_expiration(&self, today: NaiveDate) -> i64 {
        (self.expiration_date - today).num_days()
    }
}

/// A domain that has not been handed to the store yet (no id).
///
/// This is what forms, the import normalizer and the API produce.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDomain {
    pub name: String,
    pub registrar: String,
    pub category: String,
    pub purchase_date: Option<NaiveDate>,

    /// Derived from `purchase_date` when absent
    pub expiration_date: Option<NaiveDate>,
    pub status: DomainStatus,
    pub purchase_price: f64,
    pub sale_price: Option<f64>,
    pub sale_date: Option<NaiveDate>,
    pub buyer: Option<String>,
}

impl NewDomain {
    pub fn new(name: impl Into<String>, purchase_date: NaiveDate) -> Self {
        NewDomain {
            name: name.into(),
            purchase_date: Some(purchase_date),
            ..Default::default()
        }
    }

    /// Builder pattern: registrar
    pub fn with_registrar(mut self, registrar: impl Into<String>) -> Self {
        self.registrar = registrar.into();
        self
    }

    /// Builder pattern: category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_status(mut self, status: DomainStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_purchase_price(mut self, price: f64) -> Self {
        self.purchase_price = price;
        self
    }

    pub fn with_expiration(mut self, expiration: NaiveDate) -> Self {
        self.expiration_date = Some(expiration);
        self
    }

    /// Builder pattern: mark as sold with sale details
    pub fn sold(mut self, price: f64, date: NaiveDate, buyer: impl Into<String>) -> Self {
        self.status = DomainStatus::Sold;
        self.sale_price = Some(price);
        self.sale_date = Some(date);
        self.buyer = Some(buyer.into());
        self
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// A value estimate for a domain at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evaluation {
    pub id: String,
    pub domain_id: String,
    pub tool: String,
    pub date: NaiveDate,
    pub estimated_value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewEvaluation {
    pub domain_id: String,
    pub tool: String,

    /// Defaults to today when absent
    pub date: Option<NaiveDate>,
    pub estimated_value: f64,
}

// ============================================================================
// SALE
// ============================================================================

/// Sales ledger entry.
///
/// `domain_name` is a copy taken at sale time, not a reference: renaming or
/// deleting the domain later does not touch the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub domain_name: String,
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    #[serde(default)]
    pub buyer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSale {
    pub domain_name: String,
    pub sale_date: NaiveDate,
    pub sale_price: f64,
    #[serde(default)]
    pub buyer: String,
}

impl NewSale {
    /// Ledger entry mirroring a domain's own sale fields.
    ///
    /// Returns None unless the domain is sold. Nothing calls this
    /// implicitly; the caller records the sale if it wants both in sync.
    pub fn from_sold_domain(domain: &DomainRecord) -> Option<NewSale> {
        if !domain.is_sold() {
            return None;
        }

        Some(NewSale {
            domain_name: domain.name.clone(),
            sale_date: domain.sale_date?,
            sale_price: domain.sale_price.unwrap_or(0.0),
            buyer: domain.buyer.clone().unwrap_or_default(),
        })
    }
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

    #[test]
    fn test_status_literals() {
        assert_eq!(DomainStatus::Active.as_str(), "active");
        assert_eq!(DomainStatus::ForSale.as_str(), "for-sale");
        assert_eq!(DomainStatus::Sold.as_str(), "sold");
        assert_eq!(DomainStatus::Expired.as_str(), "expired");
        assert_eq!(DomainStatus::default(), DomainStatus::Active);
    }

    #[test]
    fn test_status_parse_label() {
        assert_eq!(DomainStatus::parse_label("for-sale"), Some(DomainStatus::ForSale));
        assert_eq!(DomainStatus::parse_label(" SOLD "), Some(DomainStatus::Sold));
        assert_eq!(DomainStatus::parse_label("vendu"), Some(DomainStatus::Sold));
        assert_eq!(DomainStatus::parse_label("actif"), Some(DomainStatus::Active));
        assert_eq!(DomainStatus::parse_label("invalide"), None);
        assert_eq!(DomainStatus::parse_label(""), None);
    }

    #[test]
    fn test_status_serde_uses_boundary_literals() {
        let json = serde_json::to_string(&DomainStatus::ForSale).unwrap();
        assert_eq!(json, "\"for-sale\"");

        let parsed: DomainStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(parsed, DomainStatus::Expired);
    }

    #[test]
    fn test_rederive_expiration_is_explicit() {
        let mut record = DomainRecord {
            id: "dom-1".to_string(),
            name: "exemple.com".to_string(),
            registrar: "GoDaddy".to_string(),
            category: "Business".to_string(),
            purchase_date: date(2023, 1, 15),
            expiration_date: date(2024, 12, 15),
            status: DomainStatus::Active,
            purchase_price: 15.0,
            sale_price: None,
            sale_date: None,
            buyer: None,
        };

        // Editing the purchase date alone keeps the stored expiration
        record.purchase_date = date(2023, 6, 1);
        assert_eq!(record.expiration_date, date(2024, 12, 15));

        record.rederive_expiration();
        assert_eq!(record.expiration_date, date(2024, 6, 1));
        assert_eq!(record.days_until_expiration(date(2024, 5, 31)), 1);
    }

    #[test]
    fn test_new_sale_from_sold_domain() {
        let record = DomainRecord {
            id: "dom-2".to_string(),
            name: "monsite.fr".to_string(),
            registrar: "OVH".to_string(),
            category: "Personnel".to_string(),
            purchase_date: date(2023, 3, 20),
            expiration_date: date(2025, 2, 20),
            status: DomainStatus::Sold,
            purchase_price: 12.0,
            sale_price: Some(150.0),
            sale_date: Some(date(2024, 1, 10)),
            buyer: Some("Jean Dupont".to_string()),
        };

        let sale = NewSale::from_sold_domain(&record).unwrap();
        assert_eq!(sale.domain_name, "monsite.fr");
        assert_eq!(sale.sale_price, 150.0);
        assert_eq!(sale.buyer, "Jean Dupont");

        let mut active = record.clone();
        active.status = DomainStatus::Active;
        assert!(NewSale::from_sold_domain(&active).is_none());
    }

    #[test]
    fn test_new_domain_deserializes_camel_case_with_defaults() {
        let input: NewDomain = serde_json::from_str(
            r#"{"name": "exemple.com", "purchaseDate": "2023-01-15", "purchasePrice": 15}"#,
        )
        .unwrap();

        assert_eq!(input.name, "exemple.com");
        assert_eq!(input.purchase_date, Some(date(2023, 1, 15)));
        assert_eq!(input.status, DomainStatus::Active);
        assert_eq!(input.expiration_date, None);
        assert_eq!(input.purchase_price, 15.0);
    }
}
