// ⚖️ Sale Reconciliation - domain status vs. sales ledger
//
// A domain can be marked sold without a ledger entry, and a ledger entry can
// exist for a domain that is still active. No mutation keeps the two in
// sync. This module only reports the divergence; callers decide whether to
// act on it.

use serde::{Deserialize, Serialize};

use crate::records::{DomainRecord, Sale};

// ============================================================================
// DISCREPANCIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyCategory {
    /// status = sold, but no ledger entry carries the domain name
    SoldWithoutSale,

    /// Ledger entry for a domain that exists but is not marked sold
    SaleForUnsoldDomain,

    /// Ledger entry whose name matches no current domain
    SaleForUnknownDomain,

    /// Domain sale price and ledger price disagree
    PriceMismatch,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discrepancy {
    pub domain_name: String,
    pub description: String,
    pub category: DiscrepancyCategory,
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub sold_domains: usize,
    pub ledger_entries: usize,
    pub matched: usize,
    pub discrepancies: Vec<Discrepancy>,
    pub reconciled_at: chrono::DateTime<chrono::Utc>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn by_category(&self, category: DiscrepancyCategory) -> Vec<&Discrepancy> {
        self.discrepancies
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Reconciliation: {} sold domains, {} ledger entries, {} matched, {} discrepancies",
            self.sold_domains,
            self.ledger_entries,
            self.matched,
            self.discrepancies.len()
        )
    }
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct SaleReconciler {
    /// Tolerance for price comparisons (default: 0.01)
    pub tolerance: f64,
}

impl SaleReconciler {
    pub fn new() -> Self {
        SaleReconciler { tolerance: 0.01 }
    }

    pub fn with_tolerance(tolerance: f64) -> Self {
        SaleReconciler { tolerance }
    }

    /// Match domains and ledger entries by domain name
    pub fn reconcile(&self, domains: &[DomainRecord], sales: &[Sale]) -> ReconciliationReport {
        let mut discrepancies = Vec::new();
        let mut matched = 0;

        let sold: Vec<&DomainRecord> = domains.iter().filter(|d| d.is_sold()).collect();

        for domain in &sold {
            let entries: Vec<&Sale> = sales.iter().filter(|s| s.domain_name == domain.name).collect();

            if entries.is_empty() {
                discrepancies.push(Discrepancy {
                    domain_name: domain.name.clone(),
                    description: format!("{} is marked sold but has no ledger entry", domain.name),
                    category: DiscrepancyCategory::SoldWithoutSale,
                });
                continue;
            }

            matched += 1;

            if let Some(price) = domain.sale_price {
                let ledger_total: f64 = entries.iter().map(|s| s.sale_price).sum();
                if (ledger_total - price).abs() > self.tolerance {
                    discrepancies.push(Discrepancy {
                        domain_name: domain.name.clone(),
                        description: format!(
                            "{} sale price {:.2} differs from ledger {:.2}",
                            domain.name, price, ledger_total
                        ),
                        category: DiscrepancyCategory::PriceMismatch,
                    });
                }
            }
        }

        // A name may appear on several records; any sold one covers the entry
        for sale in sales {
            let known = domains.iter().any(|d| d.name == sale.domain_name);
            let covered = domains.iter().any(|d| d.name == sale.domain_name && d.is_sold());

            match (known, covered) {
                (_, true) => {}
                (true, false) => discrepancies.push(Discrepancy {
                    domain_name: sale.domain_name.clone(),
                    description: format!("{} has a ledger entry but is not marked sold", sale.domain_name),
                    category: DiscrepancyCategory::SaleForUnsoldDomain,
                }),
                (false, false) => discrepancies.push(Discrepancy {
                    domain_name: sale.domain_name.clone(),
                    description: format!("Ledger entry for unknown domain {}", sale.domain_name),
                    category: DiscrepancyCategory::SaleForUnknownDomain,
                }),
            }
        }

        ReconciliationReport {
            sold_domains: sold.len(),
            ledger_entries: sales.len(),
            matched,
            discrepancies,
            reconciled_at: chrono::Utc::now(),
        }
    }
}

impl Default for SaleReconciler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::DomainStatus;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn create_test_domain(name: &str, status: DomainStatus, sale_price: Option<f64>) -> DomainRecord {
        DomainRecord {
            id: format!("dom-{}", name),
            name: name.to_string(),
            registrar: "OVH".to_string(),
            category: "Personnel".to_string(),
            purchase_date: date(2023, 3, 20),
            expiration_date: date(2024, 3, 20),
            status,
            purchase_price: 12.0,
            sale_price,
            sale_date: None,
            buyer: None,
        }
    }

    fn create_test_sale(name: &str, price: f64) -> Sale {
        Sale {
            id: format!("sale-{}", name),
            domain_name: name.to_string(),
            sale_date: date(2024, 1, 10),
            sale_price: price,
            buyer: "Jean Dupont".to_string(),
        }
    }

    #[test]
    fn test_consistent_portfolio() {
        let reconciler = SaleReconciler::new();
        let domains = vec![
            create_test_domain("monsite.fr", DomainStatus::Sold, Some(150.0)),
            create_test_domain("exemple.com", DomainStatus::Active, None),
        ];
        let sales = vec![create_test_sale("monsite.fr", 150.0)];

        let report = reconciler.reconcile(&domains, &sales);

        assert!(report.is_consistent());
        assert_eq!(report.sold_domains, 1);
        assert_eq!(report.matched, 1);
        assert_eq!(report.ledger_entries, 1);
    }

    #[test]
    fn test_sold_without_sale() {
        let reconciler = SaleReconciler::new();
        let domains = vec![create_test_domain("monsite.fr", DomainStatus::Sold, Some(150.0))];

        let report = reconciler.reconcile(&domains, &[]);

        assert!(!report.is_consistent());
        assert_eq!(report.by_category(DiscrepancyCategory::SoldWithoutSale).len(), 1);
    }

    #[test]
    fn test_sale_for_unsold_and_unknown_domains() {
        let reconciler = SaleReconciler::new();
        let domains = vec![create_test_domain("exemple.com", DomainStatus::ForSale, None)];
        let sales = vec![
            create_test_sale("exemple.com", 90.0),
            create_test_sale("gone.net", 40.0),
        ];

        let report = reconciler.reconcile(&domains, &sales);

        assert_eq!(report.by_category(DiscrepancyCategory::SaleForUnsoldDomain).len(), 1);
        assert_eq!(report.by_category(DiscrepancyCategory::SaleForUnknownDomain).len(), 1);
        assert_eq!(report.matched, 0);
    }

    #[test]
    fn test_sale_matches_sold_duplicate_name() {
        let reconciler = SaleReconciler::new();
        let mut resold = create_test_domain("exemple.com", DomainStatus::Sold, Some(90.0));
        resold.id = "dom-2".to_string();
        let domains = vec![
            create_test_domain("exemple.com", DomainStatus::Active, None),
            resold,
        ];
        let sales = vec![create_test_sale("exemple.com", 90.0)];

        let report = reconciler.reconcile(&domains, &sales);

        assert!(report.is_consistent());
        assert_eq!(report.matched, 1);
    }

    #[test]
    fn test_price_mismatch() {
        let reconciler = SaleReconciler::new();
        let domains = vec![create_test_domain("monsite.fr", DomainStatus::Sold, Some(150.0))];
        let sales = vec![create_test_sale("monsite.fr", 140.0)];

        let report = reconciler.reconcile(&domains, &sales);

        let mismatches = report.by_category(DiscrepancyCategory::PriceMismatch);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].domain_name, "monsite.fr");

        // Within tolerance
        let lenient = SaleReconciler::with_tolerance(20.0);
        assert!(lenient.reconcile(&domains, &sales).is_consistent());
    }
}
