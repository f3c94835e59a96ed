// 📈 Derivation Engine - expiration dates and portfolio metrics
//
// Pure functions over the collections. Nothing here is cached: every
// dashboard read recomputes from the current records.
//
//   roi = (sales_revenue - investment) / investment * 100   (0 when investment = 0)

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::records::{DomainRecord, DomainStatus, Sale};

/// Heuristic resale multiplier applied to unsold domains
pub const DEFAULT_VALUE_MULTIPLIER: f64 = 8.0;

// ============================================================================
// EXPIRATION
// ============================================================================

/// Purchase date plus one calendar year.
///
/// Feb 29 resolves to Feb 28 of the following year: chrono clamps month
/// arithmetic to the last valid day of the target month.
pub fn compute_expiration(purchase_date: Option<NaiveDate>) -> Option<NaiveDate> {
    purchase_date?.checked_add_months(Months::new(12))
}

// ============================================================================
// METRICS TYPES
// ============================================================================

/// Dashboard figures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioMetrics {
    pub total_domains: usize,
    pub sold_count: usize,
    pub total_investment: f64,
    pub total_sales_revenue: f64,
    pub roi: f64,
    pub estimated_portfolio_value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub count: usize,
    pub total: f64,
    pub average: f64,
}

/// Statistics page figures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoiStatistics {
    pub total_purchased: f64,
    pub total_sold: f64,
    /// Never negative: a loss shows as 0 profit
    pub profit: f64,
    pub roi: f64,
    pub average_purchase_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub active: usize,
    pub for_sale: usize,
    pub sold: usize,
    pub expired: usize,
}

impl StatusBreakdown {
    pub fn count(&self, status: DomainStatus) -> usize {
        match status {
            DomainStatus::Active => self.active,
            DomainStatus::ForSale => self.for_sale,
            DomainStatus::Sold => self.sold,
            DomainStatus::Expired => self.expired,
        }
    }

    pub fn total(&self) -> usize {
        self.active + self.for_sale + self.sold + self.expired
    }
}

// ============================================================================
// METRICS ENGINE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MetricsEngine {
    /// Multiplier for the estimated value of unsold domains (default: 8)
    pub value_multiplier: f64,
}

impl MetricsEngine {
    pub fn new() -> Self {
        MetricsEngine {
            value_multiplier: DEFAULT_VALUE_MULTIPLIER,
        }
    }

    pub fn with_multiplier(value_multiplier: f64) -> Self {
        MetricsEngine { value_multiplier }
    }

    pub fn portfolio_metrics(&self, domains: &[DomainRecord], sales: &[Sale]) -> PortfolioMetrics {
        let total_investment = total_investment(domains);
        let total_sales_revenue = total_sales_revenue(sales);

        let metrics = PortfolioMetrics {
            total_domains: domains.len(),
            sold_count: domains.iter().filter(|d| d.is_sold()).count(),
            total_investment,
            total_sales_revenue,
            roi: roi(total_sales_revenue, total_investment),
            estimated_portfolio_value: self.estimated_value(domains),
        };

        debug!(
            domains = metrics.total_domains,
            roi = metrics.roi,
            "portfolio metrics computed"
        );

        metrics
    }

    /// Sold domains count at their realized price, the rest at
    /// purchase price times the multiplier.
    pub fn estimated_value(&self, domains: &[DomainRecord]) -> f64 {
        domains
            .iter()
            .map(|d| {
                if d.is_sold() {
                    d.sale_price.unwrap_or(0.0)
                } else {
                    d.purchase_price * self.value_multiplier
                }
            })
            .sum()
    }
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// FREE FUNCTIONS
// ============================================================================

/// Dashboard metrics with the default multiplier
pub fn portfolio_metrics(domains: &[DomainRecord], sales: &[Sale]) -> PortfolioMetrics {
    MetricsEngine::new().portfolio_metrics(domains, sales)
}

pub fn sales_summary(sales: &[Sale]) -> SalesSummary {
    let count = sales.len();
    let total = total_sales_revenue(sales);
    let average = if count > 0 { total / count as f64 } else { 0.0 };

    SalesSummary {
        count,
        total,
        average,
    }
}

pub fn roi_statistics(domains: &[DomainRecord], sales: &[Sale]) -> RoiStatistics {
    let total_purchased = total_investment(domains);
    let total_sold = total_sales_revenue(sales);
    let average_purchase_price = if domains.is_empty() {
        0.0
    } else {
        total_purchased / domains.len() as f64
    };

    RoiStatistics {
        total_purchased,
        total_sold,
        profit: (total_sold - total_purchased).max(0.0),
        roi: roi(total_sold, total_purchased),
        average_purchase_price,
    }
}

pub fn status_breakdown(domains: &[DomainRecord]) -> StatusBreakdown {
    let mut breakdown = StatusBreakdown::default();

    for domain in domains {
        match domain.status {
            DomainStatus::Active => breakdown.active += 1,
            DomainStatus::ForSale => breakdown.for_sale += 1,
            DomainStatus::Sold => breakdown.sold += 1,
            DomainStatus::Expired => breakdown.expired += 1,
        }
    }

    breakdown
}

fn total_investment(domains: &[DomainRecord]) -> f64 {
    domains.iter().map(|d| d.purchase_price).sum()
}

/// Revenue comes from the ledger, never from domains marked sold
fn total_sales_revenue(sales: &[Sale]) -> f64 {
    sales.iter().map(|s| s.sale_price).sum()
}

fn roi(revenue: f64, investment: f64) -> f64 {
    if investment > 0.0 {
        (revenue - investment) / investment * 100.0
    } else {
        0.0
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

    fn create_test_domain(id: &str, price: f64, status: DomainStatus) -> DomainRecord {
        DomainRecord {
            id: id.to_string(),
            name: format!("{}.com", id),
            registrar: "GoDaddy".to_string(),
            category: "Business".to_string(),
            purchase_date: date(2023, 1, 15),
            expiration_date: date(2024, 1, 15),
            status,
            purchase_price: price,
            sale_price: None,
            sale_date: None,
            buyer: None,
        }
    }

    fn create_test_sale(price: f64) -> Sale {
        Sale {
            id: "sale-1".to_string(),
            domain_name: "monsite.fr".to_string(),
            sale_date: date(2024, 1, 10),
            sale_price: price,
            buyer: "Jean Dupont".to_string(),
        }
    }

    #[test]
    fn test_compute_expiration() {
        assert_eq!(compute_expiration(Some(date(2023, 1, 15))), Some(date(2024, 1, 15)));
        assert_eq!(compute_expiration(Some(date(2023, 12, 31))), Some(date(2024, 12, 31)));
        assert_eq!(compute_expiration(None), None);
    }

    #[test]
    fn test_compute_expiration_leap_day() {
        assert_eq!(compute_expiration(Some(date(2024, 2, 29))), Some(date(2025, 2, 28)));
        // Non-leap start into a leap year stays on the same day
        assert_eq!(compute_expiration(Some(date(2023, 2, 28))), Some(date(2024, 2, 28)));
    }

    #[test]
    fn test_roi_scenario() {
        let domains = vec![create_test_domain("exemple", 15.0, DomainStatus::Active)];
        let sales = vec![create_test_sale(150.0)];

        let metrics = portfolio_metrics(&domains, &sales);

        assert_eq!(metrics.total_investment, 15.0);
        assert_eq!(metrics.total_sales_revenue, 150.0);
        assert!((metrics.roi - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_roi_zero_without_investment() {
        let domains = vec![create_test_domain("free", 0.0, DomainStatus::Active)];
        let sales = vec![create_test_sale(150.0)];

        let metrics = portfolio_metrics(&domains, &sales);
        assert_eq!(metrics.roi, 0.0);
        assert!(!metrics.roi.is_nan());

        let empty = portfolio_metrics(&[], &[]);
        assert_eq!(empty.roi, 0.0);
        assert_eq!(empty.total_domains, 0);
    }

    #[test]
    fn test_estimated_portfolio_value() {
        let mut sold = create_test_domain("sold", 12.0, DomainStatus::Sold);
        sold.sale_price = Some(150.0);
        let sold_without_price = create_test_domain("sold2", 30.0, DomainStatus::Sold);

        let domains = vec![
            create_test_domain("a", 15.0, DomainStatus::Active),
            create_test_domain("b", 10.0, DomainStatus::ForSale),
            sold,
            sold_without_price,
        ];

        let metrics = portfolio_metrics(&domains, &[]);
        // 15*8 + 10*8 + 150 + 0
        assert_eq!(metrics.estimated_portfolio_value, 350.0);
        assert_eq!(metrics.sold_count, 2);
        assert_eq!(metrics.total_domains, 4);

        let engine = MetricsEngine::with_multiplier(2.0);
        assert_eq!(engine.estimated_value(&domains), 15.0 * 2.0 + 10.0 * 2.0 + 150.0);
    }

    #[test]
    fn test_sales_summary() {
        let empty = sales_summary(&[]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.average, 0.0);

        let summary = sales_summary(&[create_test_sale(150.0), create_test_sale(50.0)]);
        assert_eq!(summary.count, 2);
        assert_eq!(summary.total, 200.0);
        assert_eq!(summary.average, 100.0);
    }

    #[test]
    fn test_roi_statistics_profit_never_negative() {
        let domains = vec![
            create_test_domain("a", 100.0, DomainStatus::Active),
            create_test_domain("b", 50.0, DomainStatus::Expired),
        ];
        let stats = roi_statistics(&domains, &[create_test_sale(30.0)]);

        assert_eq!(stats.total_purchased, 150.0);
        assert_eq!(stats.total_sold, 30.0);
        assert_eq!(stats.profit, 0.0);
        assert!((stats.roi - (-80.0)).abs() < 1e-9);
        assert_eq!(stats.average_purchase_price, 75.0);

        assert_eq!(roi_statistics(&[], &[]).average_purchase_price, 0.0);
    }

    #[test]
    fn test_status_breakdown() {
        let domains = vec![
            create_test_domain("a", 1.0, DomainStatus::Active),
            create_test_domain("b", 1.0, DomainStatus::Active),
            create_test_domain("c", 1.0, DomainStatus::ForSale),
            create_test_domain("d", 1.0, DomainStatus::Expired),
        ];

        let breakdown = status_breakdown(&domains);
        assert_eq!(breakdown.count(DomainStatus::Active), 2);
        assert_eq!(breakdown.count(DomainStatus::ForSale), 1);
        assert_eq!(breakdown.count(DomainStatus::Sold), 0);
        assert_eq!(breakdown.count(DomainStatus::Expired), 1);
        assert_eq!(breakdown.total(), 4);
    }
}
