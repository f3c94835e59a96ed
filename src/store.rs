// 🏪 Portfolio Store - the Mutation API
//
// The application root owns exactly one PortfolioStore and lends it out by
// reference. Collections are private: every change goes through one of the
// operations below, each of which validates first and applies second, so a
// failed call never leaves partial state behind.

use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, warn};

use crate::derivation::{
    compute_expiration, sales_summary, MetricsEngine, PortfolioMetrics, SalesSummary,
};
use crate::error::{PortfolioError, PortfolioResult};
use crate::journal::{EntityKind, Event, Journal};
use crate::records::{DomainRecord, Evaluation, NewDomain, NewEvaluation, NewSale, Sale};
use crate::reconciliation::{ReconciliationReport, SaleReconciler};

/// Shown when an evaluation points at a domain that no longer exists
pub const UNKNOWN_DOMAIN_NAME: &str = "Unknown domain";

// ============================================================================
// ID SEQUENCE
// ============================================================================

/// Monotonic id generator ("dom-1", "dom-2", ...).
///
/// Counters never go backwards, so ids stay unique no matter how many
/// records are created in the same instant or later deleted.
#[derive(Debug, Clone)]
pub struct IdSequence {
    prefix: &'static str,
    next: u64,
}

impl IdSequence {
    pub fn new(prefix: &'static str) -> Self {
        IdSequence { prefix, next: 1 }
    }

    pub fn next_id(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

// ============================================================================
// DELETION SUMMARY
// ============================================================================

/// What `delete_domain` removed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionSummary {
    pub domain: DomainRecord,
    pub evaluations_removed: Vec<Evaluation>,
}

// ============================================================================
// STORE
// ============================================================================

pub struct PortfolioStore {
    domains: Vec<DomainRecord>,
    evaluations: Vec<Evaluation>,
    sales: Vec<Sale>,

    domain_ids: IdSequence,
    evaluation_ids: IdSequence,
    sale_ids: IdSequence,

    journal: Journal,

    /// Recorded on every event ("cli", "tui", "api", ...)
    actor: String,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self::with_actor("system")
    }

    pub fn with_actor(actor: &str) -> Self {
        PortfolioStore {
            domains: Vec::new(),
            evaluations: Vec::new(),
            sales: Vec::new(),
            domain_ids: IdSequence::new("dom"),
            evaluation_ids: IdSequence::new("eval"),
            sale_ids: IdSequence::new("sale"),
            journal: Journal::new(),
            actor: actor.to_string(),
        }
    }

    /// Store pre-filled with a small sample portfolio
    pub fn with_demo_data(actor: &str) -> PortfolioResult<Self> {
        let mut store = Self::with_actor(actor);
        store.seed_demo_data()?;
        Ok(store)
    }

    // ========================================================================
    // DOMAINS
    // ========================================================================

    pub fn create_domain(&mut self, input: NewDomain) -> PortfolioResult<DomainRecord> {
        let prepared = prepare_domain(input)?;
        let record = self.insert_domain(prepared);

        info!(id = %record.id, name = %record.name, "domain created");
        Ok(record)
    }

    /// Create many domains at once.
    ///
    /// All inputs are validated before any is inserted: either every
    /// record lands or none does.
    pub fn bulk_create_domains(&mut self, inputs: Vec<NewDomain>) -> PortfolioResult<Vec<DomainRecord>> {
        let mut prepared = Vec::with_capacity(inputs.len());

        for (index, input) in inputs.into_iter().enumerate() {
            let domain = prepare_domain(input).map_err(|err| match err {
                PortfolioError::Validation { field, message } => PortfolioError::Validation {
                    field,
                    message: format!("item {}: {}", index + 1, message),
                },
                other => other,
            })?;
            prepared.push(domain);
        }

        let created: Vec<DomainRecord> = prepared
            .into_iter()
            .map(|domain| self.insert_domain(domain))
            .collect();

        info!(count = created.len(), "domains bulk created");
        Ok(created)
    }

    /// Replace a domain wholesale. The stored expiration date is taken from
    /// the given record as-is.
    pub fn update_domain(&mut self, record: DomainRecord) -> PortfolioResult<()> {
        let position = self
            .domains
            .iter()
            .position(|d| d.id == record.id)
            .ok_or_else(|| PortfolioError::not_found("domain", record.id.clone()))?;

        let mut record = record;
        record.name = validate_name(&record.name)?;
        validate_amount("purchase_price", record.purchase_price)?;
        if let Some(price) = record.sale_price {
            validate_amount("sale_price", price)?;
        }

        self.log_event(
            "domain_updated",
            EntityKind::Domain,
            &record.id,
            serde_json::json!({
                "name": record.name,
                "status": record.status.as_str(),
            }),
        );

        info!(id = %record.id, "domain updated");
        self.domains[position] = record;
        Ok(())
    }

    /// Remove a domain and every evaluation that references it.
    ///
    /// An unknown id is an error, not a silent no-op.
    pub fn delete_domain(&mut self, id: &str) -> PortfolioResult<DeletionSummary> {
        let position = self
            .domains
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| PortfolioError::not_found("domain", id))?;

        let domain = self.domains.remove(position);

        let (removed, kept): (Vec<Evaluation>, Vec<Evaluation>) = std::mem::take(&mut self.evaluations)
            .into_iter()
            .partition(|e| e.domain_id == id);
        self.evaluations = kept;

        self.log_event(
            "domain_deleted",
            EntityKind::Domain,
            id,
            serde_json::json!({
                "name": domain.name,
                "evaluations_removed": removed.len(),
            }),
        );
        for evaluation in &removed {
            self.log_event(
                "evaluation_deleted",
                EntityKind::Evaluation,
                &evaluation.id,
                serde_json::json!({ "cascade_from": id }),
            );
        }

        info!(id, evaluations_removed = removed.len(), "domain deleted");

        Ok(DeletionSummary {
            domain,
            evaluations_removed: removed,
        })
    }

    // ========================================================================
    // EVALUATIONS
    // ========================================================================

    pub fn create_evaluation(&mut self, input: NewEvaluation) -> PortfolioResult<Evaluation> {
        if !self.domains.iter().any(|d| d.id == input.domain_id) {
            return Err(PortfolioError::validation(
                "domain_id",
                format!("No domain with id '{}'", input.domain_id),
            ));
        }

        let tool = input.tool.trim();
        if tool.is_empty() {
            return Err(PortfolioError::validation("tool", "Required field is empty"));
        }

        if !input.estimated_value.is_finite() || input.estimated_value <= 0.0 {
            return Err(PortfolioError::validation(
                "estimated_value",
                format!("Must be greater than 0, got {}", input.estimated_value),
            ));
        }

        let evaluation = Evaluation {
            id: self.evaluation_ids.next_id(),
            domain_id: input.domain_id,
            tool: tool.to_string(),
            date: input.date.unwrap_or_else(today),
            estimated_value: input.estimated_value,
        };

        self.log_event(
            "evaluation_created",
            EntityKind::Evaluation,
            &evaluation.id,
            serde_json::json!({
                "domain_id": evaluation.domain_id,
                "tool": evaluation.tool,
                "estimated_value": evaluation.estimated_value,
            }),
        );

        info!(id = %evaluation.id, domain_id = %evaluation.domain_id, "evaluation created");
        self.evaluations.push(evaluation.clone());
        Ok(evaluation)
    }

    pub fn delete_evaluation(&mut self, id: &str) -> PortfolioResult<Evaluation> {
        let position = self
            .evaluations
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PortfolioError::not_found("evaluation", id))?;

        let evaluation = self.evaluations.remove(position);
        self.log_event(
            "evaluation_deleted",
            EntityKind::Evaluation,
            id,
            serde_json::json!({ "domain_id": evaluation.domain_id }),
        );

        Ok(evaluation)
    }

    // ========================================================================
    // SALES LEDGER
    // ========================================================================

    /// Append a ledger entry. Domain status is left untouched.
    pub fn record_sale(&mut self, input: NewSale) -> PortfolioResult<Sale> {
        let domain_name = validate_sale(&input.domain_name, input.sale_price)?;

        let sale = Sale {
            id: self.sale_ids.next_id(),
            domain_name,
            sale_date: input.sale_date,
            sale_price: input.sale_price,
            buyer: input.buyer.trim().to_string(),
        };

        self.log_event(
            "sale_recorded",
            EntityKind::Sale,
            &sale.id,
            serde_json::json!({
                "domain_name": sale.domain_name,
                "sale_price": sale.sale_price,
            }),
        );

        if !self.domains.iter().any(|d| d.name == sale.domain_name && d.is_sold()) {
            warn!(domain = %sale.domain_name, "sale recorded for a domain not marked sold");
        }

        info!(id = %sale.id, "sale recorded");
        self.sales.push(sale.clone());
        Ok(sale)
    }

    pub fn update_sale(&mut self, sale: Sale) -> PortfolioResult<()> {
        let position = self
            .sales
            .iter()
            .position(|s| s.id == sale.id)
            .ok_or_else(|| PortfolioError::not_found("sale", sale.id.clone()))?;

        let mut sale = sale;
        sale.domain_name = validate_sale(&sale.domain_name, sale.sale_price)?;

        self.log_event(
            "sale_updated",
            EntityKind::Sale,
            &sale.id,
            serde_json::json!({ "sale_price": sale.sale_price }),
        );

        self.sales[position] = sale;
        Ok(())
    }

    pub fn delete_sale(&mut self, id: &str) -> PortfolioResult<Sale> {
        let position = self
            .sales
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| PortfolioError::not_found("sale", id))?;

        let sale = self.sales.remove(position);
        self.log_event(
            "sale_deleted",
            EntityKind::Sale,
            id,
            serde_json::json!({ "domain_name": sale.domain_name }),
        );

        Ok(sale)
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn domains(&self) -> &[DomainRecord] {
        &self.domains
    }

    pub fn evaluations(&self) -> &[Evaluation] {
        &self.evaluations
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn domain(&self, id: &str) -> Option<&DomainRecord> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn evaluations_for(&self, domain_id: &str) -> Vec<&Evaluation> {
        self.evaluations
            .iter()
            .filter(|e| e.domain_id == domain_id)
            .collect()
    }

    pub fn domain_name_for(&self, domain_id: &str) -> &str {
        self.domain(domain_id)
            .map(|d| d.name.as_str())
            .unwrap_or(UNKNOWN_DOMAIN_NAME)
    }

    /// Domains that can still receive an evaluation (everything not sold)
    pub fn evaluable_domains(&self) -> Vec<&DomainRecord> {
        self.domains.iter().filter(|d| !d.is_sold()).collect()
    }

    pub fn metrics(&self, engine: &MetricsEngine) -> PortfolioMetrics {
        engine.portfolio_metrics(&self.domains, &self.sales)
    }

    pub fn sales_summary(&self) -> SalesSummary {
        sales_summary(&self.sales)
    }

    /// Compare domain statuses with the ledger. Read-only.
    pub fn reconcile(&self, reconciler: &SaleReconciler) -> ReconciliationReport {
        reconciler.reconcile(&self.domains, &self.sales)
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn actor(&self) -> &str {
        &self.actor
    }

    // ========================================================================
    // INTERNALS
    // ========================================================================

    fn insert_domain(&mut self, prepared: PreparedDomain) -> DomainRecord {
        let record = prepared.into_record(self.domain_ids.next_id());

        self.log_event(
            "domain_created",
            EntityKind::Domain,
            &record.id,
            serde_json::json!({
                "name": record.name,
                "purchase_date": record.purchase_date.to_string(),
                "expiration_date": record.expiration_date.to_string(),
            }),
        );

        self.domains.push(record.clone());
        record
    }

    fn log_event(&mut self, event_type: &str, entity: EntityKind, entity_id: &str, data: serde_json::Value) {
        let event = Event::new(event_type, entity, entity_id, data, &self.actor);
        self.journal.record(event);
    }

    fn seed_demo_data(&mut self) -> PortfolioResult<()> {
        let exemple = self.create_domain(
            NewDomain::new("exemple.com", ymd(2023, 1, 15)?)
                .with_registrar("GoDaddy")
                .with_category("Business")
                .with_expiration(ymd(2024, 12, 15)?)
                .with_purchase_price(15.0),
        )?;

        self.create_domain(
            NewDomain::new("monsite.fr", ymd(2023, 3, 20)?)
                .with_registrar("OVH")
                .with_category("Personnel")
                .with_expiration(ymd(2025, 2, 20)?)
                .with_purchase_price(12.0)
                .sold(150.0, ymd(2024, 1, 10)?, "Jean Dupont"),
        )?;

        self.create_evaluation(NewEvaluation {
            domain_id: exemple.id,
            tool: "GoDaddy".to_string(),
            date: Some(ymd(2024, 1, 15)?),
            estimated_value: 120.0,
        })?;

        self.record_sale(NewSale {
            domain_name: "monsite.fr".to_string(),
            sale_date: ymd(2024, 1, 10)?,
            sale_price: 150.0,
            buyer: "Jean Dupont".to_string(),
        })?;

        Ok(())
    }
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// VALIDATION
// ============================================================================

/// A NewDomain that passed validation, waiting for its id
struct PreparedDomain {
    input: NewDomain,
    name: String,
    purchase_date: NaiveDate,
    expiration_date: NaiveDate,
}

impl PreparedDomain {
    fn into_record(self, id: String) -> DomainRecord {
        DomainRecord {
            id,
            name: self.name,
            registrar: self.input.registrar,
            category: self.input.category,
            purchase_date: self.purchase_date,
            expiration_date: self.expiration_date,
            status: self.input.status,
            purchase_price: self.input.purchase_price,
            sale_price: self.input.sale_price,
            sale_date: self.input.sale_date,
            buyer: self.input.buyer,
        }
    }
}

fn prepare_domain(input: NewDomain) -> PortfolioResult<PreparedDomain> {
    let name = validate_name(&input.name)?;

    let purchase_date = input
        .purchase_date
        .ok_or_else(|| PortfolioError::validation("purchase_date", "Required field is empty"))?;

    validate_amount("purchase_price", input.purchase_price)?;
    if let Some(price) = input.sale_price {
        validate_amount("sale_price", price)?;
    }

    let expiration_date = match input.expiration_date {
        Some(date) => date,
        None => compute_expiration(Some(purchase_date)).ok_or_else(|| {
            PortfolioError::validation("expiration_date", "Cannot derive from purchase date")
        })?,
    };

    Ok(PreparedDomain {
        input,
        name,
        purchase_date,
        expiration_date,
    })
}

fn validate_name(name: &str) -> PortfolioResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(PortfolioError::validation("name", "Required field is empty"));
    }
    Ok(name.to_string())
}

fn validate_amount(field: &'static str, amount: f64) -> PortfolioResult<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(PortfolioError::validation(
            field,
            format!("Must be a non-negative amount, got {}", amount),
        ));
    }
    Ok(())
}

fn validate_sale(domain_name: &str, price: f64) -> PortfolioResult<String> {
    let name = domain_name.trim();
    if name.is_empty() {
        return Err(PortfolioError::validation("domain_name", "Required field is empty"));
    }
    validate_amount("sale_price", price)?;
    Ok(name.to_string())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn ymd(year: i32, month: u32, day: u32) -> PortfolioResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| PortfolioError::validation("date", format!("{}-{}-{} is not a date", year, month, day)))
}

// ============================================================================
// TESTS
// ============================================================================
