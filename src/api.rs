// 🌐 JSON API over the portfolio store (feature "server")
//
// Handlers hold the store lock for one whole mutation. File bytes are
// decoded and normalized before the lock is taken.

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use crate::config::AppConfig;
use crate::derivation::{
    roi_statistics, status_breakdown, MetricsEngine, PortfolioMetrics, RoiStatistics, SalesSummary,
    StatusBreakdown,
};
use crate::error::PortfolioError;
use crate::export;
use crate::import::{import_bytes, ImportNormalizer};
use crate::journal::Event;
use crate::reconciliation::{ReconciliationReport, SaleReconciler};
use crate::records::{DomainRecord, Evaluation, NewDomain, NewEvaluation, NewSale, Sale};
use crate::settings::{CustomLists, ImportDefaults, ListKind};
use crate::store::{DeletionSummary, PortfolioStore};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<PortfolioStore>>,
    config: Arc<Mutex<AppConfig>>,
}

impl AppState {
    pub fn new(store: PortfolioStore, config: AppConfig) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            config: Arc::new(Mutex::new(config)),
        }
    }

    fn store(&self) -> Result<MutexGuard<'_, PortfolioStore>, ApiError> {
        self.store.lock().map_err(|_| ApiError::Poisoned)
    }

    fn config(&self) -> Result<MutexGuard<'_, AppConfig>, ApiError> {
        self.config.lock().map_err(|_| ApiError::Poisoned)
    }
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

// ============================================================================
// Errors
// ============================================================================

pub enum ApiError {
    Portfolio(PortfolioError),

    /// A handler panicked while holding a lock
    Poisoned,
}

impl From<PortfolioError> for ApiError {
    fn from(err: PortfolioError) -> Self {
        ApiError::Portfolio(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Portfolio(err) => {
                let status = match &err {
                    PortfolioError::Validation { .. } => StatusCode::BAD_REQUEST,
                    PortfolioError::NotFound { .. } => StatusCode::NOT_FOUND,
                    PortfolioError::ImportDecode(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    PortfolioError::Export(_) | PortfolioError::Config(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, err.to_string())
            }
            ApiError::Poisoned => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "state lock poisoned".to_string(),
            ),
        };

        if status.is_server_error() {
            error!(%status, %message, "request failed");
        }

        let body = ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Domain handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/domains
async fn list_domains(State(state): State<AppState>) -> ApiResult<Vec<DomainRecord>> {
    let domains = state.store()?.domains().to_vec();
    ok(domains)
}

/// GET /api/domains/:id
async fn get_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DomainRecord> {
    let store = state.store()?;
    let domain = store
        .domain(&id)
        .cloned()
        .ok_or_else(|| PortfolioError::not_found("domain", id))?;
    ok(domain)
}

/// POST /api/domains
async fn create_domain(
    State(state): State<AppState>,
    Json(input): Json<NewDomain>,
) -> ApiResult<DomainRecord> {
    let created = state.store()?.create_domain(input)?;
    ok(created)
}

/// POST /api/domains/bulk - all-or-nothing
async fn bulk_create_domains(
    State(state): State<AppState>,
    Json(inputs): Json<Vec<NewDomain>>,
) -> ApiResult<Vec<DomainRecord>> {
    let created = state.store()?.bulk_create_domains(inputs)?;
    ok(created)
}

/// PUT /api/domains/:id - the path id wins over any id in the body
async fn update_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut record): Json<DomainRecord>,
) -> ApiResult<DomainRecord> {
    record.id = id;
    let mut store = state.store()?;
    store.update_domain(record.clone())?;
    ok(store.domain(&record.id).cloned().unwrap_or(record))
}

/// DELETE /api/domains/:id - cascades to the domain's evaluations
async fn delete_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeletionSummary> {
    let summary = state.store()?.delete_domain(&id)?;
    ok(summary)
}

/// GET /api/domains/:id/evaluations
async fn domain_evaluations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<Evaluation>> {
    let store = state.store()?;
    if store.domain(&id).is_none() {
        return Err(PortfolioError::not_found("domain", id).into());
    }
    let evaluations: Vec<Evaluation> = store.evaluations_for(&id).into_iter().cloned().collect();
    ok(evaluations)
}

// ============================================================================
// Evaluation + sale handlers
// ============================================================================

/// GET /api/evaluations
async fn list_evaluations(State(state): State<AppState>) -> ApiResult<Vec<Evaluation>> {
    let evaluations = state.store()?.evaluations().to_vec();
    ok(evaluations)
}

/// POST /api/evaluations
async fn create_evaluation(
    State(state): State<AppState>,
    Json(input): Json<NewEvaluation>,
) -> ApiResult<Evaluation> {
    let evaluation = state.store()?.create_evaluation(input)?;
    ok(evaluation)
}

/// DELETE /api/evaluations/:id
async fn delete_evaluation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Evaluation> {
    let evaluation = state.store()?.delete_evaluation(&id)?;
    ok(evaluation)
}

/// GET /api/sales
async fn list_sales(State(state): State<AppState>) -> ApiResult<Vec<Sale>> {
    let sales = state.store()?.sales().to_vec();
    ok(sales)
}

/// POST /api/sales
async fn record_sale(
    State(state): State<AppState>,
    Json(input): Json<NewSale>,
) -> ApiResult<Sale> {
    let sale = state.store()?.record_sale(input)?;
    ok(sale)
}

/// PUT /api/sales/:id
async fn update_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut sale): Json<Sale>,
) -> ApiResult<Sale> {
    sale.id = id;
    let mut store = state.store()?;
    store.update_sale(sale.clone())?;
    ok(store
        .sales()
        .iter()
        .find(|s| s.id == sale.id)
        .cloned()
        .unwrap_or(sale))
}

/// DELETE /api/sales/:id
async fn delete_sale(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Sale> {
    let sale = state.store()?.delete_sale(&id)?;
    ok(sale)
}

// ============================================================================
// Dashboard handlers
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetricsResponse {
    portfolio: PortfolioMetrics,
    roi: RoiStatistics,
    sales: SalesSummary,
    status: StatusBreakdown,
}

/// GET /api/metrics
async fn get_metrics(State(state): State<AppState>) -> ApiResult<MetricsResponse> {
    let engine = MetricsEngine::with_multiplier(state.config()?.value_multiplier);
    let store = state.store()?;

    ok(MetricsResponse {
        portfolio: store.metrics(&engine),
        roi: roi_statistics(store.domains(), store.sales()),
        sales: store.sales_summary(),
        status: status_breakdown(store.domains()),
    })
}

/// GET /api/reconciliation
async fn get_reconciliation(State(state): State<AppState>) -> ApiResult<ReconciliationReport> {
    let report = state.store()?.reconcile(&SaleReconciler::new());
    ok(report)
}

/// GET /api/journal
async fn get_journal(State(state): State<AppState>) -> ApiResult<Vec<Event>> {
    let events = state.store()?.journal().events().to_vec();
    ok(events)
}

// ============================================================================
// Import / export handlers
// ============================================================================

#[derive(Deserialize)]
struct ImportParams {
    /// Original file name; its extension picks the decoder
    name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportResponse {
    source_name: String,
    digest: String,
    rows_read: usize,
    rows_dropped: usize,
    created: Vec<DomainRecord>,
}

fn normalizer(state: &AppState) -> Result<ImportNormalizer, ApiError> {
    let config = state.config()?;
    Ok(ImportNormalizer::new(&config.lists, &config.import))
}

async fn import_source(state: &AppState, name: &str, bytes: &[u8]) -> ApiResult<ImportResponse> {
    let batch = import_bytes(name, bytes, &normalizer(state)?)?;
    let created = state.store()?.bulk_create_domains(batch.domains)?;

    info!(source = %batch.source_name, created = created.len(), "import applied");

    ok(ImportResponse {
        source_name: batch.source_name,
        digest: batch.digest,
        rows_read: batch.rows_read,
        rows_dropped: batch.rows_dropped,
        created,
    })
}

/// POST /api/import/text - one domain name per line
async fn import_text(State(state): State<AppState>, body: String) -> ApiResult<ImportResponse> {
    import_source(&state, "import.txt", body.as_bytes()).await
}

/// POST /api/import/file?name=domains.xlsx - raw workbook or CSV bytes
async fn import_file(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    body: Bytes,
) -> ApiResult<ImportResponse> {
    let name = params.name.unwrap_or_else(|| "import.xlsx".to_string());
    import_source(&state, &name, &body).await
}

fn attachment(content_type: &str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        body,
    )
        .into_response()
}

/// GET /api/export/domains
async fn export_domains(State(state): State<AppState>) -> Result<Response, ApiError> {
    let bytes = export::domains_workbook(state.store()?.domains())?;
    let file_name = export::export_file_name(Local::now().date_naive());
    Ok(attachment(XLSX_CONTENT_TYPE, &file_name, bytes))
}

/// GET /api/export/template
async fn export_template() -> Result<Response, ApiError> {
    let bytes = export::template_workbook()?;
    Ok(attachment(XLSX_CONTENT_TYPE, export::TEMPLATE_FILE_NAME, bytes))
}

/// GET /api/export/sales
async fn export_sales(State(state): State<AppState>) -> Result<Response, ApiError> {
    let csv = export::sales_csv(state.store()?.sales())?;
    Ok(attachment(
        "text/csv; charset=utf-8",
        export::SALES_CSV_FILE_NAME,
        csv.into_bytes(),
    ))
}

// ============================================================================
// Settings handlers
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsResponse {
    lists: CustomLists,
    import: ImportDefaults,
    value_multiplier: f64,
}

#[derive(Deserialize)]
struct ListValue {
    value: String,
}

#[derive(Serialize)]
struct ListChange {
    changed: bool,
    items: Vec<String>,
}

/// GET /api/settings
async fn get_settings(State(state): State<AppState>) -> ApiResult<SettingsResponse> {
    let config = state.config()?;
    ok(SettingsResponse {
        lists: config.lists.clone(),
        import: config.import.clone(),
        value_multiplier: config.value_multiplier,
    })
}

/// POST /api/settings/:kind - add a value (trimmed, no blanks, no duplicates)
async fn add_list_value(
    State(state): State<AppState>,
    Path(kind): Path<ListKind>,
    Json(body): Json<ListValue>,
) -> ApiResult<ListChange> {
    let mut config = state.config()?;
    let changed = config.lists.add(kind, &body.value);
    ok(ListChange {
        changed,
        items: config.lists.list(kind).to_vec(),
    })
}

/// DELETE /api/settings/:kind/:value
async fn remove_list_value(
    State(state): State<AppState>,
    Path((kind, value)): Path<(ListKind, String)>,
) -> ApiResult<ListChange> {
    let mut config = state.config()?;
    let changed = config.lists.remove(kind, &value);
    ok(ListChange {
        changed,
        items: config.lists.list(kind).to_vec(),
    })
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/domains", get(list_domains).post(create_domain))
        .route("/domains/bulk", post(bulk_create_domains))
        .route(
            "/domains/:id",
            get(get_domain).put(update_domain).delete(delete_domain),
        )
        .route("/domains/:id/evaluations", get(domain_evaluations))
        .route("/evaluations", get(list_evaluations).post(create_evaluation))
        .route("/evaluations/:id", axum::routing::delete(delete_evaluation))
        .route("/sales", get(list_sales).post(record_sale))
        .route("/sales/:id", axum::routing::put(update_sale).delete(delete_sale))
        .route("/metrics", get(get_metrics))
        .route("/reconciliation", get(get_reconciliation))
        .route("/journal", get(get_journal))
        .route("/import/text", post(import_text))
        .route("/import/file", post(import_file))
        .route("/export/domains", get(export_domains))
        .route("/export/template", get(export_template))
        .route("/export/sales", get(export_sales))
        .route("/settings", get(get_settings))
        .route("/settings/:kind", post(add_list_value))
        .route("/settings/:kind/:value", axum::routing::delete(remove_list_value))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
