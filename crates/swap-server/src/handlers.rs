//! HTTP Handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use swap_core::{
    quote::{exchange_rate, quote},
    validate, Catalog, IconLoadError, IconResolver, SessionSnapshot, SwapError, SwapForm,
    SwapReceipt, SwapSession, TokenIcon, ValidationResult,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub assets: usize,
    pub open_forms: usize,
    pub price_source: String,
    pub settlement: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<ValidationResult>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub source_asset: String,
    pub target_asset: String,
    pub source_amount: String,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    /// Empty when no quote is possible
    pub target_amount: String,
    pub exchange_rate: String,
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub id: Uuid,
    #[serde(flatten)]
    pub snapshot: SessionSnapshot,
}

/// Field edits, applied in declaration order
#[derive(Debug, Default, Deserialize)]
pub struct FormEdit {
    #[serde(default)]
    pub source_asset: Option<String>,
    #[serde(default)]
    pub target_asset: Option<String>,
    #[serde(default)]
    pub source_amount: Option<String>,
    /// Catalog list click: select as source and clear errors
    #[serde(default)]
    pub picked_asset: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub message: String,
    pub receipt: SwapReceipt,
}

fn api_error(status: StatusCode, code: &str, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
            fields: None,
        }),
    )
}

fn swap_error(err: SwapError) -> ApiError {
    let message = err.user_message();
    match err {
        SwapError::Invalid(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: message,
                code: "INVALID_FORM".into(),
                fields: Some(fields),
            }),
        ),
        SwapError::SubmissionInFlight => api_error(StatusCode::CONFLICT, "SWAP_IN_FLIGHT", message),
        SwapError::Load(_) => api_error(StatusCode::BAD_GATEWAY, "CATALOG_UNAVAILABLE", message),
        SwapError::Execution(_) => api_error(StatusCode::BAD_GATEWAY, "SWAP_FAILED", message),
        SwapError::Config(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR", message),
    }
}

fn form_not_found(id: Uuid) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "FORM_NOT_FOUND", format!("No swap form {id}"))
}

// ============================================================================
// Catalog & stateless endpoints
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        assets: state.catalog.read().await.len(),
        open_forms: state.forms.lock().await.len(),
        price_source: state.loader.source_name().to_string(),
        settlement: state.executor.backend_name().to_string(),
    })
}

pub async fn get_catalog(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.catalog.read().await.clone())
}

/// Re-fetch the shared catalog. A failed reload leaves it empty.
pub async fn reload_catalog(State(state): State<AppState>) -> Result<Json<Catalog>, ApiError> {
    match state.loader.load().await {
        Ok(catalog) => {
            *state.catalog.write().await = catalog.clone();
            Ok(Json(catalog))
        }
        Err(e) => {
            *state.catalog.write().await = Catalog::empty();
            Err(swap_error(e.into()))
        }
    }
}

pub async fn quote_handler(
    State(state): State<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Json<QuoteResponse> {
    let catalog = state.catalog.read().await;
    Json(QuoteResponse {
        target_amount: quote(
            &catalog,
            &payload.source_asset,
            &payload.target_asset,
            &payload.source_amount,
        ),
        exchange_rate: exchange_rate(&catalog, &payload.source_asset, &payload.target_asset),
    })
}

pub async fn validate_handler(Json(form): Json<SwapForm>) -> Json<ValidationResult> {
    Json(validate(&form))
}

// ============================================================================
// Form sessions
// ============================================================================

/// Open a form session; like mounting the form, this fetches prices.
pub async fn create_form(State(state): State<AppState>) -> (StatusCode, Json<FormResponse>) {
    let mut session = SwapSession::new(IconResolver::new(state.config.icon_base_url.clone()));
    session.load(&state.loader).await;

    let id = Uuid::new_v4();
    let snapshot = session.snapshot();
    let mut forms = state.forms.lock().await;
    forms.sweep_idle();
    forms.insert(id, session);
    drop(forms);
    tracing::info!(form = %id, assets = snapshot.assets, "swap form opened");

    (StatusCode::CREATED, Json(FormResponse { id, snapshot }))
}

pub async fn get_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormResponse>, ApiError> {
    let mut forms = state.forms.lock().await;
    let session = forms.get(&id).ok_or_else(|| form_not_found(id))?;
    Ok(Json(FormResponse {
        id,
        snapshot: session.snapshot(),
    }))
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<FormEdit>,
) -> Result<Json<FormResponse>, ApiError> {
    let mut forms = state.forms.lock().await;
    let session = forms.get_mut(&id).ok_or_else(|| form_not_found(id))?;

    if let Some(symbol) = edit.source_asset {
        session.set_source_asset(symbol);
    }
    if let Some(symbol) = edit.target_asset {
        session.set_target_asset(symbol);
    }
    if let Some(amount) = edit.source_amount {
        session.set_source_amount(amount);
    }
    if let Some(symbol) = edit.picked_asset {
        session.pick_from_list(symbol);
    }

    Ok(Json(FormResponse {
        id,
        snapshot: session.snapshot(),
    }))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormResponse>, ApiError> {
    let mut forms = state.forms.lock().await;
    let session = forms.get_mut(&id).ok_or_else(|| form_not_found(id))?;
    session.toggle_direction().map_err(swap_error)?;

    Ok(Json(FormResponse {
        id,
        snapshot: session.snapshot(),
    }))
}

/// Reload prices for one form without holding the session lock across the fetch.
pub async fn reload_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormResponse>, ApiError> {
    let ticket = {
        let mut forms = state.forms.lock().await;
        forms
            .get_mut(&id)
            .ok_or_else(|| form_not_found(id))?
            .begin_load()
    };

    let result = state.loader.load().await;

    let mut forms = state.forms.lock().await;
    let session = forms.get_mut(&id).ok_or_else(|| form_not_found(id))?;
    session.apply_catalog(ticket, result);

    Ok(Json(FormResponse {
        id,
        snapshot: session.snapshot(),
    }))
}

/// Submit the form. Only one submission per form may be in flight; if the
/// form is closed before settlement completes, the result is not applied.
///
/// Settlement runs in its own task, so the session always leaves
/// `Submitting` even when the client disconnects mid-request.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let (attempt, intent) = {
        let mut forms = state.forms.lock().await;
        let session = forms.get_mut(&id).ok_or_else(|| form_not_found(id))?;
        session.begin_submit().map_err(swap_error)?.into_parts()
    };

    let task_state = state.clone();
    let settlement = tokio::spawn(async move {
        let outcome = task_state.executor.execute(intent).await;
        if let Some(session) = task_state.forms.lock().await.get_mut(&id) {
            session.finish_submit(attempt, outcome.clone());
        } else {
            tracing::debug!(form = %id, "form closed before settlement completed");
        }
        outcome
    });

    let outcome = match settlement.await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(form = %id, "settlement task failed: {}", e);
            if let Some(session) = state.forms.lock().await.get_mut(&id) {
                session.abandon_submit();
            }
            return Err(api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SETTLEMENT_ABORTED",
                "Swap failed. Please try again.",
            ));
        }
    };

    let receipt = outcome.map_err(|e| swap_error(e.into()))?;
    Ok(Json(SubmitResponse {
        message: receipt.message(),
        receipt,
    }))
}

/// Dismiss the result of the last submission (back to idle).
pub async fn acknowledge_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormResponse>, ApiError> {
    let mut forms = state.forms.lock().await;
    let session = forms.get_mut(&id).ok_or_else(|| form_not_found(id))?;
    session.acknowledge();

    Ok(Json(FormResponse {
        id,
        snapshot: session.snapshot(),
    }))
}

pub async fn close_form(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .forms
        .lock()
        .await
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| form_not_found(id))
}

pub async fn get_icon(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(Uuid, String)>,
) -> Result<Json<TokenIcon>, ApiError> {
    let mut forms = state.forms.lock().await;
    let session = forms.get(&id).ok_or_else(|| form_not_found(id))?;
    Ok(Json(session.icon(&symbol)))
}

/// Report that an icon failed to load; the symbol gets a glyph from now on.
pub async fn icon_failed(
    State(state): State<AppState>,
    Path((id, symbol)): Path<(Uuid, String)>,
) -> Result<Json<TokenIcon>, ApiError> {
    let mut forms = state.forms.lock().await;
    let session = forms.get_mut(&id).ok_or_else(|| form_not_found(id))?;
    session.icons_mut().mark_failed(IconLoadError::new(symbol.clone()));
    Ok(Json(session.icon(&symbol)))
}
