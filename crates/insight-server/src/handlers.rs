//! HTTP Handlers

use axum::{
    Form, Json, Router,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use market_insight::{InsightError, RenderState, SessionPhase};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::page::{Flash, Page};
use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectForm {
    pub ticker: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub provider: String,
    pub provider_connected: bool,
    pub market_data: String,
    pub phase: SessionPhase,
}

#[derive(Debug, Serialize)]
pub struct TickersResponse {
    pub tickers: Vec<String>,
    pub selected: Option<String>,
}

// ============================================================================
// Router
// ============================================================================

/// Charts are written by the model, so they must not run script on this origin
const PLOT_CSP: &str = "default-src 'none'; style-src 'unsafe-inline'; sandbox";

pub fn router(state: AppState) -> Router {
    let plots = ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(PLOT_CSP),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .service(ServeDir::new(&state.plot_dir));

    Router::new()
        .route("/", get(index))
        .route("/select", post(select))
        .route("/clear", post(clear))
        .route("/health", get(health_check))
        .route("/api/tickers", get(list_tickers))
        .nest_service("/plot", plots)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// The page. Runs the analysis whenever a dataset exists.
pub async fn index(State(state): State<AppState>) -> Response {
    let mut ui = state.ui.lock().await;
    let mut flash = ui.flash.take();

    let (status, rendered) = match ui.session.render().await {
        Ok(rendered) => (StatusCode::OK, rendered),
        Err(e) => {
            tracing::error!(error = %e, "render failed");
            flash = Some(Flash::Error(e.user_message()));
            (StatusCode::INTERNAL_SERVER_ERROR, RenderState::Empty)
        }
    };

    let html = state.pages.render(Page {
        tickers: &state.tickers,
        selected: ui.session.selection(),
        flash,
        state: &rendered,
        market: ui.session.market_provider(),
        agent: state.provider.name(),
    });

    match html {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "page template failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Page rendering failed").into_response()
        }
    }
}

/// "Save Option": download the ticker and make it the only dataset
pub async fn select(State(state): State<AppState>, Form(form): Form<SelectForm>) -> Redirect {
    let mut ui = state.ui.lock().await;

    let outcome = match state.tickers.resolve(&form.ticker) {
        Ok(ticker) => ui.session.save_option(ticker.clone()).await.map(|_| ticker),
        Err(e) => Err(e),
    };

    ui.flash = Some(match outcome {
        Ok(ticker) => {
            tracing::info!(%ticker, "ticker selected");
            Flash::Selected(ticker)
        }
        Err(e) => {
            report_failure("selection", &e);
            Flash::Error(e.user_message())
        }
    });

    Redirect::to("/")
}

/// "Clear": empty both directories and drop the selection
pub async fn clear(State(state): State<AppState>) -> Redirect {
    let mut ui = state.ui.lock().await;

    let flash = match ui.session.clear().await {
        Ok(()) => None,
        Err(e) => {
            report_failure("clear", &e);
            Some(Flash::Error(e.user_message()))
        }
    };
    ui.flash = flash;

    Redirect::to("/")
}

/// Expected action failures are warnings, anything else points at a bug
fn report_failure(action: &str, e: &InsightError) {
    if e.aborts_action() {
        tracing::warn!(action, error = %e, "action failed");
    } else {
        tracing::error!(action, error = %e, "action failed unexpectedly");
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (phase, market_data) = {
        let ui = state.ui.lock().await;
        (ui.session.phase(), ui.session.market_provider().to_string())
    };
    let provider_connected = state.provider.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        provider: state.provider.name().to_string(),
        provider_connected,
        market_data,
        phase,
    })
}

/// Candidate tickers for the select control
pub async fn list_tickers(State(state): State<AppState>) -> Json<TickersResponse> {
    let selected = {
        let ui = state.ui.lock().await;
        ui.session.selection().map(ToString::to_string)
    };

    Json(TickersResponse {
        tickers: state.tickers.iter().map(ToString::to_string).collect(),
        selected,
    })
}
