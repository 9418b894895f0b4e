//! Axum router and all HTTP handlers for wld-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{info, warn};
use wld_db::{CountryStore, ListFilter, SortOrder};
use wld_schemas::ExchangeRates;
use wld_sources::{CountryFeed, RateFeed};

use crate::{
    api_types::{DeletedResponse, ErrorResponse, HealthResponse, StatsResponse},
    state::{spawn_summary_render, AppState},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/countries/refresh", post(refresh))
        .route("/v1/countries", get(list_countries))
        .route("/v1/countries/image", get(summary_image))
        .route("/v1/countries/:name", get(get_country).delete(delete_country))
        .route("/v1/stats", get(stats))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/countries/refresh
// ---------------------------------------------------------------------------

/// Run one refresh: fetch both feeds, classify against the stored name
/// snapshot, apply the plan transactionally, then detach the summary
/// render. Responds 204 before the render has run; the caller is never
/// told whether rendering succeeded.
pub(crate) async fn refresh(State(st): State<Arc<AppState>>) -> Response {
    let started_at = Utc::now();

    // 1) Countries feed. Any failure aborts before a single write.
    let incoming = match st.countries.fetch_countries().await {
        Ok(countries) => countries,
        Err(err) => {
            warn!(source = st.countries.source_name(), error = %err, "countries fetch failed");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::source_unavailable(
                    "Could not fetch data from countries API",
                )),
            )
                .into_response();
        }
    };

    // 2) Rates feed. Failure degrades to an empty table: every estimate
    //    this refresh comes out absent, and the refresh continues.
    let rates = match st.rates.fetch_rates().await {
        Ok(rates) => rates,
        Err(err) => {
            warn!(source = st.rates.source_name(), error = %err, "rates fetch failed; continuing without rates");
            ExchangeRates::empty()
        }
    };

    // 3-5) Single-writer critical section: snapshot names, classify, write.
    {
        let _gate = st.refresh_gate.lock().await;

        let existing = match st.store.get_all(&ListFilter::default()).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "refresh: dataset read failed");
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorResponse::storage_unavailable(
                        "Could not read existing countries",
                    )),
                )
                    .into_response();
            }
        };
        let existing_names: BTreeSet<String> =
            existing.into_iter().map(|r| r.name).collect();

        let mut rng = StdRng::from_entropy();
        let plan = wld_reconcile::reconcile(
            &existing_names,
            &incoming,
            &rates,
            started_at,
            &mut rng,
        );

        if let Err(err) = st.store.apply_refresh(&plan.to_insert, &plan.to_update).await {
            warn!(error = %err, "refresh: apply failed");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::storage_unavailable(
                    "Could not persist refreshed countries",
                )),
            )
                .into_response();
        }

        info!(
            inserted = plan.to_insert.len(),
            updated = plan.to_update.len(),
            "refresh applied"
        );
    }

    // 6) Fire-and-forget artifact regeneration.
    spawn_summary_render(Arc::clone(&st));

    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// GET /v1/countries
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct ListParams {
    region: Option<String>,
    currency: Option<String>,
    sort: Option<String>,
}

pub(crate) async fn list_countries(
    State(st): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let filter = ListFilter {
        region: params.region,
        currency: params.currency,
        // Unrecognized sort values fall back to storage order.
        sort: params.sort.as_deref().and_then(SortOrder::parse),
    };

    match st.store.get_all(&filter).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => {
            warn!(error = %err, "list query failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::storage_unavailable("Could not list countries")),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/countries/:name
// ---------------------------------------------------------------------------

pub(crate) async fn get_country(
    State(st): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match st.store.get_by_name(&name).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Country not found")),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, country = %name, "lookup failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::storage_unavailable("Could not read country")),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// DELETE /v1/countries/:name
// ---------------------------------------------------------------------------

pub(crate) async fn delete_country(
    State(st): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Response {
    match st.store.delete_by_name(&name).await {
        Ok(true) => (
            StatusCode::OK,
            Json(DeletedResponse {
                message: "Country deleted successfully".to_string(),
            }),
        )
            .into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Country not found")),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, country = %name, "delete failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::storage_unavailable("Could not delete country")),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/stats
// ---------------------------------------------------------------------------

pub(crate) async fn stats(State(st): State<Arc<AppState>>) -> Response {
    match st.store.count().await {
        Ok(total) => (
            StatusCode::OK,
            Json(StatsResponse {
                total_countries: total,
                last_refreshed_at: Utc::now(),
            }),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "stats query failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse::storage_unavailable("Could not get stats")),
            )
                .into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// GET /v1/countries/image
// ---------------------------------------------------------------------------

/// Serve the most recently rendered summary artifact. A missing artifact is
/// a distinct outcome (404) from a read failure (500).
pub(crate) async fn summary_image(State(st): State<Arc<AppState>>) -> Response {
    let path = wld_render::artifact_path(&st.cache_dir);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "image/svg+xml")],
            bytes,
        )
            .into_response(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::not_found("Summary image not found")),
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, path = %path.display(), "artifact read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Could not read summary image".to_string(),
                    details: None,
                }),
            )
                .into_response()
        }
    }
}
