//! Shared runtime state for wld-daemon.
//!
//! Handlers receive `State<Arc<AppState>>` from Axum. The store and the two
//! upstream feeds are held as trait objects so scenario tests can swap in
//! the testkit store and stub feeds without a database or network.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;
use wld_db::{CountryStore, ListFilter};
use wld_sources::{CountryFeed, RateFeed};

/// Static build metadata included in health responses.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Cloneable (Arc) handle shared across all Axum handlers.
pub struct AppState {
    pub build: BuildInfo,
    pub store: Arc<dyn CountryStore>,
    pub countries: Arc<dyn CountryFeed>,
    pub rates: Arc<dyn RateFeed>,
    /// Directory holding the rendered summary artifact.
    pub cache_dir: PathBuf,
    /// Single-writer gate around the bulk-read / classify / bulk-write
    /// sequence of a refresh. Two overlapping refreshes would otherwise
    /// race their name snapshots against each other's writes.
    pub refresh_gate: Mutex<()>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CountryStore>,
        countries: Arc<dyn CountryFeed>,
        rates: Arc<dyn RateFeed>,
        cache_dir: PathBuf,
    ) -> Self {
        Self {
            build: BuildInfo {
                service: "wld-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            store,
            countries,
            rates,
            cache_dir,
            refresh_gate: Mutex::new(()),
        }
    }
}

/// Spawn the detached post-refresh task: re-read the dataset, project the
/// summary, render the artifact. Fire-and-forget by design — the refresh
/// response never waits for it and failures are logged only.
pub fn spawn_summary_render(state: Arc<AppState>) {
    tokio::spawn(async move {
        let records = match state.store.get_all(&ListFilter::default()).await {
            Ok(records) => records,
            Err(err) => {
                warn!(error = %err, "summary render: dataset read failed");
                return;
            }
        };

        let summary = wld_reconcile::project(&records);
        match wld_render::render_summary(&state.cache_dir, &summary) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "summary artifact rendered");
            }
            Err(err) => {
                warn!(error = %err, "summary render failed");
            }
        }
    });
}
