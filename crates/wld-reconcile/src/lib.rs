//! wld-reconcile
//!
//! The pure core of a refresh: classify incoming countries against the
//! persisted name set, derive estimated GDP, and project the summary view.
//! No I/O anywhere in this crate; randomness is injected by the caller so
//! tests can pin it.

pub mod engine;
pub mod gdp;
pub mod summary;

pub use engine::{reconcile, RefreshPlan};
pub use gdp::estimate_gdp;
pub use summary::project;
