//! JSON REST API over the organisation graph.
//!
//! Exposes an axum [`Router`] backed by an [`OrgChart`] over any
//! [`OrgStore`]. Auth, TLS, and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", orgchart_api::api_router(chart.clone()))
//! ```

pub mod assignments;
pub mod closure;
pub mod error;
pub mod links;
pub mod positions;
pub mod statistics;

use axum::{
  Router,
  routing::{get, post},
};
use orgchart_core::{OrgChart, store::OrgStore};

pub use error::ApiError;

/// Build the API router for `chart`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(chart: OrgChart<S>) -> Router<()>
where
  S: OrgStore + 'static,
{
  Router::new()
    // Hierarchy view
    .route("/positions", get(positions::list::<S>))
    .route("/closure", get(closure::handler::<S>))
    .route("/statistics", get(statistics::handler::<S>))
    // Hierarchy links
    .route("/hierarchy-links", post(links::create::<S>))
    .route(
      "/hierarchy-links/{id}",
      get(links::get_one::<S>)
        .patch(links::update::<S>)
        .delete(links::delete_one::<S>),
    )
    // Maintenance
    .route("/assignments/refresh-counts", post(assignments::refresh_counts::<S>))
    .with_state(chart)
}

#[cfg(test)]
mod tests;
