//! Handler for `POST /assignments/refresh-counts`.

use axum::{Json, extract::State};
use orgchart_core::{OrgChart, store::OrgStore};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
  pub refreshed: u64,
}

/// `POST /assignments/refresh-counts`: recompute cached placement counts.
pub async fn refresh_counts<S>(
  State(chart): State<OrgChart<S>>,
) -> Result<Json<RefreshResponse>, ApiError>
where
  S: OrgStore,
{
  let refreshed = chart.refresh_assignment_counts().await?;
  Ok(Json(RefreshResponse { refreshed }))
}
