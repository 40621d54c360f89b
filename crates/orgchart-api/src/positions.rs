//! Handler for `GET /positions`: every live position with its department
//! placements and the parents that apply in each.

use axum::{Json, extract::State};
use orgchart_core::{OrgChart, hierarchy::PositionView, store::OrgStore};

use crate::error::ApiError;

/// `GET /positions`
pub async fn list<S>(
  State(chart): State<OrgChart<S>>,
) -> Result<Json<Vec<PositionView>>, ApiError>
where
  S: OrgStore,
{
  Ok(Json(chart.denormalize_positions().await?))
}
