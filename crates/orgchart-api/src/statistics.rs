//! Handler for `GET /statistics`.
//!
//! Always answers 200. A failed computation is reported in the body's
//! `message` field alongside zeroed counts.

use axum::{
  Json,
  extract::{Query, State},
};
use orgchart_core::{
  OrgChart,
  stats::{Statistics, StatsQuery},
  store::OrgStore,
};

/// `GET /statistics[?position_id=...][&department_id=...][&context_parent_id=...]`
pub async fn handler<S>(
  State(chart): State<OrgChart<S>>,
  Query(query): Query<StatsQuery>,
) -> Json<Statistics>
where
  S: OrgStore,
{
  Json(chart.compute_statistics(query).await)
}
