//! Handler for `GET /closure`.

use axum::{
  Json,
  extract::{Query, State},
};
use orgchart_core::{OrgChart, closure::ClosureTarget, store::OrgStore};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ClosureParams {
  pub department_id: Option<Uuid>,
  pub position_id:   Option<Uuid>,
}

/// `GET /closure?department_id=<id>` or `GET /closure?position_id=<id>`
pub async fn handler<S>(
  State(chart): State<OrgChart<S>>,
  Query(params): Query<ClosureParams>,
) -> Result<Json<Vec<Uuid>>, ApiError>
where
  S: OrgStore,
{
  let target = match (params.department_id, params.position_id) {
    (Some(d), _) => ClosureTarget::Department(d),
    (None, Some(p)) => ClosureTarget::Position(p),
    (None, None) => {
      return Err(ApiError::BadRequest(
        "either department_id or position_id is required".into(),
      ));
    }
  };
  Ok(Json(chart.closure_of(target).await?))
}
