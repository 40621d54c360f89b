//! Handlers for `/hierarchy-links` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/hierarchy-links` | Body: [`NewHierarchyLink`]; returns 201 |
//! | `GET`    | `/hierarchy-links/:id` | 404 if not found |
//! | `PATCH`  | `/hierarchy-links/:id` | Body: [`LinkUpdate`]; re-validated |
//! | `DELETE` | `/hierarchy-links/:id` | Hard delete; returns 204 |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use orgchart_core::{
  OrgChart,
  link::{HierarchyLink, LinkUpdate, NewHierarchyLink},
  store::OrgStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `POST /hierarchy-links`
pub async fn create<S>(
  State(chart): State<OrgChart<S>>,
  Json(body): Json<NewHierarchyLink>,
) -> Result<impl IntoResponse, ApiError>
where
  S: OrgStore,
{
  let link = chart.create_link(body).await?;
  Ok((StatusCode::CREATED, Json(link)))
}

/// `GET /hierarchy-links/:id`
pub async fn get_one<S>(
  State(chart): State<OrgChart<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<HierarchyLink>, ApiError>
where
  S: OrgStore,
{
  Ok(Json(chart.get_link(id).await?))
}

/// `PATCH /hierarchy-links/:id`
pub async fn update<S>(
  State(chart): State<OrgChart<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<LinkUpdate>,
) -> Result<Json<HierarchyLink>, ApiError>
where
  S: OrgStore,
{
  Ok(Json(chart.update_link(id, body).await?))
}

/// `DELETE /hierarchy-links/:id`
pub async fn delete_one<S>(
  State(chart): State<OrgChart<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: OrgStore,
{
  chart.delete_link(id).await?;
  Ok(StatusCode::NO_CONTENT)
}
