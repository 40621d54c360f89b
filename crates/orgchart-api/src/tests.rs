//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use orgchart_core::{
  OrgChart,
  department::NewDepartment,
  employee::NewEmployee,
  overrides::{FixedQuotaUnit, StaffingOverrides},
  position::NewPosition,
  store::OrgStore,
};
use orgchart_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn make_chart(overrides: StaffingOverrides) -> OrgChart<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  OrgChart::new(Arc::new(store), overrides)
}

async fn send(
  app: Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app.oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

#[tokio::test]
async fn statistics_without_ids_reports_message() {
  let chart = make_chart(StaffingOverrides::default()).await;
  let (status, body) = send(api_router(chart), "GET", "/statistics", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 0);
  assert_eq!(body["vacant"], 0);
  assert!(body["message"].as_str().unwrap().contains("required"));
}

#[tokio::test]
async fn statistics_for_fixed_quota_unit() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let unit = store.add_department(NewDepartment::new("Unit")).await.unwrap();
  for name in ["Ada", "Grace", "Edsger"] {
    store
      .add_employee(NewEmployee::in_department(name, unit.department_id))
      .await
      .unwrap();
  }
  let overrides = StaffingOverrides {
    fixed_quota_units: vec![FixedQuotaUnit { department_id: unit.department_id, quota: 50 }],
    deputies:          vec![],
  };
  let chart = OrgChart::new(Arc::new(store), overrides);

  let uri = format!("/statistics?department_id={}", unit.department_id);
  let (status, body) = send(api_router(chart), "GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["total"], 50);
  assert_eq!(body["occupied"], 3);
  assert_eq!(body["vacant"], 47);
  assert_eq!(body["rule"], "fixed_quota");
  assert!(body.get("message").is_none());
}

#[tokio::test]
async fn closure_requires_an_id() {
  let chart = make_chart(StaffingOverrides::default()).await;
  let (status, body) = send(api_router(chart), "GET", "/closure", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn closure_lists_subtree() {
  let chart = make_chart(StaffingOverrides::default()).await;
  let root = chart.store().add_department(NewDepartment::new("Root")).await.unwrap();
  chart
    .store()
    .add_department(NewDepartment::under("Child", root.department_id))
    .await
    .unwrap();

  let uri = format!("/closure?department_id={}", root.department_id);
  let (status, body) = send(api_router(chart), "GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn self_parent_link_is_conflict() {
  let chart = make_chart(StaffingOverrides::default()).await;
  let d = chart.store().add_department(NewDepartment::new("D")).await.unwrap();
  let p = chart.store().add_position(NewPosition::new("Lead")).await.unwrap();

  let body = json!({
    "child_position_id":  p.position_id,
    "parent_position_id": p.position_id,
    "department_id":      d.department_id,
  });
  let (status, resp) =
    send(api_router(chart.clone()), "POST", "/hierarchy-links", Some(body)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(resp["error"], "a position cannot be its own parent");
  assert!(chart.store().list_links().await.unwrap().is_empty());
}

#[tokio::test]
async fn link_lifecycle() {
  let chart = make_chart(StaffingOverrides::default()).await;
  let d = chart.store().add_department(NewDepartment::new("D")).await.unwrap();
  let dev = chart.store().add_position(NewPosition::new("Dev")).await.unwrap();
  let lead = chart.store().add_position(NewPosition::new("Lead")).await.unwrap();
  let head = chart.store().add_position(NewPosition::new("Head")).await.unwrap();

  let body = json!({
    "child_position_id":  dev.position_id,
    "parent_position_id": lead.position_id,
    "department_id":      d.department_id,
  });
  let (status, created) =
    send(api_router(chart.clone()), "POST", "/hierarchy-links", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  let id = created["link_id"].as_str().unwrap().to_owned();
  let uri = format!("/hierarchy-links/{id}");

  let patch = json!({ "parent_position_id": head.position_id });
  let (status, updated) = send(api_router(chart.clone()), "PATCH", &uri, Some(patch)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(updated["parent_position_id"], head.position_id.to_string());

  let (status, positions) = send(api_router(chart.clone()), "GET", "/positions", None).await;
  assert_eq!(status, StatusCode::OK);
  let dev_view = positions
    .as_array()
    .unwrap()
    .iter()
    .find(|v| v["position"]["name"] == "Dev")
    .unwrap();
  assert_eq!(dev_view["is_subordinate"], true);

  let (status, _) = send(api_router(chart.clone()), "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(api_router(chart), "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn refresh_counts_reports_rows() {
  let chart = make_chart(StaffingOverrides::default()).await;
  let (status, body) =
    send(api_router(chart), "POST", "/assignments/refresh-counts", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["refreshed"], 0);
}
