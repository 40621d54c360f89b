//! Staffing statistics: total, occupied and vacant slots for a department
//! sub-tree or a position.
//!
//! The engine never fails past its boundary. Missing arguments and store
//! failures come back as a zeroed [`Statistics`] whose `message` explains
//! why; callers check `message` to tell a failure from a genuine zero.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  closure::{ClosureTarget, closure_of, department_closure},
  overrides::{StaffingOverrides, proportional_total},
  store::OrgStore,
};

/// What to compute statistics for. At least one of `position_id` and
/// `department_id` is required; when both are given the department decides
/// the scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsQuery {
  pub position_id:       Option<Uuid>,
  pub department_id:     Option<Uuid>,
  /// The parent position the node is being viewed beneath.
  pub context_parent_id: Option<Uuid>,
}

impl StatsQuery {
  pub fn department(id: Uuid) -> Self {
    Self { department_id: Some(id), ..Self::default() }
  }

  pub fn position(id: Uuid) -> Self {
    Self { position_id: Some(id), ..Self::default() }
  }

  pub fn beneath(mut self, context_parent_id: Uuid) -> Self {
    self.context_parent_id = Some(context_parent_id);
    self
  }

  fn target(&self) -> Option<ClosureTarget> {
    match (self.department_id, self.position_id) {
      (Some(d), _) => Some(ClosureTarget::Department(d)),
      (None, Some(p)) => Some(ClosureTarget::Position(p)),
      (None, None) => None,
    }
  }
}

/// Which rule produced [`Statistics::total`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TotalRule {
  FixedQuota,
  ProportionalDeputy,
  Standard,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
  pub total:    u64,
  pub occupied: u64,
  pub vacant:   u64,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub rule:     Option<TotalRule>,
  /// Present only when the computation failed.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub message:  Option<String>,
}

impl Statistics {
  fn new(total: u64, occupied: u64, rule: TotalRule) -> Self {
    Self {
      total,
      occupied,
      vacant: total.saturating_sub(occupied),
      rule: Some(rule),
      message: None,
    }
  }

  /// A zeroed result carrying `message`.
  pub fn failed(message: impl Into<String>) -> Self {
    Self { message: Some(message.into()), ..Self::default() }
  }

  pub fn is_failure(&self) -> bool { self.message.is_some() }
}

/// Compute statistics for `query`, applying `overrides` where configured.
pub async fn compute_statistics<S: OrgStore>(
  store: &S,
  overrides: &StaffingOverrides,
  query: StatsQuery,
) -> Statistics {
  let Some(target) = query.target() else {
    let err = Error::InvalidArgument(
      "either position_id or department_id is required".into(),
    );
    return Statistics::failed(err.to_string());
  };

  match compute(store, overrides, &query, target).await {
    Ok(stats) => stats,
    Err(e) => {
      tracing::error!(error = %e, ?query, "staffing statistics degraded to zero");
      Statistics::failed(format!("failed to compute staffing statistics: {e}"))
    }
  }
}

async fn compute<S: OrgStore>(
  store: &S,
  overrides: &StaffingOverrides,
  query: &StatsQuery,
  target: ClosureTarget,
) -> Result<Statistics> {
  let scope = closure_of(store, target).await.map_err(Error::from_store)?;
  let occupied = occupancy(store, &scope).await?;

  if let Some(unit) = overrides.unit_within(&scope) {
    tracing::debug!(unit = %unit.department_id, quota = unit.quota, "fixed-quota unit in scope");
    return Ok(Statistics::new(unit.quota.max(occupied), occupied, TotalRule::FixedQuota));
  }

  let deputy = query
    .position_id
    .and_then(|p| overrides.deputy(p, query.context_parent_id).map(|r| (p, r)));
  if let Some((position_id, rule)) = deputy {
    match overrides.unit(rule.unit_department_id) {
      Some(unit) => {
        let unit_scope = department_closure(store, unit.department_id)
          .await
          .map_err(Error::from_store)?;
        let unit_occupied = occupancy(store, &unit_scope).await?;
        let total = proportional_total(unit.quota, occupied, unit_occupied);
        tracing::debug!(
          %position_id,
          occupied,
          unit_occupied,
          total,
          "proportional deputy total"
        );
        return Ok(Statistics::new(total, occupied, TotalRule::ProportionalDeputy));
      }
      None => tracing::warn!(
        %position_id,
        unit = %rule.unit_department_id,
        "deputy rule names a unit with no configured quota; using standard rule"
      ),
    }
  }

  let declared = store
    .count_assignments_in(scope.into_iter().collect())
    .await
    .map_err(Error::from_store)?;
  Ok(Statistics::new(declared.max(occupied), occupied, TotalRule::Standard))
}

async fn occupancy<S: OrgStore>(store: &S, scope: &BTreeSet<Uuid>) -> Result<u64> {
  store
    .count_employees_in(scope.iter().copied().collect())
    .await
    .map_err(Error::from_store)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn vacancy_never_negative() {
    let s = Statistics::new(3, 5, TotalRule::Standard);
    assert_eq!(s.vacant, 0);
    let s = Statistics::new(50, 12, TotalRule::FixedQuota);
    assert_eq!(s.vacant, 38);
  }

  #[test]
  fn department_takes_precedence_over_position() {
    let d = Uuid::new_v4();
    let p = Uuid::new_v4();
    let q = StatsQuery {
      position_id:       Some(p),
      department_id:     Some(d),
      context_parent_id: None,
    };
    assert_eq!(q.target(), Some(ClosureTarget::Department(d)));
    assert_eq!(StatsQuery::position(p).target(), Some(ClosureTarget::Position(p)));
    assert_eq!(StatsQuery::default().target(), None);
  }

  #[test]
  fn failure_serialises_message_without_rule() {
    let s = Statistics::failed("boom");
    let json = serde_json::to_value(&s).unwrap();
    assert_eq!(json["total"], 0);
    assert_eq!(json["message"], "boom");
    assert!(json.get("rule").is_none());
  }
}
