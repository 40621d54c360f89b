//! Injected staffing override rules.
//!
//! Some units are staffed against a fixed quota rather than their declared
//! placements, and some deputy positions take a proportional share of such a
//! unit's quota. Which ids these are is configuration, never code.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quota used when a fixed-quota unit does not name one.
pub const DEFAULT_UNIT_QUOTA: u64 = 50;

fn default_quota() -> u64 { DEFAULT_UNIT_QUOTA }

/// A department whose total is a constant, whatever its placements say.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedQuotaUnit {
  pub department_id: Uuid,
  #[serde(default = "default_quota")]
  pub quota:         u64,
}

/// A deputy position whose total is a share of a fixed-quota unit's quota,
/// applied only when viewed beneath `executive_position_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeputyRule {
  pub position_id:           Uuid,
  pub executive_position_id: Uuid,
  /// The fixed-quota unit providing both the quota and the denominator.
  pub unit_department_id:    Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingOverrides {
  #[serde(default)]
  pub fixed_quota_units: Vec<FixedQuotaUnit>,
  #[serde(default)]
  pub deputies:          Vec<DeputyRule>,
}

impl StaffingOverrides {
  pub fn is_empty(&self) -> bool {
    self.fixed_quota_units.is_empty() && self.deputies.is_empty()
  }

  pub fn unit(&self, department_id: Uuid) -> Option<&FixedQuotaUnit> {
    self
      .fixed_quota_units
      .iter()
      .find(|u| u.department_id == department_id)
  }

  /// The first configured fixed-quota unit that falls inside `scope`.
  pub fn unit_within(&self, scope: &BTreeSet<Uuid>) -> Option<&FixedQuotaUnit> {
    self
      .fixed_quota_units
      .iter()
      .find(|u| scope.contains(&u.department_id))
  }

  /// The deputy rule for `position_id`, if it is viewed beneath its
  /// configured executive.
  pub fn deputy(
    &self,
    position_id: Uuid,
    context_parent_id: Option<Uuid>,
  ) -> Option<&DeputyRule> {
    let context = context_parent_id?;
    self
      .deputies
      .iter()
      .find(|d| d.position_id == position_id && d.executive_position_id == context)
  }
}

/// `max(round(quota * occupied / unit_occupied), occupied)`; the ratio is 0
/// when the unit is empty.
pub fn proportional_total(quota: u64, occupied: u64, unit_occupied: u64) -> u64 {
  let ratio = if unit_occupied == 0 {
    0.0
  } else {
    occupied as f64 / unit_occupied as f64
  };
  let raw = (quota as f64 * ratio).round() as u64;
  raw.max(occupied)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn proportional_share_of_quota() {
    // 4 of 20 people in the unit -> 20% of 50.
    assert_eq!(proportional_total(50, 4, 20), 10);
  }

  #[test]
  fn proportional_share_never_below_headcount() {
    assert_eq!(proportional_total(50, 4, 0), 4);
    assert_eq!(proportional_total(5, 9, 10), 9);
  }

  #[test]
  fn proportional_share_rounds_half_away_from_zero() {
    // 50 * 1/4 = 12.5
    assert_eq!(proportional_total(50, 1, 4), 13);
  }

  #[test]
  fn deputy_rule_requires_matching_context() {
    let deputy = Uuid::new_v4();
    let exec = Uuid::new_v4();
    let overrides = StaffingOverrides {
      fixed_quota_units: vec![],
      deputies:          vec![DeputyRule {
        position_id:           deputy,
        executive_position_id: exec,
        unit_department_id:    Uuid::new_v4(),
      }],
    };
    assert!(overrides.deputy(deputy, Some(exec)).is_some());
    assert!(overrides.deputy(deputy, None).is_none());
    assert!(overrides.deputy(deputy, Some(Uuid::new_v4())).is_none());
    assert!(overrides.deputy(exec, Some(exec)).is_none());
  }

  #[test]
  fn first_configured_unit_in_scope_wins() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let overrides = StaffingOverrides {
      fixed_quota_units: vec![
        FixedQuotaUnit { department_id: b, quota: 7 },
        FixedQuotaUnit { department_id: a, quota: 50 },
      ],
      deputies:          vec![],
    };
    let scope = BTreeSet::from([a, b]);
    assert_eq!(overrides.unit_within(&scope).map(|u| u.quota), Some(7));
    assert!(overrides.unit_within(&BTreeSet::new()).is_none());
  }

  #[test]
  fn quota_defaults_when_omitted() {
    let id = Uuid::new_v4();
    let json = format!(r#"{{"fixed_quota_units":[{{"department_id":"{id}"}}]}}"#);
    let overrides: StaffingOverrides = serde_json::from_str(&json).unwrap();
    assert_eq!(overrides.unit(id).map(|u| u.quota), Some(DEFAULT_UNIT_QUOTA));
    assert!(overrides.deputies.is_empty());
  }
}
