//! Hierarchy denormalisation.
//!
//! Positions can report to different parents in different departments. The
//! raw link tables are folded here into one [`PositionView`] per position,
//! listing each department placement together with the parent that applies
//! in that department.
//!
//! Reads favour availability: an edge or assignment that references a
//! department or position which no longer resolves is skipped, never an
//! error. Link hygiene is enforced on the write path in [`crate::mutator`].

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  department::Department,
  link::{Assignment, HierarchyLink},
  position::Position,
};

// ─── Input ───────────────────────────────────────────────────────────────────

/// Every live row the denormaliser needs, read in one go.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
  pub positions:   Vec<Position>,
  pub departments: Vec<Department>,
  pub assignments: Vec<Assignment>,
  pub links:       Vec<HierarchyLink>,
}

// ─── Output ──────────────────────────────────────────────────────────────────

/// Composite key a placement is deduplicated by. `parent_position_id` is
/// `None` for a position with no declared parent in the department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlacementKey {
  pub parent_position_id: Option<Uuid>,
  pub department_id:      Uuid,
}

/// A position seen from a department, on either end of a hierarchy edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRef {
  pub position_id:     Uuid,
  pub position_name:   String,
  pub department_id:   Uuid,
  pub department_name: String,
}

/// One (position, department, parent?) entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
  pub key:             PlacementKey,
  /// Id of the position-department assignment this entry derives from.
  pub link_id:         Uuid,
  pub department_id:   Uuid,
  pub department_name: String,
  pub sort_order:      i64,
  pub staff_units:     u32,
  pub current_count:   u32,
  pub vacancy_count:   u32,
  pub parent:          Option<HierarchyRef>,
}

/// The enriched, read-only record for one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionView {
  pub position:       Position,
  pub placements:     Vec<Placement>,
  /// `true` iff the position reports to at least one parent anywhere.
  pub is_subordinate: bool,
  pub parents:        Vec<HierarchyRef>,
  pub children:       Vec<HierarchyRef>,
}

impl PositionView {
  /// Placements in `department_id`, one per applicable parent.
  pub fn placements_in(&self, department_id: Uuid) -> impl Iterator<Item = &Placement> {
    self
      .placements
      .iter()
      .filter(move |p| p.department_id == department_id)
  }
}

// ─── Algorithm ───────────────────────────────────────────────────────────────

/// Build a [`PositionView`] for every position in `snapshot`, ordered by
/// position sort key, then name.
pub fn denormalize(snapshot: &GraphSnapshot) -> Vec<PositionView> {
  let positions: HashMap<Uuid, &Position> = snapshot
    .positions
    .iter()
    .map(|p| (p.position_id, p))
    .collect();
  let departments: HashMap<Uuid, &Department> = snapshot
    .departments
    .iter()
    .map(|d| (d.department_id, d))
    .collect();

  // Only edges whose three endpoints all resolve take part.
  let mut by_child_and_department: HashMap<(Uuid, Uuid), Vec<&HierarchyLink>> =
    HashMap::new();
  let mut by_parent: HashMap<Uuid, Vec<&HierarchyLink>> = HashMap::new();
  let mut by_child: HashMap<Uuid, Vec<&HierarchyLink>> = HashMap::new();
  let mut skipped = 0usize;
  for link in &snapshot.links {
    let resolves = positions.contains_key(&link.child_position_id)
      && positions.contains_key(&link.parent_position_id)
      && departments.contains_key(&link.department_id);
    if !resolves {
      skipped += 1;
      continue;
    }
    by_child_and_department
      .entry((link.child_position_id, link.department_id))
      .or_default()
      .push(link);
    by_parent.entry(link.parent_position_id).or_default().push(link);
    by_child.entry(link.child_position_id).or_default().push(link);
  }
  if skipped > 0 {
    tracing::debug!(skipped, "ignored hierarchy links with dangling references");
  }

  let mut assignments_by_position: HashMap<Uuid, Vec<&Assignment>> = HashMap::new();
  for a in &snapshot.assignments {
    assignments_by_position.entry(a.position_id).or_default().push(a);
  }
  for list in assignments_by_position.values_mut() {
    list.sort_by_key(|a| (a.sort_order, a.link_id));
  }

  let reference = |position_id: Uuid, department_id: Uuid| HierarchyRef {
    position_id,
    position_name: positions[&position_id].name.clone(),
    department_id,
    department_name: departments[&department_id].name.clone(),
  };

  let mut ordered: Vec<&Position> = snapshot.positions.iter().collect();
  ordered.sort_by(|a, b| {
    (a.sort_order, &a.name, a.position_id).cmp(&(b.sort_order, &b.name, b.position_id))
  });

  ordered
    .into_iter()
    .map(|position| {
      let id = position.position_id;
      let mut seen: HashSet<PlacementKey> = HashSet::new();
      let mut placements = Vec::new();

      for assignment in assignments_by_position.get(&id).into_iter().flatten() {
        let Some(department) = departments.get(&assignment.department_id) else {
          continue;
        };
        let base = |key: PlacementKey, parent: Option<HierarchyRef>| Placement {
          key,
          link_id: assignment.link_id,
          department_id: department.department_id,
          department_name: department.name.clone(),
          sort_order: assignment.sort_order,
          staff_units: assignment.staff_units,
          current_count: assignment.current_count,
          vacancy_count: assignment.vacancy_count,
          parent,
        };

        let mut edges: Vec<&HierarchyLink> = by_child_and_department
          .get(&(id, department.department_id))
          .cloned()
          .unwrap_or_default();

        if edges.is_empty() {
          let key = PlacementKey {
            parent_position_id: None,
            department_id:      department.department_id,
          };
          if seen.insert(key) {
            placements.push(base(key, None));
          }
          continue;
        }

        edges.sort_by(|a, b| {
          let an = &positions[&a.parent_position_id].name;
          let bn = &positions[&b.parent_position_id].name;
          (an, a.parent_position_id).cmp(&(bn, b.parent_position_id))
        });
        for edge in edges {
          let key = PlacementKey {
            parent_position_id: Some(edge.parent_position_id),
            department_id:      edge.department_id,
          };
          if seen.insert(key) {
            let parent = reference(edge.parent_position_id, edge.department_id);
            placements.push(base(key, Some(parent)));
          }
        }
      }

      let parents = collect_refs(by_child.get(&id), |l| {
        reference(l.parent_position_id, l.department_id)
      });
      let children = collect_refs(by_parent.get(&id), |l| {
        reference(l.child_position_id, l.department_id)
      });

      PositionView {
        position: position.clone(),
        placements,
        is_subordinate: by_child.contains_key(&id),
        parents,
        children,
      }
    })
    .collect()
}

/// Map edges to refs, deduplicated by (position, department).
fn collect_refs(
  edges: Option<&Vec<&HierarchyLink>>,
  to_ref: impl Fn(&HierarchyLink) -> HierarchyRef,
) -> Vec<HierarchyRef> {
  let mut seen = HashSet::new();
  let mut refs: Vec<HierarchyRef> = edges
    .into_iter()
    .flatten()
    .map(|l| to_ref(*l))
    .filter(|r| seen.insert((r.position_id, r.department_id)))
    .collect();
  refs.sort_by(|a, b| {
    (&a.position_name, &a.department_name).cmp(&(&b.position_name, &b.department_name))
  });
  refs
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn position(name: &str) -> Position {
    Position {
      position_id: Uuid::new_v4(),
      name:        name.into(),
      is_category: false,
      sort_order:  0,
      created_at:  Utc::now(),
      deleted_at:  None,
    }
  }

  fn department(name: &str) -> Department {
    Department {
      department_id:   Uuid::new_v4(),
      name:            name.into(),
      parent_id:       None,
      is_organization: false,
      sort_order:      0,
      created_at:      Utc::now(),
      deleted_at:      None,
    }
  }

  fn assign(p: &Position, d: &Department, sort_order: i64) -> Assignment {
    Assignment {
      link_id: Uuid::new_v4(),
      position_id: p.position_id,
      department_id: d.department_id,
      staff_units: 3,
      current_count: 1,
      vacancy_count: 2,
      sort_order,
    }
  }

  fn edge(child: &Position, parent: &Position, d: &Department) -> HierarchyLink {
    HierarchyLink {
      link_id:            Uuid::new_v4(),
      child_position_id:  child.position_id,
      parent_position_id: parent.position_id,
      department_id:      d.department_id,
      sort_order:         0,
    }
  }

  fn view<'a>(views: &'a [PositionView], p: &Position) -> &'a PositionView {
    views
      .iter()
      .find(|v| v.position.position_id == p.position_id)
      .unwrap()
  }

  #[test]
  fn position_without_edges_is_not_subordinate() {
    let dev = position("Developer");
    let eng = department("Engineering");
    let snapshot = GraphSnapshot {
      assignments: vec![assign(&dev, &eng, 0)],
      positions: vec![dev.clone()],
      departments: vec![eng.clone()],
      links: vec![],
    };

    let views = denormalize(&snapshot);
    let v = view(&views, &dev);
    assert!(!v.is_subordinate);
    assert!(v.parents.is_empty());
    assert_eq!(v.placements.len(), 1);
    assert_eq!(v.placements[0].key.parent_position_id, None);
    assert_eq!(v.placements[0].key.department_id, eng.department_id);
    assert_eq!(v.placements[0].staff_units, 3);
  }

  #[test]
  fn redundant_edges_collapse_to_one_placement() {
    let dev = position("Developer");
    let lead = position("Lead");
    let eng = department("Engineering");
    let snapshot = GraphSnapshot {
      assignments: vec![assign(&dev, &eng, 0)],
      links: vec![edge(&dev, &lead, &eng), edge(&dev, &lead, &eng)],
      positions: vec![dev.clone(), lead.clone()],
      departments: vec![eng.clone()],
    };

    let views = denormalize(&snapshot);
    let v = view(&views, &dev);
    assert!(v.is_subordinate);
    assert_eq!(v.placements.len(), 1);
    assert_eq!(
      v.placements[0].key,
      PlacementKey {
        parent_position_id: Some(lead.position_id),
        department_id:      eng.department_id,
      }
    );
    assert_eq!(v.parents.len(), 1);

    let l = view(&views, &lead);
    assert_eq!(l.children.len(), 1);
    assert_eq!(l.children[0].position_id, dev.position_id);
  }

  #[test]
  fn parents_are_scoped_per_department() {
    let analyst = position("Analyst");
    let cfo = position("CFO");
    let cto = position("CTO");
    let finance = department("Finance");
    let tech = department("Tech");
    let snapshot = GraphSnapshot {
      assignments: vec![assign(&analyst, &finance, 1), assign(&analyst, &tech, 0)],
      links: vec![edge(&analyst, &cfo, &finance), edge(&analyst, &cto, &tech)],
      positions: vec![analyst.clone(), cfo.clone(), cto.clone()],
      departments: vec![finance.clone(), tech.clone()],
    };

    let views = denormalize(&snapshot);
    let v = view(&views, &analyst);
    // Assignment sort order: tech (0) before finance (1).
    assert_eq!(v.placements.len(), 2);
    assert_eq!(v.placements[0].department_id, tech.department_id);
    assert_eq!(
      v.placements[0].parent.as_ref().map(|p| p.position_id),
      Some(cto.position_id)
    );
    let in_finance: Vec<_> = v.placements_in(finance.department_id).collect();
    assert_eq!(in_finance.len(), 1);
    assert_eq!(
      in_finance[0].parent.as_ref().map(|p| p.position_id),
      Some(cfo.position_id)
    );
    assert_eq!(v.parents.len(), 2);
  }

  #[test]
  fn multiple_parents_in_one_department_each_get_a_placement() {
    let dev = position("Developer");
    let lead = position("Lead");
    let architect = position("Architect");
    let eng = department("Engineering");
    let snapshot = GraphSnapshot {
      assignments: vec![assign(&dev, &eng, 0)],
      links: vec![edge(&dev, &lead, &eng), edge(&dev, &architect, &eng)],
      positions: vec![dev.clone(), lead.clone(), architect.clone()],
      departments: vec![eng.clone()],
    };

    let views = denormalize(&snapshot);
    let names: Vec<_> = view(&views, &dev)
      .placements
      .iter()
      .map(|p| p.parent.as_ref().unwrap().position_name.clone())
      .collect();
    assert_eq!(names, ["Architect", "Lead"]);
  }

  #[test]
  fn dangling_edges_are_skipped() {
    let dev = position("Developer");
    let ghost = position("Deleted Lead");
    let eng = department("Engineering");
    let gone = department("Closed Office");
    let snapshot = GraphSnapshot {
      assignments: vec![assign(&dev, &eng, 0), assign(&dev, &gone, 1)],
      // `ghost` and `gone` are not part of the live snapshot.
      links: vec![edge(&dev, &ghost, &eng)],
      positions: vec![dev.clone()],
      departments: vec![eng.clone()],
    };

    let views = denormalize(&snapshot);
    let v = view(&views, &dev);
    assert!(!v.is_subordinate);
    assert!(v.parents.is_empty());
    assert_eq!(v.placements.len(), 1);
    assert_eq!(v.placements[0].key.parent_position_id, None);
  }

  #[test]
  fn views_follow_position_sort_order() {
    let mut b = position("B");
    b.sort_order = 1;
    let a = position("A");
    let mut c = position("C");
    c.sort_order = -1;
    let snapshot = GraphSnapshot {
      positions: vec![b, a, c],
      ..GraphSnapshot::default()
    };
    let names: Vec<_> = denormalize(&snapshot)
      .into_iter()
      .map(|v| v.position.name)
      .collect();
    assert_eq!(names, ["C", "A", "B"]);
  }
}
