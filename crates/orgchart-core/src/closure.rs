//! Department closure: a department plus every department beneath it.

use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::OrgStore;

/// The node a closure is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ClosureTarget {
  Department(Uuid),
  /// Union of the closures of every department the position is assigned to.
  Position(Uuid),
}

/// Return `root` together with all of its transitive child departments.
///
/// `root` is always included, even if it no longer resolves. The visited set
/// keeps a corrupted (cyclic) parent chain from looping forever.
pub async fn department_closure<S: OrgStore>(
  store: &S,
  root: Uuid,
) -> Result<BTreeSet<Uuid>, S::Error> {
  let mut visited = BTreeSet::new();
  let mut queue = VecDeque::from([root]);

  while let Some(current) = queue.pop_front() {
    if !visited.insert(current) {
      tracing::debug!(department = %current, "department revisited during closure; skipping");
      continue;
    }
    for child in store.child_department_ids(current).await? {
      if !visited.contains(&child) {
        queue.push_back(child);
      }
    }
  }

  Ok(visited)
}

/// Resolve the department set for either kind of [`ClosureTarget`].
pub async fn closure_of<S: OrgStore>(
  store: &S,
  target: ClosureTarget,
) -> Result<BTreeSet<Uuid>, S::Error> {
  match target {
    ClosureTarget::Department(id) => department_closure(store, id).await,
    ClosureTarget::Position(id) => {
      let mut all = BTreeSet::new();
      for department in store.assignment_department_ids(id).await? {
        // Already expanded as part of an earlier placement's sub-tree.
        if all.contains(&department) {
          continue;
        }
        all.extend(department_closure(store, department).await?);
      }
      Ok(all)
    }
  }
}
