//! Validated writes to the position hierarchy.
//!
//! Every create or update is checked, in order, for: both positions
//! resolving, no self-parent, the department resolving, no duplicate edge and
//! no cycle among the edges of that department. Nothing is written unless all
//! checks pass.

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::{
  Error, Result,
  link::{HierarchyLink, LinkUpdate, NewHierarchyLink},
  store::OrgStore,
};

/// Create a department-scoped edge `child -> parent`.
pub async fn create_link<S: OrgStore>(
  store: &S,
  input: NewHierarchyLink,
) -> Result<HierarchyLink> {
  validate(
    store,
    input.child_position_id,
    input.parent_position_id,
    input.department_id,
    None,
  )
  .await
  .inspect_err(|e| tracing::warn!(error = %e, "rejected hierarchy link"))?;

  let link = store.insert_link(input).await.map_err(Error::from_store)?;
  tracing::debug!(link = %link.link_id, "hierarchy link created");
  Ok(link)
}

/// Apply `update` to an existing edge after re-validating the result.
pub async fn update_link<S: OrgStore>(
  store: &S,
  link_id: Uuid,
  update: LinkUpdate,
) -> Result<HierarchyLink> {
  let current = store
    .get_link(link_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(Error::LinkNotFound(link_id))?;
  let next = update.apply(&current);

  validate(
    store,
    next.child_position_id,
    next.parent_position_id,
    next.department_id,
    Some(link_id),
  )
  .await
  .inspect_err(|e| {
    tracing::warn!(error = %e, link = %link_id, "rejected hierarchy link update")
  })?;

  store.update_link(next).await.map_err(Error::from_store)
}

/// Hard-delete an edge.
pub async fn delete_link<S: OrgStore>(store: &S, link_id: Uuid) -> Result<()> {
  store
    .get_link(link_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(Error::LinkNotFound(link_id))?;
  if !store.delete_link(link_id).await.map_err(Error::from_store)? {
    // Removed concurrently between the lookup and the delete.
    return Err(Error::LinkNotFound(link_id));
  }
  tracing::debug!(link = %link_id, "hierarchy link deleted");
  Ok(())
}

async fn validate<S: OrgStore>(
  store: &S,
  child: Uuid,
  parent: Uuid,
  department: Uuid,
  replacing: Option<Uuid>,
) -> Result<()> {
  if child.is_nil() || parent.is_nil() {
    return Err(Error::InvalidArgument(
      "child and parent position ids are required".into(),
    ));
  }
  for id in [child, parent] {
    store
      .get_position(id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::PositionNotFound(id))?;
  }
  if child == parent {
    return Err(Error::SelfParent);
  }
  store
    .get_department(department)
    .await
    .map_err(Error::from_store)?
    .ok_or(Error::DepartmentNotFound(department))?;

  let siblings: Vec<HierarchyLink> = store
    .list_links_in_department(department)
    .await
    .map_err(Error::from_store)?
    .into_iter()
    .filter(|l| Some(l.link_id) != replacing)
    .collect();

  if siblings
    .iter()
    .any(|l| l.child_position_id == child && l.parent_position_id == parent)
  {
    return Err(Error::DuplicateLink { child, parent, department });
  }
  if reaches(&siblings, parent, child) {
    return Err(Error::HierarchyCycle { child, parent, department });
  }
  Ok(())
}

/// Whether `target` is `from` or one of its ancestors via `links`.
fn reaches(links: &[HierarchyLink], from: Uuid, target: Uuid) -> bool {
  let mut parents_of: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
  for l in links {
    parents_of
      .entry(l.child_position_id)
      .or_default()
      .push(l.parent_position_id);
  }

  let mut visited = HashSet::new();
  let mut queue = VecDeque::from([from]);
  while let Some(current) = queue.pop_front() {
    if current == target {
      return true;
    }
    if !visited.insert(current) {
      continue;
    }
    queue.extend(parents_of.get(&current).into_iter().flatten().copied());
  }
  false
}

#[cfg(test)]
mod tests {
  use super::*;

  fn link(child: Uuid, parent: Uuid) -> HierarchyLink {
    HierarchyLink {
      link_id:            Uuid::new_v4(),
      child_position_id:  child,
      parent_position_id: parent,
      department_id:      Uuid::nil(),
      sort_order:         0,
    }
  }

  #[test]
  fn reaches_follows_ancestor_chain() {
    let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    // c -> b -> a
    let links = [link(c, b), link(b, a)];
    assert!(reaches(&links, c, a));
    assert!(!reaches(&links, a, c));
  }

  #[test]
  fn reaches_terminates_on_existing_cycle() {
    let (a, b, z) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    let links = [link(a, b), link(b, a)];
    assert!(!reaches(&links, a, z));
  }
}
