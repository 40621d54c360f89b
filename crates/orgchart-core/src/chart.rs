//! [`OrgChart`], the four operations the request layer calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  closure::{self, ClosureTarget},
  hierarchy::{self, GraphSnapshot, PositionView},
  link::{HierarchyLink, LinkUpdate, NewHierarchyLink},
  mutator,
  overrides::StaffingOverrides,
  stats::{self, Statistics, StatsQuery},
  store::OrgStore,
};

/// A write against the position hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LinkMutation {
  Create(NewHierarchyLink),
  Update { link_id: Uuid, update: LinkUpdate },
  Delete { link_id: Uuid },
}

/// Store plus override configuration. Holds no other state; every call reads
/// the store afresh.
pub struct OrgChart<S> {
  store:     Arc<S>,
  overrides: Arc<StaffingOverrides>,
}

impl<S> Clone for OrgChart<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      overrides: Arc::clone(&self.overrides),
    }
  }
}

impl<S: OrgStore> OrgChart<S> {
  pub fn new(store: Arc<S>, overrides: StaffingOverrides) -> Self {
    Self { store, overrides: Arc::new(overrides) }
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn overrides(&self) -> &StaffingOverrides { &self.overrides }

  /// Read every live row the denormaliser needs.
  pub async fn snapshot(&self) -> Result<GraphSnapshot> {
    let store = self.store.as_ref();
    Ok(GraphSnapshot {
      positions:   store.list_positions().await.map_err(Error::from_store)?,
      departments: store.list_departments().await.map_err(Error::from_store)?,
      assignments: store.list_assignments().await.map_err(Error::from_store)?,
      links:       store.list_links().await.map_err(Error::from_store)?,
    })
  }

  /// Every live position with its department placements and the parents
  /// that apply in each.
  pub async fn denormalize_positions(&self) -> Result<Vec<PositionView>> {
    let snapshot = self.snapshot().await?;
    Ok(hierarchy::denormalize(&snapshot))
  }

  /// Sorted department ids in the closure of `target`.
  pub async fn closure_of(&self, target: ClosureTarget) -> Result<Vec<Uuid>> {
    let set = closure::closure_of(self.store.as_ref(), target)
      .await
      .map_err(Error::from_store)?;
    Ok(set.into_iter().collect())
  }

  /// Never fails; see [`Statistics::message`].
  pub async fn compute_statistics(&self, query: StatsQuery) -> Statistics {
    stats::compute_statistics(self.store.as_ref(), &self.overrides, query).await
  }

  pub async fn get_link(&self, link_id: Uuid) -> Result<HierarchyLink> {
    self
      .store
      .get_link(link_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::LinkNotFound(link_id))
  }

  pub async fn create_link(&self, input: NewHierarchyLink) -> Result<HierarchyLink> {
    mutator::create_link(self.store.as_ref(), input).await
  }

  pub async fn update_link(
    &self,
    link_id: Uuid,
    update: LinkUpdate,
  ) -> Result<HierarchyLink> {
    mutator::update_link(self.store.as_ref(), link_id, update).await
  }

  pub async fn delete_link(&self, link_id: Uuid) -> Result<()> {
    mutator::delete_link(self.store.as_ref(), link_id).await
  }

  /// Dispatch a [`LinkMutation`]. Returns the resulting edge, or `None` for
  /// a delete.
  pub async fn mutate_link(&self, mutation: LinkMutation) -> Result<Option<HierarchyLink>> {
    match mutation {
      LinkMutation::Create(input) => self.create_link(input).await.map(Some),
      LinkMutation::Update { link_id, update } => {
        self.update_link(link_id, update).await.map(Some)
      }
      LinkMutation::Delete { link_id } => self.delete_link(link_id).await.map(|()| None),
    }
  }

  pub async fn refresh_assignment_counts(&self) -> Result<u64> {
    self
      .store
      .refresh_assignment_counts()
      .await
      .map_err(Error::from_store)
  }
}
