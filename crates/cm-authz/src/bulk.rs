//! Multi-select module deletion.
//!
//! Deletes go out as one bulk request. Backends that predate the bulk
//! endpoint reject it with an HTTP error, in which case each module is
//! deleted through the legacy per-id endpoint instead.

use tracing::{info, warn};

use cm_client::dto::DeleteModulesRequest;
use cm_client::{Actor, Error, Result};
use cm_common::EntityId;

use crate::batch::BatchReport;
use crate::gateway::ModuleGateway;
use crate::tree::ModuleForest;

pub const EMPTY_SELECTION: &str = "Please select at least one module to delete";

/// Modules picked for deletion, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkSelection {
    selected: Vec<EntityId>,
}

impl BulkSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Duplicates keep their first position.
    pub fn from_ids(ids: impl IntoIterator<Item = EntityId>) -> Self {
        let mut selected = Vec::new();
        for id in ids {
            if !selected.contains(&id) {
                selected.push(id);
            }
        }
        Self { selected }
    }

    pub fn toggle(mut self, id: EntityId) -> Self {
        match self.selected.iter().position(|&s| s == id) {
            Some(index) => {
                self.selected.remove(index);
            }
            None => self.selected.push(id),
        }
        self
    }

    pub fn select_all(self, forest: &ModuleForest) -> Self {
        Self::from_ids(forest.flatten_ids())
    }

    pub fn clear(self) -> Self {
        Self::new()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.selected.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStrategy {
    Bulk,
    /// Bulk request rejected; one legacy delete per module
    PerModule,
}

#[derive(Debug, Clone)]
pub struct BulkDeleteReport {
    pub strategy: DeleteStrategy,
    pub batch: BatchReport<EntityId>,
}

/// Delete every selected module.
///
/// Transport errors and session expiry fail the call without a fallback.
pub async fn delete_modules<G>(gateway: &G, selection: &BulkSelection, actor: &Actor) -> Result<BulkDeleteReport>
where
    G: ModuleGateway + ?Sized,
{
    if selection.is_empty() {
        return Err(Error::InvalidInput(EMPTY_SELECTION.into()));
    }

    let ids = selection.ids();
    let request = DeleteModulesRequest::new(ids.clone(), actor);

    match gateway.delete_many(&request).await {
        Ok(()) => {
            info!(count = ids.len(), "Modules deleted");
            let mut batch = BatchReport::new();
            for id in ids {
                batch.succeeded(id);
            }
            Ok(BulkDeleteReport {
                strategy: DeleteStrategy::Bulk,
                batch,
            })
        }
        Err(e) if e.is_rejection() => {
            warn!(
                status = ?e.status(),
                error = %e,
                "Bulk delete rejected, deleting modules one by one"
            );
            let batch = delete_each(gateway, ids).await?;
            Ok(BulkDeleteReport {
                strategy: DeleteStrategy::PerModule,
                batch,
            })
        }
        Err(e) => Err(e),
    }
}

async fn delete_each<G>(gateway: &G, ids: Vec<EntityId>) -> Result<BatchReport<EntityId>>
where
    G: ModuleGateway + ?Sized,
{
    let mut batch = BatchReport::new();
    for id in ids {
        match gateway.delete_one(id).await {
            Ok(()) => batch.succeeded(id),
            Err(Error::SessionExpired) => return Err(Error::SessionExpired),
            Err(e) => {
                warn!(module_id = id, error = %e, "Module delete failed, continuing");
                batch.failed(id, e.to_string());
            }
        }
    }
    info!(result = %batch, "Per-module delete finished");
    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_common::ModuleNode;

    #[test]
    fn test_selection_toggle_and_clear() {
        let selection = BulkSelection::new().toggle(3).toggle(5).toggle(3);
        assert_eq!(selection.ids(), vec![5]);
        assert!(selection.clone().clear().is_empty());
    }

    #[test]
    fn test_selection_keeps_pick_order_without_duplicates() {
        let selection = BulkSelection::from_ids([9, 2, 9, 4]).toggle(1);
        assert_eq!(selection.ids(), vec![9, 2, 4, 1]);
    }

    #[test]
    fn test_select_all_keeps_parents_before_children() {
        let forest = ModuleForest::new(vec![ModuleNode::new(10, "Root", 0)
            .with_children(vec![ModuleNode::new(3, "Child", 10)])]);

        let selection = BulkSelection::new().select_all(&forest);
        assert_eq!(selection.ids(), vec![10, 3]);
    }

    #[test]
    fn test_select_all_covers_every_depth() {
        let forest = ModuleForest::new(vec![ModuleNode::new(1, "Root", 0).with_children(vec![
            ModuleNode::new(2, "A", 1).with_children(vec![ModuleNode::new(4, "A1", 2)]),
            ModuleNode::new(3, "B", 1),
        ])]);

        let selection = BulkSelection::new().select_all(&forest);
        assert_eq!(selection.len(), 4);
        assert!([1, 2, 3, 4].iter().all(|&id| selection.contains(id)));
    }
}
