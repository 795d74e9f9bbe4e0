//! Authorization tooling for the admin console
//!
//! - [`tree`]: module forest, expand/check state and row rendering
//! - [`reconcile`]: diff a role's persisted grants against a checkbox
//!   selection and apply the difference
//! - [`bulk`]: multi-select module deletion with a per-module fallback
//!
//! Network work goes through the [`gateway`] traits so the batch logic can
//! run against a fake backend.

pub mod batch;
pub mod bulk;
pub mod gateway;
pub mod reconcile;
pub mod tree;

pub use batch::{BatchReport, ItemOutcome, Outcome};
pub use bulk::{delete_modules, BulkDeleteReport, BulkSelection, DeleteStrategy};
pub use gateway::{ModuleGateway, RoleModuleGateway};
pub use reconcile::{apply_plan, save_rights, Mutation, ReconcilePlan, RightsSaveReport};
pub use tree::{render_rows, ModuleForest, NodeKind, Selection, TreeRow, TreeState};
