//! Clinic Admin Common Types
//!
//! Domain model shared by the REST client, the authorization tooling and
//! the `cm-admin` binary, plus the logging bootstrap every binary uses.

pub mod logging;
pub mod model;
pub mod user;

pub use model::{ModuleNode, Role, RoleModule, User};
pub use user::{FieldErrors, UserForm, UserStatus};

/// Identifier type used by every backend entity.
pub type EntityId = i64;

/// Module `parentId` value marking a root of the module forest.
pub const ROOT_PARENT_ID: EntityId = 0;
