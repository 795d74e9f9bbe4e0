//! Endpoint groups, one per console section.

mod auth;
mod modules;
mod role_modules;
mod roles;
mod users;

pub use auth::AuthApi;
pub use modules::ModulesApi;
pub use role_modules::RoleModulesApi;
pub use roles::RolesApi;
pub use users::UsersApi;
