//! Request and response bodies exchanged with the backend.

use chrono::{SecondsFormat, Utc};
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

use cm_common::{EntityId, UserForm};

/// Audit identity and practice scope stamped on mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub name: String,
    pub practice_id: EntityId,
}

impl Actor {
    pub fn new(name: impl Into<String>, practice_id: EntityId) -> Self {
        Self {
            name: name.into(),
            practice_id,
        }
    }
}

impl Default for Actor {
    fn default() -> Self {
        Self::new("admin", 2)
    }
}

/// Timestamp in the backend's expected form, e.g. `2024-05-01T09:30:00.000Z`.
pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Lowercase hex MD5, the digest the reset endpoint expects.
pub fn password_digest(password: &str) -> String {
    hex::encode(Md5::digest(password.as_bytes()))
}

// ============================================================================
// Authentication
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
    pub app: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub email_address: String,
    pub current_password: String,
    pub new_password: String,
    pub reset_password: bool,
}

impl ResetPasswordRequest {
    /// Build a request with both passwords already digested.
    pub fn hashed(email: impl Into<String>, current_password: &str, new_password: &str) -> Self {
        Self {
            email_address: email.into(),
            current_password: password_digest(current_password),
            new_password: password_digest(new_password),
            reset_password: true,
        }
    }
}

// ============================================================================
// Users
// ============================================================================

/// Registration body: the form plus the backend's fixed defaults.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRegistration {
    #[serde(flatten)]
    pub form: UserForm,
    pub reset_password: bool,
    #[serde(rename = "provider_id")]
    pub provider_id: EntityId,
    pub psychastric_physician: bool,
    #[serde(rename = "defaultpracticeId")]
    pub default_practice_id: EntityId,
    pub default_facility_id: EntityId,
    pub is_super_user: bool,
    pub is_verified: bool,
    pub mobile_login: bool,
    pub status: String,
    pub practices: EntityId,
}

impl From<UserForm> for UserRegistration {
    fn from(form: UserForm) -> Self {
        Self {
            form,
            reset_password: false,
            provider_id: 0,
            psychastric_physician: false,
            default_practice_id: 0,
            default_facility_id: 0,
            is_super_user: false,
            is_verified: true,
            mobile_login: false,
            status: "active".to_string(),
            practices: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub is_active: bool,
}

// ============================================================================
// Roles and modules
// ============================================================================

/// Create (`id == 0`) or update a role.
#[derive(Debug, Clone, Serialize)]
pub struct RoleUpsert {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub inactive: bool,
}

impl RoleUpsert {
    pub fn create(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            description: description.into(),
            inactive: false,
        }
    }

    pub fn update(id: EntityId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            ..Self::create(name, description)
        }
    }
}

/// Fields an admin fills in for a module.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleDraft {
    pub name: String,
    pub value: String,
    pub parent_id: EntityId,
    pub nodesvalues: String,
    pub inactive: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewModule {
    pub id: EntityId,
    pub name: String,
    pub value: String,
    pub parent_id: EntityId,
    pub nodesvalues: String,
    pub inactive: bool,
    pub practice_id: EntityId,
    pub created_date: String,
    pub updated_date: String,
    pub created_by: String,
    pub updated_by: String,
}

impl NewModule {
    pub fn from_draft(draft: ModuleDraft, actor: &Actor) -> Self {
        let now = now_timestamp();
        Self {
            id: 0,
            name: draft.name,
            value: draft.value,
            parent_id: draft.parent_id,
            nodesvalues: draft.nodesvalues,
            inactive: draft.inactive,
            practice_id: actor.practice_id,
            created_date: now.clone(),
            updated_date: now,
            created_by: actor.name.clone(),
            updated_by: actor.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteModulesRequest {
    pub module_ids: Vec<EntityId>,
    pub practice_id: EntityId,
    pub deleted_by: String,
}

impl DeleteModulesRequest {
    pub fn new(module_ids: Vec<EntityId>, actor: &Actor) -> Self {
        Self {
            module_ids,
            practice_id: actor.practice_id,
            deleted_by: actor.name.clone(),
        }
    }
}

/// New join row granting `role_id` access to `module_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoleModule {
    pub id: EntityId,
    pub role_id: EntityId,
    pub module_id: EntityId,
    pub inactive: bool,
    pub practice_id: EntityId,
    pub created_by: String,
    pub updated_by: String,
}

impl NewRoleModule {
    pub fn new(role_id: EntityId, module_id: EntityId, practice_id: EntityId, actor: &Actor) -> Self {
        Self {
            id: 0,
            role_id,
            module_id,
            inactive: false,
            practice_id,
            created_by: actor.name.clone(),
            updated_by: actor.name.clone(),
        }
    }
}
