//! Backend Entities
//!
//! Transient copies of what the backend owns. Field names follow the
//! backend's camelCase JSON; nullable columns are tolerated everywhere.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{EntityId, ROOT_PARENT_ID};

/// Deserialize `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Render a backend timestamp as e.g. `Jan 5, 2024`, or `N/A`.
///
/// Accepts RFC 3339, zone-less ISO date-times and plain dates; anything
/// else is returned verbatim.
pub fn format_date(value: Option<&str>) -> String {
    let Some(raw) = value.map(str::trim).filter(|s| !s.is_empty()) else {
        return "N/A".to_string();
    };

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(d) => d.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

// ============================================================================
// Roles
// ============================================================================

/// A named bundle of module permissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_id: Option<EntityId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,
}

impl Role {
    /// Practice scope used for new RoleModule rows (0 when unset).
    pub fn practice_scope(&self) -> EntityId {
        self.practice_id.unwrap_or(0)
    }
}

// ============================================================================
// Modules
// ============================================================================

/// A node in the module (permission) hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleNode {
    pub id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Navigation path of the module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodesvalues: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub parent_id: EntityId,
    #[serde(default)]
    pub children: Option<Vec<ModuleNode>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inactive: bool,
    /// Backend columns not modelled here, kept so an edited node can be
    /// posted back whole.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModuleNode {
    pub fn new(id: EntityId, name: impl Into<String>, parent_id: EntityId) -> Self {
        Self {
            id,
            name: name.into(),
            value: None,
            nodesvalues: None,
            parent_id,
            children: None,
            inactive: false,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<ModuleNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Children, treating `null` and `[]` alike.
    pub fn child_nodes(&self) -> &[ModuleNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn has_children(&self) -> bool {
        !self.child_nodes().is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_PARENT_ID
    }
}

/// Join row granting a role access to one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleModule {
    /// Join-row id; deletes are keyed by this, not by the module id
    pub id: EntityId,
    pub role_id: EntityId,
    pub module_id: EntityId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inactive: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub practice_id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

// ============================================================================
// Users
// ============================================================================

/// A console user as returned by `GetUsers`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: EntityId,
    pub full_name: Option<String>,
    pub user_name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub user_type: Option<String>,
    pub street: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub contact_no: Option<String>,
    pub last_login: Option<String>,
    pub date_joined: Option<String>,
    pub created_date: Option<String>,
    pub updated_date: Option<String>,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub role_id: EntityId,
    #[serde(rename = "provider_id", deserialize_with = "null_as_default")]
    pub provider_id: EntityId,
    #[serde(rename = "defaultpracticeId", deserialize_with = "null_as_default")]
    pub default_practice_id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub default_facility_id: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub practices: EntityId,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_verified: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_staff: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_super_user: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub reset_password: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub mobile_login: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub psychastric_physician: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_tree_from_backend_json() {
        let raw = json!([{
            "id": 1,
            "name": "Scheduling",
            "value": "/scheduling",
            "parentId": 0,
            "practiceId": 2,
            "children": [
                { "id": 2, "name": "Calendar", "parentId": 1, "children": null },
                { "id": 3, "name": "Rooms", "parentId": 1, "children": [] }
            ]
        }]);

        let nodes: Vec<ModuleNode> = serde_json::from_value(raw).unwrap();
        assert_eq!(nodes.len(), 1);
        assert!(nodes[0].is_root());
        assert!(nodes[0].has_children());
        assert!(!nodes[0].child_nodes()[0].has_children());
        assert!(!nodes[0].child_nodes()[1].has_children());
        assert_eq!(nodes[0].extra.get("practiceId"), Some(&json!(2)));
    }

    #[test]
    fn test_edited_module_keeps_unknown_columns() {
        let raw = json!({ "id": 9, "name": "Billing", "parentId": 0, "createdBy": "seed" });
        let node: ModuleNode = serde_json::from_value(raw).unwrap();
        let back = serde_json::to_value(&node).unwrap();
        assert_eq!(back["createdBy"], json!("seed"));
        assert_eq!(back["parentId"], json!(0));
    }

    #[test]
    fn test_user_tolerates_nulls() {
        let raw = json!({
            "id": 7,
            "fullName": "Ada Park",
            "email": null,
            "isActive": null,
            "isVerified": true,
            "roleId": 4,
            "provider_id": 0,
            "defaultpracticeId": 3,
            "token": "should-be-ignored"
        });
        let user: User = serde_json::from_value(raw).unwrap();
        assert_eq!(user.full_name.as_deref(), Some("Ada Park"));
        assert!(user.email.is_none());
        assert!(!user.is_active);
        assert!(user.is_verified);
        assert_eq!(user.default_practice_id, 3);
    }

    #[test]
    fn test_role_module_wire_names() {
        let raw = json!({
            "id": 11, "roleId": 3, "moduleId": 5, "inactive": false,
            "practiceId": null, "createdBy": "admin", "updatedBy": "admin"
        });
        let rm: RoleModule = serde_json::from_value(raw).unwrap();
        assert_eq!((rm.id, rm.role_id, rm.module_id, rm.practice_id), (11, 3, 5, 0));
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(None), "N/A");
        assert_eq!(format_date(Some("")), "N/A");
        assert_eq!(format_date(Some("2024-01-05T10:00:00Z")), "Jan 5, 2024");
        assert_eq!(format_date(Some("2023-11-20T08:15:30.123")), "Nov 20, 2023");
        assert_eq!(format_date(Some("2022-03-09")), "Mar 9, 2022");
        assert_eq!(format_date(Some("yesterday")), "yesterday");
    }
}
