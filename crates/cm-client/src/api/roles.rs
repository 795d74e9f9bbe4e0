//! Role directory endpoints.

use reqwest::Method;
use tracing::info;

use cm_common::{EntityId, Role};

use crate::client::Client;
use crate::dto::RoleUpsert;
use crate::error::{Error, Result};

const LIST: &str = "/api/Module/Roles";
const UPSERT: &str = "/api/Module/AddRoles";
const DELETE: &str = "/api/Module/DeleteRoles";

pub struct RolesApi<'a> {
    client: &'a Client,
}

impl<'a> RolesApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Role>> {
        let request = self.client.authed_request(Method::GET, LIST)?;
        self.client.execute_list(request).await
    }

    pub async fn get(&self, id: EntityId) -> Result<Role> {
        self.list()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("role {}", id)))
    }

    /// Create (`id == 0`) or update a role.
    pub async fn save(&self, role: &RoleUpsert) -> Result<()> {
        if role.name.trim().is_empty() {
            return Err(Error::InvalidInput("Role name is required".into()));
        }

        let request = self.client.authed_request(Method::POST, UPSERT)?.json(role);
        self.client.execute_unit(request, true).await?;
        info!(role_id = role.id, name = %role.name, "Role saved");
        Ok(())
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        let request = self
            .client
            .authed_request(Method::DELETE, DELETE)?
            .query(&[("id", id)]);
        self.client.execute_unit(request, true).await?;
        info!(role_id = id, "Role deleted");
        Ok(())
    }
}
