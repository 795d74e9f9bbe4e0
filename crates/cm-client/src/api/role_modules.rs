//! Role-to-module grants.

use reqwest::Method;

use cm_common::{EntityId, RoleModule};

use crate::client::Client;
use crate::dto::NewRoleModule;
use crate::error::Result;

const LIST: &str = "/api/Module/getRolesModules";
const ADD: &str = "/api/Module/AddRolesModules";
const DELETE: &str = "/api/Module/DeleteRolesModules";
const FOR_USER: &str = "/api/Module/getUserRolesModules";

pub struct RoleModulesApi<'a> {
    client: &'a Client,
}

impl<'a> RoleModulesApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self, role_id: EntityId) -> Result<Vec<RoleModule>> {
        let request = self
            .client
            .authed_request(Method::GET, LIST)?
            .query(&[("id", role_id)]);
        self.client.execute_list(request).await
    }

    pub async fn add(&self, grant: &NewRoleModule) -> Result<()> {
        let request = self.client.authed_request(Method::POST, ADD)?.json(grant);
        self.client.execute_unit(request, true).await
    }

    /// Delete by join-row id, not module id.
    pub async fn delete(&self, join_id: EntityId) -> Result<()> {
        let request = self
            .client
            .authed_request(Method::DELETE, DELETE)?
            .query(&[("id", join_id)]);
        self.client.execute_unit(request, true).await
    }

    /// Every grant reachable by a user through their roles. The backend
    /// shape varies, so rows are returned untyped.
    pub async fn for_user(&self, email: &str) -> Result<Vec<serde_json::Value>> {
        let request = self
            .client
            .authed_request(Method::GET, FOR_USER)?
            .query(&[("email", email)]);
        self.client.execute_list(request).await
    }
}
