//! Module hierarchy endpoints.

use reqwest::Method;
use tracing::info;

use cm_common::{EntityId, ModuleNode};

use crate::client::Client;
use crate::dto::{now_timestamp, Actor, DeleteModulesRequest, ModuleDraft, NewModule};
use crate::error::{Error, Result};

const LIST: &str = "/api/Module/getModulesList";
const ADD: &str = "/api/Module/AddModules";
const BULK_DELETE: &str = "/api/Module/DeleteModules";
const LEGACY_DELETE: &str = "/api/Module/DeleteModule";

pub struct ModulesApi<'a> {
    client: &'a Client,
}

impl<'a> ModulesApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// The module list as the backend returns it: nested roots on newer
    /// backends, a flat parent-pointer list on older ones.
    pub async fn list(&self) -> Result<Vec<ModuleNode>> {
        let request = self.client.authed_request(Method::GET, LIST)?;
        self.client.execute_list(request).await
    }

    /// Create a module. The endpoint takes an array of new modules.
    pub async fn create(&self, draft: ModuleDraft, actor: &Actor) -> Result<()> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidInput("Module name is required".into()));
        }

        let body = [NewModule::from_draft(draft, actor)];
        let request = self.client.authed_request(Method::POST, ADD)?.json(&body);
        self.client.execute_unit(request, true).await?;
        info!(name = %body[0].name, parent_id = body[0].parent_id, "Module created");
        Ok(())
    }

    /// Post an edited module back whole, as a single object.
    pub async fn update(&self, existing: &ModuleNode, draft: ModuleDraft) -> Result<()> {
        if draft.name.trim().is_empty() {
            return Err(Error::InvalidInput("Module name is required".into()));
        }

        let mut edited = existing.clone();
        edited.name = draft.name;
        edited.value = Some(draft.value);
        edited.parent_id = draft.parent_id;
        edited.nodesvalues = Some(serde_json::Value::String(draft.nodesvalues));
        edited
            .extra
            .insert("updatedDate".to_string(), serde_json::Value::String(now_timestamp()));

        let request = self.client.authed_request(Method::POST, ADD)?.json(&edited);
        self.client.execute_unit(request, true).await?;
        info!(module_id = edited.id, "Module updated");
        Ok(())
    }

    /// One request deleting every listed module.
    pub async fn delete_many(&self, request_body: &DeleteModulesRequest) -> Result<()> {
        let request = self
            .client
            .authed_request(Method::POST, BULK_DELETE)?
            .json(request_body);
        self.client.execute_unit(request, true).await
    }

    /// Per-module delete on the legacy endpoint.
    pub async fn delete_one(&self, id: EntityId) -> Result<()> {
        let request = self
            .client
            .authed_request(Method::DELETE, LEGACY_DELETE)?
            .query(&[("id", id)]);
        self.client.execute_unit(request, true).await
    }
}
