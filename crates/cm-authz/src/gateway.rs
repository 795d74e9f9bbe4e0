//! Backend seams used by the batch operations.

use async_trait::async_trait;

use cm_client::dto::{DeleteModulesRequest, NewRoleModule};
use cm_client::{Client, Result};
use cm_common::{EntityId, RoleModule};

/// Grant storage for roles.
#[async_trait]
pub trait RoleModuleGateway: Send + Sync {
    async fn grants(&self, role_id: EntityId) -> Result<Vec<RoleModule>>;

    async fn grant(&self, grant: &NewRoleModule) -> Result<()>;

    /// Remove one grant by its join-row id.
    async fn revoke(&self, join_id: EntityId) -> Result<()>;
}

/// Module deletion, bulk and per-module.
#[async_trait]
pub trait ModuleGateway: Send + Sync {
    async fn delete_many(&self, request: &DeleteModulesRequest) -> Result<()>;

    async fn delete_one(&self, module_id: EntityId) -> Result<()>;
}

#[async_trait]
impl RoleModuleGateway for Client {
    async fn grants(&self, role_id: EntityId) -> Result<Vec<RoleModule>> {
        self.role_modules().list(role_id).await
    }

    async fn grant(&self, grant: &NewRoleModule) -> Result<()> {
        self.role_modules().add(grant).await
    }

    async fn revoke(&self, join_id: EntityId) -> Result<()> {
        self.role_modules().delete(join_id).await
    }
}

#[async_trait]
impl ModuleGateway for Client {
    async fn delete_many(&self, request: &DeleteModulesRequest) -> Result<()> {
        self.modules().delete_many(request).await
    }

    async fn delete_one(&self, module_id: EntityId) -> Result<()> {
        self.modules().delete_one(module_id).await
    }
}
