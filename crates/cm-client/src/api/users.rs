//! User directory endpoints.

use reqwest::Method;
use tracing::info;

use cm_common::{EntityId, User, UserForm};

use crate::client::Client;
use crate::dto::{StatusUpdate, UserRegistration};
use crate::error::{Error, Result};

const LIST: &str = "/api/Users/GetUsers";
const REGISTER: &str = "/api/Users/userRegistration";

pub struct UsersApi<'a> {
    client: &'a Client,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let request = self.client.authed_request(Method::GET, LIST)?;
        self.client.execute_json(request, true).await
    }

    pub async fn get(&self, id: EntityId) -> Result<User> {
        self.list()
            .await?
            .into_iter()
            .find(|u| u.id == id)
            .ok_or_else(|| Error::NotFound(format!("user {}", id)))
    }

    /// Validate locally, then register. Field errors are joined into one
    /// `InvalidInput` message, one `field: message` per line.
    pub async fn register(&self, form: UserForm) -> Result<()> {
        if let Err(errors) = form.validate() {
            let message = errors
                .iter()
                .map(|(field, msg)| format!("{}: {}", field, msg))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(Error::InvalidInput(message));
        }

        let user_name = form.user_name.clone();
        let body = UserRegistration::from(form);
        let request = self.client.authed_request(Method::POST, REGISTER)?.json(&body);
        self.client.execute_unit(request, true).await?;
        info!(user = %user_name, "User registered");
        Ok(())
    }

    /// Flip a user's active flag; returns the new value.
    pub async fn toggle_status(&self, id: EntityId, currently_active: bool) -> Result<bool> {
        let body = StatusUpdate {
            is_active: !currently_active,
        };
        let path = format!("/api/Users/{}/status", id);
        let request = self.client.authed_request(Method::PUT, &path)?.json(&body);
        self.client.execute_unit(request, true).await?;
        info!(user_id = id, active = body.is_active, "User status updated");
        Ok(body.is_active)
    }

    pub async fn delete(&self, id: EntityId) -> Result<()> {
        let path = format!("/api/Users/{}", id);
        let request = self.client.authed_request(Method::DELETE, &path)?;
        self.client.execute_unit(request, true).await?;
        info!(user_id = id, "User deleted");
        Ok(())
    }
}
