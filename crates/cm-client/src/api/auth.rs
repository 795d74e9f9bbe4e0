//! Login, password recovery and sign-out.

use reqwest::Method;
use tracing::info;

use crate::client::Client;
use crate::dto::{ForgotPasswordRequest, LoginRequest, LoginResponse, ResetPasswordRequest};
use crate::error::{Error, Result};
use crate::session::Session;

const LOGIN: &str = "/api/Users/login";
const FORGOT_PASSWORD: &str = "/api/Users/forgot-password";
const RESET_PASSWORD: &str = "/api/Users/resetPassword";

pub struct AuthApi<'a> {
    client: &'a Client,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Exchange credentials for a bearer token and store it.
    pub async fn login(&self, user_name: &str, password: &str) -> Result<Session> {
        if user_name.trim().is_empty() || password.is_empty() {
            return Err(Error::InvalidInput("Username and password are required".into()));
        }

        let body = LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
            app: true,
        };
        let request = self.client.public_request(Method::POST, LOGIN).json(&body);
        let response: LoginResponse = self.client.execute_json(request, false).await?;

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingToken)?;

        let session = Session::new(token, Some(user_name.to_string()));
        self.client.session_store().save(&session)?;
        info!(user = user_name, "Signed in");
        Ok(session)
    }

    /// Ask the backend to email a reset link.
    pub async fn forgot_password(&self, email: &str) -> Result<()> {
        if email.trim().is_empty() {
            return Err(Error::InvalidInput("Email is required".into()));
        }

        let body = ForgotPasswordRequest {
            email: email.trim().to_string(),
        };
        let request = self.client.public_request(Method::POST, FORGOT_PASSWORD).json(&body);
        self.client.execute_unit(request, false).await
    }

    /// Change a password. Both passwords leave the client as MD5 digests.
    pub async fn reset_password(&self, email: &str, current_password: &str, new_password: &str) -> Result<()> {
        if email.trim().is_empty() || current_password.is_empty() || new_password.is_empty() {
            return Err(Error::InvalidInput(
                "Email, current password and new password are required".into(),
            ));
        }

        let body = ResetPasswordRequest::hashed(email.trim(), current_password, new_password);
        let request = self.client.public_request(Method::POST, RESET_PASSWORD).json(&body);
        self.client.execute_unit(request, false).await
    }

    pub fn current_session(&self) -> Result<Option<Session>> {
        self.client.session_store().load()
    }

    pub fn sign_out(&self) -> Result<()> {
        self.client.session_store().clear()?;
        info!("Signed out");
        Ok(())
    }
}
