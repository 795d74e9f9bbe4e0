//! Error types for the clinic admin client
//!
//! Every failure maps to a fixed, user-facing message for the action that
//! triggered it; see [`Error::user_message`].

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

pub const MSG_NETWORK: &str = "Network error. Please check your connection.";
pub const MSG_TIMEOUT: &str = "Request timeout. Please try again.";
pub const MSG_SERVER: &str = "Server error. Please try again later.";
pub const MSG_UNEXPECTED: &str = "An unexpected error occurred. Please try again.";
pub const MSG_SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";
pub const MSG_NOT_SIGNED_IN: &str = "You are not signed in. Please log in first.";

/// The user-triggered action an error surfaced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    ForgotPassword,
    ResetPassword,
    /// Any authenticated admin action, carrying its fixed failure banner
    Admin(&'static str),
}

#[derive(Error, Debug)]
pub enum Error {
    /// Backend unreachable
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// 400
    #[error("Bad request: {0}")]
    Validation(String),

    /// 401 from an endpoint that does not take a session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 401 from an authenticated endpoint; the stored session was cleared
    #[error("Session expired")]
    SessionExpired,

    /// 403
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// 404
    #[error("Not found: {0}")]
    NotFound(String),

    /// 5xx
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Session storage error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected locally before any request was made
    #[error("{0}")]
    InvalidInput(String),

    #[error("Login succeeded but no session token was returned")]
    MissingToken,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout
        } else if err.is_connect() {
            Error::Network(err.to_string())
        } else if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Http(err)
        }
    }
}

impl Error {
    /// Create an error from an HTTP status code and response body.
    ///
    /// A JSON body of the form `{"message": ".."}` supplies the message.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = extract_message(body);
        match status.as_u16() {
            400 => Error::Validation(message),
            401 => Error::Unauthorized(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            code @ 500..=599 => Error::Server { status: code, message },
            code => Error::Status { status: code, message },
        }
    }

    /// HTTP status the backend answered with, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Validation(_) => Some(400),
            Error::Unauthorized(_) | Error::SessionExpired => Some(401),
            Error::Forbidden(_) => Some(403),
            Error::NotFound(_) => Some(404),
            Error::Server { status, .. } | Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend received the request and refused it.
    ///
    /// Session expiry is excluded: it ends the whole action.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Error::Validation(_)
                | Error::Unauthorized(_)
                | Error::Forbidden(_)
                | Error::NotFound(_)
                | Error::Server { .. }
                | Error::Status { .. }
        )
    }

    /// Message the backend attached to a rejection, if it sent one.
    pub fn backend_message(&self) -> Option<&str> {
        let msg = match self {
            Error::Validation(m)
            | Error::Unauthorized(m)
            | Error::Forbidden(m)
            | Error::NotFound(m)
            | Error::Server { message: m, .. }
            | Error::Status { message: m, .. } => m.as_str(),
            _ => return None,
        };
        (!msg.is_empty()).then_some(msg)
    }

    /// The fixed message shown to the admin for this failure.
    pub fn user_message(&self, action: Action) -> String {
        match self {
            Error::Network(_) => return MSG_NETWORK.into(),
            Error::Timeout => return MSG_TIMEOUT.into(),
            Error::InvalidInput(msg) => return msg.clone(),
            _ => {}
        }

        match action {
            Action::Login => match self {
                Error::Unauthorized(_) => "Invalid username or password".into(),
                Error::Server { .. } => MSG_SERVER.into(),
                Error::MissingToken => {
                    "Login successful, but a session token was not provided.".into()
                }
                e if e.is_rejection() => e
                    .backend_message()
                    .unwrap_or("Login failed. Please check your credentials.")
                    .into(),
                _ => MSG_UNEXPECTED.into(),
            },
            Action::ForgotPassword => match self {
                Error::NotFound(_) => "Email not found. Please check your email address.".into(),
                Error::Validation(_) => "Invalid email format.".into(),
                Error::Server { .. } => MSG_SERVER.into(),
                e if e.is_rejection() => e
                    .backend_message()
                    .unwrap_or("Failed to request password reset.")
                    .into(),
                _ => MSG_UNEXPECTED.into(),
            },
            Action::ResetPassword => match self {
                Error::Validation(_) => "Invalid current password or email address".into(),
                Error::NotFound(_) => "User not found".into(),
                Error::Unauthorized(_) => "Current password is incorrect".into(),
                Error::Server { .. } => MSG_SERVER.into(),
                e if e.is_rejection() => e
                    .backend_message()
                    .unwrap_or("Password reset failed. Please check your information.")
                    .into(),
                _ => MSG_UNEXPECTED.into(),
            },
            Action::Admin(banner) => match self {
                Error::SessionExpired => MSG_SESSION_EXPIRED.into(),
                Error::NotSignedIn => MSG_NOT_SIGNED_IN.into(),
                _ => banner.into(),
            },
        }
    }
}

fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_taxonomy() {
        assert!(matches!(Error::from_status(StatusCode::BAD_REQUEST, ""), Error::Validation(_)));
        assert!(matches!(Error::from_status(StatusCode::UNAUTHORIZED, ""), Error::Unauthorized(_)));
        assert!(matches!(Error::from_status(StatusCode::NOT_FOUND, ""), Error::NotFound(_)));
        assert!(matches!(
            Error::from_status(StatusCode::BAD_GATEWAY, ""),
            Error::Server { status: 502, .. }
        ));
        assert!(matches!(
            Error::from_status(StatusCode::CONFLICT, ""),
            Error::Status { status: 409, .. }
        ));
    }

    #[test]
    fn test_backend_message_extraction() {
        let err = Error::from_status(StatusCode::CONFLICT, r#"{"message":"User already exists"}"#);
        assert_eq!(err.backend_message(), Some("User already exists"));

        let err = Error::from_status(StatusCode::CONFLICT, "  plain text  ");
        assert_eq!(err.backend_message(), Some("plain text"));

        let err = Error::from_status(StatusCode::CONFLICT, "");
        assert_eq!(err.backend_message(), None);
    }

    #[test]
    fn test_login_messages() {
        let unauthorized = Error::from_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(unauthorized.user_message(Action::Login), "Invalid username or password");

        let server = Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(server.user_message(Action::Login), MSG_SERVER);

        let locked = Error::from_status(StatusCode::LOCKED, r#"{"message":"Account locked"}"#);
        assert_eq!(locked.user_message(Action::Login), "Account locked");

        let bare = Error::from_status(StatusCode::FORBIDDEN, "");
        assert_eq!(
            bare.user_message(Action::Login),
            "Login failed. Please check your credentials."
        );

        assert_eq!(Error::Timeout.user_message(Action::Login), MSG_TIMEOUT);
        assert_eq!(Error::Network("refused".into()).user_message(Action::Login), MSG_NETWORK);
    }

    #[test]
    fn test_forgot_and_reset_messages() {
        let not_found = Error::from_status(StatusCode::NOT_FOUND, "");
        assert_eq!(
            not_found.user_message(Action::ForgotPassword),
            "Email not found. Please check your email address."
        );
        assert_eq!(not_found.user_message(Action::ResetPassword), "User not found");

        let bad = Error::from_status(StatusCode::BAD_REQUEST, "");
        assert_eq!(bad.user_message(Action::ForgotPassword), "Invalid email format.");
        assert_eq!(
            bad.user_message(Action::ResetPassword),
            "Invalid current password or email address"
        );

        let unauthorized = Error::from_status(StatusCode::UNAUTHORIZED, "");
        assert_eq!(
            unauthorized.user_message(Action::ResetPassword),
            "Current password is incorrect"
        );
    }

    #[test]
    fn test_admin_banner() {
        let action = Action::Admin("Failed to fetch roles");
        assert_eq!(Error::SessionExpired.user_message(action), MSG_SESSION_EXPIRED);
        assert_eq!(Error::NotSignedIn.user_message(action), MSG_NOT_SIGNED_IN);
        assert_eq!(
            Error::from_status(StatusCode::INTERNAL_SERVER_ERROR, "").user_message(action),
            "Failed to fetch roles"
        );
        assert_eq!(
            Error::InvalidInput("Please select a role first".into()).user_message(action),
            "Please select a role first"
        );
    }

    #[test]
    fn test_rejection_excludes_transport_and_session() {
        assert!(Error::from_status(StatusCode::BAD_REQUEST, "").is_rejection());
        assert!(!Error::SessionExpired.is_rejection());
        assert!(!Error::Timeout.is_rejection());
        assert!(!Error::Network("x".into()).is_rejection());
    }
}
