//! # Clinic Admin Client
//!
//! Typed client for the clinic-management backend used by the admin
//! console.
//!
//! - **Authentication**: login, forgot/reset password, session storage
//! - **Users**: directory, registration, status, deletion
//! - **Authorization**: roles, modules, role-module grants
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cm_client::{Client, Config, FileSessionStore};
//!
//! # async fn run() -> cm_client::Result<()> {
//! let session = Arc::new(FileSessionStore::new("/tmp/cm-session.json"));
//! let client = Client::new(Config::new("https://api.clinic.example"), session)?;
//!
//! client.auth().login("frontdesk", "secret").await?;
//! let roles = client.roles().list().await?;
//! println!("{} roles", roles.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod session;

pub use client::Client;
pub use config::Config;
pub use dto::Actor;
pub use error::{Action, Error, Result};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
