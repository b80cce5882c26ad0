//! Marketplace profile client
//!
//! Library behind the `marketplace` command-line tool.
//!
//! This crate provides:
//! - Profile API client with bearer-token authorization
//! - Durable session store for the login token
//! - Edit-form validation
//! - Profile page controller with request cancellation and error reporting
//! - Route table and session guard

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod navigation;
pub mod page;
pub mod session;
pub mod validation;

pub use client::{ProfileApi, ProfileClient};
pub use config::ClientConfig;
pub use error::RequestError;
pub use page::ProfilePage;
pub use session::SessionStore;
