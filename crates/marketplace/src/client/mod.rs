//! Marketplace API client.

mod profile;

pub use profile::{ProfileApi, ProfileClient};
