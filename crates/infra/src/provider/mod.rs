//! OAuth provider endpoints.

pub mod client;

pub use client::OAuthProviderClient;
