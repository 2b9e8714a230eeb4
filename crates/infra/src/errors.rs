//! Infrastructure-level error wrappers.

use pagevault_domain::BridgeError;
use thiserror::Error;

/// Errors raised inside the infrastructure layer before they are mapped onto
/// the bridge taxonomy.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("response body error: {0}")]
    Body(String),
}

impl From<InfraError> for BridgeError {
    fn from(err: InfraError) -> Self {
        match err {
            InfraError::Http(e) => BridgeError::Network(format!("http: {e}")),
            InfraError::Body(msg) => BridgeError::Network(format!("body: {msg}")),
        }
    }
}
