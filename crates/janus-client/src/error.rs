//! Errors specific to the main client orchestration or launch logic.

use janus_core::error::CoreError;
use janus_interfaces::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration loading failed: {0}")]
    ConfigError(#[from] CoreError),

    #[error("Actor system unavailable: {0}")]
    ActorSystemError(String),

    #[error("Supervised actor unreachable: {0}")]
    SupervisorError(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::ConfigError(e) => ApiError::InternalError(format!("Config error: {}", e)),
            ClientError::ActorSystemError(e) => {
                ApiError::InternalError(format!("Actor system: {}", e))
            }
            ClientError::SupervisorError(e) => {
                ApiError::InternalError(format!("Supervisor: {}", e))
            }
            ClientError::Api(api_err) => api_err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_pass_through_unchanged() {
        let original = ApiError::TrackNotFound("v0".into());
        let client: ClientError = original.clone().into();
        assert_eq!(ApiError::from(client), original);
    }

    #[test]
    fn supervisor_errors_become_internal() {
        let api: ApiError = ClientError::SupervisorError("mailbox closed".into()).into();
        assert_eq!(api, ApiError::InternalError("Supervisor: mailbox closed".into()));
    }
}
