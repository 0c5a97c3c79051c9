use pushkind_common::repository::errors::RepositoryError;
use thiserror::Error;

use crate::domain::flow::FlowError;

pub mod catalog;
pub mod kiosk;
pub mod orders;

/// Errors returned by the service layer.
///
/// Mirrors `pushkind_common::services::errors::ServiceError`, whose `Conflict`
/// carries no message and which has no room for kiosk flow errors. Routes need
/// both the message and the [`FlowError`] kind to pick between 409 and 422.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    /// Rejected form input; the message is shown to the caller as is.
    #[error("{0}")]
    Form(String),
    /// The request conflicts with the current state of the resource.
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Flow(#[from] FlowError),
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn guarded_step() -> ServiceResult<()> {
        Err::<(), _>(FlowError::SubmissionInFlight)?;
        Ok(())
    }

    #[test]
    fn flow_errors_keep_their_kind_and_message() {
        let err = guarded_step().unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Flow(FlowError::SubmissionInFlight)
        ));
        assert_eq!(err.to_string(), FlowError::SubmissionInFlight.to_string());
    }

    #[test]
    fn conflicts_carry_their_message() {
        let err = ServiceError::Conflict("order #321 cannot move from ready to pending".into());
        assert_eq!(err.to_string(), "order #321 cannot move from ready to pending");
    }
}
