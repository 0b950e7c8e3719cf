//! Error types for controller operations.

use crate::assets::LoadError;
use mw_protocol::ipc::Operation;
use thiserror::Error;

/// Errors returned by [`ApplianceController`](super::ApplianceController) operations.
///
/// A cancelled cook cycle is not an error: it is reported as
/// `CycleOutcome::Cancelled` in the cycle report.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// The operation was called while its required state did not hold.
    ///
    /// Nothing changed. Front ends log these and move on.
    #[error("{operation} ignored: {reason}")]
    PreconditionViolation { operation: Operation, reason: String },

    /// The item loader failed. Surfaced to the user as a notice.
    #[error("Failed to load '{item_type}' stage {stage}")]
    AssetLoad {
        item_type: String,
        stage: u8,
        #[source]
        source: LoadError,
    },
}

impl ControllerError {
    pub(crate) fn violation(operation: Operation, reason: impl ToString) -> Self {
        ControllerError::PreconditionViolation {
            operation,
            reason: reason.to_string(),
        }
    }

    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, ControllerError::PreconditionViolation { .. })
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;
