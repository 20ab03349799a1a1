//! Typed failure taxonomy for billing operations.

use rust_decimal::Decimal;
use service_core::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("unknown membership plan: {0}")]
    InvalidPlan(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid member status: {0}")]
    InvalidStatus(String),

    /// The payment amount matches no renewal rule and no explicit
    /// extension was supplied. Callers must clarify, never guess.
    #[error("payment amount {0} does not map to any extension rule; supply extension_days")]
    UnknownAmount(Decimal),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),

    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl From<mongodb::error::Error> for BillingError {
    fn from(err: mongodb::error::Error) -> Self {
        BillingError::Storage(anyhow::Error::new(err))
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::InvalidPlan(_)
            | BillingError::InvalidInput(_)
            | BillingError::InvalidStatus(_) => AppError::BadRequest(anyhow::anyhow!("{err}")),
            BillingError::UnknownAmount(_) => AppError::Unprocessable(anyhow::anyhow!("{err}")),
            BillingError::Unauthorized(_) => AppError::Forbidden(anyhow::anyhow!("{err}")),
            BillingError::NotFound(_) => AppError::NotFound(anyhow::anyhow!("{err}")),
            BillingError::ConcurrentModification(_) => AppError::Conflict(anyhow::anyhow!("{err}")),
            BillingError::Storage(e) => AppError::DatabaseError(e),
        }
    }
}
