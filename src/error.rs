use thiserror::Error;
use uuid::Uuid;

use crate::dues::{BillingPeriod, DueStatus};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("due record not found: {0}")]
    NotFound(Uuid),
    #[error("illegal due status transition: {from} -> {to}")]
    InvalidTransition { from: DueStatus, to: DueStatus },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("due already exists for member {member_id} in period {period}")]
    DuplicateDue {
        member_id: Uuid,
        period: BillingPeriod,
    },
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
}

pub type AppResult<T> = Result<T, AppError>;
