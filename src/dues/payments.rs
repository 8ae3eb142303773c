use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::models::MembershipDue;
use super::repository::DueRepository;

/// key: dues-payments -> single-record settlement
pub struct PaymentRecorder {
    repo: Arc<dyn DueRepository>,
}

impl PaymentRecorder {
    pub fn new(repo: Arc<dyn DueRepository>) -> Self {
        Self { repo }
    }

    /// Marks a due as Paid. Late payments (Overdue dues) settle without
    /// penalty; a due that is already Paid is refused. The storage-level
    /// guard in `save` keeps read-validate-write honest when two
    /// confirmations race for the same due.
    pub async fn record_payment(
        &self,
        due_id: Uuid,
        paid_at: DateTime<Utc>,
        method: Option<String>,
    ) -> AppResult<MembershipDue> {
        let mut due = self
            .repo
            .find_by_id(due_id)
            .await?
            .ok_or(AppError::NotFound(due_id))?;

        due.record_payment(paid_at, method)?;
        let saved = self.repo.save(&due).await?;
        info!(
            due = %saved.id,
            member = %saved.member_id,
            period = %saved.period,
            method = saved.payment_method.as_deref().unwrap_or("-"),
            "payment recorded"
        );
        Ok(saved)
    }
}
