use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::error::AppResult;

use super::repository::DueRepository;

/// key: dues-reconciliation -> stale Pending dues flip to Overdue
pub struct OverdueSweeper {
    repo: Arc<dyn DueRepository>,
}

impl OverdueSweeper {
    pub fn new(repo: Arc<dyn DueRepository>) -> Self {
        Self { repo }
    }

    /// Transitions every Pending due with `due_date < reference_date` to
    /// Overdue and returns how many changed. Re-running with the same or a
    /// later date is a no-op: the Pending filter excludes records already
    /// swept, and Paid records are never touched.
    pub async fn sweep(&self, reference_date: NaiveDate) -> AppResult<u64> {
        let stale = self.repo.find_pending_due_before(reference_date).await?;
        let mut transitioned = 0u64;
        for mut due in stale {
            due.mark_overdue()?;
            self.repo.save(&due).await?;
            transitioned += 1;
        }
        if transitioned > 0 {
            info!(%reference_date, transitioned, "overdue sweep transitioned dues");
        }
        Ok(transitioned)
    }
}
