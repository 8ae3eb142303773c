use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::Mutex;
use uuid::Uuid;

use socios_backend::dues::{BillingPeriod, DueRepository, DueStatus, MembershipDue};
use socios_backend::error::{AppError, AppResult};
use socios_backend::members::MemberDirectory;

/// In-memory stand-in for the Postgres adapter, with the same uniqueness
/// and terminal-state semantics behind `save`.
#[derive(Default)]
pub struct MemoryDueRepository {
    records: Mutex<HashMap<Uuid, MembershipDue>>,
}

#[async_trait]
impl DueRepository for MemoryDueRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MembershipDue>> {
        Ok(self.records.lock().await.get(&id).cloned())
    }

    async fn find_by_member_and_period(
        &self,
        member_id: Uuid,
        period: BillingPeriod,
    ) -> AppResult<Option<MembershipDue>> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .find(|due| due.member_id == member_id && due.period == period)
            .cloned())
    }

    async fn find_by_period(&self, period: BillingPeriod) -> AppResult<Vec<MembershipDue>> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|due| due.period == period)
            .cloned()
            .collect())
    }

    async fn find_by_status(&self, status: DueStatus) -> AppResult<Vec<MembershipDue>> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|due| due.status == status)
            .cloned()
            .collect())
    }

    async fn find_pending_due_before(&self, cutoff: NaiveDate) -> AppResult<Vec<MembershipDue>> {
        Ok(self
            .records
            .lock()
            .await
            .values()
            .filter(|due| due.status == DueStatus::Pending && due.due_date < cutoff)
            .cloned()
            .collect())
    }

    async fn save(&self, due: &MembershipDue) -> AppResult<MembershipDue> {
        let mut records = self.records.lock().await;
        if let Some(existing) = records.get(&due.id) {
            if existing.status == DueStatus::Paid {
                return Err(AppError::InvalidTransition {
                    from: DueStatus::Paid,
                    to: due.status,
                });
            }
        } else if records
            .values()
            .any(|other| other.member_id == due.member_id && other.period == due.period)
        {
            return Err(AppError::DuplicateDue {
                member_id: due.member_id,
                period: due.period,
            });
        }
        records.insert(due.id, due.clone());
        Ok(due.clone())
    }
}

/// Fixed roster double for the member directory.
pub struct StaticMemberDirectory {
    pub members: Vec<Uuid>,
}

#[async_trait]
impl MemberDirectory for StaticMemberDirectory {
    async fn list_active_members(&self) -> AppResult<Vec<Uuid>> {
        Ok(self.members.clone())
    }
}

/// Wraps the in-memory repository and fails `save` for one member,
/// simulating a uniqueness race lost between the existence check and the
/// insert.
pub struct ConflictOnSave {
    pub inner: Arc<MemoryDueRepository>,
    pub fail_for: Uuid,
}

#[async_trait]
impl DueRepository for ConflictOnSave {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MembershipDue>> {
        self.inner.find_by_id(id).await
    }

    async fn find_by_member_and_period(
        &self,
        member_id: Uuid,
        period: BillingPeriod,
    ) -> AppResult<Option<MembershipDue>> {
        self.inner.find_by_member_and_period(member_id, period).await
    }

    async fn find_by_period(&self, period: BillingPeriod) -> AppResult<Vec<MembershipDue>> {
        self.inner.find_by_period(period).await
    }

    async fn find_by_status(&self, status: DueStatus) -> AppResult<Vec<MembershipDue>> {
        self.inner.find_by_status(status).await
    }

    async fn find_pending_due_before(&self, cutoff: NaiveDate) -> AppResult<Vec<MembershipDue>> {
        self.inner.find_pending_due_before(cutoff).await
    }

    async fn save(&self, due: &MembershipDue) -> AppResult<MembershipDue> {
        if due.member_id == self.fail_for {
            return Err(AppError::DuplicateDue {
                member_id: due.member_id,
                period: due.period,
            });
        }
        self.inner.save(due).await
    }
}
