use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::AppResult;
use crate::members::MemberDirectory;

use super::models::{BillingPeriod, MembershipDue};
use super::reference::{static_payload, PixConfig};
use super::repository::DueRepository;

/// key: dues-generation-outcome -> batch result with per-member failure ledger
#[derive(Debug, Default, Serialize)]
pub struct GenerationOutcome {
    pub created: Vec<MembershipDue>,
    pub skipped_existing: usize,
    pub failures: Vec<GenerationFailure>,
}

#[derive(Debug, Serialize)]
pub struct GenerationFailure {
    pub member_id: Uuid,
    pub reason: String,
}

/// key: dues-generator -> one Pending due per member per period
pub struct DueGenerator {
    repo: Arc<dyn DueRepository>,
    directory: Arc<dyn MemberDirectory>,
    fee: Decimal,
    pix: Option<PixConfig>,
}

impl DueGenerator {
    pub fn new(
        repo: Arc<dyn DueRepository>,
        directory: Arc<dyn MemberDirectory>,
        fee: Decimal,
        pix: Option<PixConfig>,
    ) -> Self {
        Self {
            repo,
            directory,
            fee,
            pix,
        }
    }

    /// Creates the missing dues for `period`, for a single member when given
    /// or for every active member otherwise. Existing `(member, period)`
    /// dues are skipped, not errors. An individual failure (a lost race on
    /// the uniqueness constraint, a storage hiccup) lands in the outcome and
    /// the batch moves on; the caller decides whether to re-invoke, and a
    /// re-invocation creates nothing that already exists.
    pub async fn generate(
        &self,
        period: BillingPeriod,
        member: Option<Uuid>,
    ) -> AppResult<GenerationOutcome> {
        let targets = match member {
            Some(id) => vec![id],
            None => self.directory.list_active_members().await?,
        };

        let mut outcome = GenerationOutcome::default();
        for member_id in targets {
            match self.generate_for_member(member_id, period).await {
                Ok(Some(due)) => outcome.created.push(due),
                Ok(None) => outcome.skipped_existing += 1,
                Err(err) => {
                    warn!(%member_id, %period, error = %err, "due generation failed for member");
                    outcome.failures.push(GenerationFailure {
                        member_id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        info!(
            %period,
            created = outcome.created.len(),
            skipped = outcome.skipped_existing,
            failed = outcome.failures.len(),
            "due generation finished"
        );
        Ok(outcome)
    }

    async fn generate_for_member(
        &self,
        member_id: Uuid,
        period: BillingPeriod,
    ) -> AppResult<Option<MembershipDue>> {
        if self
            .repo
            .find_by_member_and_period(member_id, period)
            .await?
            .is_some()
        {
            return Ok(None);
        }

        let mut due = MembershipDue::new(member_id, period, self.fee);
        if let Some(pix) = &self.pix {
            due.payment_payload = Some(static_payload(&due, pix));
        }
        let saved = self.repo.save(&due).await?;
        Ok(Some(saved))
    }
}
