use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::AppResult;

use super::models::{BillingPeriod, DueStatus, MembershipDue};
use super::repository::DueRepository;

/// key: dues-summary -> period-level financial aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub total_members: usize,
    pub pending_count: usize,
    pub paid_count: usize,
    pub overdue_count: usize,
    pub expected_total: Decimal,
    pub collected_total: Decimal,
    pub pending_total: Decimal,
    pub overdue_total: Decimal,
    pub collection_percentage: Decimal,
}

/// key: dues-summary-service -> read-only aggregation over one period
pub struct PeriodSummaryService {
    repo: Arc<dyn DueRepository>,
    fee: Decimal,
}

impl PeriodSummaryService {
    /// `fee` prices the projection for members without a generated due in
    /// extended mode. Keep it aligned with the fee used at generation time;
    /// a summary of a past period computed with a newer fee will misstate
    /// the projected expected total.
    pub fn new(repo: Arc<dyn DueRepository>, fee: Decimal) -> Self {
        Self { repo, fee }
    }

    /// Pure read, no side effects. Basic mode (`active_member_count` absent)
    /// aggregates exactly the dues that exist for the period. Extended mode
    /// projects members without a generated due as pending at the service
    /// fee, and prices the expected total as `count × fee`.
    pub async fn summarize(
        &self,
        period: BillingPeriod,
        active_member_count: Option<usize>,
    ) -> AppResult<PeriodSummary> {
        let dues = self.repo.find_by_period(period).await?;
        Ok(summarize_records(&dues, active_member_count, self.fee))
    }
}

/// Aggregation arithmetic, separated from I/O so it can be checked without
/// a repository.
pub fn summarize_records(
    dues: &[MembershipDue],
    active_member_count: Option<usize>,
    fee: Decimal,
) -> PeriodSummary {
    let mut summary = PeriodSummary::default();

    for due in dues {
        match due.status {
            DueStatus::Pending => {
                summary.pending_count += 1;
                summary.pending_total += due.amount;
            }
            DueStatus::Paid => {
                summary.paid_count += 1;
                summary.collected_total += due.amount;
            }
            DueStatus::Overdue => {
                summary.overdue_count += 1;
                summary.overdue_total += due.amount;
            }
        }
    }

    summary.total_members = dues.len();
    summary.expected_total = summary.pending_total + summary.collected_total + summary.overdue_total;

    if let Some(active) = active_member_count {
        let missing = active.saturating_sub(dues.len());
        summary.pending_count += missing;
        summary.pending_total += fee * Decimal::from(missing as u64);
        summary.total_members = active.max(dues.len());
        summary.expected_total = fee * Decimal::from(active as u64);
    }

    summary.collection_percentage = if summary.expected_total.is_zero() {
        Decimal::ZERO
    } else {
        (summary.collected_total / summary.expected_total * Decimal::ONE_HUNDRED).round_dp(2)
    };

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn fee() -> Decimal {
        Decimal::new(1090, 2)
    }

    fn period() -> BillingPeriod {
        BillingPeriod::new(7, 2025).unwrap()
    }

    fn dues(pending: usize, paid: usize, overdue: usize) -> Vec<MembershipDue> {
        let mut all = Vec::new();
        for _ in 0..pending {
            all.push(MembershipDue::new(Uuid::new_v4(), period(), fee()));
        }
        for _ in 0..paid {
            let mut due = MembershipDue::new(Uuid::new_v4(), period(), fee());
            due.record_payment(Utc::now(), Some("PIX".to_string()))
                .unwrap();
            all.push(due);
        }
        for _ in 0..overdue {
            let mut due = MembershipDue::new(Uuid::new_v4(), period(), fee());
            due.mark_overdue().unwrap();
            all.push(due);
        }
        all
    }

    #[test]
    fn basic_mode_buckets_by_status() {
        let summary = summarize_records(&dues(2, 1, 0), None, fee());

        assert_eq!(summary.total_members, 3);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.overdue_count, 0);
        assert_eq!(summary.collected_total, Decimal::new(1090, 2));
        assert_eq!(summary.pending_total, Decimal::new(2180, 2));
        assert_eq!(summary.expected_total, Decimal::new(3270, 2));
        assert_eq!(summary.collection_percentage, Decimal::new(3333, 2));
    }

    #[test]
    fn basic_mode_totals_add_up() {
        let summary = summarize_records(&dues(3, 2, 4), None, fee());
        assert_eq!(
            summary.pending_total + summary.collected_total + summary.overdue_total,
            summary.expected_total
        );
    }

    #[test]
    fn empty_period_reports_zero_percentage() {
        let summary = summarize_records(&[], None, fee());
        assert_eq!(summary, PeriodSummary::default());
    }

    #[test]
    fn extended_mode_projects_missing_members_as_pending() {
        // One due generated and already settled; two members have nothing yet.
        let summary = summarize_records(&dues(0, 1, 0), Some(3), fee());

        assert_eq!(summary.total_members, 3);
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.pending_count, 2);
        assert_eq!(summary.pending_total, Decimal::new(2180, 2));
        assert_eq!(summary.expected_total, Decimal::new(3270, 2));
        assert_eq!(summary.collection_percentage, Decimal::new(3333, 2));
    }

    #[test]
    fn extended_mode_with_full_generation_matches_basic() {
        let all = dues(2, 1, 0);
        let basic = summarize_records(&all, None, fee());
        let extended = summarize_records(&all, Some(3), fee());
        assert_eq!(basic, extended);
    }
}
