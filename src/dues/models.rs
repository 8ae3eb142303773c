use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config;
use crate::error::{AppError, AppResult};

/// Dues always fall due on this calendar day of the period's month.
pub const DUE_DAY_OF_MONTH: u32 = 10;

/// key: dues-period -> validated (month, year) billing cycle
///
/// Construction is the only way to obtain a value, so every period held by
/// the core is already inside the configured bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BillingPeriod {
    month: u32,
    year: i32,
}

impl BillingPeriod {
    pub fn new(month: u32, year: i32) -> AppResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(AppError::Validation(format!(
                "billing month {month} outside 1-12"
            )));
        }
        let (min_year, max_year) = (*config::DUES_MIN_YEAR, *config::DUES_MAX_YEAR);
        if year < min_year || year > max_year {
            return Err(AppError::Validation(format!(
                "billing year {year} outside {min_year}-{max_year}"
            )));
        }
        Ok(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Collection date for the period: day 10 of its month.
    pub fn due_date(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, DUE_DAY_OF_MONTH)
            .expect("validated month always contains day 10")
    }

    /// Canonical `YYYY-MM` key used by reports and references.
    pub fn key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// key: dues-status -> closed lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DueStatus {
    Pending,
    Paid,
    Overdue,
}

impl DueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DueStatus::Pending => "PENDING",
            DueStatus::Paid => "PAID",
            DueStatus::Overdue => "OVERDUE",
        }
    }

    pub fn parse(raw: &str) -> AppResult<Self> {
        match raw {
            "PENDING" => Ok(DueStatus::Pending),
            "PAID" => Ok(DueStatus::Paid),
            "OVERDUE" => Ok(DueStatus::Overdue),
            other => Err(AppError::Validation(format!("unknown due status: {other}"))),
        }
    }

    /// The whole state machine: Pending settles or lapses, Overdue settles,
    /// Paid is terminal.
    pub fn can_transition_to(self, next: DueStatus) -> bool {
        matches!(
            (self, next),
            (DueStatus::Pending, DueStatus::Paid)
                | (DueStatus::Pending, DueStatus::Overdue)
                | (DueStatus::Overdue, DueStatus::Paid)
        )
    }
}

impl fmt::Display for DueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// key: dues-model -> one charge owed by one member for one period
#[derive(Debug, Clone, Serialize)]
pub struct MembershipDue {
    pub id: Uuid,
    pub member_id: Uuid,
    pub period: BillingPeriod,
    pub amount: Decimal,
    pub status: DueStatus,
    pub due_date: NaiveDate,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub payment_reference: String,
    pub payment_payload: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MembershipDue {
    /// Constructs a fresh Pending due. Creation-time fields (id, due date,
    /// payment reference, created_at) are computed here rather than by
    /// storage triggers, so callers and tests can assert on them.
    pub fn new(member_id: Uuid, period: BillingPeriod, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id,
            period,
            amount,
            status: DueStatus::Pending,
            due_date: period.due_date(),
            payment_date: None,
            payment_method: None,
            payment_reference: super::reference::new_reference(period, member_id),
            payment_payload: None,
            created_at: Utc::now(),
        }
    }

    /// Single legality gate for every status change.
    fn transition(&mut self, next: DueStatus) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Settles the due. Legal from Pending and Overdue; a due that is
    /// already Paid is refused.
    pub fn record_payment(
        &mut self,
        paid_at: DateTime<Utc>,
        method: Option<String>,
    ) -> AppResult<()> {
        self.transition(DueStatus::Paid)?;
        self.payment_date = Some(paid_at);
        self.payment_method = method;
        Ok(())
    }

    /// Lapses a Pending due whose collection date has passed.
    pub fn mark_overdue(&mut self) -> AppResult<()> {
        self.transition(DueStatus::Overdue)
    }

    /// Read model handed to API/report layers. `is_overdue` and
    /// `days_until_due` derive from `as_of`, never from stored state.
    pub fn view(&self, as_of: NaiveDate) -> DueView {
        DueView {
            id: self.id,
            member_id: self.member_id,
            period: self.period,
            period_key: self.period.key(),
            amount: self.amount,
            status: self.status,
            due_date: self.due_date,
            payment_date: self.payment_date,
            payment_method: self.payment_method.clone(),
            payment_reference: self.payment_reference.clone(),
            payment_payload: self.payment_payload.clone(),
            created_at: self.created_at,
            is_overdue: self.status != DueStatus::Paid && self.due_date < as_of,
            days_until_due: (self.due_date - as_of).num_days(),
        }
    }
}

/// key: dues-view -> computed per-due read model
#[derive(Debug, Clone, Serialize)]
pub struct DueView {
    pub id: Uuid,
    pub member_id: Uuid,
    pub period: BillingPeriod,
    pub period_key: String,
    pub amount: Decimal,
    pub status: DueStatus,
    pub due_date: NaiveDate,
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub payment_reference: String,
    pub payment_payload: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_overdue: bool,
    pub days_until_due: i64,
}
