use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

use super::models::{BillingPeriod, DueStatus, MembershipDue};

/// key: dues-repository -> persistence seam owning the uniqueness guards
///
/// The `(member, period)` uniqueness constraint behind `save` is the only
/// concurrency coordination the dues core relies on.
#[async_trait]
pub trait DueRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MembershipDue>>;

    async fn find_by_member_and_period(
        &self,
        member_id: Uuid,
        period: BillingPeriod,
    ) -> AppResult<Option<MembershipDue>>;

    async fn find_by_period(&self, period: BillingPeriod) -> AppResult<Vec<MembershipDue>>;

    async fn find_by_status(&self, status: DueStatus) -> AppResult<Vec<MembershipDue>>;

    /// Pending dues whose collection date already passed as of `cutoff`.
    async fn find_pending_due_before(&self, cutoff: NaiveDate) -> AppResult<Vec<MembershipDue>>;

    /// Create-or-update keyed on `id`. A create that collides on
    /// `(member, period)` fails with `DuplicateDue`; an update against a row
    /// that is already PAID fails with `InvalidTransition`.
    async fn save(&self, due: &MembershipDue) -> AppResult<MembershipDue>;
}

/// key: dues-repository-postgres -> sqlx adapter
#[derive(Clone)]
pub struct PgDueRepository {
    pool: PgPool,
}

impl PgDueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DueRepository for PgDueRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<MembershipDue>> {
        let row = sqlx::query("SELECT * FROM membership_dues WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(map_due).transpose()
    }

    async fn find_by_member_and_period(
        &self,
        member_id: Uuid,
        period: BillingPeriod,
    ) -> AppResult<Option<MembershipDue>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM membership_dues
            WHERE member_id = $1 AND period_year = $2 AND period_month = $3
            "#,
        )
        .bind(member_id)
        .bind(period.year())
        .bind(period.month() as i16)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(map_due).transpose()
    }

    async fn find_by_period(&self, period: BillingPeriod) -> AppResult<Vec<MembershipDue>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM membership_dues
            WHERE period_year = $1 AND period_month = $2
            ORDER BY created_at
            "#,
        )
        .bind(period.year())
        .bind(period.month() as i16)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_due).collect()
    }

    async fn find_by_status(&self, status: DueStatus) -> AppResult<Vec<MembershipDue>> {
        let rows = sqlx::query(
            "SELECT * FROM membership_dues WHERE status = $1 ORDER BY due_date, created_at",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_due).collect()
    }

    async fn find_pending_due_before(&self, cutoff: NaiveDate) -> AppResult<Vec<MembershipDue>> {
        let rows = sqlx::query(
            r#"
            SELECT * FROM membership_dues
            WHERE status = 'PENDING' AND due_date < $1
            ORDER BY due_date, created_at
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_due).collect()
    }

    async fn save(&self, due: &MembershipDue) -> AppResult<MembershipDue> {
        let result = sqlx::query(
            r#"
            INSERT INTO membership_dues (
                id,
                member_id,
                period_month,
                period_year,
                amount,
                status,
                due_date,
                payment_date,
                payment_method,
                payment_reference,
                payment_payload,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                payment_date = EXCLUDED.payment_date,
                payment_method = EXCLUDED.payment_method,
                payment_payload = EXCLUDED.payment_payload
            WHERE membership_dues.status <> 'PAID'
            RETURNING *
            "#,
        )
        .bind(due.id)
        .bind(due.member_id)
        .bind(due.period.month() as i16)
        .bind(due.period.year())
        .bind(due.amount)
        .bind(due.status.as_str())
        .bind(due.due_date)
        .bind(due.payment_date)
        .bind(due.payment_method.as_deref())
        .bind(due.payment_reference.as_str())
        .bind(due.payment_payload.as_deref())
        .bind(due.created_at)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(row)) => map_due(&row),
            // The conditional update refused to touch a settled row.
            Ok(None) => Err(AppError::InvalidTransition {
                from: DueStatus::Paid,
                to: due.status,
            }),
            Err(err) => Err(map_unique_violation(err, due)),
        }
    }
}

fn map_due(row: &PgRow) -> AppResult<MembershipDue> {
    let month: i16 = row.get("period_month");
    let year: i32 = row.get("period_year");
    let status: String = row.get("status");
    Ok(MembershipDue {
        id: row.get("id"),
        member_id: row.get("member_id"),
        period: BillingPeriod::new(month as u32, year)?,
        amount: row.get("amount"),
        status: DueStatus::parse(&status)?,
        due_date: row.get("due_date"),
        payment_date: row.get("payment_date"),
        payment_method: row.get("payment_method"),
        payment_reference: row.get("payment_reference"),
        payment_payload: row.get("payment_payload"),
        created_at: row.get("created_at"),
    })
}

/// SQLSTATE 23505 on insert means the `(member, period)` slot is taken.
fn map_unique_violation(err: sqlx::Error, due: &MembershipDue) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return AppError::DuplicateDue {
                member_id: due.member_id,
                period: due.period,
            };
        }
    }
    AppError::Db(err)
}
