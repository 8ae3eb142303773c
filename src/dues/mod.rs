pub mod generator;
pub mod models;
pub mod payments;
pub mod reconciliation;
pub mod reference;
pub mod repository;
pub mod scheduler;
pub mod summary;

pub use generator::{DueGenerator, GenerationFailure, GenerationOutcome};
pub use models::{BillingPeriod, DueStatus, DueView, MembershipDue, DUE_DAY_OF_MONTH};
pub use payments::PaymentRecorder;
pub use reconciliation::OverdueSweeper;
pub use reference::{new_reference, static_payload, PixConfig};
pub use repository::{DueRepository, PgDueRepository};
pub use scheduler::{process_tick as run_dues_maintenance_tick, spawn as spawn_dues_scheduler};
pub use summary::{summarize_records, PeriodSummary, PeriodSummaryService};
