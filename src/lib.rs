pub mod config;
pub mod dues;
pub mod error;
pub mod members;

pub use error::{AppError, AppResult};
