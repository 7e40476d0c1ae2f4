pub mod check;
pub mod context;
pub mod engine;
pub mod expect;
pub mod sequence;
pub mod summary;

pub use crate::domain::model::{CheckEvidence, CheckOutcome, CheckStatus};
pub use crate::domain::ports::{ReportStore, TargetProvider};
pub use crate::utils::error::Result;
