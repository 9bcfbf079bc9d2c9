pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod runner;
pub mod store;

pub use error::{CleanerError, Result};
pub use normalize::{normalize, normalize_opt, Stage};
pub use runner::{BatchRunner, Progress, RunSummary};
pub use store::{NameUpdate, PageTransaction, ProductRecord, ProductStore};
