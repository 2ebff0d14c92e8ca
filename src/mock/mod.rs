//! Synthetic fallback data used when the backend cannot be reached.

pub mod corpus;
pub mod generator;
pub mod store;

pub use store::DatasetStore;

use crate::model::{Alert, Mention, TrendPoint};

/// The mentions, trends and alerts produced by one generation pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub mentions: Vec<Mention>,
    pub trends: Vec<TrendPoint>,
    pub alerts: Vec<Alert>,
}
