pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod feeds;
pub mod forms;
pub mod mock;
pub mod model;
pub mod query;
pub mod report;
pub mod table;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardState};
pub use error::{ApiError, ApiResult, ValidationError};
pub use feeds::backend::BackendClient;
pub use feeds::mock::MockSource;
pub use feeds::{DashboardSource, DataOrigin};
