pub mod error;
pub mod state;

pub use error::{NodeError, Result};
pub use state::{NodeMetrics, RateSnapshot};
