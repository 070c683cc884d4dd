pub mod executor;
pub mod reporter;
pub mod types;

pub use executor::RunExecutor;
pub use reporter::RunReporter;
pub use types::{FailedRequest, RunSummary, TransportFailure};
