pub mod assertion;
pub mod collection;
pub mod error;
pub mod expander;
pub mod http;
pub mod logger;
pub mod oauth;
pub mod runner;
pub mod spec;
pub mod value;
pub mod variable;

pub use error::{ReqsuiteError, Result};
