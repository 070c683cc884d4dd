/// 变量模块 - reqsuite.toml 环境与 `${NAME}` 替换
pub mod config;
pub mod resolver;
pub mod types;

pub use config::ConfigLoader;
pub use resolver::VariableResolver;
pub use types::{Environment, VariableConfig, VariableContext, VariableError};
