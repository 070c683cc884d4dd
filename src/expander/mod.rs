/// 展开模块 - 文档 → 请求实例集合
mod expand;
mod merge;
mod source;
mod types;

pub use expand::SpecExpander;
pub use merge::{DEFAULT_TIMEOUT, merge, merge_headers, resolve_body};
pub use source::UrlSource;
pub use types::{ConfigError, ResolvedSpec};
