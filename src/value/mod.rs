/// 值模型 - 展开器与断言引擎共用的带标签值
mod convert;
mod types;

pub use types::{Value, ValueKind};
