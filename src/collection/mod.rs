/// 集合模块 - 请求实例及其容器
mod instance;
mod requests;

pub use instance::{InstanceState, RequestBody, RequestInstance};
pub use requests::Collection;
