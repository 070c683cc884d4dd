use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReqsuiteError {
    #[error("无法读取集合文档 {path}: {source}")]
    ReadDocument {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("文档解析错误: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for reqsuite crate
pub type Result<T> = std::result::Result<T, ReqsuiteError>;
