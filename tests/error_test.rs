use std::path::Path;

use reqsuite::expander::ConfigError;
use reqsuite::spec::DocumentLoader;
use reqsuite::variable::{VariableContext, VariableError};
use reqsuite::{ReqsuiteError, Result};

#[test]
fn test_no_url_source_message() {
    let err = ConfigError::NoUrlSource {
        request: "List users".to_string(),
    };
    assert_eq!(err.to_string(), "No URL provided for request 'List users'");
}

#[test]
fn test_missing_token_message() {
    let err = ConfigError::MissingToken {
        provider: "main".to_string(),
    };
    assert_eq!(err.to_string(), "Token not found for provider: main");
}

#[test]
fn test_unbound_placeholder_message() {
    let err = ConfigError::UnboundPlaceholder {
        request: "r".to_string(),
        placeholder: "env".to_string(),
    };
    assert!(err.to_string().contains("'{env}'"));
}

#[test]
fn test_unknown_environment_message() {
    let err = VariableError::UnknownEnvironment("qa".to_string());
    assert_eq!(err.to_string(), "未知环境: qa");
}

#[test]
fn test_read_document_error() {
    let context = VariableContext::new();
    let result: Result<_> = DocumentLoader::new(&context).load(Path::new("/nonexistent/collection.yaml"));

    let err = result.unwrap_err();
    assert!(matches!(err, ReqsuiteError::ReadDocument { .. }));
    assert!(err.to_string().starts_with("无法读取集合文档 /nonexistent/collection.yaml"));
}

#[test]
fn test_yaml_error_message() {
    let context = VariableContext::new();
    let err = DocumentLoader::new(&context)
        .parse("requests: [unclosed")
        .unwrap_err();
    assert!(matches!(err, ReqsuiteError::Yaml(_)));
    assert!(err.to_string().starts_with("文档解析错误: "));
}
