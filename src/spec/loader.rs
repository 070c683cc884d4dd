use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::{ReqsuiteError, Result};
use crate::spec::types::Document;
use crate::variable::{VariableContext, VariableResolver};

/// 集合文档加载器
///
/// 文档先做 `${NAME}` 文本替换，再按 YAML 解析（JSON 是 YAML 的子集）。
pub struct DocumentLoader<'a> {
    context: &'a VariableContext,
}

impl<'a> DocumentLoader<'a> {
    pub fn new(context: &'a VariableContext) -> Self {
        Self { context }
    }

    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ReqsuiteError::ReadDocument {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded collection document {} ({} bytes)", path.display(), content.len());

        self.parse(&content)
    }

    pub fn parse(&self, content: &str) -> Result<Document> {
        let content = VariableResolver::resolve(content, self.context);

        let unresolved = VariableResolver::unresolved(&content);
        if !unresolved.is_empty() {
            warn!("Unresolved document variables: {}", unresolved.join(", "));
        }

        let document: Document = serde_yaml::from_str(&content)?;
        debug!("Document declares {} request(s)", document.requests.len());
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_substitutes_variables() {
        let context: VariableContext = [("BASE", "http://localhost:9000")].into_iter().collect();
        let document = DocumentLoader::new(&context)
            .parse("defaults:\n  request:\n    url: ${BASE}/health\n")
            .unwrap();

        assert_eq!(
            document.defaults.request.url.as_deref(),
            Some("http://localhost:9000/health")
        );
    }

    #[test]
    fn test_parse_json_document() {
        let context = VariableContext::new();
        let document = DocumentLoader::new(&context)
            .parse(r#"{"requests": [{"name": "ping", "invoke": {"url": "http://a/b"}}]}"#)
            .unwrap();

        assert_eq!(document.requests.len(), 1);
        assert_eq!(document.requests[0].name.as_deref(), Some("ping"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"requests:\n  - name: one\n  - name: two\n").unwrap();
        file.flush().unwrap();

        let context = VariableContext::new();
        let document = DocumentLoader::new(&context).load(file.path()).unwrap();
        assert_eq!(document.requests.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let context = VariableContext::new();
        let result = DocumentLoader::new(&context).load("/nonexistent/collection.yaml");
        assert!(matches!(result, Err(ReqsuiteError::ReadDocument { .. })));
    }

    #[test]
    fn test_parse_malformed_yaml() {
        let context = VariableContext::new();
        let result = DocumentLoader::new(&context).parse("requests: [\n");
        assert!(matches!(result, Err(ReqsuiteError::Yaml(_))));
    }
}
