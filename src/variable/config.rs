use crate::variable::resolver::VariableResolver;
use crate::variable::types::{VariableConfig, VariableContext, VariableError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 变量配置加载器
pub struct ConfigLoader;

impl ConfigLoader {
    const CONFIG_FILE: &'static str = "reqsuite.toml";

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<VariableConfig, VariableError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| VariableError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| VariableError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 查找配置文件：当前目录及其父目录，然后 ~/.config/reqsuite/
    pub fn find() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(Self::CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                break;
            }
        }

        let candidate = dirs::home_dir()?
            .join(".config")
            .join("reqsuite")
            .join(Self::CONFIG_FILE);
        candidate.is_file().then_some(candidate)
    }

    /// 显式路径优先；否则查找，找不到时返回空配置
    pub fn load(explicit: Option<&Path>) -> Result<VariableConfig, VariableError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => match Self::find() {
                Some(path) => {
                    debug!("Using variable config {}", path.display());
                    Self::load_from_path(path)
                }
                None => Ok(VariableConfig::default()),
            },
        }
    }

    /// 构建变量上下文：环境变量在前，CLI 覆盖在后
    pub fn build_context(
        config: &VariableConfig,
        env_name: Option<&str>,
        cli_vars: &[(String, String)],
    ) -> Result<VariableContext, VariableError> {
        let mut context = VariableContext::new();

        if let Some(name) = env_name {
            let env = config
                .get_environment(name)
                .ok_or_else(|| VariableError::UnknownEnvironment(name.to_string()))?;
            for (key, value) in &env.variables {
                context.insert(key.clone(), VariableResolver::resolve_env_vars(value));
            }
        }

        for (key, value) in cli_vars {
            context.insert(key.clone(), value.clone());
        }

        Ok(context)
    }

    /// 解析 `--var key=value`
    pub fn parse_cli_var(s: &str) -> Result<(String, String), VariableError> {
        match s.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
            _ => Err(VariableError::InvalidCliVar(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_path() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[environments.dev]\nbase_url = \"http://localhost:8080\"\n")
            .unwrap();
        temp_file.flush().unwrap();

        let config = ConfigLoader::load_from_path(temp_file.path()).unwrap();
        assert!(config.get_environment("dev").is_some());
    }

    #[test]
    fn test_load_bad_toml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[environments.dev\n").unwrap();
        temp_file.flush().unwrap();

        assert!(matches!(
            ConfigLoader::load_from_path(temp_file.path()),
            Err(VariableError::Toml { .. })
        ));
    }

    #[test]
    fn test_build_context() {
        let config: VariableConfig = toml::from_str(
            r#"
[environments.dev]
base_url = "http://localhost:8080"
token = "dev-token"
"#,
        )
        .unwrap();

        let context = ConfigLoader::build_context(&config, Some("dev"), &[]).unwrap();
        assert_eq!(context.get("base_url"), Some("http://localhost:8080"));

        let cli_vars = vec![("token".to_string(), "custom-token".to_string())];
        let context = ConfigLoader::build_context(&config, Some("dev"), &cli_vars).unwrap();
        assert_eq!(context.get("token"), Some("custom-token"));

        assert!(matches!(
            ConfigLoader::build_context(&config, Some("prod"), &[]),
            Err(VariableError::UnknownEnvironment(_))
        ));
    }

    #[test]
    fn test_parse_cli_var() {
        assert_eq!(
            ConfigLoader::parse_cli_var("url=https://example.com/?a=b").unwrap(),
            ("url".to_string(), "https://example.com/?a=b".to_string())
        );
        assert!(ConfigLoader::parse_cli_var("invalid").is_err());
        assert!(ConfigLoader::parse_cli_var("=value").is_err());
    }
}
