use crate::variable::types::VariableContext;
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
    })
}

/// `${NAME}` 占位符替换
pub struct VariableResolver;

impl VariableResolver {
    /// 先查上下文，再查进程环境变量；都没有时保持原样
    pub fn resolve(text: &str, context: &VariableContext) -> String {
        placeholder_regex()
            .replace_all(text, |caps: &Captures| {
                let name = &caps[1];
                match context.get(name) {
                    Some(value) => value.to_string(),
                    None => std::env::var(name).unwrap_or_else(|_| caps[0].to_string()),
                }
            })
            .into_owned()
    }

    /// 只用进程环境变量替换，用于配置文件里的值
    pub fn resolve_env_vars(text: &str) -> String {
        Self::resolve(text, &VariableContext::new())
    }

    /// 文本中仍未解析的占位符名称
    pub fn unresolved(text: &str) -> Vec<String> {
        placeholder_regex()
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}
