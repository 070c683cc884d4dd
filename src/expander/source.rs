use std::sync::OnceLock;

use regex::{Captures, Regex};
use tracing::debug;

use crate::expander::types::ConfigError;
use crate::spec::{RequestDefaults, RequestItem, UrlValues};
use crate::value::Value;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("template pattern is valid"))
}

/// 请求 URL 的来源
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UrlSource<'a> {
    Direct(&'a str),
    Template {
        template: &'a str,
        values: &'a UrlValues,
    },
}

impl<'a> UrlSource<'a> {
    /// 优先级：invoke.url → invoke.url_values + defaults.url_template → defaults.url
    pub fn resolve(
        defaults: &'a RequestDefaults,
        item: &'a RequestItem,
        request: &str,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = item.invoke.url.as_deref() {
            return Ok(UrlSource::Direct(url));
        }

        if let (Some(values), Some(template)) = (
            item.invoke.url_values.as_ref(),
            defaults.url_template.as_deref(),
        ) {
            return Ok(UrlSource::Template { template, values });
        }

        if let Some(url) = defaults.url.as_deref() {
            return Ok(UrlSource::Direct(url));
        }

        Err(ConfigError::NoUrlSource {
            request: request.to_string(),
        })
    }

    /// 展开为具体 URL 列表，模板按笛卡尔积展开，最后声明的变量变化最快
    pub fn expand(&self, request: &str) -> Result<Vec<String>, ConfigError> {
        match *self {
            UrlSource::Direct(url) => Ok(vec![url.to_string()]),
            UrlSource::Template { template, values } => {
                check_placeholders(template, values, request)?;

                let urls: Vec<String> = combinations(values)
                    .iter()
                    .map(|binding| render(template, binding))
                    .collect();
                debug!("Template {} expanded to {} URL(s)", template, urls.len());
                Ok(urls)
            }
        }
    }
}

fn check_placeholders(template: &str, values: &UrlValues, request: &str) -> Result<(), ConfigError> {
    for caps in placeholder_regex().captures_iter(template) {
        let name = &caps[1];
        if !values.0.iter().any(|(declared, _)| declared == name) {
            return Err(ConfigError::UnboundPlaceholder {
                request: request.to_string(),
                placeholder: name.to_string(),
            });
        }
    }
    Ok(())
}

fn combinations(values: &UrlValues) -> Vec<Vec<(&str, &Value)>> {
    let mut combos: Vec<Vec<(&str, &Value)>> = vec![Vec::new()];

    for (name, choices) in &values.0 {
        let mut next = Vec::with_capacity(combos.len() * choices.len());
        for combo in &combos {
            for choice in choices {
                let mut extended = combo.clone();
                extended.push((name.as_str(), choice));
                next.push(extended);
            }
        }
        combos = next;
    }

    combos
}

fn render(template: &str, binding: &[(&str, &Value)]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            binding
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_text())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
