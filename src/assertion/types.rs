use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::value::{Value, ValueKind};

/// 断言错误类型
///
/// 只在引擎内部使用，最终都会被转换为失败的 [`AssertionResult`]。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssertError {
    #[error("Type mismatch: cannot apply to {actual} with expected {expected}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },

    #[error("Invalid property: {0}")]
    InvalidProperty(String),

    #[error("Invalid expected value: {0}")]
    InvalidValue(String),

    #[error("Malformed range '{0}': expected \"A:B\" with numeric bounds")]
    InvalidRange(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Unknown predicate kind: {0}")]
    UnknownPredicate(String),
}

impl AssertError {
    pub fn mismatch(actual: &Value, expected: &Value) -> Self {
        Self::TypeMismatch {
            expected: expected.kind(),
            actual: actual.kind(),
        }
    }
}

/// 断言谓词种类
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredicateKind {
    Contains,
    Includes,
    Equals,
    Greater,
    Lower,
    Exists,
    NotExists,
    Type,
    Length,
    Empty,
    NotEmpty,
    InRange,
    Matches,
    /// 不在目录中的谓词，求值时总是失败
    Unknown(String),
}

impl PredicateKind {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "contains" => Self::Contains,
            "includes" => Self::Includes,
            "equals" => Self::Equals,
            "greater" => Self::Greater,
            "lower" => Self::Lower,
            "exists" => Self::Exists,
            "not_exists" => Self::NotExists,
            "type" => Self::Type,
            "length" => Self::Length,
            "empty" => Self::Empty,
            "not_empty" => Self::NotEmpty,
            "in_range" => Self::InRange,
            "matches" => Self::Matches,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Contains => "contains",
            Self::Includes => "includes",
            Self::Equals => "equals",
            Self::Greater => "greater",
            Self::Lower => "lower",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
            Self::Type => "type",
            Self::Length => "length",
            Self::Empty => "empty",
            Self::NotEmpty => "not_empty",
            Self::InRange => "in_range",
            Self::Matches => "matches",
            Self::Unknown(name) => name,
        }
    }

    /// 是否需要期望值参与比较
    pub fn takes_expected(&self) -> bool {
        !matches!(
            self,
            Self::Exists | Self::NotExists | Self::Empty | Self::NotEmpty
        )
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 单条断言规则：谓词 + 期望值
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub kind: PredicateKind,
    pub expected: Value,
}

impl Rule {
    pub fn new(kind: PredicateKind, expected: impl Into<Value>) -> Self {
        Self {
            kind,
            expected: expected.into(),
        }
    }

    /// 从文档条目构建规则
    ///
    /// - `{equals: 200}` → 一条规则
    /// - `{greater: 199, lower: 300}` → 按顺序展开为两条
    /// - `exists` → 无期望值的规则
    fn from_yaml(entry: serde_yaml::Value) -> Result<Vec<Rule>, String> {
        match entry {
            serde_yaml::Value::Mapping(mapping) if !mapping.is_empty() => Ok(mapping
                .into_iter()
                .map(|(kind, expected)| Rule {
                    kind: PredicateKind::parse(&Value::from(kind).to_text()),
                    expected: Value::from(expected),
                })
                .collect()),
            serde_yaml::Value::String(kind) => Ok(vec![Rule {
                kind: PredicateKind::parse(&kind),
                expected: Value::Null,
            }]),
            other => Err(format!(
                "predicate rule must be a mapping like {{equals: 200}}, got {:?}",
                other
            )),
        }
    }
}

/// 期望集合：响应属性 → 有序规则列表，保持文档顺序
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExpectationSet {
    properties: Vec<(String, Vec<Rule>)>,
}

impl ExpectationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加规则；同名属性合并到已有条目，顺序不变
    pub fn push(&mut self, property: impl Into<String>, rule: Rule) {
        let property = property.into();
        match self.properties.iter_mut().find(|(name, _)| *name == property) {
            Some((_, rules)) => rules.push(rule),
            None => self.properties.push((property, vec![rule])),
        }
    }

    pub fn with(mut self, property: impl Into<String>, rule: Rule) -> Self {
        self.push(property, rule);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Rule])> {
        self.properties
            .iter()
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// 规则总数
    pub fn rule_count(&self) -> usize {
        self.properties.iter().map(|(_, rules)| rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}

impl<'de> Deserialize<'de> for ExpectationSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mapping = Option::<serde_yaml::Mapping>::deserialize(deserializer)?.unwrap_or_default();
        let mut set = ExpectationSet::new();

        for (property, entries) in mapping {
            let property = Value::from(property).to_text();
            let entries = match entries {
                serde_yaml::Value::Sequence(items) => items,
                serde_yaml::Value::Null => Vec::new(),
                single => vec![single],
            };
            for entry in entries {
                for rule in Rule::from_yaml(entry).map_err(D::Error::custom)? {
                    set.push(property.clone(), rule);
                }
            }
        }

        Ok(set)
    }
}

/// 断言结果
#[derive(Debug, Clone, PartialEq)]
pub struct AssertionResult {
    /// 被检查的响应属性
    pub property: String,

    /// 谓词名称
    pub predicate: String,

    /// 是否通过
    pub passed: bool,

    /// 期望值（字符串表示）
    pub expected: String,

    /// 实际值（字符串表示）
    pub actual: String,

    pub message: String,

    /// 失败详情，通过时为空
    pub details: String,
}

impl AssertionResult {
    /// 创建成功的断言结果
    pub fn success(property: &str, rule: &Rule, actual: &Value) -> Self {
        let expected = render_expected(rule);
        let actual = actual.to_string();
        Self {
            message: format!(
                "Assertion passed: {} (actual: {})",
                subject(property, rule, &expected),
                actual
            ),
            property: property.to_string(),
            predicate: rule.kind.to_string(),
            passed: true,
            expected,
            actual,
            details: String::new(),
        }
    }

    /// 创建失败的断言结果
    pub fn failure(property: &str, rule: &Rule, actual: &Value) -> Self {
        let expected = render_expected(rule);
        let actual = actual.to_string();
        let message = format!(
            "Assertion failed: expected {}, got {}",
            subject(property, rule, &expected),
            actual
        );
        Self {
            details: details(property, rule, &expected, &actual, None),
            property: property.to_string(),
            predicate: rule.kind.to_string(),
            passed: false,
            expected,
            actual,
            message,
        }
    }

    /// 创建错误的断言结果（提取或比较过程出错）
    pub fn error(property: &str, rule: &Rule, actual: Option<&Value>, error: AssertError) -> Self {
        let expected = render_expected(rule);
        let actual = actual
            .map(|v| v.to_string())
            .unwrap_or_else(|| "<unavailable>".to_string());
        Self {
            message: format!(
                "Assertion error: {} (actual: {}): {}",
                subject(property, rule, &expected),
                actual,
                error
            ),
            details: details(property, rule, &expected, &actual, Some(&error)),
            property: property.to_string(),
            predicate: rule.kind.to_string(),
            passed: false,
            expected,
            actual,
        }
    }
}

/// "属性 谓词 [期望值]"，无期望值时省略该段
fn subject(property: &str, rule: &Rule, expected: &str) -> String {
    if expected.is_empty() {
        format!("{} {}", property, rule.kind)
    } else {
        format!("{} {} {}", property, rule.kind, expected)
    }
}

fn render_expected(rule: &Rule) -> String {
    if rule.kind.takes_expected() || !rule.expected.is_null() {
        rule.expected.to_string()
    } else {
        String::new()
    }
}

fn details(
    property: &str,
    rule: &Rule,
    expected: &str,
    actual: &str,
    error: Option<&AssertError>,
) -> String {
    let mut details = format!(
        "property: {}\npredicate: {}\nexpected: {}\nactual: {}\n",
        property, rule.kind, expected, actual
    );
    if let Some(error) = error {
        details.push_str(&format!("error: {}\n", error));
    }
    details
}
