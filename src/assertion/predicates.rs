use std::cmp::Ordering;

use regex::Regex;

use crate::assertion::types::{AssertError, PredicateKind};
use crate::value::{Value, ValueKind};

/// 对实际值应用谓词
///
/// 返回 `Ok(false)` 表示比较失败，`Err` 表示比较本身无法进行。
pub fn check(kind: &PredicateKind, actual: &Value, expected: &Value) -> Result<bool, AssertError> {
    match kind {
        PredicateKind::Contains => contains(actual, expected),
        PredicateKind::Includes => includes(actual, expected),
        PredicateKind::Equals => Ok(equals(actual, expected)),
        PredicateKind::Greater => ordered(actual, expected, Ordering::Greater),
        PredicateKind::Lower => ordered(actual, expected, Ordering::Less),
        PredicateKind::Exists => Ok(!actual.is_null()),
        PredicateKind::NotExists => Ok(actual.is_null()),
        PredicateKind::Type => type_of(actual, expected),
        PredicateKind::Length => length(actual, expected),
        PredicateKind::Empty => count(actual).map(|n| n == 0),
        PredicateKind::NotEmpty => count(actual).map(|n| n > 0),
        PredicateKind::InRange => in_range(actual, expected),
        PredicateKind::Matches => matches(actual, expected),
        PredicateKind::Unknown(name) => Err(AssertError::UnknownPredicate(name.clone())),
    }
}

/// 成员关系检查
pub fn contains(actual: &Value, expected: &Value) -> Result<bool, AssertError> {
    // 文本形式的 JSON body 先解析再比较
    let embedded = match (actual, expected) {
        (Value::String(text), Value::Map(_)) => parse_embedded(text),
        _ => None,
    };
    let actual = embedded.as_ref().unwrap_or(actual);

    match (actual, expected) {
        (Value::Map(entries), Value::Map(wanted)) => Ok(wanted
            .iter()
            .all(|(key, value)| entries.get(key).is_some_and(|v| v == value))),

        (Value::List(items), Value::List(wanted)) => {
            Ok(wanted.iter().all(|value| items.contains(value)))
        }
        (Value::String(text), Value::List(wanted)) => {
            let mut found = true;
            for value in wanted {
                let fragment = value
                    .as_str()
                    .ok_or_else(|| AssertError::mismatch(actual, value))?;
                found &= text.contains(fragment);
            }
            Ok(found)
        }

        (Value::String(text), Value::String(fragment)) => Ok(text.contains(fragment.as_str())),
        (Value::List(items), scalar) if !scalar.is_container() => Ok(items.contains(scalar)),
        (Value::Map(entries), scalar) if !scalar.is_container() && !scalar.is_null() => {
            Ok(entries.contains_key(&scalar.to_text()))
        }

        _ => Err(AssertError::mismatch(actual, expected)),
    }
}

/// 与 contains 相同，但类型不匹配视为比较失败而不是错误
pub fn includes(actual: &Value, expected: &Value) -> Result<bool, AssertError> {
    match contains(actual, expected) {
        Err(AssertError::TypeMismatch { .. }) => Ok(false),
        other => other,
    }
}

/// 深度结构相等
///
/// 一侧是结构化值而另一侧是字符串时，先把字符串按 JSON 解析，
/// 这样 key 顺序和空白差异都不会导致误报。
pub fn equals(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::String(text), structured) if structured.is_container() => {
            parse_embedded(text).is_some_and(|parsed| parsed == *structured)
        }
        (structured, Value::String(text)) if structured.is_container() => {
            parse_embedded(text).is_some_and(|parsed| parsed == *structured)
        }
        _ => actual == expected,
    }
}

fn ordered(actual: &Value, expected: &Value, wanted: Ordering) -> Result<bool, AssertError> {
    actual
        .partial_cmp_value(expected)
        .map(|ordering| ordering == wanted)
        .ok_or_else(|| AssertError::mismatch(actual, expected))
}

fn type_of(actual: &Value, expected: &Value) -> Result<bool, AssertError> {
    let tag = expected
        .as_str()
        .ok_or_else(|| AssertError::InvalidValue(format!("type tag must be a string, got {}", expected)))?;
    let kind = ValueKind::parse(tag)
        .ok_or_else(|| AssertError::InvalidValue(format!("unknown type tag '{}'", tag)))?;
    Ok(actual.kind() == kind)
}

fn length(actual: &Value, expected: &Value) -> Result<bool, AssertError> {
    let wanted = expected
        .as_f64()
        .filter(|n| *n >= 0.0 && n.fract() == 0.0)
        .ok_or_else(|| {
            AssertError::InvalidValue(format!("length must be a non-negative integer, got {}", expected))
        })?;
    count(actual).map(|n| n as f64 == wanted)
}

fn count(actual: &Value) -> Result<usize, AssertError> {
    actual.len().ok_or(AssertError::TypeMismatch {
        expected: ValueKind::List,
        actual: actual.kind(),
    })
}

/// 解析 "A:B" 区间，边界按数值排序
pub fn parse_range(expected: &Value) -> Result<(f64, f64), AssertError> {
    let raw = expected.to_text();
    let bounds: Vec<&str> = raw.split(':').map(str::trim).collect();
    let [low, high] = bounds.as_slice() else {
        return Err(AssertError::InvalidRange(raw));
    };
    let low: f64 = low.parse().map_err(|_| AssertError::InvalidRange(raw.clone()))?;
    let high: f64 = high.parse().map_err(|_| AssertError::InvalidRange(raw.clone()))?;
    if low.is_nan() || high.is_nan() {
        return Err(AssertError::InvalidRange(raw));
    }
    Ok(if low <= high { (low, high) } else { (high, low) })
}

fn in_range(actual: &Value, expected: &Value) -> Result<bool, AssertError> {
    let (low, high) = parse_range(expected)?;
    let value = match actual {
        Value::Number(n) => *n,
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| AssertError::TypeMismatch {
            expected: ValueKind::Number,
            actual: ValueKind::String,
        })?,
        other => {
            return Err(AssertError::TypeMismatch {
                expected: ValueKind::Number,
                actual: other.kind(),
            });
        }
    };
    Ok(low <= value && value <= high)
}

/// 整串正则匹配
fn matches(actual: &Value, expected: &Value) -> Result<bool, AssertError> {
    let pattern = expected.to_text();
    let re = Regex::new(&format!("^(?:{})$", pattern))
        .map_err(|e| AssertError::InvalidPattern(format!("{}: {}", pattern, e)))?;
    Ok(re.is_match(&actual.to_text()))
}

fn parse_embedded(text: &str) -> Option<Value> {
    serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .map(Value::from)
        .filter(Value::is_container)
}
