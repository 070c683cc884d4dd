use tracing::{debug, trace};

use crate::assertion::extractor::extract_property;
use crate::assertion::predicates::check;
use crate::assertion::types::{AssertionResult, ExpectationSet, Rule};
use crate::http::Response;

/// 断言引擎
///
/// 无状态，每次运行构造一个实例并按引用传递。`evaluate` 是纯函数：
/// 相同输入总是得到相同输出，且任何内部错误都会转成失败结果。
#[derive(Debug, Clone, Copy, Default)]
pub struct AssertionEngine;

impl AssertionEngine {
    pub fn new() -> Self {
        Self
    }

    /// 按文档顺序对每个属性的每条规则求值
    pub fn evaluate(
        &self,
        expectations: &ExpectationSet,
        response: &Response,
    ) -> Vec<AssertionResult> {
        let mut results = Vec::with_capacity(expectations.rule_count());

        for (property, rules) in expectations.iter() {
            debug!("Evaluating response property {}", property);
            for rule in rules {
                results.push(self.evaluate_rule(property, rule, response));
            }
        }

        results
    }

    /// 单条规则求值
    pub fn evaluate_rule(&self, property: &str, rule: &Rule, response: &Response) -> AssertionResult {
        let actual = match extract_property(response, property) {
            Ok(value) => value,
            Err(e) => return AssertionResult::error(property, rule, None, e),
        };

        let result = match check(&rule.kind, &actual, &rule.expected) {
            Ok(true) => AssertionResult::success(property, rule, &actual),
            Ok(false) => AssertionResult::failure(property, rule, &actual),
            Err(e) => AssertionResult::error(property, rule, Some(&actual), e),
        };

        trace!("{}", result.message);
        result
    }
}
