mod evaluator;
mod extractor;
mod predicates;
/// 断言模块 - 对响应属性应用类型化谓词
mod types;

pub use evaluator::AssertionEngine;
pub use extractor::{PropertyPath, PropertyRoot, extract_property, extract_value};
pub use predicates::{check, contains, equals, includes, parse_range};
pub use types::{AssertError, AssertionResult, ExpectationSet, PredicateKind, Rule};
