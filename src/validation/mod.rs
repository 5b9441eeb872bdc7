//! Declarative input rules for the item write operations.
//!
//! Each write operation accepts one record shape. The shapes differ only in
//! which fields are required, so they share a single rule table and one
//! validator walks it, collecting every violation rather than stopping at the
//! first.

use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Record shape accepted by a write operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemShape {
    /// POST: id optional, name and count required
    Create,
    /// PUT: every field required
    Replace,
    /// PATCH: id required, everything else optional
    PartialUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldType {
    String,
    Integer,
}

#[derive(Debug, Clone, Copy)]
struct FieldRule {
    name: &'static str,
    field_type: FieldType,
    required: bool,
    /// A present empty string reads as missing
    non_empty: bool,
}

const fn rule(name: &'static str, field_type: FieldType, required: bool) -> FieldRule {
    FieldRule { name, field_type, required, non_empty: false }
}

const fn non_empty(rule: FieldRule) -> FieldRule {
    FieldRule { non_empty: true, ..rule }
}

const CREATE_RULES: [FieldRule; 3] = [
    rule("itemId", FieldType::String, false),
    non_empty(rule("name", FieldType::String, true)),
    rule("count", FieldType::Integer, true),
];

const REPLACE_RULES: [FieldRule; 3] = [
    rule("itemId", FieldType::String, true),
    non_empty(rule("name", FieldType::String, true)),
    rule("count", FieldType::Integer, true),
];

const PARTIAL_UPDATE_RULES: [FieldRule; 3] = [
    rule("itemId", FieldType::String, true),
    non_empty(rule("name", FieldType::String, false)),
    rule("count", FieldType::Integer, false),
];

impl ItemShape {
    fn rules(self) -> &'static [FieldRule] {
        match self {
            ItemShape::Create => &CREATE_RULES,
            ItemShape::Replace => &REPLACE_RULES,
            ItemShape::PartialUpdate => &PARTIAL_UPDATE_RULES,
        }
    }
}

/// Every rule an input record broke, in rule order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", .violations.join(", "))]
pub struct ValidationError {
    pub violations: Vec<String>,
}

/// Check `record` against `shape`.
///
/// Integral floats (`3.0`) in integer fields are rewritten as integers so the
/// record deserializes into the typed entity afterwards.
pub fn validate(shape: ItemShape, record: &mut Map<String, Value>) -> Result<(), ValidationError> {
    let rules = shape.rules();
    let mut violations = Vec::new();

    for rule in rules {
        match record.get_mut(rule.name) {
            Some(value) if !value.is_null() => {
                if let Some(message) = check_value(rule, value) {
                    violations.push(message);
                }
            }
            Some(_) if !rule.required => violations.push(type_message(rule)),
            _ => {
                if rule.required {
                    violations.push(format!("{} is required", rule.name));
                }
            }
        }
    }

    for field in record.keys() {
        if !rules.iter().any(|r| r.name == field) {
            violations.push(format!("{} is not allowed", field));
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

fn type_message(rule: &FieldRule) -> String {
    match rule.field_type {
        FieldType::String => format!("{} should be a string", rule.name),
        FieldType::Integer => format!("{} should be a number", rule.name),
    }
}

fn check_value(rule: &FieldRule, value: &mut Value) -> Option<String> {
    match rule.field_type {
        FieldType::String => match value {
            Value::String(s) if (rule.required || rule.non_empty) && s.is_empty() => {
                Some(format!("{} is required", rule.name))
            }
            Value::String(_) => None,
            _ => Some(type_message(rule)),
        },
        FieldType::Integer => {
            let number = match value {
                Value::Number(n) => n,
                _ => return Some(type_message(rule)),
            };
            if number.is_i64() {
                return None;
            }
            match number.as_f64() {
                Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
                    *value = Value::Number(Number::from(f as i64));
                    None
                }
                _ => Some(format!("{} should be an integer", rule.name)),
            }
        }
    }
}
