//! Condition → canonical predicate translation.
//!
//! Every condition shape lowers into the same [`Predicate`], so the façade and
//! the storage engine share one execution path no matter which entry point
//! the caller used.

use crate::domain::condition::predicate::{Comparison, Constraint, Predicate, Window};
use crate::domain::condition::spec::{Condition, ConditionSpec};
use crate::domain::ident::validate_ident;
use serde_json::Value as JsonValue;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("invalid field name '{0}'")]
    InvalidField(String),

    #[error("unknown operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("'between' on field '{field}' takes exactly two bounds, got {got}")]
    BetweenArity { field: String, got: usize },

    #[error("'in' on field '{field}' takes an array of scalar values")]
    InvalidInSet { field: String },

    #[error("'like' on field '{field}' takes a string pattern")]
    InvalidPattern { field: String },

    #[error("{name} must be a positive integer, got {value}")]
    InvalidPage { name: &'static str, value: String },
}

/// Lowers a condition into a predicate.
pub fn translate(condition: &Condition) -> Result<Predicate, TranslationError> {
    let predicate = match condition {
        Condition::All => Predicate::match_all(),
        Condition::Exact { values } => {
            let mut predicate = Predicate::match_all();
            for (field, value) in values {
                check_field(field)?;
                predicate.push(Constraint::new(field, Comparison::Eq(value.clone())));
            }
            predicate
        }
        Condition::Text { field, term } => {
            check_field(field)?;
            Predicate::match_all().and(Constraint::new(
                field,
                Comparison::Like {
                    pattern: format!("%{}%", term),
                    case_insensitive: true,
                },
            ))
        }
        Condition::Operators { filters } => {
            let mut predicate = Predicate::match_all();
            for (field, operators) in filters.iter() {
                check_field(field)?;
                for (operator, operand) in operators {
                    let comparison = lower_operator(field, operator, operand)?;
                    predicate.push(Constraint::new(field, comparison));
                }
            }
            predicate
        }
    };
    tracing::debug!(%predicate, "translated condition");
    Ok(predicate)
}

/// Lowers a condition and turns a 1-based page request into a row window.
pub fn translate_paginated(
    condition: &Condition,
    page: i64,
    page_size: i64,
) -> Result<(Predicate, Window), TranslationError> {
    let window = window_for(page, page_size)?;
    Ok((translate(condition)?, window))
}

pub fn translate_spec(
    spec: &ConditionSpec,
) -> Result<(Predicate, Option<Window>), TranslationError> {
    match spec {
        ConditionSpec::Plain(condition) => Ok((translate(condition)?, None)),
        ConditionSpec::Paginated {
            condition,
            page,
            page_size,
        } => {
            let (predicate, window) = translate_paginated(condition, *page, *page_size)?;
            Ok((predicate, Some(window)))
        }
    }
}

/// `(offset, limit) = ((page - 1) * page_size, page_size)`.
pub fn window_for(page: i64, page_size: i64) -> Result<Window, TranslationError> {
    if page < 1 {
        return Err(TranslationError::InvalidPage {
            name: "page",
            value: page.to_string(),
        });
    }
    if page_size < 1 {
        return Err(TranslationError::InvalidPage {
            name: "page_size",
            value: page_size.to_string(),
        });
    }
    // The offset is bound as a signed 64-bit integer, so it must fit in one.
    let offset = (page - 1)
        .checked_mul(page_size)
        .ok_or_else(|| TranslationError::InvalidPage {
            name: "page",
            value: page.to_string(),
        })?;
    Ok(Window {
        offset: offset as u64,
        limit: page_size as u64,
    })
}

/// Reads a page parameter supplied as loose JSON (e.g. from a request body).
/// Integral floats such as `2.0` are accepted; anything else is rejected.
pub fn parse_page_param(name: &'static str, value: &JsonValue) -> Result<i64, TranslationError> {
    let parsed = match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        _ => None,
    };
    match parsed {
        Some(n) if n >= 1 => Ok(n),
        _ => Err(TranslationError::InvalidPage {
            name,
            value: value.to_string(),
        }),
    }
}

fn check_field(field: &str) -> Result<(), TranslationError> {
    if validate_ident(field) {
        Ok(())
    } else {
        Err(TranslationError::InvalidField(field.to_string()))
    }
}

fn lower_operator(
    field: &str,
    operator: &str,
    operand: &JsonValue,
) -> Result<Comparison, TranslationError> {
    let comparison = match operator {
        "gt" => Comparison::Gt(operand.clone()),
        "gte" => Comparison::Gte(operand.clone()),
        "lt" => Comparison::Lt(operand.clone()),
        "lte" => Comparison::Lte(operand.clone()),
        "ne" => Comparison::Ne(operand.clone()),
        "like" => match operand {
            JsonValue::String(pattern) => Comparison::Like {
                pattern: pattern.clone(),
                case_insensitive: false,
            },
            _ => {
                return Err(TranslationError::InvalidPattern {
                    field: field.to_string(),
                })
            }
        },
        "in" => match operand {
            JsonValue::Array(values) if values.iter().all(is_scalar) => {
                Comparison::In(values.clone())
            }
            _ => {
                return Err(TranslationError::InvalidInSet {
                    field: field.to_string(),
                })
            }
        },
        "between" => match operand {
            JsonValue::Array(bounds) if bounds.len() == 2 => {
                Comparison::Between(bounds[0].clone(), bounds[1].clone())
            }
            JsonValue::Array(bounds) => {
                return Err(TranslationError::BetweenArity {
                    field: field.to_string(),
                    got: bounds.len(),
                })
            }
            _ => {
                return Err(TranslationError::BetweenArity {
                    field: field.to_string(),
                    got: 1,
                })
            }
        },
        other => {
            return Err(TranslationError::UnknownOperator {
                field: field.to_string(),
                operator: other.to_string(),
            })
        }
    };
    Ok(comparison)
}

fn is_scalar(value: &JsonValue) -> bool {
    !matches!(value, JsonValue::Array(_) | JsonValue::Object(_))
}
