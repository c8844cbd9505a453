//! Query conditions and their translation into the canonical predicate.

pub mod predicate;
pub mod spec;
pub mod translate;

pub use predicate::{Comparison, Constraint, Direction, OrderBy, Predicate, Window};
pub use spec::{Condition, ConditionSpec, OperatorFilters};
pub use translate::{
    parse_page_param, translate, translate_paginated, translate_spec, window_for,
    TranslationError,
};
