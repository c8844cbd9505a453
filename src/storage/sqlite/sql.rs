//! SQL rendering for the sqlite engine: DDL from table definitions and
//! parameterized statements from canonical predicates.

use crate::domain::condition::{Comparison, Constraint, Direction, Predicate};
use crate::domain::schema::{DefaultValue, FieldDescriptor, FieldType, IndexSpec, TableDefinition};
use crate::domain::Record;
use crate::storage::engine::Query;
use serde_json::Value as JsonValue;
use sqlx::{QueryBuilder, Sqlite};

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn field_type_to_sql(t: FieldType) -> &'static str {
    match t {
        FieldType::Integer | FieldType::BigInt => "INTEGER",
        FieldType::Float => "REAL",
        FieldType::Boolean => "BOOLEAN",
        FieldType::String => "VARCHAR(255)",
        FieldType::Text => "TEXT",
        FieldType::Date => "DATETIME",
        FieldType::Json => "JSON",
        FieldType::Uuid => "CHAR(36)",
    }
}

fn default_to_sql(default: &DefaultValue) -> Option<String> {
    match default {
        DefaultValue::Value(JsonValue::Null) => Some("NULL".to_string()),
        DefaultValue::Value(JsonValue::Bool(b)) => Some(if *b { "1" } else { "0" }.to_string()),
        DefaultValue::Value(JsonValue::Number(n)) => Some(n.to_string()),
        DefaultValue::Value(JsonValue::String(s)) => Some(quote_literal(s)),
        DefaultValue::Value(other) => Some(quote_literal(&other.to_string())),
        // Filled in by the façade at insert time.
        DefaultValue::Now => None,
    }
}

fn column_sql(name: &str, descriptor: &FieldDescriptor, inline_pk: bool) -> String {
    let mut sql = format!("{} {}", quote_ident(name), field_type_to_sql(descriptor.field_type));
    if inline_pk {
        sql.push_str(" PRIMARY KEY");
        let integer = matches!(descriptor.field_type, FieldType::Integer | FieldType::BigInt);
        if descriptor.auto_increment && integer {
            sql.push_str(" AUTOINCREMENT");
        }
    }
    if !descriptor.nullable || descriptor.primary_key {
        sql.push_str(" NOT NULL");
    }
    if descriptor.unique && !descriptor.primary_key {
        sql.push_str(" UNIQUE");
    }
    if let Some(default) = descriptor.default.as_ref().and_then(default_to_sql) {
        sql.push_str(" DEFAULT ");
        sql.push_str(&default);
    }
    sql
}

pub fn create_table_sql(definition: &TableDefinition) -> String {
    let primary_keys = definition.primary_keys();
    let inline_pk = primary_keys.len() == 1;

    let mut parts: Vec<String> = definition
        .fields()
        .iter()
        .map(|(name, d)| column_sql(name, d, inline_pk && d.primary_key))
        .collect();

    if primary_keys.len() > 1 {
        let cols: Vec<String> = primary_keys.iter().map(|c| quote_ident(c)).collect();
        parts.push(format!("PRIMARY KEY ({})", cols.join(", ")));
    }

    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(definition.storage_name()),
        parts.join(", ")
    )
}

pub fn create_index_sql(storage_name: &str, index: &IndexSpec) -> String {
    let index_name = format!("{}_{}", storage_name, index.fields.join("_"));
    let cols: Vec<String> = index.fields.iter().map(|c| quote_ident(c)).collect();
    format!(
        "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
        if index.unique { "UNIQUE " } else { "" },
        quote_ident(&index_name),
        quote_ident(storage_name),
        cols.join(", ")
    )
}

/// Binds a JSON value using the closest sqlite storage class.
pub fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &JsonValue) {
    match value {
        JsonValue::Null => {
            builder.push_bind(Option::<String>::None);
        }
        JsonValue::Bool(b) => {
            builder.push_bind(*b);
        }
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                builder.push_bind(i);
            } else if let Some(f) = n.as_f64() {
                builder.push_bind(f);
            } else {
                builder.push_bind(n.to_string());
            }
        }
        JsonValue::String(s) => {
            builder.push_bind(s.clone());
        }
        other => {
            builder.push_bind(other.to_string());
        }
    }
}

/// Like [`push_value`], but JSON fields are always stored as JSON text.
pub fn push_field_value(
    builder: &mut QueryBuilder<'_, Sqlite>,
    descriptor: Option<&FieldDescriptor>,
    value: &JsonValue,
) {
    match descriptor {
        Some(d) if d.field_type == FieldType::Json && !value.is_null() => {
            builder.push_bind(value.to_string());
        }
        _ => push_value(builder, value),
    }
}

fn push_binary(
    builder: &mut QueryBuilder<'_, Sqlite>,
    col: &str,
    op: &str,
    descriptor: Option<&FieldDescriptor>,
    value: &JsonValue,
) {
    builder.push(format!("{} {} ", col, op));
    push_field_value(builder, descriptor, value);
}

fn push_constraint(
    builder: &mut QueryBuilder<'_, Sqlite>,
    definition: &TableDefinition,
    constraint: &Constraint,
) {
    let col = quote_ident(&constraint.field);
    // Operands are bound the same way the column was written.
    let descriptor = definition.field(&constraint.field);
    match &constraint.comparison {
        Comparison::Eq(JsonValue::Null) => {
            builder.push(format!("{} IS NULL", col));
        }
        Comparison::Ne(JsonValue::Null) => {
            builder.push(format!("{} IS NOT NULL", col));
        }
        Comparison::Eq(v) => push_binary(builder, &col, "=", descriptor, v),
        Comparison::Ne(v) => push_binary(builder, &col, "<>", descriptor, v),
        Comparison::Gt(v) => push_binary(builder, &col, ">", descriptor, v),
        Comparison::Gte(v) => push_binary(builder, &col, ">=", descriptor, v),
        Comparison::Lt(v) => push_binary(builder, &col, "<", descriptor, v),
        Comparison::Lte(v) => push_binary(builder, &col, "<=", descriptor, v),
        Comparison::Like {
            pattern,
            case_insensitive: true,
        } => {
            builder.push(format!("LOWER({}) LIKE LOWER(", col));
            builder.push_bind(pattern.clone());
            builder.push(")");
        }
        Comparison::Like { pattern, .. } => {
            builder.push(format!("{} LIKE ", col));
            builder.push_bind(pattern.clone());
        }
        Comparison::In(values) if values.is_empty() => {
            builder.push("1 = 0");
        }
        Comparison::In(values) => {
            builder.push(format!("{} IN (", col));
            for (idx, v) in values.iter().enumerate() {
                if idx > 0 {
                    builder.push(", ");
                }
                push_field_value(builder, descriptor, v);
            }
            builder.push(")");
        }
        Comparison::Between(low, high) => {
            builder.push(format!("{} BETWEEN ", col));
            push_field_value(builder, descriptor, low);
            builder.push(" AND ");
            push_field_value(builder, descriptor, high);
        }
    }
}

pub fn push_where(
    builder: &mut QueryBuilder<'_, Sqlite>,
    definition: &TableDefinition,
    predicate: &Predicate,
) {
    if predicate.is_match_all() {
        return;
    }
    builder.push(" WHERE ");
    for (idx, constraint) in predicate.constraints().iter().enumerate() {
        if idx > 0 {
            builder.push(" AND ");
        }
        push_constraint(builder, definition, constraint);
    }
}

pub fn select(definition: &TableDefinition, query: &Query) -> QueryBuilder<'static, Sqlite> {
    let columns = match &query.attributes {
        Some(attrs) if !attrs.is_empty() => attrs
            .iter()
            .map(|a| quote_ident(a))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "*".to_string(),
    };

    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM {}",
        columns,
        quote_ident(definition.storage_name())
    ));
    push_where(&mut builder, definition, &query.predicate);

    if !query.order.is_empty() {
        let order: Vec<String> = query
            .order
            .iter()
            .map(|o| {
                let dir = match o.direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                format!("{} {}", quote_ident(&o.field), dir)
            })
            .collect();
        builder.push(format!(" ORDER BY {}", order.join(", ")));
    }

    if let Some(window) = query.window {
        builder.push(" LIMIT ");
        builder.push_bind(i64::try_from(window.limit).unwrap_or(i64::MAX));
        builder.push(" OFFSET ");
        builder.push_bind(i64::try_from(window.offset).unwrap_or(i64::MAX));
    }
    builder
}

pub fn insert(definition: &TableDefinition, record: &Record) -> QueryBuilder<'static, Sqlite> {
    let table = quote_ident(definition.storage_name());
    if record.is_empty() {
        return QueryBuilder::new(format!("INSERT INTO {} DEFAULT VALUES RETURNING *", table));
    }

    let columns: Vec<String> = record.keys().map(|k| quote_ident(k)).collect();
    let mut builder = QueryBuilder::new(format!(
        "INSERT INTO {} ({}) VALUES (",
        table,
        columns.join(", ")
    ));
    for (idx, (name, value)) in record.iter().enumerate() {
        if idx > 0 {
            builder.push(", ");
        }
        push_field_value(&mut builder, definition.field(name), value);
    }
    builder.push(") RETURNING *");
    builder
}

pub fn update(
    definition: &TableDefinition,
    changes: &Record,
    predicate: &Predicate,
) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!(
        "UPDATE {} SET ",
        quote_ident(definition.storage_name())
    ));
    for (idx, (name, value)) in changes.iter().enumerate() {
        if idx > 0 {
            builder.push(", ");
        }
        builder.push(format!("{} = ", quote_ident(name)));
        push_field_value(&mut builder, definition.field(name), value);
    }
    push_where(&mut builder, definition, predicate);
    builder
}

pub fn delete(
    definition: &TableDefinition,
    predicate: &Predicate,
) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!(
        "DELETE FROM {}",
        quote_ident(definition.storage_name())
    ));
    push_where(&mut builder, definition, predicate);
    builder
}

pub fn count(
    definition: &TableDefinition,
    predicate: &Predicate,
) -> QueryBuilder<'static, Sqlite> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT COUNT(*) AS count FROM {}",
        quote_ident(definition.storage_name())
    ));
    push_where(&mut builder, definition, predicate);
    builder
}
