//! SQL text generation for the facade operations.
//!
//! # Responsibility
//! - Build every statement the facade executes, in one place.
//!
//! # Invariants
//! - Table names, field lists and condition clauses are caller-trusted and
//!   interpolated verbatim. They are never escaped or validated.
//! - Only `DataField` values are bound, positionally, in field order.
//! - A missing or blank condition clause appends nothing, so update and
//!   delete without an id or clause target the whole table.

use rusqlite::types::Value;

/// One `field = value` pair for insert and update.
#[derive(Debug, Clone, PartialEq)]
pub struct DataField {
    pub field: String,
    pub value: Value,
}

impl DataField {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn text(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, Value::Text(value.into()))
    }

    pub fn null(field: impl Into<String>) -> Self {
        Self::new(field, Value::Null)
    }
}

/// SQL text plus the values bound to its `?` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    fn plain(sql: String) -> Self {
        Self {
            sql,
            params: Vec::new(),
        }
    }
}

/// Row selector for update and delete.
///
/// A non-zero id wins over any clause, mirroring the `WHERE id=<id>` shortcut.
/// An id of `0` counts as absent, so the clause is used instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<'a> {
    Id(i64),
    Condition(Option<&'a str>),
}

impl<'a> Target<'a> {
    pub fn from_parts(id: Option<i64>, condition: Option<&'a str>) -> Self {
        match id {
            Some(id) if id != 0 => Self::Id(id),
            _ => Self::Condition(condition),
        }
    }

    fn render(self) -> String {
        match self {
            Self::Id(id) => format!(" WHERE id={id}"),
            Self::Condition(condition) => clause(condition),
        }
    }
}

fn clause(condition: Option<&str>) -> String {
    match condition.map(str::trim) {
        Some(text) if !text.is_empty() => format!(" {text}"),
        _ => String::new(),
    }
}

/// `SELECT <fields> FROM <table> [<condition>]`, fields default to `*`.
pub fn select(table: &str, fields: Option<&str>, condition: Option<&str>) -> Statement {
    let fields = fields.unwrap_or("*");
    Statement::plain(format!("SELECT {fields} FROM {table}{}", clause(condition)))
}

/// `INSERT INTO <table> (<fields>) VALUES (?, ...)`.
///
/// Returns `None` for an empty field list.
pub fn insert(table: &str, data: &[DataField]) -> Option<Statement> {
    if data.is_empty() {
        return None;
    }

    let fields = data
        .iter()
        .map(|item| item.field.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let holders = vec!["?"; data.len()].join(", ");

    Some(Statement {
        sql: format!("INSERT INTO {table} ({fields}) VALUES ({holders})"),
        params: bound_values(data),
    })
}

/// `UPDATE <table> SET <field> = ?, ... <target>`.
///
/// Returns `None` for an empty field list.
pub fn update(table: &str, data: &[DataField], target: Target<'_>) -> Option<Statement> {
    if data.is_empty() {
        return None;
    }

    let assignments = data
        .iter()
        .map(|item| format!("{} = ?", item.field))
        .collect::<Vec<_>>()
        .join(", ");

    Some(Statement {
        sql: format!("UPDATE {table} SET {assignments}{}", target.render()),
        params: bound_values(data),
    })
}

/// `DELETE FROM <table> <target>`.
pub fn delete(table: &str, target: Target<'_>) -> Statement {
    Statement::plain(format!("DELETE FROM {table}{}", target.render()))
}

/// `DELETE FROM <table>` followed by `VACUUM`, in execution order.
pub fn truncate(table: &str) -> [Statement; 2] {
    [
        Statement::plain(format!("DELETE FROM {table}")),
        Statement::plain("VACUUM".to_string()),
    ]
}

/// `DROP TABLE [IF EXISTS] <table>`.
pub fn drop_table(table: &str, if_exists: bool) -> Statement {
    if if_exists {
        Statement::plain(format!("DROP TABLE IF EXISTS {table}"))
    } else {
        Statement::plain(format!("DROP TABLE {table}"))
    }
}

fn bound_values(data: &[DataField]) -> Vec<Value> {
    data.iter().map(|item| item.value.clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::{delete, drop_table, insert, select, truncate, update, DataField, Target};
    use rusqlite::types::Value;

    #[test]
    fn select_defaults_to_star_and_skips_blank_clause() {
        assert_eq!(select("t", None, None).sql, "SELECT * FROM t");
        assert_eq!(select("t", Some("a, b"), Some("  ")).sql, "SELECT a, b FROM t");
        assert_eq!(
            select("t", None, Some("WHERE id = 1")).sql,
            "SELECT * FROM t WHERE id = 1"
        );
    }

    #[test]
    fn insert_binds_values_in_field_order() {
        let stmt = insert("t", &[DataField::new("a", 1), DataField::new("b", 2)]).unwrap();
        assert_eq!(stmt.sql, "INSERT INTO t (a, b) VALUES (?, ?)");
        assert_eq!(stmt.params, vec![Value::Integer(1), Value::Integer(2)]);
        assert!(insert("t", &[]).is_none());
    }

    #[test]
    fn update_prefers_id_over_condition() {
        let data = [DataField::new("a", 5)];

        let by_id = update("t", &data, Target::from_parts(Some(7), Some("WHERE b=2"))).unwrap();
        assert_eq!(by_id.sql, "UPDATE t SET a = ? WHERE id=7");
        assert_eq!(by_id.params, vec![Value::Integer(5)]);

        let by_clause = update("t", &data, Target::from_parts(None, Some("WHERE b=2"))).unwrap();
        assert_eq!(by_clause.sql, "UPDATE t SET a = ? WHERE b=2");

        let zero_id = update("t", &data, Target::from_parts(Some(0), Some("WHERE b=2"))).unwrap();
        assert_eq!(zero_id.sql, "UPDATE t SET a = ? WHERE b=2");

        let whole_table = update("t", &data, Target::from_parts(None, None)).unwrap();
        assert_eq!(whole_table.sql, "UPDATE t SET a = ?");

        assert!(update("t", &[], Target::Id(1)).is_none());
    }

    #[test]
    fn delete_mirrors_update_targeting() {
        assert_eq!(delete("t", Target::Id(3)).sql, "DELETE FROM t WHERE id=3");
        assert_eq!(
            delete("t", Target::Condition(Some("WHERE done = 1"))).sql,
            "DELETE FROM t WHERE done = 1"
        );
        assert_eq!(delete("t", Target::Condition(Some(""))).sql, "DELETE FROM t");
        assert_eq!(
            delete("t", Target::from_parts(Some(0), Some("WHERE b=3"))).sql,
            "DELETE FROM t WHERE b=3"
        );
    }

    #[test]
    fn truncate_and_drop_shapes() {
        let [first, second] = truncate("t");
        assert_eq!(first.sql, "DELETE FROM t");
        assert_eq!(second.sql, "VACUUM");

        assert_eq!(drop_table("t", true).sql, "DROP TABLE IF EXISTS t");
        assert_eq!(drop_table("t", false).sql, "DROP TABLE t");
    }
}
