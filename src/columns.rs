//! Cell values handed from commands to formatters.
//!
//! Plain cells are JSON values. Formatted cells carry two renderings: a
//! human-readable one for the table/value/shell output and a machine-readable
//! one for JSON/YAML/CSV.

use std::cmp::Ordering;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// A value with distinct human and machine renderings.
pub trait FormattableColumn {
    fn human_readable(&self) -> String;

    fn machine_readable(&self) -> Value;

    fn to_cell(&self) -> Cell {
        Cell::Formatted {
            human: self.human_readable(),
            machine: self.machine_readable(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Value(Value),
    Formatted { human: String, machine: Value },
}

impl Cell {
    pub fn null() -> Self {
        Cell::Value(Value::Null)
    }

    pub fn human_readable(&self) -> String {
        match self {
            Cell::Value(v) => value_text(v),
            Cell::Formatted { human, .. } => human.clone(),
        }
    }

    pub fn machine_readable(&self) -> &Value {
        match self {
            Cell::Value(v) => v,
            Cell::Formatted { machine, .. } => machine,
        }
    }

    /// Machine-readable value rendered as text (strings unquoted).
    pub fn machine_text(&self) -> String {
        value_text(self.machine_readable())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Cell::Value(Value::Number(_)))
    }

    pub fn is_null(&self) -> bool {
        self.machine_readable().is_null()
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.machine_readable().serialize(serializer)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.human_readable())
    }
}

impl From<Value> for Cell {
    fn from(v: Value) -> Self {
        Cell::Value(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Value(Value::String(v.to_string()))
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Value(Value::String(v))
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Value(Value::Bool(v))
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Value(Value::from(v))
    }
}

impl From<u64> for Cell {
    fn from(v: u64) -> Self {
        Cell::Value(Value::from(v))
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Value(Value::from(v))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Value(Value::from(v))
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or_else(Cell::null)
    }
}

/// Compare two non-null cells of the same kind; `None` when the kinds differ.
pub fn compare_cells(a: &Cell, b: &Cell) -> Option<Ordering> {
    match (a.machine_readable(), b.machine_readable()) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64()?, y.as_f64()?);
            x.partial_cmp(&y)
        }
        _ => None,
    }
}
