use rusqlite::types::ValueRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One SQL value, comparable and hashable so whole rows can go into sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    /// Stored as the bit pattern of the `f64`, with `-0.0` folded into `0.0`.
    Real(RealBits),
    Text(String),
    Blob(Vec<u8>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "f64", from = "f64")]
pub struct RealBits(u64);

impl From<f64> for RealBits {
    fn from(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        RealBits(v.to_bits())
    }
}

impl From<RealBits> for f64 {
    fn from(v: RealBits) -> f64 {
        f64::from_bits(v.0)
    }
}

impl Cell {
    pub fn real(v: f64) -> Self {
        Cell::Real(RealBits::from(v))
    }

    pub fn from_value_ref(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(i) => Cell::Integer(i),
            ValueRef::Real(f) => Cell::real(f),
            ValueRef::Text(t) => Cell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Cell::Blob(b.to_vec()),
        }
    }

    pub fn render(&self) -> String {
        match self {
            Cell::Null => "NULL".into(),
            Cell::Integer(i) => i.to_string(),
            Cell::Real(r) => f64::from(*r).to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Blob(b) => format!("x'{}'", hex::encode(b)),
        }
    }
}

pub type Row = Vec<Cell>;

/// How two result sets are compared when grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareMode {
    /// Row order and duplicate multiplicity are ignored.
    #[default]
    Set,
    /// Row order is ignored, duplicate counts must match.
    Bag,
}

/// Rows returned by one statement, in the order SQLite produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn distinct(&self) -> HashSet<&Row> {
        self.rows.iter().collect()
    }

    fn counts(&self) -> HashMap<&Row, usize> {
        let mut m = HashMap::new();
        for r in &self.rows {
            *m.entry(r).or_insert(0) += 1;
        }
        m
    }

    /// Compares row contents only. Column names are not part of the answer.
    pub fn matches(&self, other: &RowSet, mode: CompareMode) -> bool {
        match mode {
            CompareMode::Set => self.distinct() == other.distinct(),
            CompareMode::Bag => self.counts() == other.counts(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "columns": self.columns,
            "rows": self.rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rs(rows: Vec<Vec<Cell>>) -> RowSet {
        RowSet::new(vec!["a".into()], rows)
    }

    #[test]
    fn set_ignores_order_and_duplicates() {
        let a = rs(vec![vec![Cell::Integer(1)], vec![Cell::Integer(2)]]);
        let b = rs(vec![
            vec![Cell::Integer(2)],
            vec![Cell::Integer(1)],
            vec![Cell::Integer(2)],
        ]);
        assert!(a.matches(&b, CompareMode::Set));
        assert!(!a.matches(&b, CompareMode::Bag));
    }

    #[test]
    fn different_values_do_not_match() {
        let a = rs(vec![vec![Cell::Integer(1)]]);
        let b = rs(vec![vec![Cell::Integer(9)]]);
        assert!(!a.matches(&b, CompareMode::Set));
    }

    #[test]
    fn integer_and_real_are_distinct() {
        let a = rs(vec![vec![Cell::Integer(1)]]);
        let b = rs(vec![vec![Cell::real(1.0)]]);
        assert!(!a.matches(&b, CompareMode::Set));
    }

    #[test]
    fn negative_zero_equals_zero() {
        assert_eq!(Cell::real(-0.0), Cell::real(0.0));
    }

    #[test]
    fn empty_sets_match() {
        assert!(RowSet::default().matches(&rs(vec![]), CompareMode::Set));
    }

    #[test]
    fn json_shape() {
        let r = RowSet::new(
            vec!["id".into(), "name".into()],
            vec![vec![Cell::Integer(1), Cell::Text("x".into())], vec![Cell::Null, Cell::real(2.5)]],
        );
        let v = r.to_json();
        assert_eq!(v["columns"][1], "name");
        assert_eq!(v["rows"][0][1], "x");
        assert!(v["rows"][1][0].is_null());
        assert_eq!(v["rows"][1][1], 2.5);
    }
}
