use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;


/// Comparison operator of a pushed-down qualifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
}

impl Operator {
    /// Every operator, in the order hosts usually advertise them.
    pub const ALL: &'static [Operator] = &[
        Operator::Gt,
        Operator::Ge,
        Operator::Lt,
        Operator::Le,
        Operator::Eq,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a host hands over an operator string we do not model.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported qualifier operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for Operator {
    type Err = UnknownOperator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" | "==" => Ok(Operator::Eq),
            ">" => Ok(Operator::Gt),
            ">=" => Ok(Operator::Ge),
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            other => Err(UnknownOperator(other.to_string())),
        }
    }
}

/// Value carried by a qualifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QualValue {
    Timestamp(DateTime<Utc>),
    Int(i64),
    String(String),
}

impl QualValue {
    /// Types a raw value: RFC3339 timestamp, then integer, else string.
    pub fn infer(raw: &str) -> Self {
        if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
            QualValue::Timestamp(t.with_timezone(&Utc))
        } else if let Ok(n) = raw.parse::<i64>() {
            QualValue::Int(n)
        } else {
            QualValue::String(raw.to_string())
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            QualValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            QualValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A single `column <op> value` constraint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Qual {
    pub column: String,
    pub operator: Operator,
    pub value: QualValue,
}

impl Qual {
    pub fn new(column: impl Into<String>, operator: Operator, value: QualValue) -> Self {
        Self {
            column: column.into(),
            operator,
            value,
        }
    }
}

/// Error returned when a `column<op>value` expression cannot be parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseQualError {
    /// No operator, or an empty column or value.
    Malformed(String),
    Operator(UnknownOperator),
}

impl fmt::Display for ParseQualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseQualError::Malformed(expr) => {
                write!(f, "expected COLUMN<OP>VALUE, got '{}'", expr)
            }
            ParseQualError::Operator(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for ParseQualError {}

impl From<UnknownOperator> for ParseQualError {
    fn from(e: UnknownOperator) -> Self {
        ParseQualError::Operator(e)
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | '!')
}

/// Parses `column<op>value`, e.g. `time>=2024-06-01T00:00:00Z`.
///
/// The operator is the run of `= < > !` after the column name; the value is
/// typed with [`QualValue::infer`].
impl FromStr for Qual {
    type Err = ParseQualError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseQualError::Malformed(s.to_string());

        let op_start = s.find(is_operator_char).ok_or_else(malformed)?;
        let rest = &s[op_start..];
        let op_len = rest.find(|c: char| !is_operator_char(c)).unwrap_or(rest.len());
        let (op, value) = rest.split_at(op_len);

        let column = s[..op_start].trim();
        let value = value.trim();
        if column.is_empty() || value.is_empty() {
            return Err(malformed());
        }

        Ok(Qual::new(column, op.parse()?, QualValue::infer(value)))
    }
}

/// Qualifiers grouped by column, in the order the host supplied them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Quals {
    by_column: BTreeMap<String, Vec<Qual>>,
}

impl Quals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a qualifier; order within a column is preserved.
    pub fn push(&mut self, qual: Qual) {
        self.by_column
            .entry(qual.column.clone())
            .or_default()
            .push(qual);
    }

    /// Builder-style [`Quals::push`].
    pub fn with(mut self, column: &str, operator: Operator, value: QualValue) -> Self {
        self.push(Qual::new(column, operator, value));
        self
    }

    /// Qualifiers for `column`, empty when none were supplied.
    pub fn get(&self, column: &str) -> &[Qual] {
        self.by_column
            .get(column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First non-empty string value under an equality qualifier on `column`.
    pub fn first_string_eq(&self, column: &str) -> Option<&str> {
        self.get(column)
            .iter()
            .filter(|q| q.operator == Operator::Eq)
            .filter_map(|q| q.value.as_str())
            .find(|s| !s.is_empty())
    }

}
