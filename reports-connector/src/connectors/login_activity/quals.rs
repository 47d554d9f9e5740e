//! Qualifier translation: host quals → typed params → time window and
//! server-side filter expressions.

use anyhow::{bail, Result};
use chrono::{DateTime, Duration, Utc};
use query_host::{Operator, Quals};

/// Smallest step used to turn a strict bound into an inclusive one.
///
/// Matches the millisecond precision of the `startTime`/`endTime` wire format.
pub fn time_unit() -> Duration {
    Duration::milliseconds(1)
}

/// One `time <op> value` constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeQual {
    pub operator: Operator,
    pub value: DateTime<Utc>,
}

impl TimeQual {
    pub fn new(operator: Operator, value: DateTime<Utc>) -> Self {
        Self { operator, value }
    }
}

/// Qualifiers understood by the login activity list operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginActivityQuals {
    /// Time constraints in the order the host supplied them.
    pub time: Vec<TimeQual>,
    pub actor_email: Option<String>,
    pub ip_address: Option<String>,
    pub event_name: Option<String>,
}

impl LoginActivityQuals {
    /// Extracts the typed qualifiers from the host's qual map.
    ///
    /// Time quals without a timestamp value are skipped. For the equality
    /// columns the first non-empty value wins; `event_names` is accepted as
    /// an alias of `event_name`.
    ///
    /// Fails when an equality value cannot be embedded in a filter
    /// expression (see [`check_filter_value`]).
    pub fn from_quals(quals: &Quals) -> Result<Self> {
        let time = quals
            .get("time")
            .iter()
            .filter_map(|q| q.value.as_timestamp().map(|t| TimeQual::new(q.operator, t)))
            .collect();

        let equality = |column: &str, value: Option<&str>| -> Result<Option<String>> {
            value
                .map(|v| check_filter_value(column, v).map(|()| v.to_string()))
                .transpose()
        };

        Ok(Self {
            time,
            actor_email: equality("actor_email", quals.first_string_eq("actor_email"))?,
            ip_address: equality("ip_address", quals.first_string_eq("ip_address"))?,
            event_name: equality(
                "event_name",
                quals
                    .first_string_eq("event_name")
                    .or_else(|| quals.first_string_eq("event_names")),
            )?,
        })
    }

    /// Server-side filter expressions, one per present equality qualifier.
    pub fn filters(&self) -> Vec<String> {
        [
            ("actor.email", &self.actor_email),
            ("ipAddress", &self.ip_address),
            ("events.name", &self.event_name),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| filter_expression(field, v))
        })
        .collect()
    }
}

/// Rejects values that would break out of `field=="value"`.
///
/// `"` and `\` end or escape the quoted value, and `,` separates
/// expressions in the `filters` parameter.
pub fn check_filter_value(column: &str, value: &str) -> Result<()> {
    if let Some(c) = value.chars().find(|c| matches!(c, '"' | '\\' | ',')) {
        bail!(
            "unsupported character '{}' in {} qualifier value {:?}",
            c,
            column,
            value
        );
    }
    Ok(())
}

/// `field=="value"`.
pub fn filter_expression(field: &str, value: &str) -> String {
    format!("{}==\"{}\"", field, value)
}

/// Inclusive `[start, end]` window sent to the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Folds time constraints into one window.
    ///
    /// Starts from `[now - lookback, now]`; each constraint overwrites the
    /// bound(s) it touches, later ones winning. `>` and `<` exclude the value
    /// by one [`time_unit`]. Returns `None` when the result is empty
    /// (`start > end`) or a bound falls outside the representable range.
    pub fn resolve(time: &[TimeQual], now: DateTime<Utc>, lookback: Duration) -> Option<Self> {
        let mut start = now.checked_sub_signed(lookback);
        let mut end = Some(now);

        for qual in time {
            let t = qual.value;
            match qual.operator {
                Operator::Eq => {
                    start = Some(t);
                    end = Some(t);
                }
                Operator::Gt => start = t.checked_add_signed(time_unit()),
                Operator::Ge => start = Some(t),
                Operator::Lt => end = t.checked_sub_signed(time_unit()),
                Operator::Le => end = Some(t),
            }
        }

        match (start, end) {
            (Some(start), Some(end)) if start <= end => Some(Self { start, end }),
            _ => None,
        }
    }
}
