use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Composite key of an activity.
///
/// `(time, unique_qualifier)` identifies one logical event.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityId {
    /// RFC3339 timestamp of the activity.
    pub time: String,
    /// Disambiguates activities sharing a timestamp.
    pub unique_qualifier: String,
    /// Report application, always `login` for this connector.
    pub application_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub customer_id: String,
}

/// User (or system) that performed the activity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Actor {
    /// Empty for system-generated events.
    pub email: String,
    pub profile_id: String,
    pub caller_type: String,
}

/// Named sub-event of an activity (e.g. `login_success`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityEvent {
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub event_type: String,
    pub name: String,
    /// Event parameters, passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// One login activity record as returned by the Reports API.
///
/// Every sub-structure is optional on the wire; missing parts deserialize to
/// `None` or empty values rather than failing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    pub id: Option<ActivityId>,
    pub actor: Option<Actor>,
    pub ip_address: String,
    pub events: Vec<ActivityEvent>,
}

/// One page of a list call.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityPage {
    pub items: Vec<Activity>,
    /// Absent or empty on the last page.
    pub next_page_token: Option<String>,
}

impl ActivityPage {
    /// Continuation token, `None` when this is the last page.
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}
