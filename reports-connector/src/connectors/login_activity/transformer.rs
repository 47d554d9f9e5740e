use query_host::{ColumnDef, ColumnType};
use serde_json::Value;

use crate::activity::{Activity, ActivityEvent};

/// Value of the `location` and `project` columns; login activity has no
/// regional or project scope.
pub const GLOBAL: &str = "global";

/// Name of the first event, empty when there are none.
pub fn first_event_name(events: &[ActivityEvent]) -> &str {
    events.first().map(|e| e.name.as_str()).unwrap_or("")
}

/// Non-empty event names in their original order.
pub fn event_names(events: &[ActivityEvent]) -> Vec<&str> {
    events
        .iter()
        .map(|e| e.name.as_str())
        .filter(|name| !name.is_empty())
        .collect()
}

/// `"<time>"`, or `"<time> - <email>"` when the actor has an email.
pub fn title(time: &str, actor_email: Option<&str>) -> String {
    match actor_email.filter(|email| !email.is_empty()) {
        Some(email) => format!("{} - {}", time, email),
        None => time.to_string(),
    }
}

fn activity_time(activity: &Activity) -> &str {
    activity.id.as_ref().map(|id| id.time.as_str()).unwrap_or("")
}

fn actor_email(activity: &Activity) -> Option<&str> {
    activity.actor.as_ref().map(|a| a.email.as_str())
}

/// Activity title: see [`title`].
pub fn activity_title(activity: &Activity) -> String {
    title(activity_time(activity), actor_email(activity))
}

fn string_or_null(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.to_string()))
}

fn non_empty_or_null(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        Value::String(value.to_string())
    }
}

/// Columns of the `gcp_admin_reports_login_activity` table.
pub fn columns() -> Vec<ColumnDef<Activity>> {
    vec![
        ColumnDef::new(
            "time",
            ColumnType::Timestamp,
            "Time of the activity (id.time), RFC3339.",
            |a: &Activity| non_empty_or_null(activity_time(a)),
        ),
        ColumnDef::new(
            "actor_email",
            ColumnType::String,
            "Email of the actor (actor.email).",
            |a: &Activity| string_or_null(a.actor.as_ref().map(|x| x.email.as_str())),
        ),
        ColumnDef::new(
            "event_name",
            ColumnType::String,
            "Name of the first event, e.g. login_success.",
            |a: &Activity| Value::String(first_event_name(&a.events).to_string()),
        ),
        ColumnDef::new(
            "unique_qualifier",
            ColumnType::String,
            "Unique qualifier of the activity (id.uniqueQualifier).",
            |a: &Activity| string_or_null(a.id.as_ref().map(|id| id.unique_qualifier.as_str())),
        ),
        ColumnDef::new(
            "application_name",
            ColumnType::String,
            "Report application name, always 'login'.",
            |a: &Activity| string_or_null(a.id.as_ref().map(|id| id.application_name.as_str())),
        ),
        ColumnDef::new(
            "actor_profile_id",
            ColumnType::String,
            "Profile ID of the actor (actor.profileId).",
            |a: &Activity| string_or_null(a.actor.as_ref().map(|x| x.profile_id.as_str())),
        ),
        ColumnDef::new(
            "actor_caller_type",
            ColumnType::String,
            "Caller type of the actor (actor.callerType).",
            |a: &Activity| string_or_null(a.actor.as_ref().map(|x| x.caller_type.as_str())),
        ),
        ColumnDef::new(
            "ip_address",
            ColumnType::String,
            "IP address associated with the activity.",
            |a: &Activity| Value::String(a.ip_address.clone()),
        ),
        ColumnDef::new(
            "events",
            ColumnType::Json,
            "Events of this activity with their parameters.",
            |a: &Activity| serde_json::to_value(&a.events).unwrap_or(Value::Null),
        ),
        ColumnDef::new(
            "title",
            ColumnType::String,
            "Title of the activity (time and actor email).",
            |a: &Activity| Value::String(activity_title(a)),
        ),
        ColumnDef::new(
            "tags",
            ColumnType::Json,
            "Event names of this activity.",
            |a: &Activity| Value::from(event_names(&a.events)),
        ),
        ColumnDef::new(
            "location",
            ColumnType::String,
            "Constant 'global'.",
            |_: &Activity| Value::String(GLOBAL.to_string()),
        ),
        ColumnDef::new(
            "project",
            ColumnType::String,
            "Constant 'global'; login activity is not tied to a project.",
            |_: &Activity| Value::String(GLOBAL.to_string()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityId, Actor};
    use query_host::TableDefinition;
    use serde_json::json;

    fn event(name: &str) -> ActivityEvent {
        ActivityEvent {
            event_type: "login".to_string(),
            name: name.to_string(),
            parameters: None,
        }
    }

    fn make_activity() -> Activity {
        Activity {
            id: Some(ActivityId {
                time: "2024-01-01T00:00:00Z".to_string(),
                unique_qualifier: "-77".to_string(),
                application_name: "login".to_string(),
                customer_id: "C01".to_string(),
            }),
            actor: Some(Actor {
                email: "a@b.com".to_string(),
                profile_id: "123".to_string(),
                caller_type: "USER".to_string(),
            }),
            ip_address: "198.51.100.4".to_string(),
            events: vec![event("login_success"), event(""), event("login_failure")],
        }
    }

    fn project(activity: &Activity) -> query_host::Row {
        TableDefinition {
            info: crate::connectors::login_activity::table_info(),
            columns: columns(),
        }
        .project(activity)
    }

    #[test]
    fn test_event_names() {
        assert!(event_names(&[]).is_empty());
        let events = vec![event("login_success"), event(""), event("login_failure")];
        assert_eq!(event_names(&events), vec!["login_success", "login_failure"]);
    }

    #[test]
    fn test_first_event_name() {
        assert_eq!(first_event_name(&[]), "");
        assert_eq!(first_event_name(&[event("logout"), event("login_success")]), "logout");
    }

    #[test]
    fn test_title() {
        assert_eq!(
            title("2024-01-01T00:00:00Z", Some("a@b.com")),
            "2024-01-01T00:00:00Z - a@b.com"
        );
        assert_eq!(title("2024-01-01T00:00:00Z", None), "2024-01-01T00:00:00Z");
        assert_eq!(title("2024-01-01T00:00:00Z", Some("")), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_project_full_activity() {
        let row = project(&make_activity());

        assert_eq!(row.len(), 13);
        assert_eq!(row["time"], "2024-01-01T00:00:00Z");
        assert_eq!(row["actor_email"], "a@b.com");
        assert_eq!(row["event_name"], "login_success");
        assert_eq!(row["unique_qualifier"], "-77");
        assert_eq!(row["application_name"], "login");
        assert_eq!(row["actor_profile_id"], "123");
        assert_eq!(row["actor_caller_type"], "USER");
        assert_eq!(row["ip_address"], "198.51.100.4");
        assert_eq!(row["title"], "2024-01-01T00:00:00Z - a@b.com");
        assert_eq!(row["tags"], json!(["login_success", "login_failure"]));
        assert_eq!(row["location"], "global");
        assert_eq!(row["project"], "global");
        assert_eq!(row["events"][0], json!({"type": "login", "name": "login_success"}));
        assert_eq!(row["events"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_project_sparse_activity() {
        let activity = Activity {
            id: Some(ActivityId {
                time: "2024-01-01T00:00:00Z".to_string(),
                ..Default::default()
            }),
            ..Default::default()
        };
        let row = project(&activity);

        assert_eq!(row["title"], "2024-01-01T00:00:00Z");
        assert_eq!(row["actor_email"], Value::Null);
        assert_eq!(row["actor_caller_type"], Value::Null);
        assert_eq!(row["event_name"], "");
        assert_eq!(row["tags"], json!([]));
        assert_eq!(row["events"], json!([]));
        assert_eq!(row["location"], "global");
    }

    #[test]
    fn test_project_empty_activity() {
        let row = project(&Activity::default());
        assert_eq!(row["time"], Value::Null);
        assert_eq!(row["unique_qualifier"], Value::Null);
        assert_eq!(row["title"], "");
    }
}
