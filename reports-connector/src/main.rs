use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use futures::StreamExt;
use query_host::{Operator, Qual, QualValue, Quals, QueryData, Table};
use reports_connector::connectors::login_activity::{self, config::TABLE_NAME};
use reports_connector::registry::{find_table, get_all_tables};
use reports_connector::{load_config, ConnectorConfig};
use tracing::info;

/// Query Admin Reports login activity and print one JSON row per line.
///
/// The OAuth access token is read from `GOOGLE_ADMIN_ACCESS_TOKEN`.
#[derive(Debug, Parser)]
#[command(name = "login-activity", version)]
struct Args {
    /// TOML config file (defaults apply when omitted)
    #[arg(long)]
    config: Option<String>,

    /// Print the table definition instead of querying
    #[arg(long)]
    describe: bool,

    /// time = <RFC3339>
    #[arg(long)]
    at: Option<DateTime<Utc>>,

    /// time >= <RFC3339>
    #[arg(long)]
    since: Option<DateTime<Utc>>,

    /// time > <RFC3339>
    #[arg(long)]
    after: Option<DateTime<Utc>>,

    /// time <= <RFC3339>
    #[arg(long)]
    until: Option<DateTime<Utc>>,

    /// time < <RFC3339>
    #[arg(long)]
    before: Option<DateTime<Utc>>,

    #[arg(long)]
    actor_email: Option<String>,

    #[arg(long)]
    ip_address: Option<String>,

    #[arg(long)]
    event_name: Option<String>,

    /// Extra qualifier, e.g. `time>=2024-06-01T00:00:00Z` (repeatable)
    #[arg(long = "where", value_name = "COLUMN<OP>VALUE")]
    conditions: Vec<Qual>,

    /// Maximum rows to return
    #[arg(long)]
    limit: Option<u64>,
}

impl Args {
    fn query(&self) -> QueryData {
        let mut quals = Quals::new();
        let time = [
            (Operator::Eq, self.at),
            (Operator::Ge, self.since),
            (Operator::Gt, self.after),
            (Operator::Le, self.until),
            (Operator::Lt, self.before),
        ];
        for (op, value) in time {
            if let Some(t) = value {
                quals = quals.with("time", op, QualValue::Timestamp(t));
            }
        }

        let equality = [
            ("actor_email", &self.actor_email),
            ("ip_address", &self.ip_address),
            ("event_name", &self.event_name),
        ];
        for (column, value) in equality {
            if let Some(v) = value {
                quals = quals.with(column, Operator::Eq, QualValue::String(v.clone()));
            }
        }

        for qual in &self.conditions {
            quals.push(qual.clone());
        }

        QueryData::new(quals, self.limit)
    }
}

/// Table definition and column schema, without touching credentials.
fn describe() -> serde_json::Value {
    let definition = login_activity::definition();
    serde_json::json!({
        "table": definition.info,
        "columns": definition.schema(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries rows.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reports_connector=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.describe {
        println!("{}", serde_json::to_string_pretty(&describe())?);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ConnectorConfig::default(),
    };
    info!(
        base_url = %config.base_url,
        user_key = %config.user_key,
        max_total_results = config.max_total_results,
        "Configuration loaded"
    );

    let tables = get_all_tables(&config)?;
    let table = find_table(&tables, TABLE_NAME)
        .ok_or_else(|| anyhow!("Table {} is not registered", TABLE_NAME))?;
    let mut rows = table.list(&args.query())?;
    let mut count = 0u64;
    while let Some(row) = rows.next().await {
        let row = row.context("Failed to list login activities")?;
        println!("{}", serde_json::Value::Object(row));
        count += 1;
    }
    info!(rows = count, "Query complete");

    Ok(())
}
