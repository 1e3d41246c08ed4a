use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console_core::{ConsoleClient, ReportInputs, ReportView};
use models::{
    domain::{ApiDuration, ApiTimestamp, ClientId, FlowId},
    flow::FlowResultsQuery,
};
use tracing::info;

mod config;

use config::{load_settings, prepare_api_base_url};

#[derive(Parser, Debug)]
struct Cli {
    /// Overrides the API base URL from console.toml / environment.
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the reports the backend can render.
    Reports,
    /// Render one report. Without --days the window is the default thirty
    /// days ending now.
    Report {
        name: String,
        #[arg(long)]
        days: Option<i64>,
        #[arg(long)]
        label: Option<String>,
    },
    /// List the client labels available for scoping reports.
    Labels,
    /// List the flows that ran on a client.
    Flows { client_id: String },
    /// Fetch one page of a flow's results.
    Results {
        client_id: String,
        flow_id: String,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 100)]
        count: i64,
        #[arg(long)]
        with_type: Option<String>,
        #[arg(long)]
        with_tag: Option<String>,
    },
    /// List flows scheduled on a client by one user.
    ScheduledFlows { client_id: String, creator: String },
    /// List the artifact descriptors known to the backend.
    Artifacts,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();
    let settings = load_settings();
    let api_base_url =
        prepare_api_base_url(cli.api_url.as_deref().unwrap_or(&settings.api_base_url))?;
    info!(api_base_url = api_base_url.as_str(), "console starting");

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.request_timeout_seconds))
        .build()?;
    let client = ConsoleClient::new_with_http_client(api_base_url, http);

    match cli.command {
        Command::Reports => {
            for report in client.list_reports().await? {
                println!("{} ({}) {}", report.name, report.report_type, report.title);
            }
        }
        Command::Report { name, days, label } => {
            let duration = days.map(ApiDuration::from_days);
            let start_time = duration.map(|window| ApiTimestamp::now() - window);
            let mut view = ReportView::new(client);
            view.apply_inputs(ReportInputs {
                name: Some(name.clone()),
                start_time,
                duration,
                client_label: label,
            })
            .await;
            match view.snapshot() {
                Some(snapshot) => {
                    if let Some(title) = &snapshot.title {
                        println!("{title}");
                    }
                    println!("{}", serde_json::to_string_pretty(&snapshot.data)?);
                }
                None => anyhow::bail!("report '{name}' could not be fetched"),
            }
        }
        Command::Labels => {
            for label in client.list_client_labels().await? {
                match label.owner {
                    Some(owner) => println!("{} (owner={owner})", label.name),
                    None => println!("{}", label.name),
                }
            }
        }
        Command::Flows { client_id } => {
            for flow in client.list_flows(&ClientId::new(client_id)).await? {
                let last_active = flow
                    .last_active_at
                    .to_datetime()
                    .map(|at| at.to_rfc3339())
                    .unwrap_or_else(|| flow.last_active_at.0.to_string());
                println!(
                    "{} {} state={:?} creator={} last_active={last_active}",
                    flow.flow_id, flow.name, flow.state, flow.creator
                );
            }
        }
        Command::Results {
            client_id,
            flow_id,
            offset,
            count,
            with_type,
            with_tag,
        } => {
            let mut query = FlowResultsQuery::new(offset, count);
            query.with_type = with_type;
            query.with_tag = with_tag;
            let result_set = client
                .fetch_result_set(&ClientId::new(client_id), &FlowId::new(flow_id), query)
                .await?;
            for item in &result_set.items {
                println!("{}", serde_json::to_string(&item.payload)?);
            }
            println!(
                "fetched {} results for filter {:?}",
                result_set.items.len(),
                result_set.query.filter_key()
            );
        }
        Command::ScheduledFlows { client_id, creator } => {
            for scheduled in client
                .list_scheduled_flows(&ClientId::new(client_id), &creator)
                .await?
            {
                println!(
                    "{} {} creator={}",
                    scheduled.scheduled_flow_id, scheduled.flow_name, scheduled.creator
                );
                if let Some(error) = scheduled.error {
                    println!("  error: {error}");
                }
            }
        }
        Command::Artifacts => {
            for artifact in client.list_artifacts().await? {
                let summary = artifact.doc.lines().next().unwrap_or_default();
                println!(
                    "{} [{} sources] {summary}",
                    artifact.name,
                    artifact.sources.len()
                );
            }
        }
    }

    Ok(())
}
