use std::io::Read;
use std::sync::Arc;

use agentdna_core::{
    diff_words, inspect, AgentProfile, AgentSummary, CoreConfig, DashboardOverview,
    DashboardService, EmailSearch, HttpChainClient, InspectReport, InteractionCard,
    JsonFileNameCache, NormalizedInteraction, WordDiffResult,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "agentdna")]
#[command(about = "AgentDNA dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List agents with headline counts
    Agents,
    /// Show an agent's interaction history
    Agent {
        /// Agent identifier
        id: String,
    },
    /// Find agents registered under an email address
    Search {
        /// Owner email address
        email: String,
    },
    /// Compare the words of two messages
    Diff {
        /// Message as originally sent
        original: String,
        /// Message as received
        received: String,
    },
    /// Normalize and classify a raw interaction payload
    Inspect {
        /// Payload JSON, or `-` to read it from stdin
        payload: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agentdna=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Agents) => {
            let service = dashboard()?;
            print!("{}", render_overview(&service.overview().await));
        }
        Some(Commands::Agent { id }) => {
            let service = dashboard()?;
            match service.agent_profile(&id).await {
                Ok(profile) => print!("{}", render_profile(&profile)),
                Err(e) => eprintln!("Error loading agent {}: {}", id, e),
            }
        }
        Some(Commands::Search { email }) => {
            let service = dashboard()?;
            match service.search_by_email(&email).await {
                Ok(search) => print!("{}", render_search(&search)),
                Err(e) => eprintln!("Error searching for {}: {}", email, e),
            }
        }
        Some(Commands::Diff { original, received }) => {
            print!("{}", render_diff(&diff_words(&original, &received)));
        }
        Some(Commands::Inspect { payload }) => {
            let payload = if payload == "-" {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            } else {
                payload
            };
            print!("{}", render_inspect(&inspect(&payload)));
        }
        None => {
            println!("Use 'agentdna --help' for commands");
        }
    }

    Ok(())
}

fn dashboard() -> anyhow::Result<DashboardService> {
    let cfg = CoreConfig::from_lookup(|key| std::env::var(key).ok())?;
    tracing::debug!("using chain connector at {}", cfg.chain_connector_url());

    let chain = HttpChainClient::new(&cfg)?;
    let names = JsonFileNameCache::open(cfg.name_cache_path());
    Ok(DashboardService::new(Arc::new(chain), Arc::new(names)))
}

// ============================================================================
// Text rendering
// ============================================================================

fn render_overview(view: &DashboardOverview) -> String {
    let m = view.metrics;
    let mut out = format!(
        "Agents secured: {}\nTotal interactions: {}\nIntrusions detected: {}\n",
        m.agents_secured, m.total_interactions, m.intrusions
    );
    if view.agents.is_empty() {
        out.push_str("\nNo agents found.\n");
    } else {
        out.push('\n');
        out.push_str(&render_agents(&view.agents));
    }
    out
}

fn render_agents(agents: &[AgentSummary]) -> String {
    agents
        .iter()
        .map(|a| format!("{}  ({})\n", a.display_name, a.id))
        .collect()
}

fn render_profile(profile: &AgentProfile) -> String {
    let m = profile.metrics;
    let mut out = format!(
        "{} ({})\nInteractions: {}  Flagged: {}  Clear: {}\n",
        profile.display_name, profile.id, m.total, m.flagged, m.clear
    );
    if profile.interactions.is_empty() {
        out.push_str("\nNo interactions recorded.\n");
    }
    for card in &profile.interactions {
        out.push('\n');
        out.push_str(&render_card(card));
    }
    out
}

fn render_card(card: &InteractionCard) -> String {
    let mut out = format!(
        "[{}] block {} at {}\n",
        card.classification, card.block_no, card.time
    );
    out.push_str(&render_messages(&card.interaction));
    out.push_str(&format!("  Reason:   {}\n", card.reason));
    if !card.diff.is_empty() {
        out.push_str(&indent(&render_diff(&card.diff)));
    }
    out
}

fn render_messages(interaction: &NormalizedInteraction) -> String {
    let mut out = format!(
        "  Original: {}\n  Received: {}\n  Response: {}\n",
        interaction.original_message,
        interaction.received_message,
        interaction.response_message
    );
    if let Some(agent) = &interaction.counterparty_agent {
        out.push_str(&format!("  Agent:    {}\n", agent));
    }
    out
}

fn render_search(search: &EmailSearch) -> String {
    if search.agents.is_empty() {
        return format!("No agents registered under {}.\n", search.email);
    }
    format!(
        "Agents registered under {}:\n{}",
        search.email,
        render_agents(&search.agents)
    )
}

fn render_diff(diff: &WordDiffResult) -> String {
    if diff.is_empty() {
        return "No word changes.\n".to_string();
    }
    format!(
        "Added:   {}\nRemoved: {}\n",
        diff.added.join(" "),
        diff.removed.join(" ")
    )
}

fn render_inspect(report: &InspectReport) -> String {
    let mut out = format!("[{}]\n", report.classification);
    if let Some(reason) = &report.decode_error {
        out.push_str(&format!(
            "  Payload could not be decoded ({}); showing defaults.\n",
            reason
        ));
    }
    out.push_str(&render_messages(&report.interaction));
    let issues = &report.interaction.trust_issues;
    if !issues.is_empty() {
        out.push_str(&format!("  Issues:   {}\n", issues.join(", ")));
    }
    out
}

fn indent(text: &str) -> String {
    text.lines().map(|l| format!("  {}\n", l)).collect()
}
