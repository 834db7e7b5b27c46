use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use nova_catalog::api::CatalogApi;
use nova_catalog::catalog::{
    CatalogEntity, CatalogInstall, CatalogKind, McpKind, PluginKind, SkillKind, SnapshotCache,
    ToggleState,
};
use nova_catalog::import::{ArchiveUpload, ImportSelection, PollPolicy};
use nova_catalog::notify::{Notifier, TracingNotifier};
use nova_catalog::{ApiClient, CatalogStore, ImportSession, NovaConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nova-catalog", version, about = "Manage plugins, skills and MCP servers")]
struct Cli {
    /// TOML config file; environment variables are used when omitted
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Plugins,
    Skills,
    Mcp,
}

#[derive(Subcommand)]
enum Command {
    /// List entries and their install state
    List { kind: KindArg },
    /// Install an entry for the current user
    Install { kind: KindArg, id: String },
    /// Enable an install
    Enable { kind: KindArg, install_id: String },
    /// Disable an install
    Disable { kind: KindArg, install_id: String },
    /// Delete an entry and its installs
    Delete { kind: KindArg, id: String },
    /// Import plugins from an archive
    Import {
        archive: PathBuf,
        /// Relative path of a candidate to import; repeat for several. All when omitted
        #[arg(long = "select")]
        select: Vec<String>,
    },
}

enum CatalogAction {
    List,
    Install(String),
    SetEnabled(String, bool),
    Delete(String),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nova_catalog=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load .env for local dev (if present)
    if dotenvy::dotenv().is_ok() {
        tracing::info!("Loaded .env");
    }

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NovaConfig::from_file(path)?,
        None => NovaConfig::from_env()?,
    };
    tracing::debug!("Using catalog API at {}", config.api.base_url);

    let client = ApiClient::new(&config)?;
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);

    let (kind, action) = match cli.command {
        Command::Import { archive, select } => {
            return run_import(&client, &config, notifier, archive, select).await;
        }
        Command::List { kind } => (kind, CatalogAction::List),
        Command::Install { kind, id } => (kind, CatalogAction::Install(id)),
        Command::Enable { kind, install_id } => (kind, CatalogAction::SetEnabled(install_id, true)),
        Command::Disable { kind, install_id } => {
            (kind, CatalogAction::SetEnabled(install_id, false))
        }
        Command::Delete { kind, id } => (kind, CatalogAction::Delete(id)),
    };

    match kind {
        KindArg::Plugins => run_catalog(client.plugins(), &config, notifier, action).await,
        KindArg::Skills => run_catalog(client.skills(), &config, notifier, action).await,
        KindArg::Mcp => run_catalog(client.mcp_servers(), &config, notifier, action).await,
    }
}

async fn run_catalog<K: CatalogKind>(
    api: CatalogApi<K>,
    config: &NovaConfig,
    notifier: Arc<dyn Notifier>,
    action: CatalogAction,
) -> Result<()> {
    let mut store = CatalogStore::new(Arc::new(api), notifier);
    if config.cache.enabled {
        match SnapshotCache::open(&config.cache.path) {
            Ok(cache) => store = store.with_cache(cache),
            Err(e) => tracing::warn!("Snapshot cache unavailable: {}", e),
        }
    }

    if !store.refresh().await {
        if !store.hydrate_from_cache() {
            bail!("failed to load {} list", K::LABEL);
        }
        tracing::warn!("Showing cached {} list", K::LABEL);
    }

    match action {
        CatalogAction::List => {
            let installs = store.installs();
            for entity in store.entities() {
                let install = installs
                    .iter()
                    .find(|install| install.entity_id() == entity.id());
                let state = match install {
                    Some(install) if install.enabled() => format!("enabled  ({})", install.id()),
                    Some(install) => format!("disabled ({})", install.id()),
                    None => "-".to_string(),
                };
                println!("{:<24} {:<32} {}", entity.id(), entity.display_name(), state);
            }
        }
        CatalogAction::Install(id) => {
            let install = store
                .install(&id)
                .await
                .with_context(|| format!("failed to install {} {}", K::LABEL, id))?;
            println!("installed {} as {}", id, install.id());
        }
        CatalogAction::SetEnabled(install_id, enabled) => {
            let outcome = store.set_enabled(&install_id, enabled).await;
            match outcome.state {
                ToggleState::Committed { enabled } => {
                    println!("{} is now {}", install_id, if enabled { "enabled" } else { "disabled" })
                }
                other => bail!("failed to update {}: {:?}", install_id, other),
            }
        }
        CatalogAction::Delete(id) => {
            if !store.delete(&id).await {
                bail!("failed to delete {} {}", K::LABEL, id);
            }
            println!("deleted {}", id);
        }
    }
    Ok(())
}

async fn run_import(
    client: &ApiClient,
    config: &NovaConfig,
    notifier: Arc<dyn Notifier>,
    archive: PathBuf,
    select: Vec<String>,
) -> Result<()> {
    let bytes = tokio::fs::read(&archive)
        .await
        .with_context(|| format!("failed to read {}", archive.display()))?;
    let file_name = archive
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("archive.zip")
        .to_string();

    let mut session = ImportSession::new(
        Arc::new(client.imports()),
        PollPolicy::from(&config.polling),
        notifier,
    );

    let results = session
        .run(ArchiveUpload { file_name, bytes }, |candidates| {
            for candidate in candidates {
                tracing::info!(
                    "Candidate {} -> {}{}",
                    candidate.relative_path,
                    candidate.plugin_name,
                    if candidate.will_overwrite { " (overwrites)" } else { "" }
                );
            }
            candidates
                .iter()
                .filter(|candidate| select.is_empty() || select.contains(&candidate.relative_path))
                .map(|candidate| ImportSelection::new(candidate.relative_path.clone()))
                .collect()
        })
        .await?;

    for item in results {
        println!(
            "{:<32} {:<24} {:?}{}",
            item.relative_path,
            item.plugin_name,
            item.status,
            item.message.map(|m| format!(" - {}", m)).unwrap_or_default()
        );
    }
    Ok(())
}
