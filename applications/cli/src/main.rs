/// FlowPlayer - tag local media with Flows and play them back
use anyhow::Context;
use clap::{Parser, Subcommand};
use flow_core::{FlowKey, MediaKind};
use flowplayer::commands::{catalog, mixes, play};
use flowplayer::{FlowConfig, PlayOptions};
use flow_storage::CatalogStore;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "flowplayer")]
#[command(about = "Tag local media with Flows and play them back", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./flowplayer.toml when present)
    #[arg(short, long, global = true, env = "FLOWPLAYER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import files or directories into the catalog
    Import {
        /// Files or directories (scanned recursively)
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Flow to tag the imported media with
        #[arg(short, long)]
        flow: FlowKey,
    },
    /// List cataloged media, newest first
    List {
        /// Only audio or only video
        #[arg(short, long)]
        kind: Option<MediaKind>,
        /// Only media tagged with this Flow
        #[arg(short, long)]
        flow: Option<FlowKey>,
    },
    /// Change the title or Flow of a cataloged entry
    Retag {
        id: i64,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        flow: Option<FlowKey>,
    },
    /// Remove an entry from the catalog
    Remove { id: i64 },
    /// Remove every entry from the catalog
    Clear,
    /// Show how many entries each Flow holds
    Flows,
    /// Remove videos stored as content:// locations
    PurgeContentVideos,
    /// Play the media tagged with a Flow
    Play {
        flow: FlowKey,
        #[command(flatten)]
        options: PlayArgs,
    },
    /// Log in to the Mix service
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "FLOWPLAYER_PASSWORD")]
        password: String,
    },
    /// Create a Mix service account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long, env = "FLOWPLAYER_PASSWORD")]
        password: String,
    },
    /// Forget the stored access token
    Logout,
    /// Manage Mixes on the Mix service
    #[command(subcommand)]
    Mixes(MixCommands),
}

#[derive(Subcommand)]
enum MixCommands {
    /// List your Mixes and their items
    List,
    /// Create an empty Mix
    Create {
        name: String,
        #[arg(short, long)]
        flow: FlowKey,
    },
    /// Rename a Mix or change its Flow
    Rename {
        id: i64,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        flow: Option<FlowKey>,
    },
    /// Delete a Mix
    Delete { id: i64 },
    /// Add a title to a Mix
    AddItem {
        mix_id: i64,
        title: String,
        #[arg(short, long)]
        kind: MediaKind,
    },
    /// Remove an item from a Mix
    RemoveItem { mix_id: i64, item_id: i64 },
    /// Play the Mix's titles found in the local catalog
    Play {
        id: i64,
        #[command(flatten)]
        options: PlayArgs,
    },
}

#[derive(clap::Args)]
struct PlayArgs {
    /// Keep catalog order instead of permuting the list
    #[arg(long)]
    in_order: bool,
    /// Position (0-based) of the first entry to play
    #[arg(long, default_value_t = 0)]
    start: usize,
    /// Start with shuffle on
    #[arg(long)]
    shuffle: bool,
    /// Start with repeat on
    #[arg(long)]
    repeat: bool,
    /// Run the simulated clock this many times faster than real time
    #[arg(long)]
    speed: Option<f32>,
    /// Close the session on the first entry that fails to load
    #[arg(long)]
    stop_on_error: bool,
}

impl From<PlayArgs> for PlayOptions {
    fn from(args: PlayArgs) -> Self {
        Self {
            in_order: args.in_order,
            start: args.start,
            shuffle: args.shuffle,
            repeat: args.repeat,
            speed: args.speed,
            stop_on_error: args.stop_on_error,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowplayer=info,flow_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = FlowConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    run(cli.command, &config, &mut out)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    out.flush()?;
    Ok(())
}

async fn run(command: Commands, config: &FlowConfig, out: &mut impl Write) -> flowplayer::Result<()> {
    match command {
        Commands::Import { paths, flow } => {
            let store = open_catalog(config).await?;
            catalog::import(&store, &paths, flow, out).await?;
        }
        Commands::List { kind, flow } => {
            let store = open_catalog(config).await?;
            catalog::list(&store, kind, flow, out).await?;
        }
        Commands::Retag { id, title, flow } => {
            let store = open_catalog(config).await?;
            catalog::retag(&store, id, title.as_deref(), flow, out).await?;
        }
        Commands::Remove { id } => {
            let store = open_catalog(config).await?;
            catalog::remove(&store, id, out).await?;
        }
        Commands::Clear => {
            let store = open_catalog(config).await?;
            catalog::clear(&store, out).await?;
        }
        Commands::Flows => {
            let store = open_catalog(config).await?;
            catalog::flows(&store, out).await?;
        }
        Commands::PurgeContentVideos => {
            let store = open_catalog(config).await?;
            catalog::purge_content_videos(&store, out).await?;
        }
        Commands::Play { flow, options } => {
            if let Some(summary) = play::play_flow(config, flow, &options.into(), out).await? {
                tracing::info!(
                    started = summary.tracks_started,
                    failures = summary.failures,
                    finished = summary.finished,
                    "Playback session ended"
                );
            }
        }
        Commands::Login { email, password } => {
            mixes::login(&config.server, &email, &password, out).await?;
        }
        Commands::Register {
            name,
            email,
            password,
        } => {
            mixes::register(&config.server, &name, &email, &password, out).await?;
        }
        Commands::Logout => {
            mixes::logout(&config.server, out).await?;
        }
        Commands::Mixes(command) => run_mix_command(command, config, out).await?,
    }

    Ok(())
}

async fn run_mix_command(
    command: MixCommands,
    config: &FlowConfig,
    out: &mut impl Write,
) -> flowplayer::Result<()> {
    let server = &config.server;
    match command {
        MixCommands::List => {
            mixes::list(server, out).await?;
        }
        MixCommands::Create { name, flow } => {
            mixes::create(server, &name, flow, out).await?;
        }
        MixCommands::Rename { id, name, flow } => {
            mixes::rename(server, id, name.as_deref(), flow, out).await?;
        }
        MixCommands::Delete { id } => {
            mixes::delete(server, id, out).await?;
        }
        MixCommands::AddItem {
            mix_id,
            title,
            kind,
        } => {
            mixes::add_item(server, mix_id, &title, kind, out).await?;
        }
        MixCommands::RemoveItem { mix_id, item_id } => {
            mixes::remove_item(server, mix_id, item_id, out).await?;
        }
        MixCommands::Play { id, options } => {
            mixes::play(config, id, &options.into(), out).await?;
        }
    }
    Ok(())
}

async fn open_catalog(config: &FlowConfig) -> flowplayer::Result<CatalogStore> {
    Ok(CatalogStore::open(&config.storage.database_url).await?)
}
