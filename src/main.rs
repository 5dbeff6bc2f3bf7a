use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use tempocli::{
    cli::{self, AnalyzeRequest},
    config::{self, Config},
    spotify::tracks::Target,
    utils::{self, SortOrder, TrackFilter},
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Analyze tempo, key and time signature of a playlist or your saved tracks
    Analyze(AnalyzeOptions),

    /// Inspect or prune the analysis cache
    Cache(CacheOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeOptions {
    /// Playlist id, URL or URI, or `library` for your saved tracks
    #[clap(value_parser = parse_target)]
    pub target: Target,

    /// Stop listing once this many tracks are collected
    #[clap(long)]
    pub limit: Option<usize>,

    /// Only show tracks at or above this tempo (BPM)
    #[clap(long)]
    pub min_tempo: Option<f64>,

    /// Only show tracks at or below this tempo (BPM)
    #[clap(long)]
    pub max_tempo: Option<f64>,

    /// Only show tracks in this key (C, F#, Bb, or 0-11)
    #[clap(long, value_parser = utils::parse_key)]
    pub key: Option<i32>,

    /// Only show tracks with this many beats per bar
    #[clap(long)]
    pub time_signature: Option<i32>,

    /// Sort output by listing, tempo, name or key
    #[clap(long, default_value = "listing", value_parser = parse_sort)]
    pub sort: SortOrder,

    /// Only show tracks whose analysis failed
    #[clap(long)]
    pub failed: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CacheOptions {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CacheSubcommand {
    /// Show location and size of the cache
    Info,

    /// Remove every cached analysis
    Clear,

    /// Remove the cached analysis of the given tracks so they are fetched again
    Forget {
        #[clap(required = true)]
        track_ids: Vec<String>,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn parse_target(s: &str) -> Result<Target, String> {
    s.parse()
}

fn parse_sort(s: &str) -> Result<SortOrder, String> {
    s.parse()
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::Auth => cli::auth(config).await,
        Command::Analyze(opt) => {
            let request = AnalyzeRequest {
                target: opt.target,
                limit: opt.limit,
                filter: TrackFilter {
                    min_tempo: opt.min_tempo,
                    max_tempo: opt.max_tempo,
                    key: opt.key,
                    time_signature: opt.time_signature,
                    failed_only: opt.failed,
                },
                sort: opt.sort,
            };
            cli::analyze(config, request).await
        }
        Command::Cache(opt) => match opt.command {
            CacheSubcommand::Info => cli::cache_info(config).await,
            CacheSubcommand::Clear => cli::cache_clear(config).await,
            CacheSubcommand::Forget { track_ids } => cli::cache_forget(config, track_ids).await,
        },
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
