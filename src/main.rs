//! radioreddit command-line interface
//!
//! Two subcommands: `create` runs the content-acquisition pipeline
//! (extraction and/or playlist generation) against a destination directory,
//! `httpd` serves that directory over HTTP.

use clap::{Args, Parser, Subcommand};
use radioreddit::config::{Config, ExtractorConfig, ServerConfig};
use radioreddit::error::{Error, Result};
use radioreddit::extract::ExtractionResult;
use radioreddit::listing::ListingType;
use radioreddit::playlist::{PlaylistSpec, build_playlist, default_playlist_path};
use radioreddit::station::RadioReddit;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "radioreddit", version, about = "Turn a subreddit into a radio station")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create mp3s and playlists in a destination directory
    Create(CreateArgs),

    /// Serve mp3 and playlist files over HTTP
    Httpd(HttpdArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// Directory mp3 files are written to
    dest_dir: PathBuf,

    /// Extract audio from this URL directly
    #[arg(long, conflicts_with = "subreddit")]
    url: Option<String>,

    /// Extract audio from a post selected from this subreddit
    #[arg(long)]
    subreddit: Option<String>,

    /// Listing type used to select the post (hot, new, random, rising, top)
    #[arg(long = "listingtype", default_value = "random", value_parser = ListingType::from_str)]
    listing_type: ListingType,

    /// Also build a playlist; optionally takes an explicit playlist path
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    playlist: Option<Option<PathBuf>>,

    /// URI prefix for playlist entries (remote playback),
    /// e.g. http://host:30080/file=
    #[arg(long, value_name = "PREFIX")]
    uri: Option<String>,

    /// Search subdirectories of the destination when building the playlist
    #[arg(long)]
    recurse: bool,

    /// Replace an existing playlist file
    #[arg(long)]
    overwrite: bool,

    /// Explicit path to the youtube-dl/yt-dlp binary
    #[arg(long = "ytdl-bin", value_name = "PATH")]
    ytdl_bin: Option<PathBuf>,
}

#[derive(Args)]
struct HttpdArgs {
    /// Directory to serve files from
    serve_dir: PathBuf,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    address: IpAddr,

    /// Port to bind to
    #[arg(long, default_value_t = 30080)]
    port: u16,

    /// Actually start serving (blocks until interrupted)
    #[arg(long)]
    start: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "radioreddit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Create(args) => run_create(args).await,
        Command::Httpd(args) => run_httpd(args).await,
    };
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run extraction and/or playlist generation, in that order.
///
/// Each stage failing is reported but does not stop the other: the exit
/// code only reflects whether at least one artifact ended up on disk.
async fn run_create(args: CreateArgs) -> Result<ExitCode> {
    if args.url.is_none() && args.subreddit.is_none() && args.playlist.is_none() {
        return Err(Error::InvalidArgument(
            "nothing to do: pass --url, --subreddit and/or --playlist".to_string(),
        ));
    }

    let config = Config {
        extractor: ExtractorConfig {
            ytdl_path: args.ytdl_bin.clone(),
            ..ExtractorConfig::default()
        },
        ..Config::default()
    };

    let mut artifacts: Vec<PathBuf> = Vec::new();

    if args.url.is_some() || args.subreddit.is_some() {
        match extract_stage(&config, &args).await {
            Ok(result) if result.succeeded => {
                if let Some(path) = result.output_path {
                    artifacts.push(path);
                }
            }
            Ok(result) => {
                tracing::error!(
                    url = %result.source_url,
                    kind = %result.error_kind.map(|k| k.to_string()).unwrap_or_default(),
                    "Extraction produced no file"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Extraction stage failed");
            }
        }
    }

    // Playlist generation always runs after extraction has settled, so it
    // enumerates whatever that attempt left on disk
    if let Some(playlist_arg) = args.playlist {
        let playlist_path =
            playlist_arg.unwrap_or_else(|| default_playlist_path(&args.dest_dir));
        let spec = PlaylistSpec {
            mp3_dir: args.dest_dir.clone(),
            playlist_path,
            overwrite: args.overwrite,
            recurse: args.recurse,
            uri_prefix: args.uri.clone(),
        };
        match build_playlist(&spec) {
            Ok(path) => artifacts.push(path),
            Err(e) => {
                tracing::error!(error = %e, "Playlist stage failed");
            }
        }
    }

    if artifacts.is_empty() {
        eprintln!("error: no artifacts created");
        return Ok(ExitCode::FAILURE);
    }
    for artifact in &artifacts {
        println!("created {}", artifact.display());
    }
    Ok(ExitCode::SUCCESS)
}

async fn extract_stage(config: &Config, args: &CreateArgs) -> Result<ExtractionResult> {
    let station = RadioReddit::new(config.clone())?;
    match (&args.url, &args.subreddit) {
        (Some(url), _) => station.create_mp3(url, &args.dest_dir).await,
        (None, Some(subreddit)) => {
            station
                .create_mp3_from_subreddit(subreddit, args.listing_type, &args.dest_dir)
                .await
        }
        (None, None) => Err(Error::InvalidArgument(
            "extraction requires --url or --subreddit".to_string(),
        )),
    }
}

async fn run_httpd(args: HttpdArgs) -> Result<ExitCode> {
    let config = ServerConfig {
        bind_address: SocketAddr::new(args.address, args.port),
        serve_dir: args.serve_dir,
    };

    if !args.start {
        println!(
            "would serve {} on {} (pass --start to run)",
            config.serve_dir.display(),
            config.bind_address
        );
        return Ok(ExitCode::SUCCESS);
    }

    radioreddit::api::start_server(config).await?;
    Ok(ExitCode::SUCCESS)
}
