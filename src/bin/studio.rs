//! studio: command-line front end for the creative studio runtime
//!
//! Usage:
//!   studio chat <message> [--image <file>] [--new-session]
//!   studio image <prompt> [--quality high] [--aspect 16:9] [--size 2K] [--reference <file>]...
//!   studio video <prompt> [--aspect 16:9] [--resolution 720p] [--reference <file>]...
//!   studio key set <token> | key clear | key status
//!   studio assets list [--kind image|video] | assets clear

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use creative_studio::archive::{AssetArchive, ChatMessage, LocalStore, SessionList};
use creative_studio::types::media::extension_for;
use creative_studio::types::{
    AspectRatio, AssetKind, GeneratedAsset, ImageConfig, ImageSize, QualityTier, ReferenceImage,
    Role, VideoConfig, VideoResolution,
};
use creative_studio::{ErrorKind, OperationOutcome, Remediation, StudioClient, StudioConfig};

#[derive(Debug, Parser)]
#[command(name = "studio", version, about = "Chat, image and video generation from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Send one message in the active chat session.
    Chat(ChatArgs),
    /// Generate an image.
    Image(ImageArgs),
    /// Render a video and wait for it.
    Video(VideoArgs),
    /// Manage the saved API key.
    #[command(subcommand)]
    Key(KeyCommand),
    /// Inspect or clear the asset archive.
    #[command(subcommand)]
    Assets(AssetsCommand),
}

#[derive(Debug, Parser)]
struct ChatArgs {
    #[arg(default_value = "")]
    message: String,
    /// Attach an image file.
    #[arg(long)]
    image: Option<PathBuf>,
    /// Start a fresh session instead of continuing the active one.
    #[arg(long)]
    new_session: bool,
    /// Disable web-search grounding.
    #[arg(long)]
    no_search: bool,
}

#[derive(Debug, Parser)]
struct ImageArgs {
    prompt: String,
    #[arg(long, default_value = "standard")]
    quality: QualityTier,
    #[arg(long, default_value = "1:1")]
    aspect: AspectRatio,
    /// Only used at high quality.
    #[arg(long, default_value = "1K")]
    size: ImageSize,
    #[arg(long = "reference")]
    references: Vec<PathBuf>,
}

#[derive(Debug, Parser)]
struct VideoArgs {
    prompt: String,
    #[arg(long, default_value = "16:9")]
    aspect: AspectRatio,
    #[arg(long, default_value = "1080p")]
    resolution: VideoResolution,
    /// More than one forces 16:9 / 720p.
    #[arg(long = "reference")]
    references: Vec<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum KeyCommand {
    /// Save a key for this and future runs.
    Set {
        token: String,
        /// Keep the key for this run only.
        #[arg(long)]
        no_persist: bool,
    },
    /// Forget the saved key.
    Clear,
    /// Show which source the active key comes from.
    Status,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Image,
    Video,
}

impl From<KindArg> for AssetKind {
    fn from(k: KindArg) -> Self {
        match k {
            KindArg::Image => AssetKind::Image,
            KindArg::Video => AssetKind::Video,
        }
    }
}

#[derive(Debug, Subcommand)]
enum AssetsCommand {
    List {
        #[arg(long)]
        kind: Option<KindArg>,
    },
    Clear,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("studio error: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = StudioConfig::from_env();
    let store = LocalStore::open(&config.data_dir)
        .with_context(|| format!("opening data dir {}", config.data_dir.display()))?;
    let client = StudioClient::builder().config(config).build()?;

    match cli.command {
        Command::Chat(args) => cmd_chat(&client, &store, args).await,
        Command::Image(args) => cmd_image(&client, &store, args).await,
        Command::Video(args) => cmd_video(&client, &store, args).await,
        Command::Key(cmd) => cmd_key(&client, cmd),
        Command::Assets(cmd) => cmd_assets(&store, cmd),
    }
}

async fn cmd_chat(client: &StudioClient, store: &LocalStore, args: ChatArgs) -> Result<i32> {
    let mut sessions = SessionList::load(store.clone())?;
    if args.new_session {
        sessions.create()?;
    }

    let image = match &args.image {
        Some(path) => Some(read_reference(path)?.to_data_url()),
        None => None,
    };
    if args.message.trim().is_empty() && image.is_none() {
        bail!("nothing to send: pass a message or --image");
    }

    let history = sessions.active().history();
    let options = client.default_chat_options().with_search(!args.no_search);
    let outcome = client
        .chat_with_options(&args.message, &history, image.as_deref(), &options)
        .await;

    let reply = match outcome {
        OperationOutcome::Success(reply) => reply,
        OperationOutcome::Failure(kind) => return Ok(report(&kind)),
    };

    println!("{}", reply.text);
    for c in &reply.citations {
        println!("  [{}] {}", c.title.as_deref().unwrap_or("source"), c.uri);
    }

    sessions.push_to_active(ChatMessage::new(Role::User, args.message))?;
    sessions.push_to_active(
        ChatMessage::new(Role::Assistant, reply.text).with_grounding(reply.citations),
    )?;
    Ok(0)
}

async fn cmd_image(client: &StudioClient, store: &LocalStore, args: ImageArgs) -> Result<i32> {
    let references = read_references(&args.references)?;
    let config = ImageConfig::new(args.quality)
        .with_aspect_ratio(args.aspect)
        .with_image_size(args.size);

    let image = match client.generate_image(&args.prompt, &config, references.as_slice()).await {
        OperationOutcome::Success(image) => image,
        OperationOutcome::Failure(kind) => return Ok(report(&kind)),
    };

    let path = write_artifact(store.dir(), "image", &image.media_type, &image.bytes)?;
    AssetArchive::load(store.clone())?.archive(GeneratedAsset::image(
        path.display().to_string(),
        &args.prompt,
        config,
    ))?;
    println!("{}", path.display());
    Ok(0)
}

async fn cmd_video(client: &StudioClient, store: &LocalStore, args: VideoArgs) -> Result<i32> {
    let references = read_references(&args.references)?;
    let config = VideoConfig {
        resolution: args.resolution,
        aspect_ratio: args.aspect,
    };

    let outcome = client
        .generate_video(&args.prompt, &config, references.as_slice(), |p| {
            eprintln!("[{}] {}", p.tick + 1, p.label);
        })
        .await;
    let video = match outcome {
        OperationOutcome::Success(video) => video,
        OperationOutcome::Failure(kind) => return Ok(report(&kind)),
    };

    let path = write_artifact(store.dir(), "video", &video.media_type, &video.bytes)?;
    AssetArchive::load(store.clone())?.archive(GeneratedAsset::video(
        path.display().to_string(),
        &args.prompt,
        config,
    ))?;
    println!("{}", path.display());
    Ok(0)
}

fn cmd_key(client: &StudioClient, cmd: KeyCommand) -> Result<i32> {
    let credentials = client.credentials();
    match cmd {
        KeyCommand::Set { token, no_persist } => {
            credentials.save(&token, !no_persist)?;
            println!("API key saved{}", if no_persist { " for this run" } else { "" });
        }
        KeyCommand::Clear => {
            credentials.discard_persisted()?;
            println!("saved API key removed");
        }
        KeyCommand::Status => match credentials.resolve() {
            Ok(resolved) => println!("API key available (source: {:?})", resolved.source),
            Err(kind) => return Ok(report(&kind)),
        },
    }
    Ok(0)
}

fn cmd_assets(store: &LocalStore, cmd: AssetsCommand) -> Result<i32> {
    let mut archive = AssetArchive::load(store.clone())?;
    match cmd {
        AssetsCommand::List { kind } => {
            let assets: Vec<&GeneratedAsset> = match kind {
                Some(k) => archive.of_kind(k.into()).collect(),
                None => archive.all().iter().collect(),
            };
            for a in assets {
                println!("{}\t{:?}\t{}\t{}", a.timestamp, a.kind, a.url, a.prompt);
            }
        }
        AssetsCommand::Clear => {
            let n = archive.len();
            archive.clear()?;
            println!("removed {n} archive records");
        }
    }
    Ok(0)
}

/// Print the failure and its remediation; the exit code is 2 for failures the user can act on.
fn report(kind: &ErrorKind) -> i32 {
    eprintln!("{} [{}]: {}", kind.name(), kind.code(), kind);
    let advice = match kind.remediation() {
        Remediation::EnterCredential => "run `studio key set <token>` with a valid API key".to_string(),
        Remediation::UpgradeCredential => {
            "use an API key from a project with billing enabled".to_string()
        }
        Remediation::WaitAndRetry { hint: Some(hint) } => format!("try again {}", hint),
        Remediation::WaitAndRetry { hint: None } => "wait a little, then try again".to_string(),
        Remediation::ManualRetry => "try again, or pick a cheaper setting".to_string(),
        Remediation::RevisePrompt => "rephrase the prompt or change the inputs".to_string(),
        Remediation::ShowMessage(_) | Remediation::None => return 1,
    };
    eprintln!("hint: {advice}");
    2
}

fn read_reference(path: &Path) -> Result<ReferenceImage> {
    ReferenceImage::from_file(path).with_context(|| format!("reading {}", path.display()))
}

fn read_references(paths: &[PathBuf]) -> Result<Vec<String>> {
    paths
        .iter()
        .map(|p| read_reference(p).map(|r| r.to_data_url()))
        .collect()
}

fn write_artifact(dir: &Path, prefix: &str, media_type: &str, bytes: &[u8]) -> Result<PathBuf> {
    let out_dir = dir.join("assets");
    std::fs::create_dir_all(&out_dir)?;
    let path = out_dir.join(format!(
        "{}-{}.{}",
        prefix,
        uuid::Uuid::new_v4(),
        extension_for(media_type)
    ));
    std::fs::write(&path, bytes).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
