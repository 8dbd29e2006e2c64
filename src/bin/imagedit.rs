//! CLI for imagedit - serve the web editor or run a one-off edit.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use imagedit::config::{
    self, ServerConfig, DEFAULT_BIND, DEFAULT_MAX_SESSIONS, DEFAULT_MAX_UPLOAD_BYTES,
};
use imagedit::{
    edit_image_with_prompt, EditResult, GeminiModel, GeminiProvider, ImageEditor, ImageFile,
    ImageFormat,
};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "imagedit")]
#[command(about = "Edit images with a text prompt via Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Gemini API key (defaults to API_KEY, then GOOGLE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model: nano-banana (gemini-2.5-flash-image) or nano-banana-pro
    #[arg(long, global = true, env = "GEMINI_MODEL", default_value = "nano-banana")]
    model: String,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web editor
    Serve(ServeArgs),

    /// Edit a local image file
    Edit(EditArgs),

    /// Verify the API key and model are usable
    Check,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "IMAGEDIT_BIND", default_value = DEFAULT_BIND)]
    bind: SocketAddr,

    /// Largest accepted request body in bytes
    #[arg(long, env = "IMAGEDIT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    max_upload_bytes: usize,

    /// Most browser sessions kept in memory
    #[arg(long, env = "IMAGEDIT_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    max_sessions: usize,
}

#[derive(Args)]
struct EditArgs {
    /// The edit instruction
    prompt: String,

    /// Image to edit
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the edited image
    #[arg(short, long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let model: GeminiModel = cli.model.parse()?;
    // Missing credentials are fatal before anything is served.
    let api_key = config::resolve_api_key(cli.api_key, |name| std::env::var(name).ok())?;
    let provider = GeminiProvider::builder()
        .api_key(api_key)
        .model(model)
        .build()?;

    match cli.command {
        Commands::Serve(args) => {
            let config = ServerConfig {
                bind: args.bind,
                max_upload_bytes: args.max_upload_bytes,
                max_sessions: args.max_sessions,
            };
            imagedit::server::serve(Arc::new(provider), config).await?;
        }
        Commands::Edit(args) => {
            edit_file(&provider, args, cli.json).await?;
        }
        Commands::Check => {
            check(&provider, cli.json).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("imagedit={default_level},tower_http=info,warn"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn read_image(path: &Path) -> anyhow::Result<ImageFile> {
    let data = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let by_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .map(|f| f.mime_type());
    let detected = ImageFormat::from_magic_bytes(&data).map(|f| f.mime_type());
    Ok(ImageFile::from_bytes(&data, detected.or(by_extension))?)
}

async fn edit_file(
    editor: &dyn ImageEditor,
    args: EditArgs,
    json_output: bool,
) -> anyhow::Result<()> {
    let image = read_image(&args.input)?;
    let start = std::time::Instant::now();

    let result =
        edit_image_with_prompt(editor, &image.base64, &image.mime_type, &args.prompt).await;
    let edited = match result {
        EditResult::ImageData(edited) => edited,
        EditResult::Error(message) => {
            if json_output {
                let result = serde_json::json!({ "success": false, "error": &message });
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
            anyhow::bail!(message);
        }
    };

    let data = edited.decode()?;
    std::fs::write(&args.output, &data)
        .with_context(|| format!("writing {}", args.output.display()))?;
    let duration_ms = start.elapsed().as_millis() as u64;

    if json_output {
        let result = serde_json::json!({
            "success": true,
            "output": args.output.display().to_string(),
            "size_bytes": data.len(),
            "mime_type": edited.mime_type,
            "model": editor.model(),
            "duration_ms": duration_ms,
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!(
            "Edited image: {} ({} bytes, {}) via {}",
            args.output.display(),
            data.len(),
            edited.mime_type,
            editor.name()
        );
        println!("Duration: {}ms", duration_ms);
    }

    Ok(())
}

async fn check(editor: &dyn ImageEditor, json_output: bool) -> anyhow::Result<()> {
    let outcome = editor.health_check().await;

    if json_output {
        let result = serde_json::json!({
            "provider": editor.name(),
            "model": editor.model(),
            "ok": outcome.is_ok(),
            "error": outcome.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if outcome.is_ok() {
        println!("✓ {} ({}) is reachable", editor.name(), editor.model());
    }

    outcome.context("health check failed")
}
