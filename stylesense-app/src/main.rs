//! StyleSense CLI - personal fashion assistant.
//!
//! Upload a photo, pick an occasion, get AI-generated outfit advice.

#![allow(clippy::print_stdout)] // interactive program renders to stdout

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use stylesense::caption::CaptionerHandle;
use stylesense::providers::GroqClient;
use stylesense::{DescriptionResolver, Occasion, OutfitImage, StylePipeline};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// StyleSense - personal fashion assistant
#[derive(Parser)]
#[command(name = "stylesense")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Photo to analyze (jpg, jpeg, or png). Without one, no advice is
    /// generated.
    image: Option<PathBuf>,

    /// Occasion to dress for
    #[arg(short, long, default_value = "Casual Outing", value_parser = parse_occasion)]
    occasion: Occasion,

    /// Describe the photo with the local captioning model instead of
    /// sending it to the hosted vision model
    #[arg(long)]
    local_caption: bool,

    /// Model to use (overrides the strategy default)
    #[arg(short, long, env = "STYLESENSE_MODEL")]
    model: Option<String>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_occasion(s: &str) -> Result<Occasion, String> {
    s.parse().map_err(|e: stylesense::occasion::ParseOccasionError| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = tokio::runtime::Runtime::new().expect("failed to create tokio runtime");

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("stylesense={level},stylesense_app={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> anyhow::Result<()> {
    // Credential check happens before any image work or network call.
    let client = GroqClient::from_env()?;

    let resolver = if cli.local_caption {
        DescriptionResolver::LocalCaption(CaptionerHandle::blip())
    } else {
        DescriptionResolver::RemoteMultimodal
    };

    let model_id = cli
        .model
        .unwrap_or_else(|| resolver.default_model_id().to_string());
    let pipeline = StylePipeline::new(resolver, client.completion_model(model_id));

    let image = match &cli.image {
        Some(path) => {
            let image = OutfitImage::load_from_path(path).await?;
            println!("Uploaded image: {image}");
            Some(image)
        }
        None => None,
    };

    println!("Analyzing your style...");

    match pipeline.advise(image, cli.occasion).await? {
        Some(advice) => {
            println!();
            println!("Your Personalized Style Guide ({})", cli.occasion);
            println!("--------------------------------");
            println!("{}", advice.text);
            if let Some(usage) = advice.token_usage {
                tracing::debug!(
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "completion token usage"
                );
            }
        }
        None => {
            println!("No image supplied; nothing to analyze.");
        }
    }

    Ok(())
}
