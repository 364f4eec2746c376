use anyhow::{Context, Result};
use chartsworth::args::CommonArgs;
use chartsworth::logging::{self, LogConfig};
use chartsworth::{Chartsworth, MonsterPlot, UploadOutcome};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "chartsworth",
    version,
    about = "Post messages and plots into Slack threads"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Post messages; the first opens the thread, the rest reply in it
    Post {
        #[arg(required = true)]
        messages: Vec<String>,
    },
    /// Upload a PNG, JPEG or WebP image file (re-encoded as PNG)
    Image {
        path: PathBuf,
        /// Name shown in Slack (default: the file's stem)
        #[arg(long)]
        filename: Option<String>,
        /// Post a text notice instead of failing when the upload is rejected
        #[arg(long)]
        notice_on_failure: bool,
    },
    /// React to the thread's opening message
    React { emoji: String },
    /// Post a monster plot
    Monster {
        /// Seed for a reproducible monster
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the link to the current notebook
    Link,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.common.verbose {
        logging::init(LogConfig::verbose());
    } else {
        logging::init(LogConfig::from_env());
    }

    let config = cli.common.load_config().context("Failed to load configuration")?;
    let chartsworth = Chartsworth::new(&config).context("Failed to set up Chartsworth")?;

    match cli.command {
        Commands::Post { messages } => {
            for message in &messages {
                chartsworth
                    .post_text(message, None)
                    .await
                    .context("Failed to post message")?;
            }
        }
        Commands::Image {
            path,
            filename,
            notice_on_failure,
        } => {
            let img = image::open(&path)
                .with_context(|| format!("Failed to read image {}", path.display()))?;
            let filename = filename.or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            });

            if notice_on_failure {
                let outcome = chartsworth
                    .post_image_or_notice(img, filename.as_deref(), None)
                    .await
                    .context("Failed to post image")?;
                if outcome == UploadOutcome::Notice {
                    eprintln!(
                        "Upload was rejected; posted a notice instead. \
                         Uploads are more reliable with a channel ID than a channel name."
                    );
                }
            } else {
                chartsworth
                    .post_image(img, filename.as_deref(), None)
                    .await
                    .context("Failed to post image")?;
            }
        }
        Commands::React { emoji } => {
            chartsworth
                .react_to_thread(&emoji, None)
                .await
                .context("Failed to add reaction")?;
        }
        Commands::Monster { seed } => {
            let monster = seed.map_or_else(MonsterPlot::random, MonsterPlot::from_seed);
            chartsworth
                .post_monster_plot(monster, None)
                .await
                .context("Failed to post monster plot")?;
        }
        Commands::Link => println!("{}", chartsworth.notebook_link()),
    }

    Ok(())
}
