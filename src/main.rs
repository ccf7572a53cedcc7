use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use story_points::{api, config::AppConfig, context::AppContext, db, loader};
use story_points_core::{TaskRecord, Trainer};

#[derive(Parser)]
#[command(name = "story-points")]
#[command(about = "Story point estimation from task text and metadata")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port for HTTP API (overrides STORY_POINTS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Train a new model on the built-in examples plus dataset files
    Train {
        /// JSON dataset files
        #[arg(short, long)]
        data: Vec<PathBuf>,
    },
    /// Estimate a single task with the stored model
    Estimate {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        task_type: Option<String>,
        #[arg(long)]
        attachments: Option<u32>,
    },
    /// Show the stored model status
    Status,
}

/// Initialize tracing with output to stderr (for JSON-printing commands) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "story_points=debug,story_points_core=info,tower_http=debug".into()
    }));

    if use_stderr {
        // Keep stdout clean for the printed JSON
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn open_context(config: &AppConfig) -> anyhow::Result<AppContext> {
    let db = db::Database::open(config.database_path()?)?;
    db.migrate()?;
    Ok(AppContext::new(db, Trainer::default()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn serve(config: AppConfig, port: u16) -> anyhow::Result<()> {
    tracing::info!("Starting story point server on port {}", port);

    let ctx = open_context(&config)?;
    if config.bootstrap {
        let bootstrap_ctx = ctx.clone();
        let bootstrap = tokio::task::spawn_blocking(move || bootstrap_ctx.bootstrap_if_untrained());
        if let Err(e) = bootstrap.await? {
            tracing::error!("Failed to train initial model: {:#}", e);
        }
    }

    let app = api::create_router_with_config(ctx, &config);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    tracing::info!("Story point server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = !matches!(cli.command, Some(Commands::Serve { .. }) | None);
    init_tracing(use_stderr);

    let config = AppConfig::from_env();

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            serve(config, port).await?;
        }
        Some(Commands::Train { data }) => {
            let records = loader::load_files(&data)?;
            let ctx = open_context(&config)?;
            let stats = ctx.train(records)?;
            print_json(&stats)?;
        }
        Some(Commands::Estimate {
            title,
            description,
            priority,
            task_type,
            attachments,
        }) => {
            let ctx = open_context(&config)?;
            let task = TaskRecord {
                title,
                description,
                priority,
                task_type,
                attachments_count: attachments,
            };
            let estimate = ctx.estimate(&task)?;
            print_json(&estimate)?;
        }
        Some(Commands::Status) => {
            let ctx = open_context(&config)?;
            print_json(&ctx.status())?;
        }
        None => {
            let port = config.port;
            serve(config, port).await?;
        }
    }

    Ok(())
}
