//! trustlens CLI: the main entry point.
//!
//! Commands:
//! - `onboard`    Write the default config
//! - `load`       Replace the roster from an upload response file
//! - `clear`      Drop the roster and its chart narratives
//! - `dashboard`  Chart series, totals, and optionally narratives
//! - `clients`    Search and page through the roster
//! - `client`     Show one client
//! - `ask`        Ask the assistant about a page
//! - `history`    Show or clear the conversation
//! - `serve`      Start the HTTP gateway

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "trustlens",
    about = "trustlens: client roster analytics with an LLM assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Page {
    Dashboard,
    Clients,
    ClientDetails,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and the store directory
    Onboard,

    /// Load a roster from a JSON upload response
    Load {
        /// JSON array of rows, or `{"data": [...]}`
        file: std::path::PathBuf,
    },

    /// Remove the roster and its cached narratives
    Clear,

    /// Show the dashboard aggregate
    Dashboard {
        /// Also generate (or reuse) the chart narratives
        #[arg(short, long)]
        narratives: bool,
    },

    /// List clients
    Clients {
        /// Case-insensitive search over every field
        #[arg(short, long, default_value = "")]
        query: String,

        /// 1-based page number
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Show one client by certificate number
    Client { cert: String },

    /// Ask the assistant a question
    Ask {
        message: String,

        /// Page the question is about
        #[arg(long, value_enum, default_value = "dashboard")]
        page: Page,

        /// Certificate number, for the client-details page
        #[arg(long)]
        cert: Option<String>,

        /// Search query, for the clients page
        #[arg(short, long, default_value = "")]
        query: String,
    },

    /// Show the conversation history
    History {
        /// Clear it instead
        #[arg(long)]
        clear: bool,
    },

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run()?,
        Commands::Load { file } => commands::roster::load(&file)?,
        Commands::Clear => commands::roster::clear()?,
        Commands::Dashboard { narratives } => commands::dashboard::run(narratives).await?,
        Commands::Clients { query, page } => commands::clients::list(&query, page)?,
        Commands::Client { cert } => commands::clients::show(&cert)?,
        Commands::Ask {
            message,
            page,
            cert,
            query,
        } => commands::assistant::ask(&message, page, cert, query).await?,
        Commands::History { clear } => commands::assistant::history(clear)?,
        Commands::Serve { port } => commands::serve::run(port).await?,
    }

    Ok(())
}
