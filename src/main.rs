use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ogamba::cli::{connect, item, project};
use ogamba::config::Config;

#[derive(Parser)]
#[command(name = "ogamba")]
#[command(about = "Curate training data projects and conversational data items")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "ogamba.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Project management
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Data item management
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
}

#[derive(Subcommand)]
enum ProjectCommands {
    /// List all projects
    List,
    /// Create a new project
    Create {
        /// Project name
        name: String,
    },
    /// Rename a project
    Rename {
        /// Project ID
        id: String,
        /// New name
        name: String,
    },
    /// Retire (soft-delete) a project
    Retire {
        /// Project ID
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// List the data items of a project
    List {
        /// Project ID
        project: String,
    },
    /// Print the default payload template for a new item
    Template,
    /// Show one data item's payloads
    Show {
        /// Project ID
        project: String,
        /// Data item ID
        item: String,
    },
    /// Create a data item from two JSON files
    Create {
        /// Project ID
        project: String,
        /// File holding the input_message JSON array
        #[arg(short, long)]
        input: PathBuf,
        /// File holding the output_message JSON array
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Replace one or both payloads of a data item
    Edit {
        /// Project ID
        project: String,
        /// Data item ID
        item: String,
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a data item
    Delete {
        /// Project ID
        project: String,
        /// Data item ID
        item: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ogamba=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Load config
    let config = Config::load(&cli.config).context("Failed to load configuration")?;

    if let Commands::Item {
        command: ItemCommands::Template,
    } = cli.command
    {
        item::template();
        return Ok(());
    }

    let api = connect(&config)?;

    match cli.command {
        Commands::Project { command } => match command {
            ProjectCommands::List => project::list(&api).await?,
            ProjectCommands::Create { name } => project::create(&api, name).await?,
            ProjectCommands::Rename { id, name } => project::rename(&api, id, name).await?,
            ProjectCommands::Retire { id, yes } => project::retire(&api, id, yes).await?,
        },
        Commands::Item { command } => match command {
            ItemCommands::List { project: project_id } => item::list(&api, project_id).await?,
            ItemCommands::Template => item::template(),
            ItemCommands::Show {
                project: project_id,
                item: item_id,
            } => item::show(&api, project_id, item_id).await?,
            ItemCommands::Create {
                project: project_id,
                input,
                output,
            } => item::create(&api, project_id, &input, &output).await?,
            ItemCommands::Edit {
                project: project_id,
                item: item_id,
                input,
                output,
            } => {
                item::edit(&api, project_id, item_id, input.as_deref(), output.as_deref()).await?
            }
            ItemCommands::Delete {
                project: project_id,
                item: item_id,
                yes,
            } => item::delete(&api, project_id, item_id, yes).await?,
        },
    }

    Ok(())
}
