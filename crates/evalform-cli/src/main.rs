//! evalform CLI — fill in evaluations from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "evalform", version, about = "Answer evaluations stored in jsonbin")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available evaluations
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Render an evaluation's form
    Show {
        /// Evaluation id
        #[arg(long)]
        id: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Answer an evaluation and save the responses
    Fill {
        /// Evaluation id
        #[arg(long)]
        id: String,

        /// Pre-filled answer as QUESTION_ID=VALUE (repeatable)
        #[arg(long = "answer", value_name = "QUESTION_ID=VALUE")]
        answers: Vec<String>,

        /// Submit as this author instead of the logged-in user
        #[arg(long)]
        author: Option<String>,

        /// Local state file holding the logged-in user
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print stored answer records
    Answers {
        /// Only records for this evaluation title
        #[arg(long)]
        evaluation: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Store the current user in local state
    Login {
        /// Display name recorded as the author of submitted answers
        #[arg(long)]
        name: String,

        /// Local state file
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Remove the current user from local state
    Logout {
        /// Local state file
        #[arg(long)]
        state_file: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("evalform=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { config } => commands::list::execute(config).await,
        Commands::Show { id, config } => commands::show::execute(id, config).await,
        Commands::Fill {
            id,
            answers,
            author,
            state_file,
            config,
        } => commands::fill::execute(id, answers, author, state_file, config).await,
        Commands::Answers {
            evaluation,
            format,
            config,
        } => commands::answers::execute(evaluation, format, config).await,
        Commands::Login {
            name,
            state_file,
            config,
        } => commands::login::login(name, state_file, config),
        Commands::Logout { state_file, config } => commands::login::logout(state_file, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
