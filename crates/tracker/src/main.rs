use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use storage::services::TrendPeriod;
use storage::{ClientConfig, PostgrestClient};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod exercise_arg;
mod handlers;

use exercise_arg::ExerciseArg;

#[derive(Parser)]
#[command(name = "tracker")]
#[command(about = "Athlete workout tracker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "TRACKER_API_URL")]
    api_url: String,

    #[arg(long, env = "TRACKER_API_TOKEN", hide_env_values = true)]
    api_token: String,

    #[arg(
        long,
        env = "TRACKER_HTTP_TIMEOUT_SECS",
        default_value_t = storage::config::DEFAULT_TIMEOUT_SECS
    )]
    timeout_secs: u64,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user and its athlete profile
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        age: Option<i32>,

        #[arg(long)]
        goals: Option<String>,

        #[arg(long)]
        medical: Option<String>,
    },
    /// Show a user's athlete profile, applying any given changes first
    Profile {
        user_id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        age: Option<i32>,

        #[arg(long)]
        goals: Option<String>,

        #[arg(long)]
        medical: Option<String>,
    },
    Exercises {
        #[command(subcommand)]
        command: ExerciseCommands,
    },
    /// Schedule a session
    Plan {
        athlete_id: i64,
        date: NaiveDate,

        /// EXERCISE:REPS:WEIGHTS[:INSTRUCTIONS], repeatable
        #[arg(long = "exercise", required = true)]
        exercises: Vec<ExerciseArg>,
    },
    /// Show the session scheduled on a date
    Show { athlete_id: i64, date: NaiveDate },
    /// Complete a session and update performance and trends
    Complete {
        #[arg(required_unless_present = "resume")]
        athlete_id: Option<i64>,

        #[arg(required_unless_present = "resume")]
        date: Option<NaiveDate>,

        /// Sets as performed; defaults to the planned sets
        #[arg(long = "exercise")]
        exercises: Vec<ExerciseArg>,

        /// Journal left behind by an interrupted completion
        #[arg(long, conflicts_with_all = ["athlete_id", "date", "exercises"])]
        resume: Option<PathBuf>,

        #[arg(long, default_value = "./completion-progress.json")]
        journal: PathBuf,
    },
    /// Delete a session and its exercises
    Delete { athlete_id: i64, date: NaiveDate },
    /// Running statistics per exercise
    Performance {
        athlete_id: i64,

        #[arg(long)]
        exercise_id: Option<i64>,
    },
    /// Weekly and monthly workout trends
    Trends {
        athlete_id: i64,

        #[arg(long)]
        period: Option<TrendPeriod>,
    },
}

#[derive(Subcommand)]
enum ExerciseCommands {
    List,
    Add { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tracker={},storage={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = ClientConfig::new(cli.api_url, cli.api_token)
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    let client = PostgrestClient::new(&config).context("Invalid backend configuration")?;

    match cli.command {
        Commands::Signup {
            name,
            email,
            age,
            goals,
            medical,
        } => handlers::signup(&client, name, email, age, goals, medical).await,
        Commands::Profile {
            user_id,
            name,
            email,
            age,
            goals,
            medical,
        } => handlers::profile(&client, user_id, name, email, age, goals, medical).await,
        Commands::Exercises { command } => match command {
            ExerciseCommands::List => handlers::list_exercises(&client).await,
            ExerciseCommands::Add { name } => handlers::add_exercise(&client, &name).await,
        },
        Commands::Plan {
            athlete_id,
            date,
            exercises,
        } => handlers::plan(&client, athlete_id, date, exercises).await,
        Commands::Show { athlete_id, date } => handlers::show(&client, athlete_id, date).await,
        Commands::Complete {
            athlete_id,
            date,
            exercises,
            resume,
            journal,
        } => match (resume, athlete_id, date) {
            (Some(path), _, _) => handlers::resume(&client, &path).await,
            (None, Some(athlete_id), Some(date)) => {
                handlers::complete(&client, athlete_id, date, exercises, &journal).await
            }
            _ => anyhow::bail!("athlete_id and date are required unless --resume is given"),
        },
        Commands::Delete { athlete_id, date } => handlers::delete(&client, athlete_id, date).await,
        Commands::Performance {
            athlete_id,
            exercise_id,
        } => handlers::performance(&client, athlete_id, exercise_id).await,
        Commands::Trends { athlete_id, period } => {
            handlers::trends(&client, athlete_id, period).await
        }
    }
}
