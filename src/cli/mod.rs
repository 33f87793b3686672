pub mod checklist;
pub mod stats;

use std::{env, path::PathBuf};

use anyhow::Result;
use chrono::Timelike;
use checklist::{print_blocks, print_today, process_toggle_command};
use clap::{Parser, Subcommand};
use stats::{process_chart_command, process_stats_command, ChartCommand, StatsCommand};
use tracing::{debug, level_filters::LevelFilter};

use crate::{
    checklist::{catalog::BlockCatalog, saver::DailyLogSaver},
    storage::log_storage::LogStorageImpl,
    utils::{
        clock::{Clock, DefaultClock},
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, LoggingOptions, CLI_PREFIX},
    },
};

const USER_ENV: &str = "BLOCKLOG_USER";
const DEFAULT_USER: &str = "local";

#[derive(Parser, Debug)]
#[command(name = "Blocklog", version, long_about = None)]
#[command(about = "Application for tracking daily discipline blocks", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        short,
        global = true,
        help = "User whose logs are used. Defaults to $BLOCKLOG_USER, then $USER"
    )]
    user: Option<String>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Toggle blocks for today and save the day")]
    Toggle {
        #[arg(required = true, help = "Keys of the blocks, for example morningPrayer")]
        keys: Vec<String>,
        #[arg(long, help = "Toggle even if the time window of a block is closed")]
        force: bool,
    },
    #[command(about = "Show the checklist for today")]
    Today {},
    #[command(about = "Show streak, weekly trend and most consistent blocks")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },
    #[command(about = "Show completed blocks per day")]
    Chart {
        #[command(flatten)]
        command: ChartCommand,
    },
    #[command(about = "List tracked blocks and their time windows")]
    Blocks {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = args
        .dir
        .map_or_else(create_application_default_path, ensure_dir)?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(
        &app_dir,
        LoggingOptions {
            prefix: CLI_PREFIX,
            level: logging_level,
            show_std: args.log,
        },
    )?;

    let user = resolve_user(args.user);
    debug!("Running for user {user} in {app_dir:?}");

    let catalog = BlockCatalog::load_or_default(&app_dir)?;
    let storage = LogStorageImpl::new(app_dir)?;

    match args.commands {
        Commands::Toggle { keys, force } => {
            let saver = DailyLogSaver::new(storage, Box::new(DefaultClock));
            process_toggle_command(&saver, &user, &catalog, &keys, force).await
        }
        Commands::Today {} => {
            let saver = DailyLogSaver::new(storage, Box::new(DefaultClock));
            print_today(&saver, &user, &catalog).await
        }
        Commands::Stats { command } => process_stats_command(&storage, &user, command).await,
        Commands::Chart { command } => process_chart_command(&storage, &user, command).await,
        Commands::Blocks {} => {
            print_blocks(&catalog, DefaultClock.time().hour());
            Ok(())
        }
    }
}

fn resolve_user(explicit: Option<String>) -> String {
    explicit
        .or_else(|| env::var(USER_ENV).ok())
        .or_else(|| env::var("USER").ok())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_USER.to_string())
}
