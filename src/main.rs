//! Binary entrypoint for the bonsaigotchi CLI.
//!
//! Commands:
//! - `init [--force]` - write a starter `bonsai.toml`
//! - `status` - load the save, catch up to now and print a summary
//! - `care <action>` - apply one care action and save
//! - `feed <item>` / `buy <item> [qty]` / `claim` - food and wallet commands
//! - `unlock <item>` - record a shop unlock
//! - `rename <name>` - give the bonsai a new name
//! - `simulate --minutes N` - fast-forward N simulated minutes headlessly and save
//! - `run [--autosave-minutes N] [--no-autosave]` - tick live until Ctrl-C, autosaving,
//!   then save once more
//!
//! See the library crate docs for module-level details: `bonsaigotchi::`.
use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::{info, warn};

use bonsaigotchi::config::Config;
use bonsaigotchi::logutil::vitals_line;
use bonsaigotchi::session::Session;
use bonsaigotchi::sim::{CareAction, FoodItem};
use bonsaigotchi::storage::LoadSource;

#[derive(Parser)]
#[command(name = "bonsaigotchi")]
#[command(about = "A headless bonsai virtual pet simulation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "bonsai.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Show the creature and environment
    Status,
    /// Apply a care action (water, prune, rest, fertilize, clean, exercise, train, play, meditate)
    Care { action: String },
    /// Feed an item from the inventory (burger, ice_cream, vegetables, premium_nutrients, special_treat)
    Feed { item: String },
    /// Buy food with bonsai bills
    Buy {
        item: String,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Claim the daily bonsai bills reward
    Claim,
    /// Record a shop item as unlocked
    Unlock { item: String },
    /// Rename the bonsai (1-50 characters)
    Rename { name: String },
    /// Fast-forward simulated time without waiting
    Simulate {
        /// Simulated minutes to run, one tick per minute
        #[arg(short, long, default_value_t = 60)]
        minutes: u32,
    },
    /// Run the live tick loop until Ctrl-C
    Run {
        /// Autosave interval in minutes, overriding the configuration
        #[arg(long)]
        autosave_minutes: Option<u64>,
        /// Disable autosave for this run (the final save still happens)
        #[arg(long)]
        no_autosave: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        init_logging(&None, cli.verbose);
        if !force && tokio::fs::try_exists(&cli.config).await.unwrap_or(false) {
            return Err(anyhow!(
                "{} already exists (use --force to overwrite)",
                cli.config
            ));
        }
        Config::create_default(&cli.config).await?;
        println!("Wrote default configuration to {}", cli.config);
        return Ok(());
    }

    let config = Config::load_or_default(&cli.config).await?;
    init_logging(&Some(config.clone()), cli.verbose);

    let now = Utc::now();
    let (session, outcome) = Session::open(&config, now)?;
    match outcome.source {
        LoadSource::Primary => {}
        LoadSource::Backup => println!("Main save was unreadable; restored the backup copy."),
        LoadSource::Fresh if !outcome.problems.is_empty() => {
            println!("No usable save found; a new bonsai was planted.")
        }
        LoadSource::Fresh => info!("Starting with a new bonsai"),
    }
    session.tick(now)?;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Status => {
            print_status(&session, now)?;
            return Ok(());
        }
        Commands::Care { action } => {
            let action = CareAction::parse(&action)
                .ok_or_else(|| anyhow!("unknown care action '{}'", action))?;
            if session.act(action, now)? {
                println!("{} done.", action);
            } else {
                println!("{} is not available right now (cooldown or low energy).", action);
            }
        }
        Commands::Feed { item } => {
            let food = FoodItem::from_id(&item).ok_or_else(|| anyhow!("unknown food '{}'", item))?;
            if session.feed(food, now)? {
                println!("Fed {}.", food.id());
            } else {
                println!("No {} left in the inventory.", food.id());
            }
        }
        Commands::Buy { item, quantity } => {
            let food = FoodItem::from_id(&item).ok_or_else(|| anyhow!("unknown food '{}'", item))?;
            session.buy(food, quantity)?;
            println!("Bought {} x {}.", quantity, food.id());
        }
        Commands::Claim => match session.claim_daily_reward(now)? {
            Some(amount) => println!("Claimed {} bonsai bills.", amount),
            None => println!("Daily reward already claimed; come back later."),
        },
        Commands::Unlock { item } => {
            if session.unlock(&item)? {
                println!("Unlocked {}.", item.trim());
            } else {
                println!("{} was already unlocked.", item.trim());
            }
        }
        Commands::Rename { name } => {
            session.rename(&name)?;
            let name = session.inspect(|world| world.creature.name().to_string())?;
            println!("Your bonsai is now called {}.", name);
        }
        Commands::Simulate { minutes } => {
            let ticks = session.fast_forward(minutes, now)?;
            let rollovers: u32 = ticks.iter().map(|t| t.creature.day_rollovers).sum();
            let levels: u32 = ticks.iter().map(|t| t.creature.levels_gained).sum();
            println!(
                "Simulated {} minutes: {} game days passed, {} levels gained.",
                minutes, rollovers, levels
            );
        }
        Commands::Run {
            autosave_minutes,
            no_autosave,
        } => {
            info!("Starting bonsaigotchi v{}", env!("CARGO_PKG_VERSION"));
            if no_autosave || autosave_minutes.is_some() {
                session.configure_autosave(!no_autosave, autosave_minutes)?;
            }
            match session.autosave_status() {
                Some(status) if status.enabled => {
                    info!("Autosaving every {} minutes", status.interval_minutes)
                }
                _ => info!("Autosave is off; saving on exit only"),
            }
            session
                .run_until(async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                    }
                })
                .await?;
            return Ok(());
        }
    }

    session.save_now(Utc::now()).await?;
    print_status(&session, now)?;
    Ok(())
}

fn print_status(session: &Session, now: DateTime<Utc>) -> Result<()> {
    let ready = session.available_actions(now)?;
    session.inspect(|world| {
        let c = &world.creature;
        let env = &world.environment;
        let clock = c.clock();
        println!("{}", vitals_line(c));
        println!(
            "  stage {:?}, xp {}, mood {:?}, condition {:?}, age {} days, streak {}",
            c.growth_stage(),
            c.xp(),
            c.mood_state(),
            c.health_condition(),
            c.age(),
            c.consecutive_days_good_care()
        );
        println!(
            "  game time {:02}:{:02} day {} month {} year {}",
            clock.hour, clock.minute, clock.day, clock.month, clock.year
        );
        println!(
            "  bills {}, inventory {:?}",
            c.wallet().balance(),
            c.inventory().counts()
        );
        let r = env.readings();
        println!(
            "  {:?} {:?} {:?} ({:?}), {:.1}C humidity {:.0} light {:.0}",
            env.climate_zone(),
            env.season(),
            env.weather(),
            env.time_of_day(),
            r.temperature,
            r.humidity,
            r.light_quality
        );
        for event in env.active_events() {
            println!(
                "  event {:?} intensity {}, {:.1}h left",
                event.event_type,
                event.intensity,
                event.remaining_hours(env.game_minutes())
            );
        }
        let ready: Vec<String> = ready.iter().map(|action| action.to_string()).collect();
        println!("  ready: {}", ready.join(", "));
    })?;
    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|cfg| cfg.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.as_ref().and_then(|cfg| cfg.logging.file.clone());
    match log_file.and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .ok()
    }) {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // Echo to the console only in the foreground
            let is_tty = atty::is(atty::Stream::Stdout);
            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());
                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }
                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
