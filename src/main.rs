//! Binary entrypoint for the Chorequest CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml` and seed the snapshot
//! - `status` - print the household roster and catalog summary
//! - `add-player <name>` - add a player to the roster
//! - `login <player>` - record a player activation (daily login bonus)
//! - `submit` / `approve` / `deny` - drive the quest lifecycle
//! - `buy <player> <reward>` - spend gems in the shop
//! - `vacation on|off` - pause and resume the cooldown clock
//! - `export-quests` / `import-quests` / `export-rewards` / `import-rewards`
//! - `backup` / `restore [--yes]` - whole-state JSON backup
//! - `set-pin` - set the parent PIN (read without echo)
//!
//! Every mutating command is load → one core operation → save; the core
//! never touches the store itself.
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use chorequest::config::Config;
use chorequest::engine::{self, Clock, PurchaseOutcome, SystemClock};
use chorequest::engine::types::GameState;
use chorequest::exchange;
use chorequest::store::StateStore;
use chorequest::validation::compact_for_log;

#[derive(Parser)]
#[command(name = "chorequest")]
#[command(about = "A quest/reward economy engine for household task tracking")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config.toml and seed the snapshot
    Init,
    /// Show the household roster and catalog summary
    Status,
    /// Add a player to the roster
    AddPlayer {
        /// Display name for the new player
        name: String,
    },
    /// Record a player activation and grant the daily login bonus
    Login {
        /// Player id
        player: String,
    },
    /// Submit a quest for parent review
    Submit {
        player: String,
        quest: String,
    },
    /// Approve a pending quest submission
    Approve {
        player: String,
        quest: String,
    },
    /// Deny a pending quest submission
    Deny {
        player: String,
        quest: String,
    },
    /// Buy a shop reward with gems
    Buy {
        player: String,
        reward: String,
    },
    /// Pause or resume the cooldown clock
    Vacation {
        /// "on" or "off"
        #[arg(value_parser = ["on", "off"])]
        mode: String,
    },
    /// Write the quest catalog as CSV
    ExportQuests {
        /// Output file
        #[arg(default_value = "quests.csv")]
        file: String,
    },
    /// Replace the quest catalog from CSV
    ImportQuests {
        file: String,
    },
    /// Write the reward catalog as CSV
    ExportRewards {
        #[arg(default_value = "rewards.csv")]
        file: String,
    },
    /// Replace the reward catalog from CSV
    ImportRewards {
        file: String,
    },
    /// Write a full JSON backup of the snapshot
    Backup {
        #[arg(default_value = "chorequest-backup.json")]
        file: String,
    },
    /// Overwrite the whole state from a backup file
    Restore {
        file: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Set the parent PIN (read without echo)
    SetPin,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init => Config::default(),
        _ => Config::load_or_default(&cli.config)
            .await
            .with_context(|| format!("loading {}", cli.config))?,
    };
    init_logging(&config, cli.verbose);

    let engine_cfg = config.engine_config().context("resolving engine config")?;
    let store = StateStore::new(&config.storage.state_file);
    let clock = SystemClock;

    match cli.command {
        Commands::Init => {
            info!("initializing new configuration");
            Config::create_default(&cli.config)
                .await
                .with_context(|| format!("writing {}", cli.config))?;
            println!("Configuration file created at {}", cli.config);

            let now = clock.now();
            if store.load().await?.is_none() {
                let mut state = engine::seed_state(now);
                store.save(&mut state, now).await?;
                println!("Seeded default snapshot at {}", config.storage.state_file);
            } else {
                println!(
                    "Snapshot already exists at {}, leaving it alone",
                    config.storage.state_file
                );
            }
        }
        Commands::Status => {
            let state = load_or_seed(&store, &clock).await?;
            print_status(&state);
        }
        Commands::AddPlayer { name } => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            let id = engine::state::add_player(&mut state, &name, now)?;
            store.save(&mut state, now).await?;
            println!("Added player {} ({id})", compact_for_log(&name, 40));
        }
        Commands::Login { player } => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            let outcome = engine::grant_login_bonus(&mut state, &player, now, &engine_cfg)?;
            store.save(&mut state, now).await?;
            if outcome.granted {
                println!("Daily login bonus granted (level {})", outcome.level);
                if outcome.leveled_up {
                    println!("Level up! 🎉");
                }
            } else {
                println!("Login bonus already granted today");
            }
        }
        Commands::Submit { player, quest } => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            engine::submit(&mut state, &player, &quest)?;
            store.save(&mut state, now).await?;
            println!("Submitted {quest} for review");
        }
        Commands::Approve { player, quest } => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            let outcome = engine::approve(&mut state, &player, &quest, now, &engine_cfg)?;
            store.save(&mut state, now).await?;
            println!(
                "Approved: +{} XP, +{} gems (level {}, streak {})",
                outcome.xp_awarded, outcome.gems_awarded, outcome.level, outcome.streak
            );
            if let Some(loot) = outcome.loot {
                println!("Loot found: {loot}");
            }
            if let Some(next) = outcome.next_assignee {
                println!("Rotation advanced to {next}");
            }
        }
        Commands::Deny { player, quest } => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            engine::deny(&mut state, &player, &quest, now)?;
            store.save(&mut state, now).await?;
            println!("Denied {quest}");
        }
        Commands::Buy { player, reward } => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            let outcome = engine::purchase(&mut state, &player, &reward, now, &engine_cfg)?;
            store.save(&mut state, now).await?;
            match outcome {
                PurchaseOutcome::Purchased {
                    cost,
                    remaining_gems,
                } => println!("Purchased for {cost} gems ({remaining_gems} left)"),
                PurchaseOutcome::Rejected(denied) => {
                    println!("{}", denied.message(now));
                }
            }
        }
        Commands::Vacation { mode } => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            if mode == "on" {
                engine::vacation::enable(&mut state, now)?;
                store.save(&mut state, now).await?;
                println!("Vacation mode enabled");
            } else {
                let summary = engine::vacation::disable(&mut state, now)?;
                store.save(&mut state, now).await?;
                println!(
                    "Vacation mode disabled, {} cooldown(s) shifted",
                    summary.shifted
                );
            }
        }
        Commands::ExportQuests { file } => {
            let state = load_or_seed(&store, &clock).await?;
            let csv = exchange::quests_to_csv(&state.quests);
            tokio::fs::write(&file, csv)
                .await
                .with_context(|| format!("writing {file}"))?;
            println!("Exported {} quest(s) to {file}", state.quests.len());
        }
        Commands::ImportQuests { file } => {
            let now = clock.now();
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {file}"))?;
            let (quests, warnings) = exchange::quests_from_csv(&content);
            let mut state = load_or_seed(&store, &clock).await?;
            state.quests = quests;
            store.save(&mut state, now).await?;
            print_warnings(&warnings);
            println!("Imported {} quest(s), replacing the catalog", state.quests.len());
        }
        Commands::ExportRewards { file } => {
            let state = load_or_seed(&store, &clock).await?;
            let csv = exchange::rewards_to_csv(&state.rewards);
            tokio::fs::write(&file, csv)
                .await
                .with_context(|| format!("writing {file}"))?;
            println!("Exported {} reward(s) to {file}", state.rewards.len());
        }
        Commands::ImportRewards { file } => {
            let now = clock.now();
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {file}"))?;
            let (rewards, warnings) = exchange::rewards_from_csv(&content);
            let mut state = load_or_seed(&store, &clock).await?;
            state.rewards = rewards;
            store.save(&mut state, now).await?;
            print_warnings(&warnings);
            println!(
                "Imported {} reward(s), replacing the catalog",
                state.rewards.len()
            );
        }
        Commands::Backup { file } => {
            let state = load_or_seed(&store, &clock).await?;
            let json = exchange::export_backup(&state)?;
            tokio::fs::write(&file, json)
                .await
                .with_context(|| format!("writing {file}"))?;
            println!("Backup written to {file}");
        }
        Commands::Restore { file, yes } => {
            let now = clock.now();
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {file}"))?;
            let current = load_or_seed(&store, &clock).await?;
            let mut restored = exchange::import_backup(&content, &current.parent_pin)?;

            if !yes && !confirm_overwrite()? {
                println!("Restore cancelled.");
                return Ok(());
            }
            store.save(&mut restored, now).await?;
            println!(
                "Restored {} player(s), {} quest(s), {} reward(s)",
                restored.users.len(),
                restored.quests.len(),
                restored.rewards.len()
            );
        }
        Commands::SetPin => {
            let now = clock.now();
            let mut state = load_or_seed(&store, &clock).await?;
            let pin1 = rpassword::prompt_password("New PIN (4 digits): ")?;
            let pin2 = rpassword::prompt_password("Confirm PIN: ")?;
            if pin1 != pin2 {
                println!("Error: PINs do not match.");
                return Ok(());
            }
            engine::state::set_parent_pin(&mut state, &pin1)?;
            store.save(&mut state, now).await?;
            println!("Parent PIN updated.");
        }
    }

    Ok(())
}

/// Load the snapshot, seeding and persisting the defaults on first run.
async fn load_or_seed(store: &StateStore, clock: &SystemClock) -> Result<GameState> {
    match store.load().await? {
        Some(state) => Ok(state),
        None => {
            let now = clock.now();
            let mut state = engine::seed_state(now);
            store.save(&mut state, now).await?;
            info!("seeded default snapshot");
            Ok(state)
        }
    }
}

fn print_status(state: &GameState) {
    println!(
        "Chorequest: {} player(s), {} quest(s), {} reward(s), weekly goal {}",
        state.users.len(),
        state.quests.len(),
        state.rewards.len(),
        state.weekly_goal
    );
    if state.vacation_mode {
        println!("Vacation mode is ACTIVE");
    }
    for player in &state.users {
        let flag = if player.is_deactivated { " (deactivated)" } else { "" };
        println!(
            "  {} {} [{}]{} - level {}, {} XP, {} gems, streak {}, {} pending",
            player.avatar,
            player.name,
            player.id,
            flag,
            player.level,
            player.total_xp,
            player.gems,
            player.streak,
            player.pending_ids.len()
        );
    }
}

fn print_warnings(warnings: &[exchange::ImportWarning]) {
    for w in warnings {
        println!("  warning (line {}, {}): {}", w.line, w.field, w.message);
    }
}

fn confirm_overwrite() -> Result<bool> {
    use std::io::{BufRead, Write};
    print!("This will overwrite the current state. Type 'yes' to continue: ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("yes"))
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // Base level from CLI verbosity overrides config
    let base_level = match verbosity {
        0 => match config.logging.level.as_str() {
            "debug" => log::LevelFilter::Debug,
            "trace" => log::LevelFilter::Trace,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        },
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    if let Some(ref file) = config.logging.file {
        if let Ok(f) = std::fs::OpenOptions::new().create(true).append(true).open(file) {
            let mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            let write_mutex = mutex.clone();
            let is_tty = atty::is(atty::Stream::Stderr);
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
    } else {
        builder.format(|fmt, record| {
            writeln!(
                fmt,
                "{} [{}] {}",
                chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
                record.level(),
                record.args()
            )
        });
    }
    let _ = builder.try_init();
}
