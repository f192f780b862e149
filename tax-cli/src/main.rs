use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use tax_cli::app::{self, EntryEdit};
use tax_cli::{CliConfig, Overrides, Settings, logging, report};
use tax_core::calculations::ComparisonCoordinator;
use tax_core::{DeductionItemId, Scenario, SessionStore};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Thai personal income tax calculator.
///
/// Compares the tax owed with no optional deductions against two
/// user-defined deduction plans, and keeps sessions in a store.
#[derive(Debug, Parser)]
#[command(name = "thai-tax", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// TOML file supplying defaults for the options below.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session store backend (`memory` or `sqlite`).
    #[arg(long, global = true)]
    backend: Option<String>,

    /// Store connection string.
    /// For SQLite this is a file path (e.g. `sessions.db`) or `:memory:`.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Buddhist-era tax year, e.g. 2568.
    #[arg(long, global = true)]
    year: Option<i32>,

    /// Bracket CSV replacing the built-in table.
    #[arg(long, global = true)]
    brackets: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `warn,tax_core=debug`. Overrides RUST_LOG.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log output to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Hide log output on the terminal.
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compare baseline, plan 1 and plan 2.
    Compare {
        /// Session JSON file.
        #[arg(long, conflicts_with = "key")]
        session: Option<PathBuf>,

        /// Stored session key.
        #[arg(long, required_unless_present = "session")]
        key: Option<String>,

        /// Plan CSV replacing the session's plans.
        #[arg(long)]
        plans: Option<PathBuf>,

        /// Print the snapshot as JSON.
        #[arg(long)]
        json: bool,

        /// Evaluate the three scenarios on separate threads.
        #[arg(long)]
        parallel: bool,
    },

    /// Store a session JSON file under a key.
    Save {
        #[arg(long)]
        session: PathBuf,
        #[arg(long)]
        key: String,
    },

    /// Print a stored session as JSON.
    Show {
        #[arg(long)]
        key: String,
        /// Write to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Delete a stored session.
    Delete {
        #[arg(long)]
        key: String,
    },

    /// List stored session keys.
    List,

    /// Set one plan item in a stored session.
    SetEntry {
        #[arg(long)]
        key: String,
        /// `plan1` or `plan2`.
        #[arg(long, value_parser = parse_plan)]
        plan: Scenario,
        /// Deduction item id, e.g. `rmf` or `life_insurance`.
        #[arg(long)]
        item: DeductionItemId,
        /// Amount in baht; commas allowed.
        #[arg(long, conflicts_with_all = ["max", "disable"], required_unless_present_any = ["max", "disable"])]
        amount: Option<String>,
        /// Use the most that still counts.
        #[arg(long, conflicts_with = "disable")]
        max: bool,
        /// Untick the item.
        #[arg(long)]
        disable: bool,
    },

    /// Derive income from a salary-slip CSV.
    ImportSlips {
        #[arg(long)]
        slips: PathBuf,
        /// Project the months present over twelve.
        #[arg(long)]
        estimated: bool,
        /// Write the income into this stored session.
        #[arg(long)]
        key: Option<String>,
    },

    /// Read salary and social security from slip text (e.g. OCR output).
    ExtractSlip {
        #[arg(long)]
        text: PathBuf,
    },

    /// Print the bracket table in effect.
    Brackets,
}

fn parse_plan(s: &str) -> Result<Scenario, String> {
    match Scenario::parse(s) {
        Some(s @ (Scenario::Plan1 | Scenario::Plan2)) => Ok(s),
        _ => Err(format!("'{s}' is not a plan; use plan1 or plan2")),
    }
}

// ─── logging ─────────────────────────────────────────────────────────────────

fn configure_logging(
    settings: &Settings,
    quiet: bool,
) -> anyhow::Result<()> {
    if let Some(level) = &settings.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &settings.log_file {
        logging::enable_file_logging(path)?;
    }
    if quiet {
        logging::set_stderr_enabled(false)?;
    }
    Ok(())
}

// ─── commands ────────────────────────────────────────────────────────────────

async fn open_store(settings: &Settings) -> anyhow::Result<Box<dyn SessionStore>> {
    debug!("connecting to {} backend", settings.store.backend);
    let registry = app::build_registry();
    let store = registry
        .create(&settings.store)
        .await
        .context("failed to open session store")?;
    Ok(store)
}

async fn run(
    command: Command,
    settings: &Settings,
) -> anyhow::Result<()> {
    let mut stdout = io::stdout().lock();

    match command {
        Command::Compare {
            session,
            key,
            plans,
            json,
            parallel,
        } => {
            let mut session = match (session, key) {
                (Some(path), _) => app::read_session_file(&path)?,
                (None, Some(key)) => open_store(settings)
                    .await?
                    .load(&key)
                    .await?
                    .with_context(|| format!("no session stored under '{key}'"))?,
                (None, None) => anyhow::bail!("give --session or --key"),
            };
            if let Some(path) = plans {
                let entries = tax_data::load_plan_from_file(&path)?;
                app::apply_plans(&mut session, entries);
            }

            let rules = app::load_rules(session.tax_year, settings.brackets_file.as_deref())?;
            let coordinator = ComparisonCoordinator::new(&rules);
            let snapshot = if parallel {
                coordinator.compare_parallel(
                    &session.income,
                    &session.basic,
                    &session.plan1,
                    &session.plan2,
                )
            } else {
                coordinator.compare(&session.income, &session.basic, &session.plan1, &session.plan2)
            };
            info!(
                recommendation = ?snapshot.recommendation,
                baseline_tax = %snapshot.baseline.tax_owed,
                "comparison complete"
            );

            if json {
                serde_json::to_writer_pretty(&mut stdout, &snapshot)?;
                writeln!(stdout)?;
            } else {
                report::write_snapshot(&mut stdout, &snapshot)?;
            }
        }

        Command::Save { session, key } => {
            let mut session = app::read_session_file(&session)?;
            session.saved_at = Some(Utc::now());
            if settings.is_ephemeral_store() {
                warn!(backend = %settings.store.backend, "store does not persist between runs");
            }
            open_store(settings).await?.save(&key, &session).await?;
            info!(key, "session saved");
        }

        Command::Show { key, out } => {
            let session = open_store(settings)
                .await?
                .load(&key)
                .await?
                .with_context(|| format!("no session stored under '{key}'"))?;
            match out {
                Some(path) => app::write_session_file(&path, &session)?,
                None => {
                    serde_json::to_writer_pretty(&mut stdout, &session)?;
                    writeln!(stdout)?;
                }
            }
        }

        Command::Delete { key } => {
            open_store(settings).await?.delete(&key).await?;
            info!(key, "session deleted");
        }

        Command::List => {
            for key in open_store(settings).await?.list_keys().await? {
                writeln!(stdout, "{key}")?;
            }
        }

        Command::SetEntry {
            key,
            plan,
            item,
            amount,
            max,
            disable,
        } => {
            let edit = match (amount, max, disable) {
                (_, true, _) => EntryEdit::Max,
                (_, _, true) => EntryEdit::Disable,
                (Some(text), _, _) => EntryEdit::Amount(text),
                (None, false, false) => anyhow::bail!("give --amount, --max or --disable"),
            };
            let store = open_store(settings).await?;
            let mut session = app::load_or_new(store.as_ref(), &key, settings.tax_year).await?;
            let amount = app::edit_entry(&mut session, plan, item, edit)?;
            session.saved_at = Some(Utc::now());
            store.save(&key, &session).await?;
            writeln!(stdout, "{plan} {item} = {}", tax_cli::utils::format_baht(amount))?;
        }

        Command::ImportSlips {
            slips,
            estimated,
            key,
        } => {
            let rows = tax_data::load_slips_from_file(&slips)?;
            let import = if estimated {
                tax_data::IncomeImport::estimated(&rows)?
            } else {
                tax_data::IncomeImport::actual(&rows)?
            };
            report::write_import(&mut stdout, &import)?;

            if let Some(key) = key {
                let store = open_store(settings).await?;
                let mut session =
                    app::load_or_new(store.as_ref(), &key, settings.tax_year).await?;
                app::apply_import(&mut session, &import);
                session.saved_at = Some(Utc::now());
                store.save(&key, &session).await?;
                info!(key, months = import.months_used, "income imported into session");
            }
        }

        Command::ExtractSlip { text } => {
            let contents = std::fs::read_to_string(&text)
                .with_context(|| format!("failed to read '{}'", text.display()))?;
            let extraction = tax_data::extract_slip_fields(&contents);
            if !extraction.found {
                warn!(path = %text.display(), "no salary figure found; enter it by hand");
            }
            serde_json::to_writer_pretty(&mut stdout, &extraction)?;
            writeln!(stdout)?;
        }

        Command::Brackets => {
            let rules = app::load_rules(settings.tax_year, settings.brackets_file.as_deref())?;
            report::write_brackets(&mut stdout, rules.tax_year, &rules.brackets)?;
        }
    }

    Ok(())
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_default_logging();

    let cli = Cli::parse();
    let config = CliConfig::load_or_default(cli.global.config.as_deref())?;
    let settings = Settings::resolve(
        config,
        Overrides {
            backend: cli.global.backend,
            db: cli.global.db,
            tax_year: cli.global.year,
            brackets_file: cli.global.brackets,
            log_level: cli.global.log_level,
            log_file: cli.global.log_file,
        },
    );
    configure_logging(&settings, cli.global.quiet)?;
    debug!(?settings, "settings resolved");

    run(cli.command, &settings).await
}
