use chrono::{Local, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use drinkmate_core::bac::validate_amount;
use drinkmate_core::catalog::Catalog;
use drinkmate_core::report::{describe_event, SessionSummary};
use drinkmate_core::*;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "drinkmate")]
#[command(about = "Drink tracker with BAC estimate and pace warnings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current session (default)
    Status,

    /// Search the drink catalog
    Search {
        /// Name or part of a name; lists everything when omitted
        query: Option<String>,
    },

    /// Log a drink
    Add {
        /// Drink to log, matched against the catalog
        query: String,

        /// Number of servings (0.5 to 10, in steps of 0.5)
        #[arg(long, default_value_t = 1.0)]
        amount: f64,

        /// Double serving
        #[arg(long)]
        double: bool,
    },

    /// Change a logged drink
    Edit {
        /// Event id or a unique prefix of it
        id: String,

        /// Replace the drink
        #[arg(long)]
        drink: Option<String>,

        /// New number of servings
        #[arg(long)]
        amount: Option<f64>,

        /// Mark as a double serving
        #[arg(long, conflicts_with = "single")]
        double: bool,

        /// Mark as a single serving
        #[arg(long)]
        single: bool,
    },

    /// Remove a logged drink
    Delete {
        /// Event id or a unique prefix of it
        id: String,
    },

    /// Show or update the body profile
    Profile {
        /// Body weight in kilograms
        #[arg(long)]
        weight: Option<f64>,

        #[arg(long, value_enum)]
        sex: Option<SexArg>,
    },

    /// Roll up the event log to CSV
    Rollup {
        /// Clean up processed logs after rollup
        #[arg(long)]
        cleanup: bool,
    },

    /// Clear the current session
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum SexArg {
    Male,
    Female,
    Other,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
            SexArg::Other => Sex::Other,
        }
    }
}

/// Files under the data directory
struct Paths {
    session: PathBuf,
    log_dir: PathBuf,
    log: PathBuf,
    csv: PathBuf,
}

impl Paths {
    fn new(data_dir: &Path) -> Self {
        let log_dir = data_dir.join("log");
        Self {
            session: data_dir.join("session.json"),
            log: log_dir.join("events.jsonl"),
            log_dir,
            csv: data_dir.join("drinks.csv"),
        }
    }
}

fn main() -> Result<()> {
    drinkmate_core::logging::init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::default_config_path);
    let config = Config::load_or_default(&config_path)?;
    let data_dir = cli
        .data_dir
        .unwrap_or_else(|| config.data.data_dir.clone());
    let paths = Paths::new(&data_dir);

    match cli.command {
        Some(Commands::Search { query }) => cmd_search(query.as_deref().unwrap_or(""), &config),
        Some(Commands::Add {
            query,
            amount,
            double,
        }) => cmd_add(&paths, &query, amount, double, &config),
        Some(Commands::Edit {
            id,
            drink,
            amount,
            double,
            single,
        }) => {
            let is_double = match (double, single) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            cmd_edit(&paths, &id, drink.as_deref(), amount, is_double, &config)
        }
        Some(Commands::Delete { id }) => cmd_delete(&paths, &id),
        Some(Commands::Profile { weight, sex }) => {
            cmd_profile(config, &config_path, weight, sex.map(Sex::from))
        }
        Some(Commands::Rollup { cleanup }) => cmd_rollup(&paths, cleanup),
        Some(Commands::Reset) => cmd_reset(&paths),
        Some(Commands::Status) | None => cmd_status(&paths),
    }
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    let catalog = Catalog::load_or_default(config.search.catalog_path.as_deref())?;
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn cmd_search(query: &str, config: &Config) -> Result<()> {
    let catalog = load_catalog(config)?;
    let matches = catalog.search(query, config.search.match_threshold);

    if matches.is_empty() {
        println!("No drinks match '{}'", query);
        return Ok(());
    }

    for drink in matches {
        println!(
            "  {} {:<24} {:>5.0} ml  {:>4.1}%  {}",
            drink.glyph,
            drink.name,
            drink.volume_ml,
            drink.abv * 100.0,
            drink.category
        );
    }

    Ok(())
}

fn cmd_add(paths: &Paths, query: &str, amount: f64, double: bool, config: &Config) -> Result<()> {
    let amount = validate_amount(amount)?;
    let catalog = load_catalog(config)?;
    let drink = catalog.best_match(query, config.search.match_threshold)?;

    let event = DrinkEvent::log(drink, amount, double, &config.profile, Utc::now());
    tracing::debug!("Logging {} as event {}", drink.name, event.id);

    // Append inside the update: a failed append skips the session save
    let mut sink = JsonlSink::new(&paths.log);
    let session = SessionState::update(&paths.session, |s| {
        sink.append(&event)?;
        Ok(s.apply(event.clone()))
    })?;

    println!(
        "✓ Logged {} {} [{}]",
        event.glyph,
        describe_event(&event),
        short_id(&event)
    );
    print_status(&session);

    Ok(())
}

fn cmd_edit(
    paths: &Paths,
    id: &str,
    drink_query: Option<&str>,
    amount: Option<f64>,
    is_double: Option<bool>,
    config: &Config,
) -> Result<()> {
    let amount = amount.map(validate_amount).transpose()?;
    let catalog = load_catalog(config)?;

    let mut sink = JsonlSink::new(&paths.log);
    let mut revised = None;
    let session = SessionState::update(&paths.session, |s| {
        let event_id = s.resolve_id(id)?;
        let current = s
            .find(event_id)
            .ok_or_else(|| Error::EventNotFound(id.to_string()))?;

        let drink = match drink_query {
            Some(q) => catalog.best_match(q, config.search.match_threshold)?,
            None => catalog
                .find(&current.name)
                .ok_or_else(|| Error::NoMatch(current.name.clone()))?,
        };

        let event = current.revise(
            drink,
            amount.unwrap_or(current.amount),
            is_double.unwrap_or(current.is_double),
            &config.profile,
        );
        sink.append(&event)?;
        revised = Some(event.clone());
        Ok(s.apply(event))
    })?;

    if let Some(event) = revised {
        println!(
            "✓ Updated {} {} [{}]",
            event.glyph,
            describe_event(&event),
            short_id(&event)
        );
    }
    print_status(&session);

    Ok(())
}

fn cmd_delete(paths: &Paths, id: &str) -> Result<()> {
    let mut sink = JsonlSink::new(&paths.log);
    let mut removed = None;
    let session = SessionState::update(&paths.session, |s| {
        let event_id = s.resolve_id(id)?;
        sink.remove(event_id)?;
        removed = s.find(event_id).cloned();
        Ok(s.remove(event_id))
    })?;

    if let Some(event) = removed {
        println!("✓ Removed {} {}", event.glyph, describe_event(&event));
    }
    print_status(&session);

    Ok(())
}

fn cmd_status(paths: &Paths) -> Result<()> {
    let session = SessionState::load(&paths.session)?;
    print_status(&session);

    if session.events.is_empty() {
        return Ok(());
    }

    println!();
    println!("  Recent drinks:");
    for event in &session.events {
        println!(
            "    {}  {} {:<28} {}",
            short_id(event),
            event.glyph,
            describe_event(event),
            event.timestamp.with_timezone(&Local).format("%-I:%M%p")
        );
    }

    Ok(())
}

fn cmd_profile(
    mut config: Config,
    config_path: &Path,
    weight: Option<f64>,
    sex: Option<Sex>,
) -> Result<()> {
    if weight.is_some() || sex.is_some() {
        if let Some(w) = weight {
            config.profile.weight_kg = w;
        }
        if let Some(s) = sex {
            config.profile.sex = s;
        }
        config.save_to(config_path)?;
        println!("✓ Profile saved to {}", config_path.display());
    }

    println!("  Weight: {:.1} kg", config.profile.weight_kg);
    println!(
        "  Sex: {:?} (distribution factor {:.2})",
        config.profile.sex,
        config.profile.sex.distribution_factor()
    );

    Ok(())
}

fn cmd_rollup(paths: &Paths, cleanup: bool) -> Result<()> {
    if !paths.log.exists() {
        println!("No event log found - nothing to roll up.");
        return Ok(());
    }

    let count = drinkmate_core::archive::log_to_csv_and_archive(&paths.log, &paths.csv)?;

    println!("✓ Rolled up {} drinks to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = drinkmate_core::archive::cleanup_processed_logs(&paths.log_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed logs", cleaned);
        }
    }

    Ok(())
}

fn cmd_reset(paths: &Paths) -> Result<()> {
    SessionState::default().save(&paths.session)?;
    println!("✓ Session cleared");
    Ok(())
}

fn short_id(event: &DrinkEvent) -> String {
    event.id.to_string().chars().take(8).collect()
}

/// Colour `text` with the level's colour when stdout is a terminal
fn paint(level: RiskLevel, text: &str) -> String {
    if !std::io::stdout().is_terminal() {
        return text.to_string();
    }

    let (r, g, b) = level.rgb();
    let channel = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "\x1b[38;2;{};{};{}m{}\x1b[0m",
        channel(r),
        channel(g),
        channel(b),
        text
    )
}

fn print_status(session: &SessionState) {
    let summary = SessionSummary::new(session, Utc::now());

    println!();
    println!("  BAC: {:.3}%  ({})", summary.bac, summary.status());
    println!("  Safe to drive in: {}", summary.time_until_safe());
    println!(
        "  {} {}",
        summary.risk.level.icon(),
        paint(
            summary.risk.level,
            &format!(
                "{}: {}",
                summary.risk.level.label(),
                summary.risk.level.message()
            )
        )
    );
    for insight in &summary.risk.insights {
        println!("    • {}", insight);
    }
    println!("  Drinks in session: {}", summary.event_count);
}
