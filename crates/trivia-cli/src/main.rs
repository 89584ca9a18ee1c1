use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use trivia_core::{
    CalendarDay, Continent, CoreError, EngineConfig, LevelCurve, PlayerSnapshot, ProgressUpdate,
    QuestionCatalog, Session, UserProgress, assignment_for_date, daily_phase, export_json,
    import_json, on_challenge_completed, streak_standing, theme_for_date, today_utc,
    visible_streak,
};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

#[derive(Parser)]
#[command(name = "trivia", about = "Trivia game engine CLI")]
struct Cli {
    /// Question catalog JSON (default: built-in sample catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Engine config TOML
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Player snapshot JSON
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the level reached with a given XP total
    Level {
        xp: u64,
    },

    /// Show the cumulative XP needed for a level and its milestone unlocks
    Xp {
        level: u32,
    },

    /// Show (and open) the daily assignment
    Daily {
        /// Day as YYYY-MM-DD (default: today, UTC)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the player's level, streak and daily progress
    Status {
        #[arg(long)]
        date: Option<String>,
    },

    /// Record completion of the daily challenge
    Complete {
        #[arg(long)]
        date: Option<String>,
    },

    /// Play an adaptive quiz session, answers read from stdin
    Play {
        /// Number of questions
        #[arg(long, default_value_t = 5)]
        count: usize,

        /// RNG seed for reproducible question order
        #[arg(long)]
        seed: Option<u64>,

        /// Restrict to one continent
        #[arg(long)]
        continent: Option<String>,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(&cli)?;
    let curve = LevelCurve::new(&config.curve).context("failed to build level curve")?;

    match &cli.command {
        Commands::Level { xp } => cmd_level(&curve, *xp),
        Commands::Xp { level } => cmd_xp(&curve, *level),
        Commands::Daily { date } => cmd_daily(&cli, date.as_deref()),
        Commands::Status { date } => cmd_status(&cli, &curve, date.as_deref()),
        Commands::Complete { date } => cmd_complete(&cli, &config, &curve, date.as_deref()),
        Commands::Play {
            count,
            seed,
            continent,
            category,
        } => cmd_play(
            &cli,
            &config,
            &curve,
            *count,
            *seed,
            continent.as_deref(),
            category.as_deref(),
        ),
    }
}

// ---------------------------------------------------------------------------
// Inputs: config, catalog, player snapshot
// ---------------------------------------------------------------------------

fn path_from(flag: Option<&PathBuf>, var: &str) -> Option<PathBuf> {
    flag.cloned()
        .or_else(|| std::env::var(var).ok().map(PathBuf::from))
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let Some(path) = path_from(cli.config.as_ref(), "TRIVIA_CONFIG") else {
        return Ok(EngineConfig::default());
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = EngineConfig::from_toml_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

fn load_catalog(cli: &Cli) -> Result<QuestionCatalog> {
    match path_from(cli.catalog.as_ref(), "TRIVIA_CATALOG") {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read catalog {}", path.display()))?;
            QuestionCatalog::from_json(&content)
                .with_context(|| format!("failed to load catalog {}", path.display()))
        }
        None => QuestionCatalog::from_json(BUILTIN_CATALOG).context("built-in catalog is invalid"),
    }
}

fn default_state_path() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".trivia")
        .join("player.json")
}

fn state_path(cli: &Cli) -> PathBuf {
    path_from(cli.state.as_ref(), "TRIVIA_STATE").unwrap_or_else(default_state_path)
}

/// Missing file means a fresh player.
fn load_snapshot(path: &Path) -> Result<PlayerSnapshot> {
    match std::fs::read_to_string(path) {
        Ok(content) => import_json(&content)
            .with_context(|| format!("failed to parse player state {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(PlayerSnapshot::default()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn save_snapshot(path: &Path, snapshot: &PlayerSnapshot) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = export_json(snapshot).context("failed to serialize player state")?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!("saved player state to {}", path.display());
    Ok(())
}

fn parse_date(date: Option<&str>) -> Result<CalendarDay> {
    match date {
        Some(s) => CalendarDay::parse(s).with_context(|| format!("bad --date '{s}'")),
        None => Ok(today_utc()),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_level(curve: &LevelCurve, xp: u64) -> Result<()> {
    let view = UserProgress::new(xp).view(curve);
    println!("level:      {}", view.level);
    println!("tier:       {} ({} {})", view.tier, view.title, view.badge);
    println!("xp:         {}", view.xp);
    if view.capped {
        println!("next:       (capped at max level)");
    } else {
        println!(
            "next:       {} XP to go ({:.0}% through level)",
            view.xp_to_next,
            view.progress * 100.0
        );
    }
    Ok(())
}

fn cmd_xp(curve: &LevelCurve, level: u32) -> Result<()> {
    let xp = curve.xp_for_level(level);
    let tier = curve.tier_for_level(level).value();
    if xp.is_clamped() {
        let shown = curve.level_for_xp(xp.value()).value();
        println!("level:      {shown} (clamped)");
    } else {
        println!("level:      {level}");
    }
    println!("xp:         {}", xp.value());
    println!("tier:       {tier}");

    let unlocks = curve.milestone_unlocks_for_level(level);
    if !unlocks.is_empty() {
        let names: Vec<String> = unlocks.iter().map(|u| u.to_string()).collect();
        println!("unlocks:    {}", names.join(", "));
    }
    Ok(())
}

fn cmd_daily(cli: &Cli, date: Option<&str>) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let date = parse_date(date)?;
    let assignment =
        assignment_for_date(&catalog, date).context("failed to build daily assignment")?;
    let theme = theme_for_date(&catalog, date);

    println!("date:       {date}");
    println!("theme:      {}", theme.name);
    for (i, id) in assignment.challenge_question_ids.iter().enumerate() {
        if let Some(q) = catalog.question(id) {
            println!("{}. [{}] {}", i + 1, q.continent, q.text);
        }
    }
    if let Some(fact) = catalog.fact(&assignment.discovery_fact_id) {
        println!("fact:       {}", fact.text);
    }

    let path = state_path(cli);
    let mut snapshot = load_snapshot(&path)?;
    if snapshot.opened_on != Some(date) {
        snapshot.opened_on = Some(date);
        save_snapshot(&path, &snapshot)?;
    }
    Ok(())
}

fn cmd_status(cli: &Cli, curve: &LevelCurve, date: Option<&str>) -> Result<()> {
    let today = parse_date(date)?;
    let snapshot = load_snapshot(&state_path(cli))?;
    let view = snapshot.progress.view(curve);
    let standing = streak_standing(&snapshot.streak, today);
    let phase = daily_phase(&snapshot.streak, snapshot.opened_on, today);

    println!(
        "level:      {} ({}, {} {})",
        view.level, view.tier, view.title, view.badge
    );
    println!(
        "xp:         {} ({} into level, {} to next)",
        view.xp, view.xp_into_level, view.xp_to_next
    );
    println!(
        "streak:     {} (longest {}, {})",
        visible_streak(&snapshot.streak, today),
        snapshot.streak.longest_streak,
        standing.as_str()
    );
    println!("today:      {}", phase.as_str());
    Ok(())
}

fn cmd_complete(
    cli: &Cli,
    config: &EngineConfig,
    curve: &LevelCurve,
    date: Option<&str>,
) -> Result<()> {
    let date = parse_date(date)?;
    let path = state_path(cli);
    let mut snapshot = load_snapshot(&path)?;

    if snapshot.streak.last_completion_date == Some(date) {
        println!("already completed {date}");
        println!("streak:     {}", snapshot.streak.current_streak);
        return Ok(());
    }

    let streak = match on_challenge_completed(&snapshot.streak, date) {
        Ok(streak) => streak,
        Err(e @ CoreError::InvalidChronology { .. }) => {
            tracing::warn!("discarding completion event: {e}");
            bail!("completion rejected: {e}");
        }
        Err(e) => return Err(e).context("failed to update streak"),
    };

    let bonus = config.scoring.daily_completion_xp(streak.current_streak);
    let (progress, update) = snapshot.progress.award(curve, bonus);
    snapshot.streak = streak;
    snapshot.progress = progress;
    save_snapshot(&path, &snapshot)?;

    println!(
        "streak:     {} (longest {})",
        streak.current_streak, streak.longest_streak
    );
    println!("bonus:      +{bonus} XP");
    print_update(&update);
    Ok(())
}

fn cmd_play(
    cli: &Cli,
    config: &EngineConfig,
    curve: &LevelCurve,
    count: usize,
    seed: Option<u64>,
    continent: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let catalog = load_catalog(cli)?;
    let continent = continent
        .map(|c| c.parse::<Continent>())
        .transpose()
        .context("bad --continent")?;
    let seed = seed.unwrap_or_else(rand::random);
    let mut session = Session::new(&config.difficulty, &catalog, seed);
    tracing::info!(session = %session.id, seed, "starting play session");

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    let mut stdout = std::io::stdout();

    for round in 1..=count {
        let selection = match session.next_question(&catalog, continent, category) {
            Ok(selection) => selection,
            Err(CoreError::NoQuestionsAvailable(reason)) => {
                println!("no more questions ({reason})");
                break;
            }
            Err(e) => return Err(e).context("failed to select question"),
        };
        let question = selection.question;

        println!(
            "\nQ{round} [tier {}, {}] {}",
            question.difficulty, question.continent, question.text
        );
        for (i, choice) in question.choices.iter().enumerate() {
            println!("  {}) {choice}", i + 1);
        }
        print!("> ");
        stdout.flush()?;

        let asked = Instant::now();
        let Some(line) = lines.next().transpose()? else {
            println!();
            break;
        };
        let elapsed_ms = asked.elapsed().as_millis() as u64;
        // unparseable input counts as a wrong answer
        let choice = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .unwrap_or(usize::MAX);

        let result = session.answer(question, choice, elapsed_ms, &config.scoring);
        if result.correct {
            println!("correct! +{} XP", result.xp);
        } else {
            println!("wrong, it was: {} (+{} XP)", question.answer_text(), result.xp);
        }
    }

    println!(
        "\nanswered {}, correct {}, +{} XP, tier now {}",
        session.answered,
        session.correct,
        session.xp_earned,
        session.state.target()
    );

    if session.xp_earned > 0 {
        let path = state_path(cli);
        let mut snapshot = load_snapshot(&path)?;
        let (progress, update) = snapshot.progress.award(curve, session.xp_earned);
        snapshot.progress = progress;
        save_snapshot(&path, &snapshot)?;
        print_update(&update);
    }
    Ok(())
}

fn print_update(update: &ProgressUpdate) {
    if update.leveled_up() {
        println!("level:      {} -> {}", update.previous_level, update.level);
    } else {
        println!("level:      {}", update.level);
    }
    for milestone in &update.milestones {
        let names: Vec<String> = milestone.unlocks.iter().map(|u| u.to_string()).collect();
        println!("milestone:  level {} unlocks {}", milestone.level, names.join(", "));
    }
}
