mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use logic::{CheckResult, GameRecord, LogicTester, SeasonReport, TesterAssets, reports};
use util::split_csv;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Play the league's first two teams once per seed
    Game,
    /// Play a round-robin season over the whole league
    Season,
    /// Replay every seed twice and check determinism and game invariants
    Verify,
}

#[derive(Debug, Parser)]
#[command(name = "pennant-tester", version)]
#[command(about = "Batch harness for the Pennant baseball simulation core")]
struct Args {
    /// What to run
    #[arg(long, value_enum, default_value_t = RunMode::Verify)]
    mode: RunMode,

    /// Seeds to run (comma-separated; decimal, 0x hex, or ranges like 1..50)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Teams in the synthetic league
    #[arg(long, default_value_t = 6)]
    teams: usize,

    /// Seed for the synthetic league's rosters and cards
    #[arg(long, default_value_t = 2024)]
    league_seed: u64,

    /// Days to simulate in season mode
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Simulation config JSON (defaults apply to missing fields)
    #[arg(long)]
    config: Option<PathBuf>,

    /// League JSON to use instead of the synthetic league
    #[arg(long)]
    league: Option<PathBuf>,

    /// Include play-by-play in game mode
    #[arg(long)]
    detail: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

/// What a run produced, ready for reporting.
enum Outcome {
    Games(Vec<GameRecord>),
    Season(SeasonReport),
    Verify(Vec<CheckResult>),
}

impl Outcome {
    fn passed(&self) -> bool {
        match self {
            Self::Games(_) => true,
            Self::Season(report) => report.violations.is_empty(),
            Self::Verify(results) => results.iter().all(|r| r.passed),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    announce_banner(&args);
    let start_time = Instant::now();
    let outcome = run(&args).await?;
    write_reports(&args, &outcome, start_time)?;

    if !outcome.passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn announce_banner(args: &Args) {
    if args.output.is_none() && args.report != "console" {
        return;
    }
    println!("{}", "⚾ Pennant Simulation Tester".bright_cyan().bold());
    println!("{}", "============================".cyan());
}

async fn run(args: &Args) -> Result<Outcome> {
    let assets = TesterAssets::load(
        args.config.as_deref(),
        args.league.as_deref(),
        args.teams,
        args.league_seed,
    )?;
    info!(
        "loaded league of {} teams (league seed {})",
        assets.league.len(),
        args.league_seed
    );
    let seeds = logic::resolve_seed_inputs(&split_csv(&args.seeds))?;
    let tester = LogicTester::new(assets, args.verbose);

    match args.mode {
        RunMode::Game => {
            let records = tester
                .run_games(&seeds, args.detail)
                .context("game run failed")?;
            Ok(Outcome::Games(records))
        }
        RunMode::Season => {
            if args.days == 0 {
                bail!("season mode needs at least one day");
            }
            let base_seed = u64::from(seeds[0]);
            let report = tester
                .run_season(base_seed, args.days)
                .await
                .context("season run failed")?;
            Ok(Outcome::Season(report))
        }
        RunMode::Verify => Ok(Outcome::Verify(tester.verify(&seeds))),
    }
}

fn write_reports(args: &Args, outcome: &Outcome, start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let out = output_target.writer();

    match (outcome, args.report.as_str()) {
        (Outcome::Games(records), "json") => reports::generate_game_json_report(out, records)?,
        (Outcome::Games(records), "markdown") => {
            reports::generate_game_markdown_report(out, records)?;
        }
        (Outcome::Games(records), "csv") => reports::generate_game_csv_report(out, records)?,
        (Outcome::Games(records), _) => reports::generate_game_console_report(out, records)?,
        (Outcome::Season(report), "json") => reports::generate_season_json_report(out, report)?,
        (Outcome::Season(report), "markdown") => {
            reports::generate_season_markdown_report(out, report)?;
        }
        (Outcome::Season(report), "csv") => reports::generate_season_csv_report(out, report)?,
        (Outcome::Season(report), _) => reports::generate_season_console_report(out, report)?,
        (Outcome::Verify(results), "json") => reports::generate_verify_json_report(out, results)?,
        (Outcome::Verify(results), "markdown") => {
            reports::generate_verify_markdown_report(out, results)?;
        }
        (Outcome::Verify(results), "csv") => reports::generate_verify_csv_report(out, results)?,
        (Outcome::Verify(results), _) => {
            reports::generate_verify_console_report(out, results, start_time.elapsed())?;
        }
    }

    if args.report == "console" {
        let duration = start_time.elapsed();
        writeln!(out)?;
        writeln!(out, "🏁 Total time: {duration:?}")?;
    }
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}
