use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use super::tester::{CheckResult, GameRecord, LogicTester, SeasonReport};
use crate::util::report_timestamp;

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    generated_at: String,
    mode: &'a str,
    data: T,
}

fn write_json<T: Serialize>(out: &mut dyn Write, mode: &str, data: T) -> Result<()> {
    let envelope = Envelope {
        generated_at: report_timestamp(),
        mode,
        data,
    };
    serde_json::to_writer_pretty(&mut *out, &envelope)?;
    writeln!(out)?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn optional(name: Option<&String>) -> &str {
    name.map_or("-", String::as_str)
}

// Games

pub fn generate_game_console_report(out: &mut dyn Write, records: &[GameRecord]) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "⚾ Game Results".bright_cyan().bold())?;
    writeln!(out, "{}", "===============".cyan())?;
    for record in records {
        writeln!(
            out,
            "{} seed {:#010x}  {} {} @ {} {}  ({} inn)",
            "▶".green(),
            record.seed,
            record.away.bold(),
            record.away_runs,
            record.home.bold(),
            record.home_runs,
            record.innings
        )?;
        for row in record.line_score.lines() {
            writeln!(out, "   {row}")?;
        }
        writeln!(
            out,
            "   W: {}  L: {}  SV: {}",
            optional(record.winning_pitcher.as_ref()),
            optional(record.losing_pitcher.as_ref()),
            optional(record.save.as_ref())
        )?;
        for play in &record.play_by_play {
            writeln!(out, "     {}", play.dimmed())?;
        }
    }
    writeln!(out)?;
    writeln!(out, "Games: {}", records.len())?;
    writeln!(
        out,
        "Home win rate: {:.1}%",
        LogicTester::home_win_rate(records) * 100.0
    )?;
    Ok(())
}

pub fn generate_game_json_report(out: &mut dyn Write, records: &[GameRecord]) -> Result<()> {
    write_json(out, "game", records)
}

pub fn generate_game_markdown_report(out: &mut dyn Write, records: &[GameRecord]) -> Result<()> {
    writeln!(out, "# Pennant Game Results\n")?;
    writeln!(out, "_Generated {}_\n", report_timestamp())?;
    writeln!(out, "| Seed | Away | R | Home | R | Inn | W | L | SV |")?;
    writeln!(out, "|------|------|---|------|---|-----|---|---|----|")?;
    for record in records {
        writeln!(
            out,
            "| `{:#010x}` | {} | {} | {} | {} | {} | {} | {} | {} |",
            record.seed,
            record.away,
            record.away_runs,
            record.home,
            record.home_runs,
            record.innings,
            optional(record.winning_pitcher.as_ref()),
            optional(record.losing_pitcher.as_ref()),
            optional(record.save.as_ref())
        )?;
    }
    Ok(())
}

pub fn generate_game_csv_report(out: &mut dyn Write, records: &[GameRecord]) -> Result<()> {
    writeln!(
        out,
        "seed,away,away_runs,home,home_runs,innings,winning_pitcher,losing_pitcher,save,fingerprint"
    )?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{}",
            record.seed,
            csv_field(&record.away),
            record.away_runs,
            csv_field(&record.home),
            record.home_runs,
            record.innings,
            csv_field(optional(record.winning_pitcher.as_ref())),
            csv_field(optional(record.losing_pitcher.as_ref())),
            csv_field(optional(record.save.as_ref())),
            record.fingerprint
        )?;
    }
    Ok(())
}

// Seasons

pub fn generate_season_console_report(out: &mut dyn Write, report: &SeasonReport) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🏆 Season Standings".bright_cyan().bold())?;
    writeln!(out, "{}", "===================".cyan())?;
    writeln!(
        out,
        "Base seed {:#x} | {} days | {} games",
        report.base_seed, report.days_played, report.games_played
    )?;
    writeln!(out)?;
    writeln!(out, "{:<24} {:>4} {:>4} {:>6} {:>5} {:>5}", "Team", "W", "L", "Pct", "RF", "RA")?;
    for line in &report.standings {
        writeln!(
            out,
            "{:<24} {:>4} {:>4} {:>6.3} {:>5} {:>5}",
            line.team, line.wins, line.losses, line.win_pct, line.runs_for, line.runs_against
        )?;
    }
    if !report.leaders.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", "⭐ Leaders".bright_yellow().bold())?;
        for leader in &report.leaders {
            writeln!(out, "  {:<4} {} ({})", leader.category, leader.player, leader.value)?;
        }
    }
    write_violations_console(out, &report.violations)
}

fn write_violations_console(out: &mut dyn Write, violations: &[String]) -> Result<()> {
    writeln!(out)?;
    if violations.is_empty() {
        writeln!(out, "{}", "✅ Season books balance".green())?;
    } else {
        writeln!(out, "{}", "❌ Season violations".red().bold())?;
        for violation in violations {
            writeln!(out, "   • {}", violation.red())?;
        }
    }
    Ok(())
}

pub fn generate_season_json_report(out: &mut dyn Write, report: &SeasonReport) -> Result<()> {
    write_json(out, "season", report)
}

pub fn generate_season_markdown_report(out: &mut dyn Write, report: &SeasonReport) -> Result<()> {
    writeln!(out, "# Pennant Season Report\n")?;
    writeln!(out, "_Generated {}_\n", report_timestamp())?;
    writeln!(out, "- **Base seed**: `{:#x}`", report.base_seed)?;
    writeln!(out, "- **Days**: {}", report.days_played)?;
    writeln!(out, "- **Games**: {}\n", report.games_played)?;
    writeln!(out, "## Standings\n")?;
    writeln!(out, "| Team | W | L | Pct | RF | RA |")?;
    writeln!(out, "|------|---|---|-----|----|----|")?;
    for line in &report.standings {
        writeln!(
            out,
            "| {} | {} | {} | {:.3} | {} | {} |",
            line.team, line.wins, line.losses, line.win_pct, line.runs_for, line.runs_against
        )?;
    }
    writeln!(out, "\n## Leaders\n")?;
    for leader in &report.leaders {
        writeln!(out, "- **{}**: {} ({})", leader.category, leader.player, leader.value)?;
    }
    if !report.violations.is_empty() {
        writeln!(out, "\n## Violations\n")?;
        for violation in &report.violations {
            writeln!(out, "- {violation}")?;
        }
    }
    Ok(())
}

pub fn generate_season_csv_report(out: &mut dyn Write, report: &SeasonReport) -> Result<()> {
    writeln!(out, "team,wins,losses,win_pct,runs_for,runs_against")?;
    for line in &report.standings {
        writeln!(
            out,
            "{},{},{},{:.3},{},{}",
            csv_field(&line.team),
            line.wins,
            line.losses,
            line.win_pct,
            line.runs_for,
            line.runs_against
        )?;
    }
    Ok(())
}

// Verification

pub fn generate_verify_console_report(
    out: &mut dyn Write,
    results: &[CheckResult],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Verification Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=======================".cyan())?;

    let total = results.len();
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "Total checks: {total}")?;
    writeln!(out, "Passed: {}", passed.to_string().green())?;
    writeln!(out, "Failed: {}", (total - passed).to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for result in results {
        let status = if result.passed {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, result.check_name.bold())?;
        writeln!(
            out,
            "   Seeds: {}/{} clean",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "   Average time: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "   Failures:")?;
            for failure in &result.failures {
                writeln!(out, "     • {}", failure.red())?;
            }
        }
    }
    Ok(())
}

pub fn generate_verify_json_report(out: &mut dyn Write, results: &[CheckResult]) -> Result<()> {
    write_json(out, "verify", results)
}

pub fn generate_verify_markdown_report(out: &mut dyn Write, results: &[CheckResult]) -> Result<()> {
    writeln!(out, "# Pennant Verification Results\n")?;
    writeln!(out, "_Generated {}_\n", report_timestamp())?;
    let passed = results.iter().filter(|r| r.passed).count();
    writeln!(out, "- **Checks**: {}", results.len())?;
    writeln!(out, "- **Passed**: {passed}")?;
    writeln!(out, "- **Failed**: {}\n", results.len() - passed)?;
    for result in results {
        let status = if result.passed { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, result.check_name)?;
        writeln!(
            out,
            "- **Seeds**: {}/{} clean",
            result.successful_iterations, result.iterations_run
        )?;
        writeln!(out, "- **Average time**: {:?}", result.average_duration)?;
        if !result.failures.is_empty() {
            writeln!(out, "- **Failures**:")?;
            for failure in &result.failures {
                writeln!(out, "  - {failure}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_verify_csv_report(out: &mut dyn Write, results: &[CheckResult]) -> Result<()> {
    writeln!(out, "check,passed,iterations,successful,average_ms,failures")?;
    for result in results {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            csv_field(&result.check_name),
            result.passed,
            result.iterations_run,
            result.successful_iterations,
            result.average_duration.as_millis(),
            csv_field(&result.failures.join("; "))
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::tester::StandingsLine;

    fn record() -> GameRecord {
        GameRecord {
            seed: 42,
            away: "Harbor City, Pennants".to_string(),
            home: "Ridgeview Pennants".to_string(),
            away_runs: 3,
            home_runs: 5,
            innings: 8,
            winning_pitcher: Some("Ada Lane".to_string()),
            losing_pitcher: Some("Bo Park".to_string()),
            save: None,
            fingerprint: "00000000deadbeef".to_string(),
            line_score: "Harbo0 1 2 | 3\nRidge2 0 3 | 5".to_string(),
            play_by_play: vec!["T1 Ada Lane K [1 out, ---] 0-0".to_string()],
        }
    }

    fn render(write: impl FnOnce(&mut dyn Write) -> Result<()>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn game_csv_quotes_commas() {
        let csv = render(|out| generate_game_csv_report(out, &[record()]));
        assert!(csv.starts_with("seed,away"));
        assert!(csv.contains("\"Harbor City, Pennants\""));
        assert!(csv.contains(",-,00000000deadbeef"));
    }

    #[test]
    fn game_json_wraps_records() {
        let json = render(|out| generate_game_json_report(out, &[record()]));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["mode"], "game");
        assert_eq!(value["data"][0]["home_runs"], 5);
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn game_console_and_markdown_include_pitchers() {
        let console = render(|out| generate_game_console_report(out, &[record()]));
        assert!(console.contains("Ada Lane"));
        assert!(console.contains("Home win rate"));
        let markdown = render(|out| generate_game_markdown_report(out, &[record()]));
        assert!(markdown.contains("# Pennant Game Results"));
        assert!(markdown.contains("| `0x0000002a` |"));
    }

    #[test]
    fn verify_reports_list_failures() {
        let results = vec![CheckResult {
            check_name: "determinism".to_string(),
            passed: false,
            iterations_run: 2,
            successful_iterations: 1,
            failures: vec!["seed 0x00000001: replay diverged".to_string()],
            average_duration: Duration::from_millis(3),
        }];
        let console =
            render(|out| generate_verify_console_report(out, &results, Duration::from_secs(1)));
        assert!(console.contains("replay diverged"));
        let markdown = render(|out| generate_verify_markdown_report(out, &results));
        assert!(markdown.contains("- **Failed**: 1"));
        let csv = render(|out| generate_verify_csv_report(out, &results));
        assert!(csv.contains("determinism,false,2,1,3,"));
    }

    #[test]
    fn season_reports_render_standings() {
        let report = SeasonReport {
            base_seed: 7,
            days_played: 2,
            games_played: 2,
            standings: vec![StandingsLine {
                team: "Ridgeview Pennants".to_string(),
                wins: 2,
                losses: 0,
                win_pct: 1.0,
                runs_for: 9,
                runs_against: 4,
            }],
            leaders: Vec::new(),
            violations: vec!["runs scored 9 != runs allowed 4".to_string()],
        };
        let csv = render(|out| generate_season_csv_report(out, &report));
        assert!(csv.contains("Ridgeview Pennants,2,0,1.000,9,4"));
        let console = render(|out| generate_season_console_report(out, &report));
        assert!(console.contains("Season violations"));
        let markdown = render(|out| generate_season_markdown_report(out, &report));
        assert!(markdown.contains("## Violations"));
    }
}
