//! Terminal rendering shared by the commands.

use acbo_core::quality::mean_score;
use acbo_core::query::{QueryResult, ResultMode};
use acbo_core::track::{TrackProgress, TrackState};
use colored::Colorize;

pub fn percent(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}

fn mode_label(mode: ResultMode) -> colored::ColoredString {
    match mode {
        ResultMode::Baseline => "BASELINE".red().bold(),
        ResultMode::Optimized => "OPTIMIZED".green().bold(),
    }
}

pub fn track_line(mode: ResultMode, progress: &TrackProgress, step_title: Option<&str>) -> String {
    let status = match &progress.state {
        TrackState::Idle => "idle".dimmed().to_string(),
        TrackState::Running { step } => format!(
            "step {}/{} {}",
            step + 1,
            progress.total_steps,
            step_title.unwrap_or_default()
        ),
        TrackState::Completed => "done".green().to_string(),
        TrackState::Failed { reason } => format!("failed: {}", reason).red().to_string(),
    };
    format!("  {:<9} {} {}", mode_label(mode), step_bar(progress), status)
}

/// `[##...]`, one cell per step.
fn step_bar(progress: &TrackProgress) -> String {
    let cells: String = (0..progress.total_steps)
        .map(|i| if progress.is_step_complete(i) { '#' } else { '.' })
        .collect();
    format!("[{}]", cells)
}

pub fn print_result(result: &QueryResult) {
    println!();
    println!(
        "{} quality {}  tokens {}/{} ({})  attempts {}",
        mode_label(result.mode()),
        percent(result.overall_quality_score()).bold(),
        result.tokens_used(),
        result.budget_limit,
        percent(result.budget_usage()),
        result.attempt_count()
    );
    println!("{}", result.response_text());

    if let Some(mean) = mean_score(result.dimensions()) {
        println!("{} mean {}", "Quality dimensions:".cyan(), percent(mean));
        for dimension in result.dimensions() {
            let mark = if dimension.passed() { "✓".green() } else { "✗".red() };
            println!(
                "  {} {:<13} {} (threshold {})",
                mark,
                dimension.name(),
                percent(dimension.score()),
                percent(dimension.threshold())
            );
        }
    }

    if !result.evidence().is_empty() {
        println!("{}", "Evidence:".cyan());
        for evidence in result.evidence() {
            println!(
                "  [{}] {} {}",
                percent(evidence.relevance),
                evidence.source_label.dimmed(),
                evidence.text
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_bar_follows_progress() {
        let mut progress = TrackProgress::started(4);
        assert_eq!(step_bar(&progress), "[....]");

        progress.state = TrackState::Running { step: 2 };
        assert_eq!(step_bar(&progress), "[##..]");

        progress.state = TrackState::Completed;
        assert_eq!(step_bar(&progress), "[####]");
    }
}
