//! Read-only views over the seeded catalog.

use acbo_core::insight::latest_gain;
use acbo_core::scenario::BudgetSummary;
use acbo_core::ScenarioRegistry;
use anyhow::Result;
use colored::Colorize;

use super::Context;
use super::render::percent;

pub fn scenarios(ctx: &Context) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(ScenarioRegistry::scenarios())?);
        return Ok(());
    }

    println!("{}", "Scenarios".bright_magenta().bold());
    for scenario in ScenarioRegistry::scenarios() {
        println!(
            "  {:<20} {} {}",
            scenario.id.bold(),
            scenario.display_name,
            format!("[{}]", scenario.domain).dimmed()
        );
        println!(
            "  {:<20} baseline {} / optimized {}",
            "",
            percent(scenario.baseline.overall_quality_score).red(),
            percent(scenario.optimized.overall_quality_score).green()
        );
    }

    println!();
    println!("{}", "Domains".bright_magenta().bold());
    for domain in ScenarioRegistry::domains() {
        let name = if domain.enabled {
            domain.id.normal()
        } else {
            format!("{} (coming soon)", domain.id).dimmed()
        };
        println!("  {:<24} {}", name, domain.description.dimmed());
    }
    Ok(())
}

pub fn insights(ctx: &Context) -> Result<()> {
    let (insights, history) = ctx.store.read(|s| (s.insights.clone(), s.accuracy_history.clone()));
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&insights)?);
        return Ok(());
    }

    println!("{}", "Learning insights".bright_magenta().bold());
    for insight in &insights {
        let applied = if insight.applied { "applied".green() } else { "pending".yellow() };
        println!(
            "  {:<12} +{:<4} {} {}",
            insight.category.to_string().cyan(),
            percent(insight.impact_fraction),
            insight.description,
            applied
        );
    }

    println!();
    println!("{}", "Accuracy".bright_magenta().bold());
    for point in &history {
        println!(
            "  {:<8} baseline {}  optimized {}",
            point.label,
            percent(point.baseline),
            percent(point.optimized)
        );
    }
    if let Some(gain) = latest_gain(&history) {
        println!("  latest gain {}", format!("+{}", percent(gain)).green());
    }
    Ok(())
}

pub fn quality(ctx: &Context) -> Result<()> {
    let timeline = ScenarioRegistry::quality_timeline();
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(timeline)?);
        return Ok(());
    }

    println!("{}", "Quality gate".bright_magenta().bold());
    for attempt in timeline {
        let verdict = if attempt.passed { "PASS".green().bold() } else { "FAIL".red().bold() };
        println!("  attempt {} ({}) {}", attempt.attempt, attempt.elapsed_label, verdict);
        for (name, score) in &attempt.dimensions {
            println!("    {:<13} {}", name, percent(*score));
        }
        println!("    {}", attempt.action.dimmed());
    }
    Ok(())
}

pub fn budget(ctx: &Context, tokens: Option<u32>) -> Result<()> {
    let budget = tokens.unwrap_or(ctx.config.budget.token_limit);
    let candidates = ScenarioRegistry::chunk_candidates();
    let summary = BudgetSummary::compute(candidates, budget);
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} {} tokens", "Budget".bright_magenta().bold(), budget);
    for chunk in candidates {
        let mark = if chunk.selected { "selected".green() } else { "excluded".dimmed() };
        println!("  #{} {:>4} tok  {}  {} {}", chunk.id, chunk.tokens, percent(chunk.score), mark, chunk.text);
    }
    println!();
    println!(
        "Selected {}/{} chunks using {} tokens, average quality {}, {} of budget saved.",
        summary.selected,
        summary.candidates,
        summary.total_tokens,
        percent(summary.average_score),
        percent(summary.budget_saved)
    );
    Ok(())
}
