//! `acbo run` and `acbo query`.

use std::sync::Arc;

use acbo_application::{ComparisonOutcome, ComparisonUseCase, QueryOutcome, RemoteQueryUseCase};
use acbo_core::query::{QueryResult, ResultMode};
use acbo_core::track::{TrackProgress, TrackState};
use acbo_core::{AppStore, ScenarioRegistry};
use acbo_infrastructure::HttpRagBackend;
use anyhow::Result;
use colored::Colorize;
use tokio::task::JoinHandle;

use super::Context;
use super::render::{percent, print_result, track_line};

pub async fn scenario(ctx: &Context, scenario_id: &str) -> Result<()> {
    ctx.sign_in()?;
    let usecase = ComparisonUseCase::new(Arc::clone(&ctx.store), ctx.config.clone());

    if let Some(scenario) = ScenarioRegistry::find(scenario_id).filter(|_| !ctx.json) {
        println!("{} {}", scenario.display_name.bold(), format!("({})", scenario.domain).dimmed());
        println!("{}", format!("> {}", scenario.query_text).green());
    }

    let watcher = (!ctx.json).then(|| watch_tracks(&ctx.store));
    let outcome = usecase.run_scenario(scenario_id).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }

    match outcome? {
        ComparisonOutcome::Completed { baseline, optimized } => report_comparison(ctx, &baseline, &optimized)?,
        ComparisonOutcome::Superseded => report_superseded(ctx, "Run was superseded.")?,
    }
    Ok(())
}

pub async fn query(ctx: &Context, text: &str, baseline: bool) -> Result<()> {
    ctx.sign_in()?;
    if baseline {
        ctx.store.toggle_acbo_enabled();
    }
    let usecase = ComparisonUseCase::new(Arc::clone(&ctx.store), ctx.config.clone());
    if !ctx.json {
        println!("{}", format!("> {}", text).green());
    }

    let watcher = (!ctx.json).then(|| watch_tracks(&ctx.store));
    let outcome = usecase.run_query(text).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }

    match outcome? {
        QueryOutcome::Completed(result) => {
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
        }
        QueryOutcome::Superseded => report_superseded(ctx, "Query was superseded.")?,
    }
    Ok(())
}

pub async fn remote_query(ctx: &Context, text: &str, baseline: bool) -> Result<()> {
    ctx.sign_in()?;
    if baseline {
        ctx.store.toggle_acbo_enabled();
    }
    let backend = Arc::new(HttpRagBackend::new(&ctx.config.backend));
    let usecase = RemoteQueryUseCase::new(Arc::clone(&ctx.store), backend, &ctx.config);
    if !ctx.json {
        println!("{} {}", format!("> {}", text).green(), format!("({})", ctx.config.backend.base_url).dimmed());
    }

    let result = usecase.run_query(text).await?;
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }
    Ok(())
}

pub(super) fn report_superseded(ctx: &Context, message: &str) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::json!({ "status": "superseded" }));
    } else {
        println!("{}", message.yellow());
    }
    Ok(())
}

fn report_comparison(ctx: &Context, baseline: &QueryResult, optimized: &QueryResult) -> Result<()> {
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&[baseline, optimized])?);
        return Ok(());
    }

    print_result(baseline);
    print_result(optimized);

    let gain = optimized.overall_quality_score() - baseline.overall_quality_score();
    let saved = 1.0 - optimized.tokens_used() as f64 / baseline.tokens_used().max(1) as f64;
    println!();
    println!(
        "{} quality {}, tokens {}",
        "Summary:".bright_magenta().bold(),
        format!("+{}", percent(gain)).green(),
        format!("-{}", percent(saved)).green()
    );
    Ok(())
}

/// Prints a line whenever a track moves.
fn watch_tracks(store: &AppStore) -> JoinHandle<()> {
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        let mut last: Option<(TrackProgress, TrackProgress)> = None;
        while rx.changed().await.is_ok() {
            let current = {
                let state = rx.borrow_and_update();
                (state.baseline_track.clone(), state.optimized_track.clone())
            };
            let previous = last.replace(current.clone());
            let (baseline, optimized) = &current;

            if baseline.state != TrackState::Idle && previous.as_ref().map(|p| &p.0) != Some(baseline) {
                println!("{}", track_line(ResultMode::Baseline, baseline, step_title(ResultMode::Baseline, baseline)));
            }
            if optimized.state != TrackState::Idle && previous.as_ref().map(|p| &p.1) != Some(optimized) {
                println!("{}", track_line(ResultMode::Optimized, optimized, step_title(ResultMode::Optimized, optimized)));
            }
        }
    })
}

fn step_title(mode: ResultMode, progress: &TrackProgress) -> Option<&'static str> {
    let steps = match mode {
        ResultMode::Baseline => ScenarioRegistry::baseline_steps(),
        ResultMode::Optimized => ScenarioRegistry::optimized_steps(),
    };
    progress
        .state
        .current_step()
        .and_then(|i| steps.get(i))
        .map(|s| s.title.as_str())
}
