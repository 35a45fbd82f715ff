//! `acbo upload`: the document processing pipeline.

use std::sync::Arc;

use acbo_application::{ProcessingOutcome, ProcessingUseCase, UploadRequest};
use acbo_core::{AppStore, ScenarioRegistry};
use anyhow::Result;
use colored::Colorize;
use tokio::task::JoinHandle;

use super::Context;
use super::run::report_superseded;

pub async fn run(ctx: &Context, names: Vec<String>) -> Result<()> {
    ctx.sign_in()?;
    let uploads: Vec<UploadRequest> = names
        .into_iter()
        .map(|name| {
            let size = std::fs::metadata(&name).map(|m| m.len()).unwrap_or(0);
            UploadRequest {
                size_bytes: size,
                ..UploadRequest::from_name(name)
            }
        })
        .collect();

    let watcher = (!ctx.json).then(|| watch_stages(&ctx.store));
    let usecase = ProcessingUseCase::new(Arc::clone(&ctx.store), ctx.config.pacing.clone());
    let outcome = usecase.process(uploads).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }

    let ProcessingOutcome::Completed(documents) = outcome? else {
        return report_superseded(ctx, "Processing was superseded.");
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&documents)?);
        return Ok(());
    }

    println!();
    for doc in &documents {
        println!(
            "{} {} chunks, {}",
            doc.name.bold(),
            doc.chunk_count.unwrap_or_default(),
            doc.mime_type.dimmed()
        );
    }

    let entities = ctx.store.read(|s| s.entities.clone());
    println!("{}", "Entities:".cyan());
    for entity in entities {
        println!("  {:<16} {:<8} in {} document(s)", entity.name, entity.kind.to_string().dimmed(), entity.count);
    }
    Ok(())
}

/// Prints each processing stage as it completes.
fn watch_stages(store: &AppStore) -> JoinHandle<()> {
    let stages = ScenarioRegistry::processing_stages();
    let mut rx = store.subscribe();
    tokio::spawn(async move {
        let mut shown = 0;
        while rx.changed().await.is_ok() {
            let stage = rx.borrow_and_update().processing_stage;
            if stage > shown && stage <= stages.len() {
                let done = &stages[stage - 1];
                println!("  {} {} {}", "✓".green(), done.name.bold(), done.description.dimmed());
                shown = stage;
            }
        }
    })
}
