//! Local store subcommands.

use siteprobe_config::Config;
use siteprobe_coordinator::{AnalysisStore, FileAnalysisStore};
use siteprobe_popup::security_score;
use siteprobe_protocols::storage_key;

/// List stored analyses, oldest first.
pub(crate) async fn handle_history(config: &Config, format: &str) -> anyhow::Result<()> {
    let store = FileAnalysisStore::new(&config.storage.path).await?;
    let entries = store.list().await?;

    if entries.is_empty() {
        println!("No stored analyses.");
        return Ok(());
    }

    match format {
        "json" => {
            let json = serde_json::to_string_pretty(&entries)?;
            println!("{}", json);
        }
        _ => {
            println!(
                "{:<32} {:<16} {:<6} {}",
                "DOMAIN", "TYPE", "SCORE", "CACHED AT"
            );
            println!("{}", "-".repeat(80));
            for entry in entries {
                println!(
                    "{:<32} {:<16} {:<6} {}",
                    entry.record.domain,
                    entry.record.analysis_type.to_string(),
                    security_score(&entry.record),
                    entry.cached_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
            }
        }
    }
    Ok(())
}

pub(crate) async fn handle_forget(config: &Config, domain: &str) -> anyhow::Result<()> {
    let store = FileAnalysisStore::new(&config.storage.path).await?;
    let key = storage_key(domain);
    if store.get(&key).await?.is_none() {
        println!("No stored analysis for {}", domain);
        return Ok(());
    }
    store.delete(&key).await?;
    println!("Removed analysis for {}", domain);
    Ok(())
}
