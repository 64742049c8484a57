//! `minion history` — inspect or reset the dedup history.

use minion_core::history::{HistoryStore, MAX_BIBLE_REFS, MAX_MATH_HASHES};
use minion_memory::FileHistory;
use std::path::Path;

pub async fn show(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = FileHistory::new(&config.history_path);
    let record = store.load().await;

    println!("🗂  History ({})", store.path().display());
    println!("==========");
    println!("  Math fingerprints:  {}/{MAX_MATH_HASHES}", record.math_hashes.len());
    println!("  Scripture refs:     {}/{MAX_BIBLE_REFS}", record.bible_refs.len());
    if record.last_horoscope_date.is_empty() {
        println!("  Last horoscope:     (never)");
    } else {
        println!("  Last horoscope:     {}", record.last_horoscope_date);
    }

    let recent = record.recent_bible_refs(5);
    if !recent.is_empty() {
        println!("\n  Recent references:");
        for reference in recent.iter().rev() {
            println!("    - {reference}");
        }
    }
    Ok(())
}

pub fn reset(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let store = FileHistory::new(&config.history_path);
    store.reset()?;
    println!("✅ History cleared: {}", store.path().display());
    Ok(())
}
