//! `minion doctor` — Diagnose system health.

use minion_channels::build_channel;
use minion_config::TopicsFile;
use minion_providers::build_from_config;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Minion Doctor — System Diagnostics");
    println!("=====================================\n");

    let mut issues = 0;

    let config = match super::load_config(config_path) {
        Ok(config) => {
            println!("  ✅ Config valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  Fix the config first; other checks depend on it.");
            return Ok(());
        }
    };

    match config.require_secrets() {
        Ok(()) => println!("  ✅ API key available for '{}'", config.default_provider),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    match TopicsFile::load(&config.topics_path) {
        Ok(file) => {
            let problems = file.problems().len();
            if problems == 0 {
                println!("  ✅ Topic file: {} topic(s)", file.topics.len());
            } else {
                println!("  ⚠️  Topic file: {problems} unrecognized agent(s), see `minion check`");
                issues += 1;
            }
        }
        Err(e) => {
            println!("  ❌ Topic file: {e}");
            issues += 1;
        }
    }

    if config.history_path.exists() {
        println!("  ✅ History file: {}", config.history_path.display());
    } else {
        println!("  ✅ History file will be created at {}", config.history_path.display());
    }

    match build_channel(&config.delivery) {
        Ok(channel) => match channel.health_check().await {
            Ok(true) => println!("  ✅ Delivery channel '{}' ready", channel.name()),
            Ok(false) | Err(_) => {
                println!("  ❌ Delivery channel '{}' not ready", channel.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Delivery channel: {e}");
            issues += 1;
        }
    }

    if config.require_secrets().is_ok() {
        let router = build_from_config(&config);
        if let Some(provider) = router.default() {
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider '{}' reachable", provider.name()),
                _ => {
                    println!("  ⚠️  Provider '{}' did not answer a health check", provider.name());
                    issues += 1;
                }
            }
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
