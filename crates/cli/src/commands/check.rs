//! `minion check` — validate the topic file offline.

use minion_config::{AgentSpec, TopicsFile};
use std::path::{Path, PathBuf};

pub fn run(config_path: Option<&Path>, topics: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let path = topics.unwrap_or(config.topics_path);
    let file = TopicsFile::load(&path)?;

    println!("📋 Topics in {}", path.display());
    println!("  Default cap: {} items per section\n", file.defaults.max_items_per_section);

    for topic in &file.topics {
        println!("  {} (max {})", topic.heading, topic.cap(&file.defaults));
        if topic.agents.is_empty() {
            println!("     ⚠️  no agents — section will hold a placeholder");
        }
        for agent in &topic.agents {
            match agent {
                AgentSpec::Unknown { type_name } => {
                    println!("     ❌ {type_name}: unknown agent type")
                }
                AgentSpec::Invalid { type_name, reason } => {
                    println!("     ❌ {type_name}: {reason}")
                }
                other => println!("     ✅ {}", other.type_name()),
            }
        }
    }

    let problems = file.problems().len();
    println!();
    if problems == 0 {
        println!("  🎉 All agents recognized.");
    } else {
        println!("  ⚠️  {problems} agent(s) will produce a diagnostic section instead of content.");
    }
    Ok(())
}
