use anyhow::{Context, Result};

use concierge_core::config::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(config).context("could not serialize configuration")?;
    println!("{rendered}");
    Ok(())
}
