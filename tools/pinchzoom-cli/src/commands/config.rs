//! Show or save the effective configuration.

use pinchzoom_common::config::AppConfig;

pub fn run(config: &AppConfig, write: bool) -> anyhow::Result<()> {
    config.validate()?;

    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        let path = config.save()?;
        println!();
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}
