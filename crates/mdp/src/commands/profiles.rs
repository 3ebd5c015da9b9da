//! Profiles command - list configured profiles.

use anyhow::Result;
use console::{Style, style};

use super::Context;

/// Run the profiles command.
pub fn run(ctx: &Context) -> Result<()> {
    let loaded = mdp_config::load_config(ctx.config_path.as_deref())?;
    let config = &loaded.config;
    let default = config.select(ctx.profile.as_deref()).ok().map(|(name, _)| name);

    let dim = Style::new().dim();
    let green = Style::new().green();

    match &loaded.source {
        Some(path) => println!("{} {}", dim.apply_to("Config:"), path.display()),
        None => println!("{}", dim.apply_to("Config: (none found)")),
    }

    if config.profiles.is_empty() {
        println!("No profiles configured.");
        return Ok(());
    }

    println!();
    for (name, profile) in &config.profiles {
        let marker = if Some(name.as_str()) == default {
            green.apply_to("●").to_string()
        } else {
            " ".to_string()
        };
        let practice = profile
            .practice_id
            .as_deref()
            .map(|id| format!(" practice {}", id))
            .unwrap_or_default();
        println!(
            "{} {} {}{}",
            marker,
            style(name).bold(),
            dim.apply_to(&profile.version),
            dim.apply_to(practice)
        );
    }

    for warning in &loaded.warnings {
        eprintln!("{} {}", style("warning:").yellow(), warning);
    }

    Ok(())
}
