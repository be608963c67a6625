//! Configuration command

use anyhow::Result;
use colored::Colorize;

use crate::config::AppConfig;
use crate::context::Context;
use crate::output::OutputFormat;

/// Print the effective configuration
pub fn show(ctx: &Context) -> Result<()> {
    match ctx.output.format() {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ctx.config)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&ctx.config)?),
        OutputFormat::Table | OutputFormat::Csv => {
            if let Some(path) = AppConfig::user_config_path() {
                println!("{} {}", "# user config:".dimmed(), path.display());
            }
            print!("{}", toml::to_string_pretty(&ctx.config)?);
        }
    }
    Ok(())
}
