//! Subcommand implementations

mod analyze;
mod config;
mod plan;

pub use analyze::{HomogeneityArgs, NormalityArgs, PairwiseArgs};
pub use plan::PlanArgs;

use anyhow::{anyhow, Result};
use cohort_stats_core::{IndexKey, Value};

use crate::cli::Commands;
use crate::context::Context;

/// Dispatch a parsed subcommand
pub async fn execute(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Normality(args) => analyze::normality(ctx, args).await,
        Commands::Homogeneity(args) => analyze::homogeneity(ctx, args).await,
        Commands::TTest(args) => analyze::t_test(ctx, args).await,
        Commands::MannWhitney(args) => analyze::mann_whitney(ctx, args).await,
        Commands::Plan(args) => plan::execute(ctx, args).await,
        Commands::Config => config::show(ctx),
    }
}

/// `A` or `Developing,Chad`: comma-separated values of a composite key
pub fn parse_key(text: &str) -> Result<IndexKey> {
    let values: Vec<Value> = text.split(',').map(Value::parse).collect();
    if values.iter().any(Value::is_null) {
        return Err(anyhow!("Key '{}' contains an empty component", text));
    }
    Ok(IndexKey::new(values))
}

/// `A:B` tests H0 "location(A) <= location(B)"
pub fn parse_pair(text: &str) -> Result<(IndexKey, IndexKey)> {
    let (first, second) = text
        .split_once(':')
        .ok_or_else(|| anyhow!("Pair '{}' must have the form FIRST:SECOND", text))?;
    Ok((parse_key(first)?, parse_key(second)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("Developed").unwrap(), IndexKey::from("Developed"));
        assert_eq!(
            parse_key("Developing, 2014").unwrap(),
            IndexKey::new(vec![Value::from("Developing"), Value::Integer(2014)])
        );
        assert!(parse_key("A,,B").is_err());
    }

    #[test]
    fn test_parse_pair() {
        let (first, second) = parse_pair("Developed:Developing").unwrap();
        assert_eq!(first, IndexKey::from("Developed"));
        assert_eq!(second, IndexKey::from("Developing"));
        assert!(parse_pair("Developed").is_err());
    }
}
