use clap::{Parser, Subcommand};
use malldesk_core::config::{ConfigOverrides, canonical_key};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Mall maintenance request desk", long_about = None)]
pub struct Cli {
    /// Command to run; starts an interactive session when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Start with an empty request list instead of seed data
    #[arg(long, global = true)]
    pub no_seed: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a maintenance request
    ///
    /// Example: malldesk create --category Plumbing --description "Water leak in restroom" --location "Food Court" --priority high
    Create {
        #[arg(long, default_value = "")]
        category: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        location: String,
        /// low, medium or high (defaults to medium)
        #[arg(long)]
        priority: Option<String>,
    },
    /// Set a request's status
    ///
    /// Example: malldesk advance 3 in-progress
    Advance { id: String, status: String },
    /// Move a request to its next stage
    ///
    /// Example: malldesk next 1
    Next { id: String },
    /// List requests
    ///
    /// Example: malldesk list --status pending --search "food court"
    List {
        /// all, pending, assigned, in-progress or completed
        #[arg(long, default_value = "all")]
        status: String,
        /// Case-insensitive text matched against description, location and category
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Show details of a request
    ///
    /// Example: malldesk show 2
    Show { id: String },
    /// Show request counts per status
    ///
    /// Example: malldesk stats
    Stats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    SeedDemo,
    SeedPath,
    FetchDelayMs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonical_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    let target = match canonical_field.as_str() {
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            return Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            });
        }
        "theme" => ConfigOverrideTarget::Theme,
        "seed_demo" => ConfigOverrideTarget::SeedDemo,
        "seed_path" => ConfigOverrideTarget::SeedPath,
        "fetch_delay_ms" => ConfigOverrideTarget::FetchDelayMs,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if remainder.is_some() {
        return Err(format!("{canonical_field} override cannot have subfields"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` argument into one set of overrides.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::SeedDemo => {
                let flag = parse_bool(&parsed.value)
                    .ok_or_else(|| format!("seed_demo expects true or false, got '{}'", parsed.value))?;
                overrides.seed_demo = Some(flag);
            }
            ConfigOverrideTarget::SeedPath => {
                if parsed.value.is_empty() {
                    return Err("seed_path override cannot be empty".to_string());
                }
                overrides.seed_path = Some(PathBuf::from(parsed.value));
            }
            ConfigOverrideTarget::FetchDelayMs => {
                let delay = parsed.value.parse::<u64>().map_err(|_| {
                    format!("fetch_delay_ms expects milliseconds, got '{}'", parsed.value)
                })?;
                overrides.fetch_delay_ms = Some(delay);
            }
        }
    }

    Ok(overrides)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
