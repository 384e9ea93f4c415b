use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::{get_config_path, validate_config, Config, WeekRange, YearRange};

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    std::io::stdout()
        .flush()
        .context("Failed to flush stdout")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a message and a default value. Returns default if input is empty.
fn prompt_with_default(message: &str, default: &str) -> Result<String> {
    let input = prompt(&format!("{} [{}]: ", message, default))?;
    if input.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(input)
    }
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// Keep asking until the answer parses.
fn prompt_parsed<T: FromStr + ToString>(message: &str, default: T) -> Result<T> {
    let default_str = default.to_string();
    loop {
        let input = prompt_with_default(message, &default_str)?;
        match input.parse::<T>() {
            Ok(v) => return Ok(v),
            Err(_) => println!("  Invalid value '{}'. Try again.", input),
        }
    }
}

/// Serialize `config` and write it atomically, creating parent directories.
pub fn write_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit().context("Failed to save config")?;

    Ok(())
}

/// Run the init flow. With `accept_defaults` the built-in defaults are
/// written without prompting; an existing file is then only replaced when
/// `force` is set.
pub fn run_init(default_path: Option<PathBuf>, accept_defaults: bool, force: bool) -> Result<()> {
    let config_path = default_path.unwrap_or_else(get_config_path);

    if accept_defaults {
        if config_path.exists() && !force {
            anyhow::bail!(
                "Config already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }
        write_config(&config_path, &Config::default())?;
        println!("Config written to {}", config_path.display());
        return Ok(());
    }

    println!();
    println!("cfb-buoyancy configuration");
    println!("==========================");
    println!();

    let defaults = Config::default();
    let config = loop {
        let seasons = YearRange {
            start: prompt_parsed("First season", defaults.seasons.start)?,
            end: prompt_parsed("Last season", defaults.seasons.end)?,
        };
        let weeks = WeekRange {
            start: prompt_parsed("First week", defaults.weeks.start)?,
            end: prompt_parsed("Last week", defaults.weeks.end)?,
        };
        let request_delay = prompt_with_default("Delay between requests", &defaults.request_delay)?;

        let candidate = Config {
            seasons,
            weeks,
            request_delay,
            ..defaults.clone()
        };
        match validate_config(&candidate) {
            Ok(()) => break candidate,
            Err(errors) => {
                for error in errors {
                    println!("  Invalid: {}", error);
                }
                println!("  Let's try again.");
                println!();
            }
        }
    };

    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() && !force {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    write_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `cfb-buoyancy fetch` to download the season data.");

    Ok(())
}
