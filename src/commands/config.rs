//! Config subcommands handler

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, Write};

use wordblame::config::migrate_config;
use wordblame::Config;

const GREEN: &str = "\x1b[32m";
const RESET: &str = "\x1b[0m";

/// Show current configuration as TOML.
pub fn handle_show() -> Result<()> {
    let config = Config::load()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("# {}", Config::config_path()?.display());
    print!("{}", toml_str);
    Ok(())
}

/// Open configuration file in the default editor.
///
/// Uses $EDITOR environment variable (defaults to 'vi').
#[cfg(not(tarpaulin_include))]
pub fn handle_edit() -> Result<()> {
    let config_path = Config::config_path()?;

    if !config_path.exists() {
        Config::default().save()?;
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    println!("Opening {} with {}", config_path.display(), editor);

    std::process::Command::new(&editor)
        .arg(&config_path)
        .status()
        .with_context(|| format!("Failed to open editor {}", editor))?;

    Ok(())
}

/// Add missing fields to the config file.
///
/// Shows a preview of the additions and asks before writing, unless `yes`
/// is set. A missing file is created with the full defaults.
pub fn handle_migrate(yes: bool) -> Result<()> {
    let config_path = Config::config_path()?;
    let file_exists = config_path.exists();

    let content = if file_exists {
        fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?
    } else {
        String::new()
    };

    let result = migrate_config(&content)?;

    if !result.has_changes() {
        println!("Config is already up to date.");
        return Ok(());
    }

    if file_exists {
        println!(
            "Found {} missing field(s){}:",
            result.added_fields.len(),
            if result.sections_added.is_empty() {
                String::new()
            } else {
                format!(" in {} new section(s)", result.sections_added.len())
            }
        );
    } else {
        println!("Config file does not exist. Will create with default settings.");
    }
    println!();
    print_diff_preview(&result.content, &result.added_fields, !file_exists);
    println!();

    let question = if file_exists {
        format!("Apply these changes to {}?", config_path.display())
    } else {
        format!("Create {}?", config_path.display())
    };
    if !yes && !prompt_confirmation(&question)? {
        println!("No changes made.");
        return Ok(());
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, &result.content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Config written to {}", config_path.display());
    Ok(())
}

/// Print the lines of `new_content` that were added, prefixed with `+`.
///
/// Section headers are printed before their first added field. For new
/// files every non-empty line counts as added.
fn print_diff_preview(new_content: &str, added_fields: &[String], is_new_file: bool) {
    let added: HashSet<&str> = added_fields.iter().map(String::as_str).collect();
    let (green, reset) = if atty::is(atty::Stream::Stdout) {
        (GREEN, RESET)
    } else {
        ("", "")
    };

    let mut section = String::new();
    let mut pending_header: Option<&str> = None;

    for line in new_content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            section = trimmed[1..trimmed.len() - 1].to_string();
            pending_header = Some(line);
            continue;
        }

        let is_added = is_new_file
            || trimmed
                .split_once('=')
                .map(|(key, _)| added.contains(format!("{}.{}", section, key.trim()).as_str()))
                .unwrap_or(false);
        if !is_added {
            continue;
        }

        if let Some(header) = pending_header.take() {
            println!("{}  {}{}", green, header, reset);
        }
        println!("{}+ {}{}", green, line, reset);
    }
}

/// Prompt user for yes/no confirmation.
///
/// Returns false without asking when stdin is not a TTY.
#[cfg(not(tarpaulin_include))]
fn prompt_confirmation(message: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        println!("Non-interactive mode: use --yes to apply changes automatically");
        return Ok(false);
    }

    print!("{} [y/N] ", message);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;

    let response = input.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}
