//! Tokenize command handler

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};

use wordblame::diff::units;
use wordblame::{Config, Tokenizer};

/// Print the tokens (or diff units) of a markup file or stdin, one per line.
pub fn handle(file: Option<&Path>, as_units: bool) -> Result<()> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    let words = Tokenizer::new().words(&text);
    let words = if as_units {
        let config = Config::load()?;
        units(&words, config.engine.split_punctuation)
    } else {
        words
    };

    for word in words {
        println!("{}", word);
    }
    Ok(())
}
