//! Plain-text views of a revision's annotations.

use std::collections::HashMap;
use std::fmt::Write;

use serde::Serialize;
use unicode_width::UnicodeWidthStr;

use crate::annotation::WordAnnotation;

/// One contributor's share of a revision's text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorCredit {
    pub author: String,
    /// Words attributed to the author
    pub words: usize,
    /// Of those, words that were moved into place by a later revision
    pub moved: usize,
    /// `words` as a fraction of the revision's word count
    pub share: f64,
}

/// Per-author credit, most words first. Ties are ordered by author name.
pub fn credits(annotations: &[WordAnnotation]) -> Vec<AuthorCredit> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for annotation in annotations {
        let entry = counts.entry(annotation.author.as_str()).or_default();
        entry.0 += 1;
        if annotation.is_moved {
            entry.1 += 1;
        }
    }

    let total = annotations.len();
    let mut credits: Vec<AuthorCredit> = counts
        .into_iter()
        .map(|(author, (words, moved))| AuthorCredit {
            author: author.to_string(),
            words,
            moved,
            share: words as f64 / total as f64,
        })
        .collect();
    credits.sort_by(|a, b| b.words.cmp(&a.words).then_with(|| a.author.cmp(&b.author)));
    credits
}

/// One line per word: position, word, author, origin and a `moved` marker.
pub fn render_words(annotations: &[WordAnnotation]) -> String {
    let word_width = column_width(annotations.iter().map(|a| a.word.as_str()), "WORD");
    let author_width = column_width(annotations.iter().map(|a| a.author.as_str()), "AUTHOR");
    let position_width = annotations.len().saturating_sub(1).to_string().len().max(3);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>pw$}  {}  {}  ORIGIN",
        "POS",
        pad("WORD", word_width),
        pad("AUTHOR", author_width),
        pw = position_width,
    );
    for a in annotations {
        let line = format!(
            "{:>pw$}  {}  {}  {}{}",
            a.position,
            pad(&a.word, word_width),
            pad(&a.author, author_width),
            a.origin,
            if a.is_moved { "  moved" } else { "" },
            pw = position_width,
        );
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// Table of [`credits`].
pub fn render_credits(credits: &[AuthorCredit]) -> String {
    let author_width = column_width(credits.iter().map(|c| c.author.as_str()), "AUTHOR");

    let mut out = String::new();
    let _ = writeln!(out, "{}  {:>6}  {:>6}  {:>5}", pad("AUTHOR", author_width), "WORDS", "SHARE", "MOVED");
    for c in credits {
        let _ = writeln!(
            out,
            "{}  {:>6}  {:>5.1}%  {:>5}",
            pad(&c.author, author_width),
            c.words,
            c.share * 100.0,
            c.moved,
        );
    }
    out
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str) -> usize {
    values.map(UnicodeWidthStr::width).max().unwrap_or(0).max(header.width())
}

/// Left-align to a display width; `format!` padding counts chars, not columns.
fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}
