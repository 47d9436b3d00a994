//! Markup cleaning passes.
//!
//! Each pass handles one construct. Order matters: links are resolved before
//! tags are stripped, and category declarations survive link resolution so
//! that [`StripCategories`] can drop them whole.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::MarkupPass;

static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\[\]]*)\]\]").unwrap());
static REF_SELF_CLOSING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<ref\b[^>]*/>").unwrap());
static REF_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<ref\b[^>]*>.*?</ref\s*>").unwrap());
static COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][A-Za-z0-9]*\b[^<>]*>").unwrap());
static CATEGORY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\[\s*category\s*:[^\[\]]*\]\]").unwrap());

/// Removes `{{ ... }}` templates, nested ones included.
///
/// An opening `{{` with no balancing `}}` is kept verbatim and scanning
/// continues after it.
pub struct StripTemplates;

impl MarkupPass for StripTemplates {
    fn name(&self) -> &'static str {
        "templates"
    }

    fn apply(&self, text: &str) -> String {
        let spans = template_spans(text.as_bytes());
        if spans.is_empty() {
            return text.to_string();
        }

        let mut result = String::with_capacity(text.len());
        let mut copied_from = 0;
        for (start, end) in spans {
            result.push_str(&text[copied_from..start]);
            copied_from = end;
        }
        result.push_str(&text[copied_from..]);
        result
    }
}

/// Outermost balanced `{{ ... }}` ranges, in order, in one pass.
///
/// Openers still on the stack at the end never balanced: they stay as text,
/// while templates closed inside them are still reported.
fn template_spans(bytes: &[u8]) -> Vec<(usize, usize)> {
    let mut open = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;

    while i + 1 < bytes.len() {
        match (bytes[i], bytes[i + 1]) {
            (b'{', b'{') => {
                open.push(i);
                i += 2;
            }
            (b'}', b'}') => match open.pop() {
                Some(start) => {
                    i += 2;
                    // Spans closed earlier inside this one are swallowed by it
                    while spans.last().is_some_and(|&(inner, _)| inner > start) {
                        spans.pop();
                    }
                    spans.push((start, i));
                }
                None => i += 1,
            },
            _ => i += 1,
        }
    }
    spans
}

/// Replaces `[[target|display]]` with `display` and `[[target]]` with
/// `target`.
///
/// Innermost links resolve first, so a link nested in a caption ends up as
/// plain text inside its parent's display text. Category declarations are
/// left alone.
pub struct ResolveLinks;

impl ResolveLinks {
    fn visible_text(inner: &str) -> Option<String> {
        let trimmed = inner.trim_start();
        if is_category(trimmed) {
            return None;
        }

        let text = match inner.rsplit_once('|') {
            Some((_, display)) if !display.trim().is_empty() => display,
            Some((target, _)) => target,
            None => inner,
        };
        // [[:Category:Foo]] is a visible link to the category page
        Some(text.trim().trim_start_matches(':').to_string())
    }
}

impl MarkupPass for ResolveLinks {
    fn name(&self) -> &'static str {
        "links"
    }

    fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let next = LINK
                .replace_all(&current, |caps: &Captures| {
                    Self::visible_text(&caps[1]).unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
            if next == current {
                return current;
            }
            current = next;
        }
    }
}

fn is_category(inner: &str) -> bool {
    match inner.split_once(':') {
        Some((prefix, _)) => prefix.trim().eq_ignore_ascii_case("category"),
        None => false,
    }
}

/// Removes `<ref>...</ref>` citation blocks and self-closing `<ref/>` tags.
pub struct StripReferences;

impl MarkupPass for StripReferences {
    fn name(&self) -> &'static str {
        "references"
    }

    fn apply(&self, text: &str) -> String {
        // Self-closing first: the block pattern would otherwise read
        // `<ref name="x"/>` as an opening tag.
        let text = REF_SELF_CLOSING.replace_all(text, "");
        REF_BLOCK.replace_all(&text, "").into_owned()
    }
}

/// Removes `<!-- ... -->` comments.
pub struct StripComments;

impl MarkupPass for StripComments {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn apply(&self, text: &str) -> String {
        COMMENT.replace_all(text, "").into_owned()
    }
}

/// Strips opening, closing and self-closing tags, keeping enclosed text.
pub struct StripTags;

impl MarkupPass for StripTags {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn apply(&self, text: &str) -> String {
        TAG.replace_all(text, "").into_owned()
    }
}

/// Removes `[[Category:...]]` declarations.
pub struct StripCategories;

impl MarkupPass for StripCategories {
    fn name(&self) -> &'static str {
        "categories"
    }

    fn apply(&self, text: &str) -> String {
        CATEGORY.replace_all(text, "").into_owned()
    }
}
