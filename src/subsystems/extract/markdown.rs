//! Render an [`ExtractionResult`] as a Markdown document.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::info;

use super::{ContentNode, ExtractError, ExtractionResult, NodeKind};

const UNTITLED: &str = "Untitled Document";
const SUMMARY_NOTE: &str = "> Extracted automatically from the web page, preserving its structure";
pub const MAX_RAW_TEXT_CHARS: usize = 5000;
const RAW_TEXT_TRUNCATED: &str =
    "\n\n... [content truncated, see the original page for the full text]";
/// Byte cap on the URL-derived stem; keeps names well under the 255-byte
/// filesystem limit for non-ASCII URLs.
const MAX_STEM_BYTES: usize = 100;
const FILE_SUFFIX: &str = "_extracted.md";

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-_.]").expect("file name pattern is valid"));

pub fn render(result: &ExtractionResult, generated_at: &str) -> String {
    let title = if result.title.trim().is_empty() { UNTITLED } else { result.title.trim() };

    let mut lines: Vec<String> = vec![
        format!("# {title}"),
        String::new(),
        format!("**Source URL**: {}", result.source_url),
        String::new(),
    ];
    if let Some(author) = &result.author {
        lines.push(format!("**Author**: {author}"));
    }
    if let Some(date) = &result.date {
        lines.push(format!("**Date**: {date}"));
    }
    lines.extend(["", "---", ""].map(String::from));

    if !result.nodes.is_empty() {
        lines.extend(["## Content Summary", "", SUMMARY_NOTE, ""].map(String::from));
        for node in &result.nodes {
            render_node(node, &mut lines);
        }
    } else if !result.raw_text.trim().is_empty() {
        lines.extend(["## Extracted Content", ""].map(String::from));
        let text = result.raw_text.trim();
        match text.char_indices().nth(MAX_RAW_TEXT_CHARS) {
            Some((cut, _)) => lines.push(format!("{}{RAW_TEXT_TRUNCATED}", &text[..cut])),
            None => lines.push(text.to_string()),
        }
    }

    lines.extend(["", "---", ""].map(String::from));
    lines.push(format!("*Generated at: {generated_at}*"));
    lines.push(format!("*Total characters: {}*", result.raw_text.chars().count()));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_node(node: &ContentNode, lines: &mut Vec<String>) {
    match node.kind {
        NodeKind::Heading => {
            let depth = usize::from(node.level).saturating_add(1).min(6);
            lines.push(format!("{} {}", "#".repeat(depth), node.text));
            lines.push(String::new());
            if let Some(content) = &node.content {
                lines.push(content.clone());
                lines.push(String::new());
            }
        }
        NodeKind::Paragraph => {
            lines.push(node.text.clone());
            lines.push(String::new());
        }
    }
    for child in &node.children {
        render_node(child, lines);
    }
}

/// Filesystem-safe name derived from the URL.
pub fn file_name_for(url: &str) -> String {
    let safe = UNSAFE_FILE_CHARS.replace_all(url, "_");
    let mut cut = safe.len().min(MAX_STEM_BYTES);
    while !safe.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}{FILE_SUFFIX}", &safe[..cut])
}

/// Render and write into `dir`, returning the written path.
pub fn write(
    result: &ExtractionResult,
    dir: &Path,
    generated_at: &str,
) -> Result<PathBuf, ExtractError> {
    let path = dir.join(file_name_for(&result.source_url));
    let doc = render(result, generated_at);
    fs::write(&path, &doc)?;
    info!(path = %path.display(), bytes = doc.len(), "markdown written");
    Ok(path)
}
