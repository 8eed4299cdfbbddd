//! Web page → Markdown extraction.
//!
//! - **fetch**: HTTP GET with browser-like headers and charset detection.
//! - **parse**: pick the main content container and build a heading tree.
//! - **markdown**: render the tree as a Markdown document and write it.

pub mod fetch;
pub mod markdown;
pub mod parse;

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

pub use fetch::{FetchedPage, PageFetcher};
pub use parse::extract;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("URL must start with http:// or https://: {0}")]
    InvalidUrl(String),
    #[error("output path {0} is a file, expected a directory")]
    OutputIsFile(PathBuf),
    #[error("cannot reach {url}: {reason}")]
    Request { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u16 },
    #[error("no content could be extracted")]
    NoContent,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Heading,
    Paragraph,
}

/// One node of the extracted outline.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentNode {
    /// 1 for `h1`, 2 for `h2`, …
    pub level: u8,
    pub text: String,
    pub kind: NodeKind,
    /// Summary of the material between this heading and the next one.
    pub content: Option<String>,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            kind: NodeKind::Heading,
            content: None,
            children: Vec::new(),
        }
    }

    pub fn paragraph(level: u8, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            kind: NodeKind::Paragraph,
            content: None,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, self included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(ContentNode::count).sum::<usize>()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionResult {
    pub source_url: String,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub nodes: Vec<ContentNode>,
    pub raw_html: String,
    pub raw_text: String,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.raw_text.trim().is_empty()
    }
}

pub fn validate_url(url: &str) -> Result<(), ExtractError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ExtractError::InvalidUrl(url.to_string()))
    }
}

/// Create `dir` if needed; refuse when the path is an existing file.
pub fn prepare_output_dir(dir: &Path) -> Result<(), ExtractError> {
    if dir.is_file() {
        return Err(ExtractError::OutputIsFile(dir.to_path_buf()));
    }
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Written document plus the extraction it was rendered from.
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub path: PathBuf,
    pub result: ExtractionResult,
    pub markdown_bytes: usize,
}

/// Fetch `url`, extract its content and write Markdown into `output_dir`.
///
/// The output directory is prepared before any network traffic. A page
/// with nothing extractable yields [`ExtractError::NoContent`] and no file.
pub async fn run(
    url: &str,
    output_dir: &Path,
    timeout_seconds: u64,
    generated_at: &str,
) -> Result<ExtractOutcome, ExtractError> {
    validate_url(url)?;
    prepare_output_dir(output_dir)?;

    let page = PageFetcher::new(timeout_seconds)?.fetch(url).await?;
    let result = extract(&page.url, &page.html);
    if result.is_empty() {
        warn!(%url, "page produced no extractable content");
        return Err(ExtractError::NoContent);
    }

    let path = markdown::write(&result, output_dir, generated_at)?;
    let markdown_bytes = std::fs::metadata(&path)?.len() as usize;
    info!(path = %path.display(), markdown_bytes, "extraction saved");
    Ok(ExtractOutcome { path, result, markdown_bytes })
}
