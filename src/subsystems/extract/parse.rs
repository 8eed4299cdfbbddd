//! HTML → [`ExtractionResult`].
//!
//! The main content container is the first candidate selector whose text
//! exceeds [`MIN_CONTAINER_CHARS`]; failing that, `<body>`. Chrome elements
//! (scripts, navigation, forms, …) are skipped wherever text is gathered.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::{debug, info};

use super::{ContentNode, ExtractionResult};

const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"main\"]",
    ".content",
    "#content",
    ".post-content",
    ".article-content",
    ".entry-content",
    "#article",
    ".article",
    ".main-content",
    ".post",
    ".documentation",
    ".docs",
    ".tutorial",
    ".guide",
];

const IGNORED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "aside", "form", "button", "iframe", "noscript",
];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

pub const MIN_CONTAINER_CHARS: usize = 100;
pub const MAX_SECTION_CHARS: usize = 500;
const MAX_LIST_ITEMS: usize = 5;
const MAX_CODE_CHARS: usize = 100;
const MAX_TABLE_CHARS: usize = 200;
const MAX_TABLE_ROWS: usize = 10;

pub fn extract(url: &str, html: &str) -> ExtractionResult {
    let doc = Html::parse_document(html);

    let title = first_match(&doc, "title")
        .map(inline_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| title_from_url(url));

    let container = find_container(&doc);
    let raw_text = block_text(container);
    let nodes = build_nodes(container, &title);

    info!(
        nodes = nodes.iter().map(ContentNode::count).sum::<usize>(),
        text_chars = raw_text.chars().count(),
        "extraction complete"
    );

    ExtractionResult {
        source_url: url.to_string(),
        title,
        description: meta_content(&doc, "meta[name=\"description\"]"),
        author: meta_content(&doc, "meta[name=\"author\"]"),
        date: meta_content(&doc, "meta[property=\"article:published_time\"]")
            .or_else(|| meta_content(&doc, "meta[name=\"date\"]")),
        nodes,
        raw_html: container.html(),
        raw_text,
    }
}

fn first_match<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next()
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    first_match(doc, selector)
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn find_container(doc: &Html) -> ElementRef<'_> {
    for selector in CONTENT_SELECTORS {
        if let Some(found) = first_match(doc, selector) {
            if block_text(found).chars().count() > MIN_CONTAINER_CHARS {
                info!(%selector, "content container found");
                return found;
            }
        }
    }
    debug!("no content container matched, using body");
    first_match(doc, "body").unwrap_or_else(|| doc.root_element())
}

/// Last path segment without its extension, else the host, else the URL.
pub fn title_from_url(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return url.to_string();
    };
    let segment = parsed
        .path_segments()
        .and_then(|mut segs| segs.rfind(|s| !s.is_empty()))
        .map(|s| match s.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => s.to_string(),
        });
    segment
        .or_else(|| parsed.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

fn is_ignored(tag: &str) -> bool {
    IGNORED_TAGS.contains(&tag)
}

fn is_heading(tag: &str) -> bool {
    HEADING_TAGS.contains(&tag)
}

fn push_text(el: ElementRef<'_>, out: &mut Vec<String>) {
    for child in el.children() {
        match child.value() {
            Node::Text(t) => out.push(t.to_string()),
            Node::Element(e) if !is_ignored(e.name()) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    push_text(child_el, out);
                }
            }
            _ => {}
        }
    }
}

/// Every non-empty text run, trimmed, one per line.
pub fn block_text(el: ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    push_text(el, &mut pieces);
    pieces
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text as it reads inline, whitespace collapsed.
fn inline_text(el: ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    push_text(el, &mut pieces);
    pieces.concat().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text with original line breaks, for `<pre>`.
fn verbatim_text(el: ElementRef<'_>) -> String {
    let mut pieces = Vec::new();
    push_text(el, &mut pieces);
    pieces.concat().trim().to_string()
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn inside_ignored(el: ElementRef<'_>, container: ElementRef<'_>) -> bool {
    el.ancestors()
        .take_while(|a| a.id() != container.id())
        .filter_map(ElementRef::wrap)
        .any(|a| is_ignored(a.value().name()))
}

fn build_nodes(container: ElementRef<'_>, title: &str) -> Vec<ContentNode> {
    let headings: Vec<ElementRef<'_>> = match Selector::parse("h1, h2, h3, h4, h5, h6") {
        Ok(sel) => container
            .select(&sel)
            .filter(|h| !inside_ignored(*h, container))
            .collect(),
        Err(_) => Vec::new(),
    };

    if headings.is_empty() {
        let text = block_text(container);
        if text.is_empty() {
            return Vec::new();
        }
        let body = if text.chars().count() > MAX_SECTION_CHARS {
            format!("{}... [content truncated]", truncate_chars(&text, MAX_SECTION_CHARS))
        } else {
            text
        };
        let mut root = ContentNode::heading(1, title);
        root.children.push(ContentNode::paragraph(2, body));
        return vec![root];
    }

    let mut flat = Vec::with_capacity(headings.len());
    for heading in headings {
        let text = inline_text(heading);
        if text.is_empty() {
            continue;
        }
        let level = heading.value().name()[1..].parse::<u8>().unwrap_or(1);
        let mut node = ContentNode::heading(level, text);
        node.content = section_summary(heading);
        flat.push(node);
    }

    nest(flat)
}

/// Summarise the siblings between `heading` and the next heading.
fn section_summary(heading: ElementRef<'_>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    for sibling in heading.next_siblings().filter_map(ElementRef::wrap) {
        let tag = sibling.value().name();
        if is_heading(tag) {
            break;
        }
        match tag {
            "p" => {
                let text = inline_text(sibling);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            "ul" | "ol" => {
                let items: Vec<String> = sibling
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|li| li.value().name() == "li")
                    .map(inline_text)
                    .filter(|t| !t.is_empty())
                    .collect();
                if !items.is_empty() {
                    let shown = &items[..items.len().min(MAX_LIST_ITEMS)];
                    let more = if items.len() > MAX_LIST_ITEMS { "..." } else { "" };
                    parts.push(format!("List: {}{more}", shown.join("; ")));
                }
            }
            "pre" => {
                let code = verbatim_text(sibling);
                if !code.is_empty() {
                    parts.push(format!("Code block: {}...", truncate_chars(&code, MAX_CODE_CHARS)));
                }
            }
            "table" => {
                let table = table_text(sibling);
                if !table.is_empty() {
                    parts.push(format!("Table: {}...", truncate_chars(&table, MAX_TABLE_CHARS)));
                }
            }
            _ => {}
        }
    }

    if parts.is_empty() {
        return None;
    }
    let combined = parts.join(" ");
    if combined.chars().count() > MAX_SECTION_CHARS {
        Some(format!("{}...", truncate_chars(&combined, MAX_SECTION_CHARS)))
    } else {
        Some(combined)
    }
}

/// Rows as `a | b | c`, first [`MAX_TABLE_ROWS`] non-empty rows.
fn table_text(table: ElementRef<'_>) -> String {
    let (Ok(row_sel), Ok(cell_sel)) = (Selector::parse("tr"), Selector::parse("td, th")) else {
        return String::new();
    };
    table
        .select(&row_sel)
        .filter_map(|row| {
            let cells: Vec<String> = row
                .select(&cell_sel)
                .map(inline_text)
                .filter(|c| !c.is_empty())
                .collect();
            (!cells.is_empty()).then(|| cells.join(" | "))
        })
        .take(MAX_TABLE_ROWS)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Nest a document-ordered heading list: each heading becomes a child of the
/// nearest preceding heading with a strictly lower level.
pub fn nest(flat: Vec<ContentNode>) -> Vec<ContentNode> {
    fn attach(stack: &mut [ContentNode], roots: &mut Vec<ContentNode>, node: ContentNode) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    let mut roots = Vec::new();
    let mut stack: Vec<ContentNode> = Vec::new();

    for node in flat {
        while let Some(top) = stack.pop() {
            if top.level < node.level {
                stack.push(top);
                break;
            }
            attach(&mut stack, &mut roots, top);
        }
        stack.push(node);
    }
    while let Some(top) = stack.pop() {
        attach(&mut stack, &mut roots, top);
    }
    roots
}
