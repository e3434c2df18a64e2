use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::info;
use scraper::{ElementRef, Html, Node, Selector};

use super::document::EditorDocument;

/// Capabilities granted to the frame that hosts assistant-provided markup.
pub const SANDBOX_ATTRIBUTES: &str = "allow-scripts allow-same-origin";

/// Path of the exported host page, relative to the workspace root.
pub const EXPORT_RELATIVE_PATH: &str = "preview/index.html";

/// Elements whose boundaries start a new line in the text rendering.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "div", "dl", "dt", "dd",
    "fieldset", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "html",
    "label", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Elements whose content never shows up as text. `title` is read separately.
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template", "title"];

/// The sandboxed frame boundary. Holds the document the frame shows and a
/// generation counter that increases every time the frame must reload.
#[derive(Debug, Default, Clone)]
pub struct PreviewFrame {
    document: String,
    generation: u64,
    seen_revision: Option<u64>,
    rendered: Vec<String>,
    title: Option<String>,
}

impl PreviewFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads the frame when the document revision moved on.
    pub fn sync(&mut self, doc: &EditorDocument) -> bool {
        if self.seen_revision == Some(doc.revision()) {
            return false;
        }
        self.seen_revision = Some(doc.revision());
        self.document = doc.text();
        let page = render_text(&self.document);
        self.title = page.title;
        self.rendered = page.lines;
        self.generation += 1;
        true
    }

    /// The full document of the frame, exactly as the editor holds it.
    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn sandbox(&self) -> &'static str {
        SANDBOX_ATTRIBUTES
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.rendered
    }

    /// A standalone page embedding the document in a sandboxed iframe.
    pub fn host_page(&self) -> String {
        host_page(&self.document)
    }

    /// Writes the host page under the workspace and returns its path.
    pub fn export(&self, workspace_root: &Path) -> Result<PathBuf> {
        let path = workspace_root.join(EXPORT_RELATIVE_PATH);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, self.host_page())
            .with_context(|| format!("failed to write preview to {}", path.display()))?;
        info!(
            "exported preview generation {} to {}",
            self.generation,
            path.display()
        );
        Ok(path)
    }
}

pub fn host_page(document: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Preview</title>\n\
<style>html,body{{margin:0;height:100%}}iframe{{border:0;width:100%;height:100%}}</style>\n\
</head>\n<body>\n<iframe title=\"preview\" sandbox=\"{}\" srcdoc=\"{}\"></iframe>\n</body>\n</html>\n",
        SANDBOX_ATTRIBUTES,
        escape_attribute(document)
    )
}

/// Escapes text for a double-quoted HTML attribute.
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Debug, Default, PartialEq)]
pub struct TextPage {
    pub title: Option<String>,
    pub lines: Vec<String>,
}

/// Flattens markup into readable lines for the terminal preview.
///
/// The document is parsed the way a browser would, so entities are decoded
/// and stray `<` characters stay text. Block elements break lines, hidden
/// elements vanish and form controls get a bracketed stand-in.
pub fn render_text(markup: &str) -> TextPage {
    let document = Html::parse_document(markup);
    let mut flattener = Flattener::default();
    flattener.walk(document.root_element());
    flattener.flush();

    let title = Selector::parse("title")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .map(|element| element.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty());

    TextPage {
        title,
        lines: flattener.lines,
    }
}

#[derive(Default)]
struct Flattener {
    lines: Vec<String>,
    current: String,
}

impl Flattener {
    fn walk(&mut self, element: ElementRef) {
        let name = element.value().name();
        if HIDDEN_TAGS.contains(&name) {
            return;
        }
        let block = BLOCK_TAGS.contains(&name);
        if block {
            self.flush();
        }
        match name {
            "input" => {
                let label = element
                    .value()
                    .attr("placeholder")
                    .or_else(|| element.value().attr("value"))
                    .unwrap_or_default();
                self.push_word(&format!("[{label:_<12}]"));
            }
            "select" => self.push_word("[select v]"),
            "hr" => self.lines.push("─".repeat(24)),
            "button" => {
                self.push_word("[");
                self.walk_children(element);
                self.current.push_str(" ]");
            }
            "li" => {
                self.push_word("•");
                self.walk_children(element);
            }
            _ => self.walk_children(element),
        }
        if block {
            self.flush();
        }
    }

    fn walk_children(&mut self, element: ElementRef) {
        for child in element.children() {
            if let Some(child_element) = ElementRef::wrap(child) {
                self.walk(child_element);
            } else if let Node::Text(text) = child.value() {
                for word in text.split_whitespace() {
                    self.push_word(word);
                }
            }
        }
    }

    fn push_word(&mut self, word: &str) {
        if !self.current.is_empty() && !self.current.ends_with(' ') {
            self.current.push(' ');
        }
        self.current.push_str(word);
    }

    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            self.lines.push(trimmed.to_string());
        }
        self.current.clear();
    }
}
