use std::ops::Range;

use crate::core::{BlockKind, Color, Document, TextRun};
use crate::keys::Modifiers;
use crate::ops::Path;
use crate::plugin::Decoration;

/// Presentation of a block. Unknown kinds already read as paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Title,
    Subtitle,
    Body,
}

impl From<BlockKind> for BlockStyle {
    fn from(kind: BlockKind) -> Self {
        match kind {
            BlockKind::HeadingOne => Self::Title,
            BlockKind::HeadingTwo => Self::Subtitle,
            BlockKind::Paragraph => Self::Body,
        }
    }
}

/// Inline wrappers, innermost first: bold, then color, then link, then the
/// phantom math result.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Bold(Box<Inline>),
    Colored { color: Color, child: Box<Inline> },
    Link { href: String, child: Box<Inline> },
    WithResult { child: Box<Inline>, result: String },
}

impl Inline {
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Bold(child)
            | Self::Colored { child, .. }
            | Self::Link { child, .. }
            | Self::WithResult { child, .. } => child.text(),
        }
    }

    pub fn is_bold(&self) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Bold(_) => true,
            Self::Colored { child, .. }
            | Self::Link { child, .. }
            | Self::WithResult { child, .. } => child.is_bold(),
        }
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Self::Text(_) | Self::Bold(_) => None,
            Self::Colored { color, .. } => Some(*color),
            Self::Link { child, .. } | Self::WithResult { child, .. } => child.color(),
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            Self::Link { href, .. } => Some(href),
            Self::WithResult { child, .. } => child.href(),
            _ => None,
        }
    }

    pub fn result(&self) -> Option<&str> {
        match self {
            Self::WithResult { result, .. } => Some(result),
            _ => None,
        }
    }
}

/// A slice of one text run with its wrappers applied.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedLeaf {
    pub path: Path,
    pub range: Range<usize>,
    pub content: Inline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBlock {
    pub index: usize,
    pub style: BlockStyle,
    pub leaves: Vec<RenderedLeaf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Open `href` in a new browsing context; editing is not disturbed.
    OpenExternal(String),
    /// Leave the click to the host (caret placement, selection).
    Default,
}

/// Plain clicks open the link; a held modifier keeps editing behavior.
pub fn link_click_action(href: &str, modifiers: Modifiers) -> LinkAction {
    if modifiers.platform() || modifiers.shift || modifiers.alt {
        LinkAction::Default
    } else {
        LinkAction::OpenExternal(href.to_string())
    }
}

/// `[scheme:]//host...` with no whitespace, where host is `localhost` or has a
/// dot followed by at least two characters.
pub fn is_url(text: &str) -> bool {
    let rest = match text.find("//") {
        Some(0) => &text[2..],
        Some(ix) => {
            let Some(scheme) = text[..ix].strip_suffix(':') else {
                return false;
            };
            if scheme.is_empty()
                || !scheme
                    .chars()
                    .all(|ch| ch.is_alphanumeric() || ch == '_')
            {
                return false;
            }
            &text[ix + 2..]
        }
        None => return false,
    };
    if rest.is_empty() || rest.chars().any(char::is_whitespace) {
        return false;
    }
    if rest.starts_with("localhost") {
        return true;
    }
    match rest.find('.') {
        Some(dot) if dot > 0 => rest[dot + 1..].chars().count() >= 2,
        _ => false,
    }
}

pub fn render_document(doc: &Document, decorations: &[Decoration]) -> Vec<RenderedBlock> {
    doc.children
        .iter()
        .enumerate()
        .map(|(index, block)| RenderedBlock {
            index,
            style: BlockStyle::from(block.kind),
            leaves: block
                .children
                .iter()
                .enumerate()
                .flat_map(|(run_ix, run)| render_run(&[index, run_ix], run, decorations))
                .collect(),
        })
        .collect()
}

/// Splits a run at decoration edges and wraps each piece.
pub fn render_run(path: &[usize], run: &TextRun, decorations: &[Decoration]) -> Vec<RenderedLeaf> {
    let len = run.text.len();
    let mut ranges: Vec<(Range<usize>, &Decoration)> = decorations
        .iter()
        .filter(|decoration| decoration.covers_run(path))
        .filter_map(|decoration| {
            let start = decoration.anchor.offset.min(len);
            let end = decoration.focus.offset.min(len);
            (start < end && run.text.is_char_boundary(start) && run.text.is_char_boundary(end))
                .then_some((start..end, decoration))
        })
        .collect();
    ranges.sort_by_key(|(range, _)| range.start);

    let mut leaves = Vec::new();
    let mut cursor = 0usize;
    for (range, decoration) in ranges {
        if range.start < cursor {
            continue;
        }
        if range.start > cursor {
            leaves.push(leaf(path, run, cursor..range.start, None));
        }
        leaves.push(leaf(path, run, range.clone(), Some(&decoration.result)));
        cursor = range.end;
    }
    if cursor < len || leaves.is_empty() {
        leaves.push(leaf(path, run, cursor..len, None));
    }
    leaves
}

fn leaf(path: &[usize], run: &TextRun, range: Range<usize>, result: Option<&str>) -> RenderedLeaf {
    let text = run.text[range.clone()].to_string();
    let mut content = Inline::Text(text.clone());
    if run.marks.bold {
        content = Inline::Bold(Box::new(content));
    }
    if let Some(color) = run.marks.color {
        content = Inline::Colored {
            color,
            child: Box::new(content),
        };
    }
    if is_url(&text) {
        content = Inline::Link {
            href: text,
            child: Box::new(content),
        };
    }
    if let Some(result) = result {
        content = Inline::WithResult {
            child: Box::new(content),
            result: result.to_string(),
        };
    }
    RenderedLeaf {
        path: path.to_vec(),
        range,
        content,
    }
}
