use std::fmt::Write as _;

use mononote_core::{BlockStyle, Inline, RenderedBlock, SessionRow};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const UNDERLINE: &str = "\x1b[4m";

/// One line per block. Headings get a `#`/`##` gutter when `ansi` is off so
/// the structure survives piping, and math results are set off by a space.
pub fn render_blocks(blocks: &[RenderedBlock], ansi: bool) -> String {
    let mut out = String::new();
    for block in blocks {
        if !ansi {
            match block.style {
                BlockStyle::Title => out.push_str("# "),
                BlockStyle::Subtitle => out.push_str("## "),
                BlockStyle::Body => {}
            }
        }
        for leaf in &block.leaves {
            render_inline(&leaf.content, block.style, ansi, &mut out);
        }
        out.push('\n');
    }
    out
}

fn render_inline(inline: &Inline, style: BlockStyle, ansi: bool, out: &mut String) {
    if !ansi {
        out.push_str(inline.text());
        if let Some(result) = inline.result() {
            let _ = write!(out, " {result}");
        }
        return;
    }

    let mut codes = String::new();
    match style {
        BlockStyle::Title => codes.push_str(BOLD),
        BlockStyle::Subtitle => codes.push_str(UNDERLINE),
        BlockStyle::Body => {}
    }
    if inline.is_bold() {
        codes.push_str(BOLD);
    }
    if let Some(color) = inline.color() {
        let (r, g, b) = color.rgb();
        let _ = write!(codes, "\x1b[38;2;{r};{g};{b}m");
    }
    if inline.href().is_some() {
        codes.push_str(UNDERLINE);
    }

    if codes.is_empty() {
        out.push_str(inline.text());
    } else {
        out.push_str(&codes);
        out.push_str(inline.text());
        out.push_str(RESET);
    }
    if let Some(result) = inline.result() {
        let _ = write!(out, "{DIM}{result}{RESET}");
    }
}

/// Aligned table of session rows, newest first as given.
pub fn render_session_rows(rows: &[SessionRow]) -> String {
    let headers = ["OPENED", "CLOSED", "DURATION", "STATUS"];
    let cells: Vec<[&str; 4]> = rows
        .iter()
        .map(|row| [&*row.opened, &*row.closed, &*row.duration, &*row.status])
        .collect();

    let mut widths = headers.map(|header| header.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(&headers).chain(&cells) {
        let line: Vec<String> = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}
