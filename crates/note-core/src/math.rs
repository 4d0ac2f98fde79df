//! Inline arithmetic: a run ending in `a <op> b =` gets its result shown as a
//! phantom after the `=`. Nothing is ever written back into the document.

use crate::core::{Document, Point, TextRun};
use crate::plugin::{Decoration, Decorator, NotePlugin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
}

impl Operator {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            _ => None,
        }
    }

    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    /// `None` for division by zero and for results that are not finite.
    pub fn apply(&self, lhs: f64, rhs: f64) -> Option<f64> {
        let value = match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div if rhs == 0.0 => return None,
            Self::Div => lhs / rhs,
        };
        value.is_finite().then_some(value)
    }
}

/// A trailing `lhs op rhs =` found at the end of a run's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionMatch<'a> {
    /// Byte offset where `lhs` begins.
    pub start: usize,
    /// Byte offset just past the `=`; always the text length.
    pub end: usize,
    pub lhs: &'a str,
    pub op: Operator,
    pub rhs: &'a str,
}

impl ExpressionMatch<'_> {
    pub fn evaluate(&self) -> Option<f64> {
        evaluate(self.lhs, self.op, self.rhs)
    }
}

/// Finds `NUM ws* OP ws* NUM ws* =` anchored at the end of `text`, where NUM
/// is `digits[.digits][%]`. Operands are taken greedily, so for `12+3=` the
/// left operand is `12`, not `2`.
pub fn match_expression(text: &str) -> Option<ExpressionMatch<'_>> {
    let mut cur = BackCursor::new(text);
    if !cur.eat('=') {
        return None;
    }
    cur.skip_whitespace();

    let rhs_end = cur.pos;
    cur.operand()?;
    let rhs_start = cur.pos;

    cur.skip_whitespace();
    let op = Operator::from_char(cur.bump()?)?;
    cur.skip_whitespace();

    let lhs_end = cur.pos;
    cur.operand()?;
    let lhs_start = cur.pos;

    Some(ExpressionMatch {
        start: lhs_start,
        end: text.len(),
        lhs: &text[lhs_start..lhs_end],
        op,
        rhs: &text[rhs_start..rhs_end],
    })
}

/// Reads a text backwards from its end.
struct BackCursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> BackCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: text.len(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[..self.pos].chars().next_back()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos -= ch.len_utf8();
        Some(ch)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos -= expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let mut count = 0;
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos -= ch.len_utf8();
            count += 1;
        }
        count
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(char::is_whitespace);
    }

    /// Consumes one operand ending at the cursor, as far left as it extends.
    fn operand(&mut self) -> Option<()> {
        self.eat('%');
        if self.skip_while(|ch| ch.is_ascii_digit()) == 0 {
            return None;
        }
        let fraction_end = self.pos;
        if self.eat('.') && self.skip_while(|ch| ch.is_ascii_digit()) == 0 {
            self.pos = fraction_end;
        }
        Some(())
    }
}

/// Numeric value of an operand; a trailing `%` divides by 100.
pub fn operand_value(operand: &str) -> Option<f64> {
    let (number, percent) = match operand.strip_suffix('%') {
        Some(number) => (number, true),
        None => (operand, false),
    };
    let value: f64 = number.parse().ok()?;
    Some(if percent { value / 100.0 } else { value })
}

pub fn evaluate(lhs: &str, op: Operator, rhs: &str) -> Option<f64> {
    op.apply(operand_value(lhs)?, operand_value(rhs)?)
}

/// Rounds the exact binary value to two decimals and prints it without
/// trailing zeros: `3.333…` → `3.33`, `4.0` → `4`, `0.015` → `0.01` (the
/// stored double sits just below the tie). Exact ties such as `0.125` round
/// away from zero.
pub fn format_result(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let magnitude = value.abs();
    let eighths = magnitude * 8.0;
    let fixed = if magnitude < 1e15 && eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        // Odd eighths are the only doubles ending in an exact `5` at the third decimal.
        format!("{:.2}", (magnitude * 100.0).ceil() / 100.0)
    } else {
        format!("{magnitude:.2}")
    };
    let rounded: f64 = fixed.parse().ok()?;
    if rounded == 0.0 {
        return Some("0".to_string());
    }
    let signed = if value.is_sign_negative() { -rounded } else { rounded };
    Some(signed.to_string())
}

/// Match, evaluate and format in one go. `None` when any step fails.
pub fn trailing_result(text: &str) -> Option<(ExpressionMatch<'_>, String)> {
    let matched = match_expression(text)?;
    let result = format_result(matched.evaluate()?)?;
    Some((matched, result))
}

/// The phantom-result decoration for one run: it covers the final `=`.
pub fn decorate_run(path: &[usize], run: &TextRun) -> Option<Decoration> {
    let (matched, result) = trailing_result(&run.text)?;
    Some(Decoration {
        anchor: Point::new(path.to_vec(), matched.end - 1),
        focus: Point::new(path.to_vec(), matched.end),
        result,
    })
}

/// Decorations for every run of `doc`, in document order.
pub fn decorate_document(doc: &Document) -> Vec<Decoration> {
    doc.children
        .iter()
        .enumerate()
        .flat_map(|(block_ix, block)| {
            block
                .children
                .iter()
                .enumerate()
                .filter_map(move |(run_ix, run)| decorate_run(&[block_ix, run_ix], run))
        })
        .collect()
}

pub struct MathPlugin;

impl NotePlugin for MathPlugin {
    fn id(&self) -> &'static str {
        "math"
    }

    fn decorators(&self) -> Vec<Box<dyn Decorator>> {
        vec![Box::new(MathResultDecorator)]
    }
}

struct MathResultDecorator;

impl Decorator for MathResultDecorator {
    fn id(&self) -> &'static str {
        "math.result"
    }

    fn decorate(&self, path: &[usize], run: &TextRun) -> Vec<Decoration> {
        decorate_run(path, run).into_iter().collect()
    }
}
