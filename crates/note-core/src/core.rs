use std::ops::Range;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::ops::{Op, Path, Transaction};
use crate::plugin::{
    CommandError, Decoration, PluginRegistry, QueryError,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Document {
    pub children: Vec<Block>,
}

impl Document {
    pub fn empty() -> Self {
        Self {
            children: vec![Block::paragraph("")],
        }
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.children.get(index)
    }

    pub fn run(&self, path: &[usize]) -> Option<&TextRun> {
        match path {
            [block, run] => self.children.get(*block)?.children.get(*run),
            _ => None,
        }
    }

    /// Plain text of the document, one line per block.
    pub fn plain_text(&self) -> String {
        self.children
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type", default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub children: Vec<TextRun>,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<TextRun>) -> Self {
        Self { kind, children }
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![TextRun::plain(text)])
    }

    pub fn heading(kind: BlockKind, text: impl Into<String>) -> Self {
        Self::new(kind, vec![TextRun::plain(text)])
    }

    pub fn text(&self) -> String {
        self.children.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn text_len(&self) -> usize {
        self.children.iter().map(|run| run.text.len()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    HeadingOne,
    HeadingTwo,
    #[default]
    #[serde(other)]
    Paragraph,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::HeadingOne => "heading-one",
            Self::HeadingTwo => "heading-two",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "paragraph" => Some(Self::Paragraph),
            "heading-one" => Some(Self::HeadingOne),
            "heading-two" => Some(Self::HeadingTwo),
            _ => None,
        }
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, Self::HeadingOne | Self::HeadingTwo)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

impl TextRun {
    pub fn new(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Marks::default())
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self::new(
            text,
            Marks {
                bold: true,
                color: None,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(
        default,
        deserialize_with = "palette_color",
        skip_serializing_if = "Option::is_none"
    )]
    pub color: Option<Color>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Colors outside the palette are dropped instead of failing the whole file.
fn palette_color<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(Color::from_hex))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "#ffffff")]
    White,
    #[serde(rename = "#E94079")]
    Pink,
    #[serde(rename = "#EBB369")]
    Amber,
    #[serde(rename = "#DEF169")]
    Lime,
    #[serde(rename = "#73DF5C")]
    Green,
    #[serde(rename = "#55A9D2")]
    Blue,
    #[serde(rename = "#64D1FB")]
    Sky,
    #[serde(rename = "#8E73EF")]
    Violet,
}

impl Color {
    pub const PALETTE: [Color; 8] = [
        Color::White,
        Color::Pink,
        Color::Amber,
        Color::Lime,
        Color::Green,
        Color::Blue,
        Color::Sky,
        Color::Violet,
    ];

    pub fn hex(&self) -> &'static str {
        match self {
            Self::White => "#ffffff",
            Self::Pink => "#E94079",
            Self::Amber => "#EBB369",
            Self::Lime => "#DEF169",
            Self::Green => "#73DF5C",
            Self::Blue => "#55A9D2",
            Self::Sky => "#64D1FB",
            Self::Violet => "#8E73EF",
        }
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        Self::PALETTE
            .into_iter()
            .find(|color| color.hex().eq_ignore_ascii_case(hex))
    }

    pub fn rgb(&self) -> (u8, u8, u8) {
        let hex = &self.hex()[1..];
        let channel = |ix: usize| u8::from_str_radix(&hex[ix..ix + 2], 16).unwrap_or(0xff);
        (channel(0), channel(2), channel(4))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    pub fn block_index(&self) -> usize {
        self.path.first().copied().unwrap_or(0)
    }

    pub fn run_index(&self) -> usize {
        self.path.get(1).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoRecord {
    pub inverse_ops: Vec<Op>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

/// Undo/redo stacks as persisted next to the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct History {
    #[serde(default)]
    pub undos: Vec<UndoRecord>,
    #[serde(default)]
    pub redos: Vec<UndoRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct EditorConfig {
    pub max_undo: usize,
    pub max_normalize_iterations: usize,
}

impl EditorConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.max_undo == 0 {
            self.max_undo = 200;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        self
    }
}

pub struct Editor {
    doc: Document,
    selection: Selection,
    registry: PluginRegistry,
    config: EditorConfig,
    /// Marks for text typed at a collapsed caret. Dropped on any other edit
    /// or selection change.
    pending_marks: Option<Marks>,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
}

impl Editor {
    pub fn new(doc: Document, selection: Selection, registry: PluginRegistry) -> Self {
        Self::with_config(doc, selection, registry, EditorConfig::default())
    }

    pub fn with_config(
        doc: Document,
        selection: Selection,
        registry: PluginRegistry,
        config: EditorConfig,
    ) -> Self {
        let mut editor = Self {
            doc,
            selection,
            registry,
            config: config.with_defaults(),
            pending_marks: None,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        editor.normalize_in_place();
        editor
    }

    pub fn with_core_plugins() -> Self {
        let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
        Self::new(Document::empty(), selection, PluginRegistry::core())
    }

    pub fn with_notepad_plugins() -> Self {
        Self::from_document(Document::empty())
    }

    /// Notepad editor over `doc` with the caret at the very start.
    pub fn from_document(doc: Document) -> Self {
        Self::notepad(doc, EditorConfig::default())
    }

    pub fn notepad(doc: Document, config: EditorConfig) -> Self {
        let selection = Selection::collapsed(Point::new(vec![0, 0], 0));
        Self::with_config(doc, selection, PluginRegistry::notepad(), config)
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.pending_marks = None;
        self.selection = selection;
        self.normalize_selection_in_place();
    }

    pub fn pending_marks(&self) -> Option<&Marks> {
        self.pending_marks.as_ref()
    }

    pub fn set_pending_marks(&mut self, marks: Option<Marks>) {
        self.pending_marks = marks;
    }

    pub(crate) fn take_pending_marks(&mut self) -> Option<Marks> {
        self.pending_marks.take()
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn history(&self) -> History {
        History {
            undos: self.undo_stack.clone(),
            redos: self.redo_stack.clone(),
        }
    }

    pub fn set_history(&mut self, history: History) {
        let History { mut undos, redos } = history;
        if undos.len() > self.config.max_undo {
            undos.drain(..undos.len() - self.config.max_undo);
        }
        self.undo_stack = undos;
        self.redo_stack = redos;
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };
        self.pending_marks = None;

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut redo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            if let Ok(inv) = self.apply_op(op) {
                redo_ops.push(inv);
            } else {
                // If we can't apply inverse ops, bail out and stop mutating further.
                break;
            }
        }
        redo_ops.reverse();

        self.selection = selection_before.clone();
        self.normalize_in_place();

        self.redo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: redo_ops,
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };
        self.pending_marks = None;

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut undo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            if let Ok(inv) = self.apply_op(op) {
                undo_ops.push(inv);
            } else {
                break;
            }
        }
        undo_ops.reverse();

        self.selection = selection_after.clone();
        self.normalize_in_place();

        self.undo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: undo_ops,
        });
        true
    }

    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        if tx.is_empty() && tx.selection_after.is_none() {
            return Ok(());
        }
        self.pending_marks = None;
        let selection_before = self.selection.clone();

        let mut inverse_ops: Vec<Op> = Vec::new();
        for op in tx.ops.iter().cloned() {
            match self.apply_op(op) {
                Ok(inv) => inverse_ops.push(inv),
                Err(err) => {
                    self.roll_back(inverse_ops, selection_before);
                    return Err(err);
                }
            }
        }

        if let Some(sel) = tx.selection_after {
            self.selection = sel;
        }

        if let Err(err) = self.normalize_with_inverse_ops(&mut inverse_ops) {
            self.roll_back(inverse_ops, selection_before);
            return Err(err);
        }
        inverse_ops.reverse();

        self.normalize_selection_in_place();

        if inverse_ops.is_empty() {
            // Selection-only change, nothing to undo.
            return Ok(());
        }

        let selection_after = self.selection.clone();

        self.undo_stack.push(UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > self.config.max_undo {
            self.undo_stack.remove(0);
        }

        Ok(())
    }

    pub fn run_command(&mut self, id: &str, args: Option<Value>) -> Result<(), CommandError> {
        let Some(command) = self.registry.command(id) else {
            return Err(CommandError::new(format!("Unknown command: {id}")));
        };
        (command.handler)(self, args)
    }

    pub fn run_query_json(&self, id: &str, args: Option<Value>) -> Result<Value, QueryError> {
        let Some(query) = self.registry.query(id) else {
            return Err(QueryError::new(format!("Unknown query: {id}")));
        };
        (query.handler)(self, args)
    }

    pub fn run_query<T>(&self, id: &str, args: Option<Value>) -> Result<T, QueryError>
    where
        T: DeserializeOwned,
    {
        let value = self.run_query_json(id, args)?;
        serde_json::from_value(value)
            .map_err(|err| QueryError::new(format!("Failed to decode query result: {err}")))
    }

    /// Runs every registered decorator over every text run. Recomputed from
    /// scratch on each call; nothing is cached between calls.
    pub fn decorations(&self) -> Vec<Decoration> {
        let mut out = Vec::new();
        for (block_ix, block) in self.doc.children.iter().enumerate() {
            for (run_ix, run) in block.children.iter().enumerate() {
                let path = [block_ix, run_ix];
                for decorator in self.registry.decorators() {
                    out.extend(decorator.decorate(&path, run));
                }
            }
        }
        out
    }

    /// Undoes the ops of a transaction that failed partway through.
    fn roll_back(&mut self, mut inverse_ops: Vec<Op>, selection: Selection) {
        inverse_ops.reverse();
        for op in inverse_ops {
            if let Err(err) = self.apply_op(op) {
                tracing::warn!("rollback stopped early: {err:?}");
                break;
            }
        }
        self.selection = selection;
    }

    fn normalize_in_place(&mut self) {
        let _ = self.normalize_with_inverse_ops(&mut Vec::new());
        self.normalize_selection_in_place();
    }

    fn normalize_selection_in_place(&mut self) {
        self.selection = self
            .registry
            .normalize_selection(&self.doc, &self.selection);
    }

    /// Runs normalize passes to a fixpoint, pushing the inverse of every op
    /// applied onto `inverse_ops`.
    fn normalize_with_inverse_ops(&mut self, inverse_ops: &mut Vec<Op>) -> Result<(), ApplyError> {
        for _ in 0..self.config.max_normalize_iterations {
            let ops = self.registry.normalize(&self.doc);
            if ops.is_empty() {
                return Ok(());
            }
            for op in ops {
                let inv = self.apply_op(op)?;
                inverse_ops.push(inv);
            }
        }
        Err(ApplyError::NormalizeDidNotConverge)
    }

    fn apply_op(&mut self, op: Op) -> Result<Op, ApplyError> {
        apply_op_to(&mut self.doc, &mut self.selection, op)
    }
}

fn apply_op_to(doc: &mut Document, selection: &mut Selection, op: Op) -> Result<Op, ApplyError> {
    match op {
        Op::InsertText { path, offset, text } => {
            let run = run_mut(doc, &path)?;
            let offset = clamp_to_char_boundary(&run.text, offset);
            run.text.insert_str(offset, &text);
            transform_selection_insert_text(selection, &path, offset, text.len());
            Ok(Op::RemoveText {
                path,
                range: offset..offset + text.len(),
            })
        }
        Op::RemoveText { path, range } => {
            let run = run_mut(doc, &path)?;
            let start = clamp_to_char_boundary(&run.text, range.start);
            let end = clamp_to_char_boundary(&run.text, range.end);
            if start >= end {
                return Ok(Op::InsertText {
                    path,
                    offset: start,
                    text: String::new(),
                });
            }
            let removed = run.text[start..end].to_string();
            run.text.replace_range(start..end, "");
            transform_selection_remove_text(selection, &path, start..end);
            Ok(Op::InsertText {
                path,
                offset: start,
                text: removed,
            })
        }
        Op::InsertRun { path, run } => {
            let (block_ix, run_ix) = split_run_path(&path)?;
            let block = block_mut(doc, block_ix)?;
            if run_ix > block.children.len() {
                return Err(ApplyError::InvalidPath(format!(
                    "Insert run index out of bounds: {run_ix} > {}",
                    block.children.len()
                )));
            }
            block.children.insert(run_ix, run);
            for point in points_mut(selection) {
                if point.block_index() == block_ix && point.run_index() >= run_ix {
                    point.path = vec![block_ix, point.run_index() + 1];
                }
            }
            Ok(Op::RemoveRun { path })
        }
        Op::RemoveRun { path } => {
            let (block_ix, run_ix) = split_run_path(&path)?;
            let block = block_mut(doc, block_ix)?;
            if run_ix >= block.children.len() {
                return Err(ApplyError::InvalidPath(format!(
                    "Remove run index out of bounds: {run_ix} >= {}",
                    block.children.len()
                )));
            }
            let removed = block.children.remove(run_ix);
            let fallback = match run_ix.checked_sub(1) {
                Some(prev) => Point::new(vec![block_ix, prev], block.children[prev].text.len()),
                None => Point::new(vec![block_ix, 0], 0),
            };
            for point in points_mut(selection) {
                if point.block_index() != block_ix || point.run_index() < run_ix {
                    continue;
                }
                if point.run_index() > run_ix {
                    point.path = vec![block_ix, point.run_index() - 1];
                } else {
                    *point = fallback.clone();
                }
            }
            Ok(Op::InsertRun { path, run: removed })
        }
        Op::SplitRun {
            path,
            offset,
            marks,
        } => {
            let (block_ix, run_ix) = split_run_path(&path)?;
            let block = block_mut(doc, block_ix)?;
            let Some(run) = block.children.get_mut(run_ix) else {
                return Err(ApplyError::InvalidPath(format!(
                    "Split run index out of bounds: {run_ix}"
                )));
            };
            let offset = clamp_to_char_boundary(&run.text, offset);
            let tail = run.text.split_off(offset);
            block.children.insert(run_ix + 1, TextRun::new(tail, marks));
            for point in points_mut(selection) {
                if point.block_index() != block_ix {
                    continue;
                }
                let ix = point.run_index();
                if ix > run_ix {
                    point.path = vec![block_ix, ix + 1];
                } else if ix == run_ix && point.offset > offset {
                    point.path = vec![block_ix, run_ix + 1];
                    point.offset -= offset;
                }
            }
            Ok(Op::MergeRun {
                path: vec![block_ix, run_ix + 1],
            })
        }
        Op::MergeRun { path } => {
            let (block_ix, run_ix) = split_run_path(&path)?;
            let block = block_mut(doc, block_ix)?;
            if run_ix == 0 || run_ix >= block.children.len() {
                return Err(ApplyError::InvalidPath(format!(
                    "Cannot merge run {run_ix} of {}",
                    block.children.len()
                )));
            }
            let right = block.children.remove(run_ix);
            let left = &mut block.children[run_ix - 1];
            let left_len = left.text.len();
            left.text.push_str(&right.text);
            for point in points_mut(selection) {
                if point.block_index() != block_ix {
                    continue;
                }
                let ix = point.run_index();
                if ix == run_ix {
                    point.path = vec![block_ix, run_ix - 1];
                    point.offset += left_len;
                } else if ix > run_ix {
                    point.path = vec![block_ix, ix - 1];
                }
            }
            Ok(Op::SplitRun {
                path: vec![block_ix, run_ix - 1],
                offset: left_len,
                marks: right.marks,
            })
        }
        Op::InsertBlock { index, block } => {
            if index > doc.children.len() {
                return Err(ApplyError::InvalidPath(format!(
                    "Insert block index out of bounds: {index} > {}",
                    doc.children.len()
                )));
            }
            doc.children.insert(index, block);
            for point in points_mut(selection) {
                if !point.path.is_empty() && point.path[0] >= index {
                    point.path[0] += 1;
                }
            }
            Ok(Op::RemoveBlock { index })
        }
        Op::RemoveBlock { index } => {
            if index >= doc.children.len() {
                return Err(ApplyError::InvalidPath(format!(
                    "Remove block index out of bounds: {index} >= {}",
                    doc.children.len()
                )));
            }
            let removed = doc.children.remove(index);
            let fallback = match index.checked_sub(1) {
                Some(prev) => end_of_block(doc, prev),
                None => Point::new(vec![0, 0], 0),
            };
            for point in points_mut(selection) {
                if point.path.is_empty() || point.path[0] < index {
                    continue;
                }
                if point.path[0] > index {
                    point.path[0] -= 1;
                } else {
                    *point = fallback.clone();
                }
            }
            Ok(Op::InsertBlock {
                index,
                block: removed,
            })
        }
        Op::SplitBlock { index, run, kind } => {
            let block = block_mut(doc, index)?;
            let run = run.min(block.children.len());
            let tail = block.children.split_off(run);
            doc.children.insert(index + 1, Block::new(kind, tail));
            for point in points_mut(selection) {
                if point.path.is_empty() || point.path[0] < index {
                    continue;
                }
                if point.path[0] > index {
                    point.path[0] += 1;
                } else if point.run_index() >= run {
                    point.path = vec![index + 1, point.run_index() - run];
                }
            }
            Ok(Op::MergeBlock { index: index + 1 })
        }
        Op::MergeBlock { index } => {
            if index == 0 || index >= doc.children.len() {
                return Err(ApplyError::InvalidPath(format!(
                    "Cannot merge block {index} of {}",
                    doc.children.len()
                )));
            }
            let removed = doc.children.remove(index);
            let prev = &mut doc.children[index - 1];
            let prev_runs = prev.children.len();
            prev.children.extend(removed.children);
            for point in points_mut(selection) {
                if point.path.is_empty() || point.path[0] < index {
                    continue;
                }
                if point.path[0] > index {
                    point.path[0] -= 1;
                } else {
                    point.path = vec![index - 1, point.run_index() + prev_runs];
                }
            }
            Ok(Op::SplitBlock {
                index: index - 1,
                run: prev_runs,
                kind: removed.kind,
            })
        }
        Op::SetBlockKind { index, kind } => {
            let block = block_mut(doc, index)?;
            let old = std::mem::replace(&mut block.kind, kind);
            Ok(Op::SetBlockKind { index, kind: old })
        }
        Op::SetRunMarks { path, marks } => {
            let run = run_mut(doc, &path)?;
            let old = std::mem::replace(&mut run.marks, marks);
            Ok(Op::SetRunMarks { path, marks: old })
        }
    }
}

#[derive(Debug)]
pub enum ApplyError {
    InvalidPath(String),
    NormalizeDidNotConverge,
}

impl From<PathError> for ApplyError {
    fn from(value: PathError) -> Self {
        ApplyError::InvalidPath(value.0)
    }
}

#[derive(Debug)]
pub struct PathError(pub String);

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn points_mut(selection: &mut Selection) -> [&mut Point; 2] {
    [&mut selection.anchor, &mut selection.focus]
}

fn transform_selection_insert_text(
    selection: &mut Selection,
    path: &[usize],
    offset: usize,
    len: usize,
) {
    for point in points_mut(selection) {
        if point.path == path && point.offset >= offset {
            point.offset = point.offset.saturating_add(len);
        }
    }
}

fn transform_selection_remove_text(selection: &mut Selection, path: &[usize], range: Range<usize>) {
    let removed_len = range.end.saturating_sub(range.start);
    for point in points_mut(selection) {
        if point.path != path {
            continue;
        }
        if point.offset <= range.start {
            continue;
        }
        if point.offset >= range.end {
            point.offset = point.offset.saturating_sub(removed_len);
        } else {
            point.offset = range.start;
        }
    }
}

fn end_of_block(doc: &Document, index: usize) -> Point {
    match doc.children.get(index) {
        Some(block) if !block.children.is_empty() => {
            let last = block.children.len() - 1;
            Point::new(vec![index, last], block.children[last].text.len())
        }
        _ => Point::new(vec![index, 0], 0),
    }
}

fn split_run_path(path: &[usize]) -> Result<(usize, usize), PathError> {
    match path {
        [block, run] => Ok((*block, *run)),
        _ => Err(PathError(format!("Expected a run path, got {path:?}"))),
    }
}

fn block_mut(doc: &mut Document, index: usize) -> Result<&mut Block, PathError> {
    let len = doc.children.len();
    doc.children
        .get_mut(index)
        .ok_or_else(|| PathError(format!("Block index out of bounds: {index} >= {len}")))
}

fn run_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextRun, PathError> {
    let (block_ix, run_ix) = split_run_path(path)?;
    let block = block_mut(doc, block_ix)?;
    let len = block.children.len();
    block.children.get_mut(run_ix).ok_or_else(|| {
        PathError(format!(
            "Run index out of bounds at block {block_ix}: {run_ix} >= {len}"
        ))
    })
}
