use crate::core::{
    ApplyError, Block, BlockKind, Editor, Marks, Point, Selection, TextRun,
    clamp_to_char_boundary,
};
use crate::ops::{Op, Transaction};

/// Granularity for backward deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Character,
    Word,
}

impl Editor {
    pub fn active_block_index(&self) -> usize {
        self.selection().focus.block_index()
    }

    pub fn active_block(&self) -> Option<&Block> {
        self.doc().block(self.active_block_index())
    }

    pub fn block_kind(&self, index: usize) -> Option<BlockKind> {
        self.doc().block(index).map(|block| block.kind)
    }

    pub fn set_block_kind(&mut self, index: usize, kind: BlockKind) -> Result<(), ApplyError> {
        if self.block_kind(index) == Some(kind) {
            return Ok(());
        }
        self.apply(Transaction::new(vec![Op::SetBlockKind { index, kind }]).source("set_block_kind"))
    }

    pub fn block_start(&self, index: usize) -> Point {
        Point::new(vec![index, 0], 0)
    }

    /// Offset of the focus within the concatenated text of its block.
    pub fn caret_block_offset(&self) -> usize {
        let focus = &self.selection().focus;
        self.doc()
            .block(focus.block_index())
            .map(|block| point_global_offset(block, focus.run_index(), focus.offset))
            .unwrap_or(0)
    }

    /// End of the last run of the last block.
    pub fn document_end(&self) -> Point {
        let index = self.doc().children.len().saturating_sub(1);
        match self.doc().block(index) {
            Some(block) if !block.children.is_empty() => {
                let last = block.children.len() - 1;
                Point::new(vec![index, last], block.children[last].text.len())
            }
            _ => self.block_start(index),
        }
    }

    pub fn move_to_end(&mut self) {
        let end = self.document_end();
        self.set_selection(Selection::collapsed(end));
    }

    pub fn is_caret_at_block_start(&self) -> bool {
        self.selection().is_collapsed() && self.caret_block_offset() == 0
    }

    /// Text between the start of the caret's block and the caret. `None` when
    /// the selection is expanded.
    pub fn text_before_caret(&self) -> Option<String> {
        if !self.selection().is_collapsed() {
            return None;
        }
        let block = self.active_block()?;
        let text = block.text();
        let offset = clamp_to_char_boundary(&text, self.caret_block_offset());
        Some(text[..offset].to_string())
    }

    pub fn insert_text(&mut self, text: &str) -> Result<(), ApplyError> {
        if text.is_empty() {
            return Ok(());
        }
        if !self.selection().is_collapsed() {
            self.delete_selection()?;
        }
        let focus = self.selection().focus.clone();
        let tx = match self
            .take_pending_marks()
            .and_then(|marks| self.marked_insert(&focus, text, marks))
        {
            Some(tx) => tx,
            None => Transaction::new(vec![Op::InsertText {
                path: focus.path,
                offset: focus.offset,
                text: text.to_string(),
            }]),
        };
        self.apply(tx.source("insert_text"))
    }

    /// Inserts `text` as its own run carrying `marks`. `None` when the run at
    /// the caret already has those marks.
    fn marked_insert(&self, focus: &Point, text: &str, marks: Marks) -> Option<Transaction> {
        let run = self.doc().run(&focus.path)?;
        if run.marks == marks {
            return None;
        }
        let (block_ix, run_ix) = (focus.block_index(), focus.run_index());
        let cursor = clamp_to_char_boundary(&run.text, focus.offset);
        let inserted = TextRun::new(text, marks.clone());

        let (ops, caret_run) = if run.text.is_empty() {
            (
                vec![
                    Op::SetRunMarks {
                        path: focus.path.clone(),
                        marks,
                    },
                    Op::InsertText {
                        path: focus.path.clone(),
                        offset: 0,
                        text: text.to_string(),
                    },
                ],
                run_ix,
            )
        } else if cursor == 0 {
            (
                vec![Op::InsertRun {
                    path: vec![block_ix, run_ix],
                    run: inserted,
                }],
                run_ix,
            )
        } else if cursor == run.text.len() {
            (
                vec![Op::InsertRun {
                    path: vec![block_ix, run_ix + 1],
                    run: inserted,
                }],
                run_ix + 1,
            )
        } else {
            (
                vec![
                    Op::SplitRun {
                        path: focus.path.clone(),
                        offset: cursor,
                        marks: run.marks.clone(),
                    },
                    Op::InsertRun {
                        path: vec![block_ix, run_ix + 1],
                        run: inserted,
                    },
                ],
                run_ix + 1,
            )
        };

        Some(Transaction::new(ops).selection_after(Selection::collapsed(Point::new(
            vec![block_ix, caret_run],
            text.len(),
        ))))
    }

    /// Pastes plain text, turning line breaks into block breaks.
    pub fn insert_plain_text(&mut self, text: &str) -> Result<(), ApplyError> {
        let normalized = text.replace("\r\n", "\n");
        for (ix, line) in normalized.split('\n').enumerate() {
            if ix > 0 {
                self.insert_break()?;
            }
            self.insert_text(line)?;
        }
        Ok(())
    }

    pub fn delete_backward(&mut self, unit: Unit) -> Result<(), ApplyError> {
        if !self.selection().is_collapsed() {
            return self.delete_selection();
        }

        let ops = self.delete_backward_in_block_ops(unit);
        if !ops.is_empty() {
            return self.apply(Transaction::new(ops).source("delete_backward"));
        }

        let index = self.active_block_index();
        if index == 0 {
            return Ok(());
        }
        self.apply(Transaction::new(vec![Op::MergeBlock { index }]).source("delete_backward:merge"))
    }

    /// Ops removing `unit` before the caret without leaving the caret's block.
    /// Empty when the caret sits at the block start.
    pub(crate) fn delete_backward_in_block_ops(&self, unit: Unit) -> Vec<Op> {
        let Some(block) = self.active_block() else {
            return Vec::new();
        };
        let block_ix = self.active_block_index();
        let end = self.caret_block_offset();
        let text = block.text();
        let start = match unit {
            Unit::Character => prev_char_boundary(&text, end),
            Unit::Word => prev_word_boundary(&text, end),
        };
        remove_block_range_ops(block_ix, block, start, end)
    }

    pub fn delete_selection(&mut self) -> Result<(), ApplyError> {
        let sel = self.selection().clone();
        if sel.is_collapsed() {
            return Ok(());
        }
        let (start, end) = ordered_selection_points(&sel);
        let (start_ix, end_ix) = (start.block_index(), end.block_index());
        let doc = self.doc();
        let (Some(start_block), Some(end_block)) = (doc.block(start_ix), doc.block(end_ix)) else {
            return Err(ApplyError::InvalidPath("Selection outside document".into()));
        };

        let start_global = point_global_offset(start_block, start.run_index(), start.offset);
        let end_global = point_global_offset(end_block, end.run_index(), end.offset);

        let mut ops = Vec::new();
        if start_ix == end_ix {
            ops.extend(remove_block_range_ops(
                start_ix,
                start_block,
                start_global,
                end_global,
            ));
        } else {
            ops.extend(remove_block_range_ops(
                start_ix,
                start_block,
                start_global,
                start_block.text_len(),
            ));
            ops.extend(remove_block_range_ops(end_ix, end_block, 0, end_global));
            for index in (start_ix + 1..end_ix).rev() {
                ops.push(Op::RemoveBlock { index });
            }
            ops.push(Op::MergeBlock {
                index: start_ix + 1,
            });
        }

        let caret = point_for_global_offset(start_ix, start_block, start_global);
        self.apply(
            Transaction::new(ops)
                .selection_after(Selection::collapsed(caret))
                .source("delete_selection"),
        )
    }

    /// Splits the caret's block in two; the new block keeps the same kind.
    pub fn insert_break(&mut self) -> Result<(), ApplyError> {
        if !self.selection().is_collapsed() {
            self.delete_selection()?;
        }
        let focus = self.selection().focus.clone();
        let (block_ix, run_ix) = (focus.block_index(), focus.run_index());
        let Some(block) = self.doc().block(block_ix) else {
            return Err(ApplyError::InvalidPath(format!("No block at {block_ix}")));
        };
        let Some(run) = block.children.get(run_ix) else {
            return Err(ApplyError::InvalidPath(format!(
                "No run at {block_ix}/{run_ix}"
            )));
        };

        let ops = vec![
            Op::SplitRun {
                path: vec![block_ix, run_ix],
                offset: focus.offset,
                marks: run.marks.clone(),
            },
            Op::SplitBlock {
                index: block_ix,
                run: run_ix + 1,
                kind: block.kind,
            },
        ];
        self.apply(
            Transaction::new(ops)
                .selection_after(Selection::collapsed(Point::new(vec![block_ix + 1, 0], 0)))
                .source("insert_break"),
        )
    }
}

fn prev_char_boundary(text: &str, offset: usize) -> usize {
    let offset = clamp_to_char_boundary(text, offset);
    text[..offset]
        .char_indices()
        .next_back()
        .map(|(ix, _)| ix)
        .unwrap_or(0)
}

fn prev_word_boundary(text: &str, offset: usize) -> usize {
    let offset = clamp_to_char_boundary(text, offset);
    let mut chars = text[..offset].char_indices().rev().peekable();
    let mut start = offset;
    while let Some((ix, _)) = chars.next_if(|(_, ch)| ch.is_whitespace()) {
        start = ix;
    }
    while let Some((ix, _)) = chars.next_if(|(_, ch)| !ch.is_whitespace()) {
        start = ix;
    }
    start
}

/// `RemoveText` ops covering `[start, end)` of the block's concatenated text.
fn remove_block_range_ops(block_ix: usize, block: &Block, start: usize, end: usize) -> Vec<Op> {
    let mut ops = Vec::new();
    if start >= end {
        return ops;
    }
    let mut cursor = 0usize;
    for (run_ix, run) in block.children.iter().enumerate() {
        let (run_start, run_end) = (cursor, cursor + run.text.len());
        cursor = run_end;
        if end <= run_start || start >= run_end {
            continue;
        }
        let local_start = start.saturating_sub(run_start);
        let local_end = end.min(run_end) - run_start;
        ops.push(Op::RemoveText {
            path: vec![block_ix, run_ix],
            range: local_start..local_end,
        });
    }
    ops
}

pub(crate) fn point_global_offset(block: &Block, run_ix: usize, offset: usize) -> usize {
    let mut global = 0usize;
    for (ix, run) in block.children.iter().enumerate() {
        if ix < run_ix {
            global += run.text.len();
            continue;
        }
        if ix == run_ix {
            global += clamp_to_char_boundary(&run.text, offset);
        }
        break;
    }
    global
}

pub(crate) fn point_for_global_offset(block_ix: usize, block: &Block, global_offset: usize) -> Point {
    let mut remaining = global_offset;
    for (run_ix, run) in block.children.iter().enumerate() {
        if remaining < run.text.len() {
            return Point::new(
                vec![block_ix, run_ix],
                clamp_to_char_boundary(&run.text, remaining),
            );
        }
        if remaining == run.text.len() {
            if block.children.get(run_ix + 1).is_some() && !run.text.is_empty() {
                return Point::new(vec![block_ix, run_ix + 1], 0);
            }
            return Point::new(vec![block_ix, run_ix], run.text.len());
        }
        remaining -= run.text.len();
    }

    // Fallback to end of last run.
    match block.children.len().checked_sub(1) {
        Some(last) => Point::new(vec![block_ix, last], block.children[last].text.len()),
        None => Point::new(vec![block_ix, 0], 0),
    }
}

pub(crate) fn ordered_selection_points(sel: &Selection) -> (Point, Point) {
    let key = |p: &Point| (p.block_index(), p.run_index(), p.offset);
    if key(&sel.focus) < key(&sel.anchor) {
        (sel.focus.clone(), sel.anchor.clone())
    } else {
        (sel.anchor.clone(), sel.focus.clone())
    }
}

pub(crate) fn total_text_len(runs: &[TextRun]) -> usize {
    runs.iter().map(|run| run.text.len()).sum()
}
