use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::core::{Block, BlockKind, Marks, Selection, TextRun};

/// `[block_ix]` for blocks, `[block_ix, run_ix]` for text runs.
pub type Path = Vec<usize>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        path: Path,
        range: Range<usize>,
    },
    InsertRun {
        path: Path,
        run: TextRun,
    },
    RemoveRun {
        path: Path,
    },
    /// Splits the run at `path` at `offset`; the right half becomes a new run
    /// at the next index carrying `marks`.
    SplitRun {
        path: Path,
        offset: usize,
        marks: Marks,
    },
    /// Appends the run at `path` onto the previous run and removes it.
    MergeRun {
        path: Path,
    },
    InsertBlock {
        index: usize,
        block: Block,
    },
    RemoveBlock {
        index: usize,
    },
    /// Moves runs `run..` of block `index` into a new block of `kind` at
    /// `index + 1`.
    SplitBlock {
        index: usize,
        run: usize,
        kind: BlockKind,
    },
    /// Appends the runs of block `index` onto block `index - 1` and removes it.
    MergeBlock {
        index: usize,
    },
    SetBlockKind {
        index: usize,
        kind: BlockKind,
    },
    SetRunMarks {
        path: Path,
        marks: Marks,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default)]
    pub ops: Vec<Op>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection_after: Option<Selection>,
    #[serde(default)]
    pub meta: TransactionMeta,
}

impl Transaction {
    pub fn new(ops: Vec<Op>) -> Self {
        Self {
            ops,
            selection_after: None,
            meta: TransactionMeta::default(),
        }
    }

    pub fn selection_after(mut self, selection_after: Selection) -> Self {
        self.selection_after = Some(selection_after);
        self
    }

    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
