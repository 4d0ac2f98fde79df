use std::sync::Arc;

use serde_json::Value;

use crate::core::{BlockKind, Editor};
use crate::keys::{Key, KeyEvent, KeyOutcome};
use crate::ops::{Op, Transaction};
use crate::plugin::{CommandError, CommandSpec, KeyHandler, NotePlugin, QueryError, QuerySpec};
use crate::transforms::Unit;

pub struct HeadingPlugin;

impl NotePlugin for HeadingPlugin {
    fn id(&self) -> &'static str {
        "heading"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("block.set_kind", "Set block type", |editor, args| {
                let kind = kind_arg(args.as_ref()).map_err(CommandError::new)?;
                let tx = set_kind(editor, kind, "command:block.set_kind");
                editor
                    .apply(tx)
                    .map_err(|e| CommandError::new(format!("Failed to set block type: {e:?}")))
            })
            .description("Set the type of the block holding the caret.")
            .args_example(serde_json::json!({ "kind": "heading-one" })),
            CommandSpec::new("block.toggle_kind", "Toggle block type", |editor, args| {
                let kind = kind_arg(args.as_ref()).map_err(CommandError::new)?;
                let tx = toggle_kind(editor, kind);
                editor
                    .apply(tx)
                    .map_err(|e| CommandError::new(format!("Failed to toggle block type: {e:?}")))
            })
            .description("Switch the active block to the given type, or back to a paragraph if it already is one.")
            .args_example(serde_json::json!({ "kind": "heading-two" })),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![
            QuerySpec::new("block.kind", |editor, _args| {
                let kind = editor
                    .block_kind(editor.active_block_index())
                    .unwrap_or_default();
                Ok(Value::String(kind.as_str().to_string()))
            }),
            QuerySpec::new("block.is_active", |editor, args| {
                let kind = kind_arg(args.as_ref()).map_err(QueryError::new)?;
                Ok(Value::Bool(
                    editor.block_kind(editor.active_block_index()) == Some(kind),
                ))
            }),
        ]
    }

    fn key_handlers(&self) -> Vec<Arc<dyn KeyHandler>> {
        vec![
            Arc::new(HeadingShortcutOnSpace),
            Arc::new(DemoteHeadingOnBackspace),
        ]
    }
}

fn kind_arg(args: Option<&Value>) -> Result<BlockKind, String> {
    let raw = args
        .and_then(|v| v.get("kind"))
        .and_then(|v| v.as_str())
        .ok_or_else(|| "Missing args.kind".to_string())?;
    BlockKind::parse(raw).ok_or_else(|| format!("Unknown block type: {raw}"))
}

fn set_kind(editor: &Editor, kind: BlockKind, source: &'static str) -> Transaction {
    let index = editor.active_block_index();
    if editor.block_kind(index) == Some(kind) {
        return Transaction::new(Vec::new()).source(source);
    }
    Transaction::new(vec![Op::SetBlockKind { index, kind }]).source(source)
}

/// Toolbar semantics: activating the active kind falls back to a paragraph.
fn toggle_kind(editor: &Editor, kind: BlockKind) -> Transaction {
    let active = editor.block_kind(editor.active_block_index()) == Some(kind);
    let target = if active { BlockKind::Paragraph } else { kind };
    set_kind(editor, target, "command:block.toggle_kind")
}

/// `# ` and `## ` at the start of a block turn it into a heading.
struct HeadingShortcutOnSpace;

impl KeyHandler for HeadingShortcutOnSpace {
    fn id(&self) -> &'static str {
        "heading.shortcut_on_space"
    }

    fn handle(&self, editor: &mut Editor, event: &KeyEvent) -> Result<KeyOutcome, CommandError> {
        if event.key != Key::Space {
            return Ok(KeyOutcome::Ignored);
        }
        let Some(before) = editor.text_before_caret() else {
            return Ok(KeyOutcome::Ignored);
        };
        let (unit, kind) = match before.as_str() {
            "#" => (Unit::Character, BlockKind::HeadingOne),
            "##" => (Unit::Word, BlockKind::HeadingTwo),
            _ => return Ok(KeyOutcome::Ignored),
        };

        let index = editor.active_block_index();
        let mut ops = editor.delete_backward_in_block_ops(unit);
        ops.push(Op::SetBlockKind { index, kind });
        editor
            .apply(Transaction::new(ops).source("key:heading_shortcut"))
            .map_err(|e| CommandError::new(format!("Failed to apply heading shortcut: {e:?}")))?;
        Ok(KeyOutcome::Consumed)
    }
}

/// Backspace at the very start of a heading demotes it instead of merging.
struct DemoteHeadingOnBackspace;

impl KeyHandler for DemoteHeadingOnBackspace {
    fn id(&self) -> &'static str {
        "heading.demote_on_backspace"
    }

    fn handle(&self, editor: &mut Editor, event: &KeyEvent) -> Result<KeyOutcome, CommandError> {
        if event.key != Key::Backspace || !editor.is_caret_at_block_start() {
            return Ok(KeyOutcome::Ignored);
        }
        let index = editor.active_block_index();
        if !editor.block_kind(index).is_some_and(|kind| kind.is_heading()) {
            return Ok(KeyOutcome::Ignored);
        }
        editor
            .apply(
                Transaction::new(vec![Op::SetBlockKind {
                    index,
                    kind: BlockKind::Paragraph,
                }])
                .source("key:demote_heading"),
            )
            .map_err(|e| CommandError::new(format!("Failed to demote heading: {e:?}")))?;
        Ok(KeyOutcome::Consumed)
    }
}
