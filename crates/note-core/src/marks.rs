use std::sync::Arc;

use serde_json::Value;

use crate::core::{Color, Editor, Marks, Selection, TextRun, clamp_to_char_boundary};
use crate::keys::{Key, KeyEvent, KeyOutcome};
use crate::ops::{Op, Transaction};
use crate::plugin::{CommandError, CommandSpec, KeyHandler, NotePlugin, QueryError, QuerySpec};
use crate::transforms::{
    ordered_selection_points, point_for_global_offset, point_global_offset, total_text_len,
};

pub struct MarksPlugin;

impl NotePlugin for MarksPlugin {
    fn id(&self) -> &'static str {
        "marks"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![
            CommandSpec::new("marks.toggle_bold", "Toggle bold", |editor, _args| {
                if editor.selection().is_collapsed() {
                    return set_caret_marks(editor, |mut marks| {
                        marks.bold = !marks.bold;
                        marks
                    });
                }
                toggle_bold(editor)
                    .map_err(CommandError::new)
                    .and_then(|tx| {
                        editor
                            .apply(tx)
                            .map_err(|e| CommandError::new(format!("Failed to toggle bold: {e:?}")))
                    })
            })
            .description("Toggle bold on the current selection or caret."),
            CommandSpec::new("marks.set_color", "Set text color", |editor, args| {
                let raw = args
                    .as_ref()
                    .and_then(|v| v.get("color"))
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| CommandError::new("Missing args.color"))?;
                let color = Color::from_hex(raw)
                    .ok_or_else(|| CommandError::new(format!("Color not in palette: {raw}")))?;
                if editor.selection().is_collapsed() {
                    return set_caret_marks(editor, |mut marks| {
                        marks.color = Some(color);
                        marks
                    });
                }
                set_color(editor, Some(color))
                    .map_err(CommandError::new)
                    .and_then(|tx| {
                        editor
                            .apply(tx)
                            .map_err(|e| CommandError::new(format!("Failed to set color: {e:?}")))
                    })
            })
            .description("Set a palette color on the current selection or caret.")
            .args_example(serde_json::json!({ "color": "#E94079" })),
            CommandSpec::new("marks.unset_color", "Unset text color", |editor, _args| {
                if editor.selection().is_collapsed() {
                    return set_caret_marks(editor, |mut marks| {
                        marks.color = None;
                        marks
                    });
                }
                set_color(editor, None)
                    .map_err(CommandError::new)
                    .and_then(|tx| {
                        editor.apply(tx).map_err(|e| {
                            CommandError::new(format!("Failed to unset color: {e:?}"))
                        })
                    })
            })
            .description("Remove the color mark from the current selection or caret."),
        ]
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![
            QuerySpec::new("marks.get_active", |editor, _args| {
                serde_json::to_value(active_marks(editor))
                    .map_err(|err| QueryError::new(format!("Failed to encode marks: {err}")))
            }),
            QuerySpec::new("marks.is_bold_active", |editor, _args| {
                Ok(Value::Bool(active_marks(editor).bold))
            }),
            QuerySpec::new("marks.active_color", |editor, _args| {
                Ok(active_marks(editor)
                    .color
                    .map(|color| Value::String(color.hex().to_string()))
                    .unwrap_or(Value::Null))
            }),
        ]
    }

    fn key_handlers(&self) -> Vec<Arc<dyn KeyHandler>> {
        vec![Arc::new(ToggleBoldShortcut)]
    }
}

/// Ctrl/Cmd+B. Always consumed so the host's own bold shortcut never fires.
struct ToggleBoldShortcut;

impl KeyHandler for ToggleBoldShortcut {
    fn id(&self) -> &'static str {
        "marks.toggle_bold_shortcut"
    }

    fn handle(&self, editor: &mut Editor, event: &KeyEvent) -> Result<KeyOutcome, CommandError> {
        if !event.modifiers.platform() || event.key != Key::Char('b') {
            return Ok(KeyOutcome::Ignored);
        }
        if let Err(err) = editor.run_command("marks.toggle_bold", None) {
            tracing::debug!("bold shortcut did nothing: {}", err.message());
        }
        Ok(KeyOutcome::Consumed)
    }
}

/// Marks the next typed text will get: the pending caret marks if any,
/// otherwise those of the run holding the focus.
pub fn active_marks(editor: &Editor) -> Marks {
    if let Some(marks) = editor.pending_marks() {
        return marks.clone();
    }
    editor
        .doc()
        .run(&editor.selection().focus.path)
        .map(|run| run.marks.clone())
        .unwrap_or_default()
}

/// Changes the marks for text typed at a collapsed caret. The document is
/// left alone until something is typed.
fn set_caret_marks(
    editor: &mut Editor,
    apply: impl FnOnce(Marks) -> Marks,
) -> Result<(), CommandError> {
    let Some(run) = editor.doc().run(&editor.selection().focus.path) else {
        return Err(CommandError::new("Selection is not in a text run"));
    };
    let run_marks = run.marks.clone();
    let marks = apply(active_marks(editor));
    editor.set_pending_marks((marks != run_marks).then_some(marks));
    Ok(())
}

fn toggle_bold(editor: &Editor) -> Result<Transaction, String> {
    let sel = editor.selection().clone();
    let target = !all_selected_runs_have(editor, &sel, |marks| marks.bold)?;
    apply_mark_range(editor, &sel, &|mut marks: Marks| {
        marks.bold = target;
        marks
    })
    .map(|(ops, selection_after)| {
        Transaction::new(ops)
            .selection_after(selection_after)
            .source("command:marks.toggle_bold")
    })
}

fn set_color(editor: &Editor, color: Option<Color>) -> Result<Transaction, String> {
    let sel = editor.selection().clone();
    let source = if color.is_some() {
        "command:marks.set_color"
    } else {
        "command:marks.unset_color"
    };
    let apply = move |mut marks: Marks| {
        marks.color = color;
        marks
    };
    let (ops, selection_after) = apply_mark_range(editor, &sel, &apply)?;
    Ok(Transaction::new(ops)
        .selection_after(selection_after)
        .source(source))
}

fn all_selected_runs_have(
    editor: &Editor,
    sel: &Selection,
    get: fn(&Marks) -> bool,
) -> Result<bool, String> {
    let (start, end) = ordered_selection_points(sel);
    let (start_ix, end_ix) = (start.block_index(), end.block_index());
    let doc = editor.doc();
    if end_ix >= doc.children.len() {
        return Err("Selection end is not in a block".into());
    }

    for block_ix in start_ix..=end_ix {
        let block = &doc.children[block_ix];
        let total_len = total_text_len(&block.children);
        if total_len == 0 {
            continue;
        }
        let start_global = if block_ix == start_ix {
            point_global_offset(block, start.run_index(), start.offset)
        } else {
            0
        };
        let end_global = if block_ix == end_ix {
            point_global_offset(block, end.run_index(), end.offset)
        } else {
            total_len
        };
        if start_global >= end_global {
            continue;
        }

        let mut cursor = 0usize;
        for run in &block.children {
            let (run_start, run_end) = (cursor, cursor + run.text.len());
            cursor = run_end;
            if end_global <= run_start || start_global >= run_end {
                continue;
            }
            if !get(&run.marks) {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn apply_mark_range(
    editor: &Editor,
    sel: &Selection,
    apply: &dyn Fn(Marks) -> Marks,
) -> Result<(Vec<Op>, Selection), String> {
    let (start, end) = ordered_selection_points(sel);
    let (start_ix, end_ix) = (start.block_index(), end.block_index());
    let doc = editor.doc();
    if end_ix >= doc.children.len() {
        return Err("Selection end is not in a block".into());
    }

    let mut ops: Vec<Op> = Vec::new();
    let mut new_anchor = sel.anchor.clone();
    let mut new_focus = sel.focus.clone();

    for block_ix in start_ix..=end_ix {
        let block = &doc.children[block_ix];
        let total_len = total_text_len(&block.children);
        if total_len == 0 {
            continue;
        }
        let start_global = if block_ix == start_ix {
            point_global_offset(block, start.run_index(), start.offset)
        } else {
            0
        };
        let end_global = if block_ix == end_ix {
            point_global_offset(block, end.run_index(), end.offset)
        } else {
            total_len
        };
        if start_global >= end_global {
            continue;
        }

        let new_runs = apply_marks_in_block(&block.children, start_global, end_global, apply);

        for run_ix in (0..block.children.len()).rev() {
            ops.push(Op::RemoveRun {
                path: vec![block_ix, run_ix],
            });
        }
        for (run_ix, run) in new_runs.iter().cloned().enumerate() {
            ops.push(Op::InsertRun {
                path: vec![block_ix, run_ix],
                run,
            });
        }

        let remapped = crate::core::Block::new(block.kind, new_runs);
        for point in [&mut new_anchor, &mut new_focus] {
            if point.block_index() == block_ix {
                let global = point_global_offset(block, point.run_index(), point.offset);
                *point = point_for_global_offset(block_ix, &remapped, global);
            }
        }
    }

    Ok((
        ops,
        Selection {
            anchor: new_anchor,
            focus: new_focus,
        },
    ))
}

fn apply_marks_in_block(
    runs: &[TextRun],
    start_global: usize,
    end_global: usize,
    apply: &dyn Fn(Marks) -> Marks,
) -> Vec<TextRun> {
    if start_global >= end_global {
        return runs.to_vec();
    }

    let mut out: Vec<TextRun> = Vec::new();
    let mut cursor = 0usize;

    for run in runs {
        let (run_start, run_end) = (cursor, cursor + run.text.len());
        cursor = run_end;

        if end_global <= run_start || start_global >= run_end {
            out.push(run.clone());
            continue;
        }

        let sel_start = clamp_to_char_boundary(&run.text, start_global.saturating_sub(run_start));
        let sel_end = clamp_to_char_boundary(&run.text, end_global.saturating_sub(run_start));

        if sel_start == 0 && sel_end == run.text.len() {
            out.push(TextRun::new(run.text.clone(), apply(run.marks.clone())));
            continue;
        }

        let prefix = &run.text[..sel_start];
        let middle = &run.text[sel_start..sel_end];
        let suffix = &run.text[sel_end..];

        if !prefix.is_empty() {
            out.push(TextRun::new(prefix, run.marks.clone()));
        }
        if !middle.is_empty() {
            out.push(TextRun::new(middle, apply(run.marks.clone())));
        }
        if !suffix.is_empty() {
            out.push(TextRun::new(suffix, run.marks.clone()));
        }
    }

    if out.is_empty() {
        out.push(TextRun::plain(""));
    }

    out
}
