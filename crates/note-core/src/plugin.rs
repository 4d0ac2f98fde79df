use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::{Document, Editor, Point, Selection, TextRun, clamp_to_char_boundary};
use crate::heading::HeadingPlugin;
use crate::keys::{KeyEvent, KeyOutcome};
use crate::marks::MarksPlugin;
use crate::math::MathPlugin;
use crate::ops::Op;

#[derive(Debug, Clone)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone)]
pub struct QueryError {
    message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

type CommandHandler = dyn Fn(&mut Editor, Option<Value>) -> Result<(), CommandError> + Send + Sync;
type QueryHandler = dyn Fn(&Editor, Option<Value>) -> Result<Value, QueryError> + Send + Sync;

#[derive(Clone)]
pub struct CommandSpec {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub args_example: Option<Value>,
    pub handler: Arc<CommandHandler>,
}

impl CommandSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        handler: impl Fn(&mut Editor, Option<Value>) -> Result<(), CommandError>
        + Send
        + Sync
        + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            args_example: None,
            handler: Arc::new(handler),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn args_example(mut self, args_example: Value) -> Self {
        self.args_example = Some(args_example);
        self
    }
}

#[derive(Clone)]
pub struct QuerySpec {
    pub id: String,
    pub handler: Arc<QueryHandler>,
}

impl QuerySpec {
    pub fn new(
        id: impl Into<String>,
        handler: impl Fn(&Editor, Option<Value>) -> Result<Value, QueryError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            handler: Arc::new(handler),
        }
    }
}

/// An ephemeral annotation over `[anchor, focus)` of a single text run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoration {
    pub anchor: Point,
    pub focus: Point,
    pub result: String,
}

impl Decoration {
    pub fn covers_run(&self, path: &[usize]) -> bool {
        self.anchor.path == path
    }
}

pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op>;
}

/// Derives decorations from a single text run. Must be pure.
pub trait Decorator: Send + Sync {
    fn id(&self) -> &'static str;
    fn decorate(&self, path: &[usize], run: &TextRun) -> Vec<Decoration>;
}

/// Intercepts a key press before default handling.
pub trait KeyHandler: Send + Sync {
    fn id(&self) -> &'static str;
    fn handle(&self, editor: &mut Editor, event: &KeyEvent) -> Result<KeyOutcome, CommandError>;
}

pub trait NotePlugin: Send + Sync {
    fn id(&self) -> &'static str;
    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        Vec::new()
    }
    fn commands(&self) -> Vec<CommandSpec> {
        Vec::new()
    }
    fn queries(&self) -> Vec<QuerySpec> {
        Vec::new()
    }
    fn key_handlers(&self) -> Vec<Arc<dyn KeyHandler>> {
        Vec::new()
    }
    fn decorators(&self) -> Vec<Box<dyn Decorator>> {
        Vec::new()
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    plugin_ids: Vec<&'static str>,
    normalize_passes: Vec<Box<dyn NormalizePass>>,
    commands: HashMap<String, CommandSpec>,
    queries: HashMap<String, QuerySpec>,
    key_handlers: Vec<Arc<dyn KeyHandler>>,
    decorators: Vec<Box<dyn Decorator>>,
}

impl PluginRegistry {
    pub fn new(plugins: impl IntoIterator<Item = Box<dyn NotePlugin>>) -> Result<Self, String> {
        let mut registry = Self::default();
        for plugin in plugins {
            registry.register_plugin(plugin)?;
        }
        Ok(registry)
    }

    pub fn core() -> Self {
        let mut registry = Self::default();
        registry.register_builtin(Box::new(CoreNormalizePlugin));
        registry
    }

    pub fn notepad() -> Self {
        let mut registry = Self::core();
        registry.register_builtin(Box::new(MarksPlugin));
        registry.register_builtin(Box::new(HeadingPlugin));
        registry.register_builtin(Box::new(MathPlugin));
        registry
    }

    fn register_builtin(&mut self, plugin: Box<dyn NotePlugin>) {
        let id = plugin.id();
        if let Err(err) = self.register_plugin(plugin) {
            // Built-in ids are distinct; this only trips if two built-ins collide.
            tracing::error!("built-in plugin {id} failed to register: {err}");
        }
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn NotePlugin>) -> Result<(), String> {
        if self.plugin_ids.contains(&plugin.id()) {
            return Err(format!("Duplicate plugin id: {}", plugin.id()));
        }

        let commands = plugin.commands();
        for cmd in &commands {
            if self.commands.contains_key(&cmd.id) {
                return Err(format!("Duplicate command id: {}", cmd.id));
            }
        }
        let queries = plugin.queries();
        for query in &queries {
            if self.queries.contains_key(&query.id) {
                return Err(format!("Duplicate query id: {}", query.id));
            }
        }

        self.plugin_ids.push(plugin.id());
        self.normalize_passes.extend(plugin.normalize_passes());
        self.key_handlers.extend(plugin.key_handlers());
        self.decorators.extend(plugin.decorators());
        for cmd in commands {
            self.commands.insert(cmd.id.clone(), cmd);
        }
        for query in queries {
            self.queries.insert(query.id.clone(), query);
        }

        Ok(())
    }

    pub fn plugin_ids(&self) -> &[&'static str] {
        &self.plugin_ids
    }

    pub fn normalize_passes(&self) -> &[Box<dyn NormalizePass>] {
        &self.normalize_passes
    }

    pub fn commands(&self) -> &HashMap<String, CommandSpec> {
        &self.commands
    }

    pub fn command(&self, id: &str) -> Option<CommandSpec> {
        self.commands.get(id).cloned()
    }

    pub fn queries(&self) -> &HashMap<String, QuerySpec> {
        &self.queries
    }

    pub fn query(&self, id: &str) -> Option<QuerySpec> {
        self.queries.get(id).cloned()
    }

    pub fn key_handlers(&self) -> &[Arc<dyn KeyHandler>] {
        &self.key_handlers
    }

    pub fn decorators(&self) -> &[Box<dyn Decorator>] {
        &self.decorators
    }

    pub fn normalize(&self, doc: &Document) -> Vec<Op> {
        let mut ops: Vec<Op> = Vec::new();
        for pass in &self.normalize_passes {
            ops.extend(pass.run(doc, self));
        }
        ops
    }

    pub fn normalize_selection(&self, doc: &Document, selection: &Selection) -> Selection {
        Selection {
            anchor: normalize_point(doc, &selection.anchor),
            focus: normalize_point(doc, &selection.focus),
        }
    }
}

/// Clamps a point onto an existing run and a char boundary inside it.
fn normalize_point(doc: &Document, point: &Point) -> Point {
    if doc.children.is_empty() {
        return Point::new(vec![0, 0], 0);
    }
    let block_ix = point.block_index().min(doc.children.len() - 1);
    let block = &doc.children[block_ix];
    if block.children.is_empty() {
        return Point::new(vec![block_ix, 0], 0);
    }
    let run_ix = if point.path.len() < 2 {
        0
    } else {
        point.run_index().min(block.children.len() - 1)
    };
    let text = &block.children[run_ix].text;
    Point::new(
        vec![block_ix, run_ix],
        clamp_to_char_boundary(text, point.offset),
    )
}

struct CoreNormalizePlugin;

impl NotePlugin for CoreNormalizePlugin {
    fn id(&self) -> &'static str {
        "core.normalize"
    }

    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        vec![
            Box::new(EnsureNonEmptyDocument),
            Box::new(EnsureBlockHasTextRun),
            Box::new(MergeAdjacentTextRuns),
        ]
    }
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn id(&self) -> &'static str {
        "core.ensure_non_empty_document"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertBlock {
                index: 0,
                block: crate::core::Block::paragraph(""),
            }];
        }
        Vec::new()
    }
}

struct EnsureBlockHasTextRun;

impl NormalizePass for EnsureBlockHasTextRun {
    fn id(&self) -> &'static str {
        "core.ensure_block_has_text_run"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        doc.children
            .iter()
            .enumerate()
            .filter(|(_, block)| block.children.is_empty())
            .map(|(ix, _)| Op::InsertRun {
                path: vec![ix, 0],
                run: TextRun::plain(""),
            })
            .collect()
    }
}

struct MergeAdjacentTextRuns;

impl NormalizePass for MergeAdjacentTextRuns {
    fn id(&self) -> &'static str {
        "core.merge_adjacent_text_runs"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();
        for (block_ix, block) in doc.children.iter().enumerate() {
            // Right to left so earlier indices stay valid while merging.
            for run_ix in (1..block.children.len()).rev() {
                if block.children[run_ix].marks == block.children[run_ix - 1].marks {
                    ops.push(Op::MergeRun {
                        path: vec![block_ix, run_ix],
                    });
                }
            }
        }
        ops
    }
}
