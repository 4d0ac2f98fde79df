use mononote_core::{
    Decoration, Decorator, Document, Editor, KeyEvent, MarksPlugin, NotePlugin, PluginRegistry,
    Point, QuerySpec, Selection, TextRun,
};

struct ShoutPlugin;

impl NotePlugin for ShoutPlugin {
    fn id(&self) -> &'static str {
        "shout"
    }

    fn queries(&self) -> Vec<QuerySpec> {
        vec![QuerySpec::new("shout.text", |editor, _args| {
            Ok(serde_json::json!(editor.doc().plain_text().to_uppercase()))
        })]
    }

    fn decorators(&self) -> Vec<Box<dyn Decorator>> {
        vec![Box::new(BangDecorator)]
    }
}

struct BangDecorator;

impl Decorator for BangDecorator {
    fn id(&self) -> &'static str {
        "shout.bang"
    }

    fn decorate(&self, path: &[usize], run: &TextRun) -> Vec<Decoration> {
        let Some(ix) = run.text.find('!') else {
            return Vec::new();
        };
        vec![Decoration {
            anchor: Point::new(path.to_vec(), ix),
            focus: Point::new(path.to_vec(), ix + 1),
            result: "!!".to_string(),
        }]
    }
}

#[test]
fn notepad_registry_layers_features_over_normalization() {
    let registry = PluginRegistry::notepad();

    assert_eq!(
        registry.plugin_ids(),
        &["core.normalize", "marks", "heading", "math"]
    );
    assert!(registry.command("marks.toggle_bold").is_some());
    assert!(registry.command("block.toggle_kind").is_some());
    assert!(registry.query("block.kind").is_some());
    assert_eq!(registry.key_handlers().len(), 3);
    assert_eq!(registry.decorators().len(), 1);
}

#[test]
fn core_editor_has_no_formatting_rules() {
    let mut editor = Editor::with_core_plugins();

    editor.type_text("# x").unwrap();

    assert_eq!(editor.doc().plain_text(), "# x");
    assert!(editor.run_command("marks.toggle_bold", None).is_err());
    assert!(editor.decorations().is_empty());
}

#[test]
fn duplicate_plugins_are_rejected() {
    let mut registry = PluginRegistry::notepad();

    let err = registry.register_plugin(Box::new(MarksPlugin)).unwrap_err();

    assert!(err.contains("marks"));
    assert!(PluginRegistry::new([
        Box::new(ShoutPlugin) as Box<dyn NotePlugin>,
        Box::new(ShoutPlugin),
    ])
    .is_err());
}

#[test]
fn custom_plugins_contribute_queries_and_decorations() {
    let mut registry = PluginRegistry::notepad();
    registry.register_plugin(Box::new(ShoutPlugin)).unwrap();
    let mut editor = Editor::new(
        Document::empty(),
        Selection::collapsed(Point::new(vec![0, 0], 0)),
        registry,
    );

    editor.type_text("hey! 2*3=").unwrap();
    editor.key_down(&KeyEvent::with_ctrl('b')).unwrap();

    let shout: String = editor.run_query("shout.text", None).unwrap();
    assert_eq!(shout, "HEY! 2*3=");

    let results: Vec<String> = editor
        .decorations()
        .into_iter()
        .map(|decoration| decoration.result)
        .collect();
    assert_eq!(results, vec!["6".to_string(), "!!".to_string()]);
}
