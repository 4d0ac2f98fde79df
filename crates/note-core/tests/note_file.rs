use mononote_core::{
    Block, BlockKind, Color, Document, Editor, History, NoteFile, SessionRecord, TextRun,
};

#[test]
fn reads_files_written_by_other_clients() {
    let raw = r##"{
        "content": [
            {
                "type": "heading-one",
                "children": [{ "text": "Hi", "bold": true, "color": "#e94079" }]
            },
            { "type": "paragraph", "children": [{ "text": "body" }] }
        ],
        "history": { "undos": [], "redos": [] },
        "sessions": [
            { "openTimestamp": 1000, "closeTimestamp": 5000, "durationSeconds": 4, "modified": true }
        ],
        "meta": { "version": 1, "created": 5000 }
    }"##;

    let file = NoteFile::from_json_str(raw).unwrap();

    let heading = &file.content.children[0];
    assert_eq!(heading.kind, BlockKind::HeadingOne);
    assert!(heading.children[0].marks.bold);
    assert_eq!(heading.children[0].marks.color, Some(Color::Pink));
    assert_eq!(file.content.children[1], Block::paragraph("body"));
    assert_eq!(
        file.sessions,
        vec![SessionRecord {
            open_timestamp: 1000,
            close_timestamp: Some(5000),
            duration_seconds: 4.0,
            modified: true,
        }]
    );
    assert_eq!(file.meta.created, 5000);
    assert_eq!(file.history(), Some(History::default()));
}

#[test]
fn unknown_block_types_and_colors_degrade_gracefully() {
    let raw = r##"{
        "content": [
            { "type": "quote", "children": [{ "text": "x", "color": "#123456", "italic": true }] }
        ]
    }"##;

    let file = NoteFile::from_json_str(raw).unwrap();

    assert_eq!(file.content.children, vec![Block::paragraph("x")]);
    assert!(file.sessions.is_empty());
    assert_eq!(file.meta.version, 1);
}

#[test]
fn missing_or_null_content_means_initial_document() {
    let file = NoteFile::from_json_str(r#"{ "content": null }"#).unwrap();
    assert_eq!(file.content, Document::empty());

    let file = NoteFile::from_json_str("{}").unwrap();
    assert_eq!(file.content, Document::empty());
    assert_eq!(file.history(), Some(History::default()));
}

#[test]
fn foreign_history_is_kept_but_not_interpreted() {
    let file = NoteFile::from_json_str(r#"{ "history": { "stack": [1, 2] } }"#).unwrap();
    assert_eq!(file.history(), None);

    let text = file.to_json_pretty().unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["history"], serde_json::json!({ "stack": [1, 2] }));

    let file = NoteFile::from_json_str(r#"{ "history": { "undos": 5 } }"#).unwrap();
    assert_eq!(file.history(), None);
}

#[test]
fn written_files_use_the_shared_field_names() {
    let mut editor = Editor::with_notepad_plugins();
    editor.type_text("# Notes").unwrap();
    let mut session = SessionRecord::start(1_000);
    session.mark_modified();

    let file = NoteFile::new(
        editor.doc().clone(),
        &editor.history(),
        vec![session.closed_at(3_500)],
        3_500,
    );
    let text = file.to_json_pretty().unwrap();
    assert!(text.contains('\n'));

    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["content"][0]["type"], "heading-one");
    assert_eq!(value["content"][0]["children"][0], serde_json::json!({ "text": "Notes" }));
    assert_eq!(value["sessions"][0]["openTimestamp"], 1_000);
    assert_eq!(value["sessions"][0]["closeTimestamp"], 3_500);
    assert_eq!(value["sessions"][0]["durationSeconds"], 2.5);
    assert_eq!(value["sessions"][0]["modified"], true);
    assert_eq!(value["meta"], serde_json::json!({ "version": 1, "created": 3_500 }));
    assert!(value["history"]["undos"].is_array());

    let reread = NoteFile::from_json_str(&text).unwrap();
    assert_eq!(reread, file);
    assert_eq!(reread.history(), Some(editor.history()));
}

#[test]
fn colored_runs_serialize_with_palette_hex() {
    let run = TextRun::new(
        "c",
        mononote_core::Marks {
            bold: false,
            color: Some(Color::Violet),
        },
    );

    let value = serde_json::to_value(&run).unwrap();

    assert_eq!(value, serde_json::json!({ "text": "c", "color": "#8E73EF" }));
}

#[test]
fn block_kinds_use_kebab_case_and_default_to_paragraph() {
    assert_eq!(
        serde_json::to_string(&BlockKind::HeadingTwo).unwrap(),
        r#""heading-two""#
    );
    assert_eq!(
        serde_json::from_str::<BlockKind>(r#""heading-one""#).unwrap(),
        BlockKind::HeadingOne
    );
    assert_eq!(
        serde_json::from_str::<BlockKind>(r#""callout""#).unwrap(),
        BlockKind::Paragraph
    );
    assert_eq!(BlockKind::default(), BlockKind::Paragraph);
}
