use mononote_core::{
    Block, BlockKind, Document, Editor, KeyEvent, Point, Selection, TextRun, Unit,
};

fn editor_with_blocks(blocks: Vec<Block>, selection: Selection) -> Editor {
    let mut editor = Editor::from_document(Document { children: blocks });
    editor.set_selection(selection);
    editor
}

fn caret(block: usize, run: usize, offset: usize) -> Selection {
    Selection::collapsed(Point::new(vec![block, run], offset))
}

#[test]
fn enter_splits_block_and_keeps_its_kind() {
    let mut editor = editor_with_blocks(
        vec![Block::heading(BlockKind::HeadingOne, "hello")],
        caret(0, 0, 2),
    );

    editor.key_down(&KeyEvent::enter()).unwrap();

    assert_eq!(
        editor.doc().children,
        vec![
            Block::heading(BlockKind::HeadingOne, "he"),
            Block::heading(BlockKind::HeadingOne, "llo"),
        ]
    );
    assert_eq!(editor.selection().focus, Point::new(vec![1, 0], 0));

    assert!(editor.undo());
    assert_eq!(
        editor.doc().children,
        vec![Block::heading(BlockKind::HeadingOne, "hello")]
    );
}

#[test]
fn enter_at_block_end_opens_an_empty_block() {
    let mut editor = editor_with_blocks(vec![Block::paragraph("ab")], caret(0, 0, 2));

    editor.type_text("\ncd").unwrap();

    assert_eq!(
        editor.doc().children,
        vec![Block::paragraph("ab"), Block::paragraph("cd")]
    );
}

#[test]
fn enter_inside_bold_run_keeps_marks_on_both_sides() {
    let mut editor = editor_with_blocks(
        vec![Block::new(BlockKind::Paragraph, vec![TextRun::bold("abcd")])],
        caret(0, 0, 2),
    );

    editor.insert_break().unwrap();

    assert_eq!(editor.doc().children[0].children, vec![TextRun::bold("ab")]);
    assert_eq!(editor.doc().children[1].children, vec![TextRun::bold("cd")]);
}

#[test]
fn deleting_across_blocks_joins_the_ends() {
    let mut editor = editor_with_blocks(
        vec![
            Block::paragraph("hello"),
            Block::paragraph("big"),
            Block::paragraph("world"),
        ],
        Selection {
            anchor: Point::new(vec![2, 0], 3),
            focus: Point::new(vec![0, 0], 2),
        },
    );

    editor.key_down(&KeyEvent::backspace()).unwrap();

    assert_eq!(editor.doc().children, vec![Block::paragraph("held")]);
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 2));

    assert!(editor.undo());
    assert_eq!(editor.doc().plain_text(), "hello\nbig\nworld");
}

#[test]
fn typing_replaces_an_expanded_selection() {
    let mut editor = editor_with_blocks(
        vec![Block::paragraph("hello world")],
        Selection {
            anchor: Point::new(vec![0, 0], 6),
            focus: Point::new(vec![0, 0], 11),
        },
    );

    editor.type_text("there").unwrap();

    assert_eq!(editor.doc().plain_text(), "hello there");
    assert!(editor.selection().is_collapsed());
}

#[test]
fn word_delete_skips_trailing_whitespace_first() {
    let mut editor = editor_with_blocks(vec![Block::paragraph("hello world  ")], caret(0, 0, 13));

    editor.delete_backward(Unit::Word).unwrap();
    assert_eq!(editor.doc().plain_text(), "hello ");

    editor.delete_backward(Unit::Word).unwrap();
    assert_eq!(editor.doc().plain_text(), "");
}

#[test]
fn character_delete_respects_multibyte_text() {
    let mut editor = editor_with_blocks(vec![Block::paragraph("hé")], caret(0, 0, 3));

    editor.delete_backward(Unit::Character).unwrap();

    assert_eq!(editor.doc().plain_text(), "h");
    assert_eq!(editor.selection().focus.offset, 1);
}

#[test]
fn text_before_caret_spans_runs() {
    let editor = editor_with_blocks(
        vec![Block::new(
            BlockKind::Paragraph,
            vec![TextRun::plain("ab"), TextRun::bold("cd")],
        )],
        caret(0, 1, 1),
    );

    assert_eq!(editor.text_before_caret().as_deref(), Some("abc"));
    assert_eq!(editor.caret_block_offset(), 3);
}

#[test]
fn pasted_lines_become_blocks() {
    let mut editor = Editor::with_notepad_plugins();

    editor.insert_plain_text("one\r\ntwo\nthree").unwrap();

    assert_eq!(editor.doc().plain_text(), "one\ntwo\nthree");
    assert_eq!(editor.doc().children.len(), 3);
    assert_eq!(editor.selection().focus, Point::new(vec![2, 0], 5));
}

#[test]
fn empty_document_is_normalized_to_one_paragraph() {
    let editor = Editor::from_document(Document { children: vec![] });

    assert_eq!(editor.doc(), &Document::empty());
    assert_eq!(editor.selection().focus, Point::new(vec![0, 0], 0));
}

#[test]
fn move_to_end_lands_after_the_last_run() {
    let mut editor = editor_with_blocks(
        vec![
            Block::paragraph("first"),
            Block::new(
                BlockKind::Paragraph,
                vec![TextRun::plain("a"), TextRun::bold("bc")],
            ),
        ],
        caret(0, 0, 0),
    );

    editor.move_to_end();

    assert_eq!(editor.selection().focus, Point::new(vec![1, 1], 2));
    assert!(editor.selection().is_collapsed());
}
