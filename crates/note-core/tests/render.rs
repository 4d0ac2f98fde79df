use mononote_core::{
    Block, BlockKind, BlockStyle, Color, Document, Editor, Inline, LinkAction, Marks, Modifiers,
    TextRun, decorate_document, is_url, link_click_action, render_document,
};

#[test]
fn bold_is_wrapped_by_color() {
    let run = TextRun::new(
        "hi",
        Marks {
            bold: true,
            color: Some(Color::Pink),
        },
    );
    let doc = Document {
        children: vec![Block::new(BlockKind::Paragraph, vec![run])],
    };

    let rendered = render_document(&doc, &[]);

    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].style, BlockStyle::Body);
    assert_eq!(
        rendered[0].leaves[0].content,
        Inline::Colored {
            color: Color::Pink,
            child: Box::new(Inline::Bold(Box::new(Inline::Text("hi".to_string())))),
        }
    );
}

#[test]
fn block_kinds_map_to_styles() {
    let doc = Document {
        children: vec![
            Block::heading(BlockKind::HeadingOne, "a"),
            Block::heading(BlockKind::HeadingTwo, "b"),
            Block::paragraph("c"),
        ],
    };

    let styles: Vec<_> = render_document(&doc, &[])
        .into_iter()
        .map(|block| block.style)
        .collect();

    assert_eq!(
        styles,
        vec![BlockStyle::Title, BlockStyle::Subtitle, BlockStyle::Body]
    );
}

#[test]
fn math_result_is_a_phantom_after_the_equals_sign() {
    let doc = Document {
        children: vec![Block::paragraph("sum 1+2=")],
    };
    let decorations = decorate_document(&doc);

    let rendered = render_document(&doc, &decorations);
    let leaves = &rendered[0].leaves;

    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].range, 0..7);
    assert_eq!(leaves[0].content, Inline::Text("sum 1+2".to_string()));
    assert_eq!(leaves[1].range, 7..8);
    assert_eq!(leaves[1].content.text(), "=");
    assert_eq!(leaves[1].content.result(), Some("3"));

    let visible: String = leaves.iter().map(|leaf| leaf.content.text()).collect();
    assert_eq!(visible, doc.plain_text());
}

#[test]
fn url_runs_render_as_links() {
    let mut editor = Editor::with_notepad_plugins();
    editor.type_text("https://example.com").unwrap();

    let rendered = render_document(editor.doc(), &editor.decorations());
    let content = &rendered[0].leaves[0].content;

    assert_eq!(content.href(), Some("https://example.com"));
    assert_eq!(
        link_click_action("https://example.com", Modifiers::default()),
        LinkAction::OpenExternal("https://example.com".to_string())
    );
    assert_eq!(
        link_click_action("https://example.com", Modifiers::ctrl()),
        LinkAction::Default
    );
}

#[test]
fn url_detection() {
    for text in [
        "https://example.com",
        "http://localhost",
        "//localhost:3000/path",
        "ftp://files.example.org/a b".trim_end_matches(" b"),
    ] {
        assert!(is_url(text), "expected url: {text:?}");
    }
    for text in [
        "example.com",
        "https://",
        "https://a b.com",
        "ftp://x.y",
        "mailto:me@example.com",
        "see https://example.com",
        "https://.com",
    ] {
        assert!(!is_url(text), "unexpected url: {text:?}");
    }
}

#[test]
fn empty_run_still_renders_one_leaf() {
    let doc = Document::empty();

    let rendered = render_document(&doc, &[]);

    assert_eq!(rendered[0].leaves.len(), 1);
    assert_eq!(rendered[0].leaves[0].content, Inline::Text(String::new()));
}
