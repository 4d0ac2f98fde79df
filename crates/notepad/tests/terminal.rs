use mononote::{render_blocks, render_session_rows};
use mononote_core::{
    Block, BlockKind, Color, Document, Marks, SessionRow, TextRun, decorate_document,
    render_document,
};

fn sample() -> Document {
    Document {
        children: vec![
            Block::heading(BlockKind::HeadingOne, "Budget"),
            Block::new(
                BlockKind::Paragraph,
                vec![
                    TextRun::new(
                        "rent ",
                        Marks {
                            bold: true,
                            color: Some(Color::Pink),
                        },
                    ),
                    TextRun::plain("1200/4="),
                ],
            ),
        ],
    }
}

#[test]
fn plain_output_keeps_structure_and_results() {
    let doc = sample();
    let blocks = render_document(&doc, &decorate_document(&doc));

    assert_eq!(render_blocks(&blocks, false), "# Budget\nrent 1200/4= 300\n");
}

#[test]
fn ansi_output_styles_marks_and_dims_results() {
    let doc = sample();
    let blocks = render_document(&doc, &decorate_document(&doc));

    let out = render_blocks(&blocks, true);

    assert!(out.starts_with("\x1b[1mBudget\x1b[0m\n"));
    assert!(out.contains("\x1b[1m\x1b[38;2;233;64;121mrent \x1b[0m"));
    assert!(out.contains("=\x1b[2m300\x1b[0m"));
    assert!(!out.contains('#'));
}

#[test]
fn session_table_aligns_columns() {
    let rows = vec![
        SessionRow {
            opened: "Nov 14, 2023 • 10:13 PM".into(),
            closed: "Active".into(),
            duration: "3 seconds".into(),
            status: "EDITED".into(),
        },
        SessionRow {
            opened: "Jan 1, 1970 • 12:00 AM".into(),
            closed: "12:01 AM".into(),
            duration: "1 minute".into(),
            status: "VIEWED".into(),
        },
    ];

    let table = render_session_rows(&rows);
    let lines: Vec<&str> = table.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("OPENED "));
    let status_column = lines[0].find("STATUS").unwrap();
    assert_eq!(&lines[1][lines[1].len() - "EDITED".len()..], "EDITED");
    assert_eq!(lines[1].chars().count(), lines[2].chars().count());
    assert_eq!(
        lines[0].chars().count(),
        status_column + "STATUS".len()
    );
}
