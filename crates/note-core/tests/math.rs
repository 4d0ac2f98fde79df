use mononote_core::{
    Block, Document, Editor, Operator, Point, TextRun, decorate_document, decorate_run,
    format_result, match_expression, trailing_result,
};

fn result_of(text: &str) -> Option<String> {
    trailing_result(text).map(|(_, result)| result)
}

#[test]
fn matcher_takes_greedy_operands_anchored_at_end() {
    let Some(m) = match_expression("12+3=") else {
        panic!("expected a match");
    };
    assert_eq!((m.lhs, m.op, m.rhs), ("12", Operator::Add, "3"));
    assert_eq!((m.start, m.end), (0, 5));

    let Some(m) = match_expression("Total: 50% * 200 =") else {
        panic!("expected a match");
    };
    assert_eq!((m.lhs, m.op, m.rhs), ("50%", Operator::Mul, "200"));
    assert_eq!(m.start, 7);
    assert_eq!(m.end, "Total: 50% * 200 =".len());
}

#[test]
fn matcher_rejects_non_trailing_or_malformed_expressions() {
    for text in ["1+2", "1+2= ", "a+2=", "1+=", "1 2=", "+2=", "1+.5=", "1+2.=", "", "="] {
        assert!(match_expression(text).is_none(), "unexpected match for {text:?}");
    }
}

#[test]
fn matcher_stops_at_the_first_malformed_decimal() {
    let Some(m) = match_expression("1.2.3+4=") else {
        panic!("expected a match");
    };
    assert_eq!(m.lhs, "2.3");
    assert_eq!(m.start, 2);

    let Some(m) = match_expression("-5+3=") else {
        panic!("expected a match");
    };
    assert_eq!(m.lhs, "5");
    assert_eq!(result_of("-5+3="), Some("8".to_string()));
}

#[test]
fn evaluator_rounds_to_two_decimals_and_trims_zeros() {
    assert_eq!(result_of("2*3="), Some("6".to_string()));
    assert_eq!(result_of("10/4="), Some("2.5".to_string()));
    assert_eq!(result_of("1/3="), Some("0.33".to_string()));
    assert_eq!(result_of("2/3="), Some("0.67".to_string()));
    assert_eq!(result_of("0.125*1="), Some("0.13".to_string()));
    assert_eq!(result_of("0.1+0.2="), Some("0.3".to_string()));
    assert_eq!(result_of("5-10="), Some("-5".to_string()));
    assert_eq!(result_of("1 + 2 ="), Some("3".to_string()));
}

#[test]
fn rounding_follows_the_stored_value_and_lifts_exact_ties() {
    assert_eq!(format_result(0.015), Some("0.01".to_string()));
    assert_eq!(format_result(0.045), Some("0.04".to_string()));
    assert_eq!(format_result(2.675), Some("2.67".to_string()));
    assert_eq!(format_result(0.125), Some("0.13".to_string()));
    assert_eq!(format_result(0.375), Some("0.38".to_string()));
    assert_eq!(format_result(-0.125), Some("-0.13".to_string()));
    assert_eq!(result_of("1.5%*1="), Some("0.01".to_string()));
}

#[test]
fn percent_operands_are_fractions() {
    assert_eq!(result_of("50%*200="), Some("100".to_string()));
    assert_eq!(result_of("200*5%="), Some("10".to_string()));
    assert_eq!(result_of("10%+10%="), Some("0.2".to_string()));
}

#[test]
fn division_by_zero_has_no_result() {
    assert_eq!(result_of("10/0="), None);
    assert_eq!(result_of("0/0="), None);
    assert_eq!(result_of("5/0%="), None);
}

#[test]
fn formatting_never_prints_negative_zero() {
    assert_eq!(format_result(-0.001), Some("0".to_string()));
    assert_eq!(format_result(f64::INFINITY), None);
    assert_eq!(format_result(1234.5), Some("1234.5".to_string()));
}

#[test]
fn decoration_covers_only_the_equals_sign() {
    let run = TextRun::plain("sum 1+1=");
    let Some(decoration) = decorate_run(&[0, 2], &run) else {
        panic!("expected a decoration");
    };
    assert_eq!(decoration.anchor, Point::new(vec![0, 2], 7));
    assert_eq!(decoration.focus, Point::new(vec![0, 2], 8));
    assert_eq!(decoration.result, "2");

    assert!(decorate_run(&[0, 0], &TextRun::plain("1/0=")).is_none());
}

#[test]
fn document_decorations_follow_runs_not_blocks() {
    let doc = Document {
        children: vec![
            Block::paragraph("3*3="),
            Block::new(
                Default::default(),
                vec![TextRun::bold("4+"), TextRun::plain("4=")],
            ),
            Block::paragraph("plain"),
        ],
    };

    let decorations = decorate_document(&doc);

    assert_eq!(decorations.len(), 1);
    assert_eq!(decorations[0].anchor.path, vec![0, 0]);
    assert_eq!(decorations[0].result, "9");
}

#[test]
fn editor_decorations_track_edits_without_touching_the_document() {
    let mut editor = Editor::with_notepad_plugins();

    editor.type_text("2*4=").unwrap();
    let decorations = editor.decorations();
    assert_eq!(decorations.len(), 1);
    assert_eq!(decorations[0].result, "8");
    assert_eq!(editor.doc().plain_text(), "2*4=");

    editor.type_text("x").unwrap();
    assert!(editor.decorations().is_empty());
}
