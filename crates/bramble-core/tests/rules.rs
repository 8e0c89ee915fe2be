use bramble_core::{
    CardId, CellId, CellKind, CellTree, Color, Direction, FactsDb, LanguageConfig, Point,
    ProgramConfig, Rect, Value, Workspace, find_binding, list, match_value_against_pattern, relex,
};
use pretty_assertions::assert_eq;

/// Append the forms of `src` to `parent`. Words are lexed like typed text; `"..."` words (no
/// spaces) become string cells.
fn write_forms(tree: &mut CellTree, parent: CellId, src: &str) {
    let lang = LanguageConfig::default();
    let mut stack = vec![parent];
    let mut word = String::new();

    let flush = |tree: &mut CellTree, stack: &[CellId], word: &mut String| {
        if word.is_empty() {
            return;
        }
        let top = *stack.last().unwrap();
        if let Some(text) = word.strip_prefix('"') {
            let cell = tree.alloc_text(CellKind::String, text.trim_end_matches('"'));
            tree.push_child(top, cell).unwrap();
        } else {
            let cell = tree.alloc(CellKind::Hole);
            tree.push_child(top, cell).unwrap();
            relex(tree, cell, word, &lang, Point::in_text(cell, 0)).unwrap();
        }
        word.clear();
    };

    for ch in src.chars() {
        match ch {
            '(' => {
                flush(tree, &stack, &mut word);
                let list = tree.alloc(CellKind::List);
                tree.push_child(*stack.last().unwrap(), list).unwrap();
                stack.push(list);
            }
            ')' => {
                flush(tree, &stack, &mut word);
                stack.pop();
            }
            ' ' | '\n' => flush(tree, &stack, &mut word),
            _ => word.push(ch),
        }
    }
    flush(tree, &stack, &mut word);
}

fn add_card(ws: &mut Workspace, rect: Rect, src: &str) -> CardId {
    let id = ws.add_card(rect);
    let root = ws.card(id).unwrap().root;
    write_forms(ws.editor_mut().tree_mut(), root, src);
    id
}

fn labeled(from: u64, to: u64, label: &str) -> Vec<Value> {
    vec![
        Value::Card(CardId(from)),
        Value::symbol("wishes"),
        Value::Card(CardId(to)),
        Value::symbol("is"),
        Value::symbol("labeled"),
        Value::string(label),
    ]
}

#[test]
fn test_duplicate_fact_is_absorbed() {
    let mut db = FactsDb::default();
    db.push_fact(labeled(1, 2, "hi"));
    db.push_fact(labeled(1, 2, "hi"));
    assert_eq!(db.fact_count(), 1);
}

#[test]
fn test_label_pattern_binds_p_q_s() {
    let fact = Value::List(labeled(1, 2, "hi"));
    let pattern = list!["$p", "wishes", "$q", "is", "labeled", "$s"];
    let mut bindings = Vec::new();
    assert!(match_value_against_pattern(&fact, &pattern, &mut bindings));
    assert_eq!(find_binding(&bindings, "p"), Some(&Value::Card(CardId(1))));
    assert_eq!(find_binding(&bindings, "q"), Some(&Value::Card(CardId(2))));
    assert_eq!(find_binding(&bindings, "s"), Some(&Value::string("hi")));
}

#[test]
fn test_fixed_point_ends_with_one_empty_pass() {
    let mut ws = Workspace::new();
    add_card(&mut ws, Rect::new(0.0, 0.0, 100.0, 100.0), "(claim a b)");
    let report = ws.update_frame();
    assert_eq!(report.fact_count, 1);
    assert_eq!(report.passes, 2);
    assert!(!report.truncated);

    let mut ws = Workspace::new();
    add_card(
        &mut ws,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        "(when (a $x) (claim c $x)) (claim a b)",
    );
    let report = ws.update_frame();
    assert_eq!(report.fact_count, 2);
    assert_eq!(report.passes, 3);
}

#[test]
fn test_rules_chain_across_cards() {
    let mut ws = Workspace::new();
    add_card(
        &mut ws,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        "(when (ready $x) (claim done $x))",
    );
    add_card(&mut ws, Rect::new(0.0, 300.0, 100.0, 100.0), "(claim ready 1)");
    let report = ws.update_frame();

    let facts: Vec<String> = ws
        .program()
        .db()
        .facts()
        .iter()
        .map(|f| f.root.to_string())
        .collect();
    assert_eq!(facts, vec!["(ready 1)", "(done 1)"]);
    assert_eq!(report.passes, 3);
}

#[test]
fn test_labels_and_highlights_reach_the_snapshot() {
    let mut ws = Workspace::new();
    let a = add_card(
        &mut ws,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        "(wish self is labeled \"alpha\") (wish self is highlighted \"green\")",
    );
    let b = add_card(
        &mut ws,
        Rect::new(0.0, 300.0, 100.0, 100.0),
        "(wish self is highlighted \"mauve\")",
    );
    ws.update_frame();
    let snapshot = ws.snapshot();

    let card_a = snapshot.card(a).unwrap();
    assert_eq!(card_a.label.as_deref(), Some("alpha"));
    assert_eq!(card_a.highlight, Some(Color::rgb(0.0, 1.0, 0.0)));
    let card_b = snapshot.card(b).unwrap();
    assert_eq!(card_b.label, None);
    assert_eq!(card_b.highlight, None);
}

#[test]
fn test_points_rule_labels_neighbor_and_bolds_whisker() {
    let mut ws = Workspace::new();
    let pointer = add_card(
        &mut ws,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        "(when (self points right at $q) (wish $q is labeled \"hit\"))",
    );
    let target = add_card(&mut ws, Rect::new(150.0, 0.0, 100.0, 100.0), "");
    ws.update_frame();
    let snapshot = ws.snapshot();

    assert_eq!(snapshot.card(target).unwrap().label.as_deref(), Some("hit"));
    let whiskers = snapshot.card(pointer).unwrap().whiskers;
    let right = whiskers[Direction::Right.index()];
    assert!(right.shown && right.bold);
    assert!(!whiskers[Direction::Left.index()].shown);
}

#[test]
fn test_stamps_only_count_for_the_frame_that_wrote_them() {
    let mut ws = Workspace::new();
    let pointer = add_card(
        &mut ws,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        "(when (self points right at $q) (wish $q is labeled \"hit\"))",
    );
    let target = add_card(&mut ws, Rect::new(150.0, 0.0, 100.0, 100.0), "");
    ws.update_frame();
    assert!(ws.snapshot().card(target).unwrap().label.is_some());

    // Move the target out of reach: the next frame no longer stamps it.
    ws.set_card_rect(target, Rect::new(1000.0, 0.0, 100.0, 100.0))
        .unwrap();
    let report = ws.update_frame();
    let snapshot = ws.snapshot();
    assert_eq!(snapshot.frame, Some(report.frame));
    assert_eq!(snapshot.card(target).unwrap().label, None);
    let right = snapshot.card(pointer).unwrap().whiskers[Direction::Right.index()];
    assert!(right.shown);
    assert!(!right.bold);
}

#[test]
fn test_pass_limit_truncates_runaway_rules() {
    let mut ws = Workspace::with_parts(
        bramble_core::Editor::with_defaults(),
        ProgramConfig {
            max_passes: Some(4),
            ..ProgramConfig::default()
        },
    );
    add_card(
        &mut ws,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        "(claim n 0) (when (n $x) (claim n ($x)))",
    );
    let report = ws.update_frame();
    assert!(report.truncated);
    assert_eq!(report.passes, 4);
}

#[test]
fn test_long_fraction_claim_reaches_fixed_point() {
    let mut ws = Workspace::new();
    let src = format!("(claim v 1.{})", "1".repeat(400));
    add_card(&mut ws, Rect::new(0.0, 0.0, 100.0, 100.0), &src);
    let report = ws.update_frame();
    assert_eq!(report.fact_count, 1);
    assert_eq!(report.passes, 2);

    let fact = &ws.program().db().facts()[0].root;
    match fact {
        Value::List(items) => match items.as_slice() {
            [Value::Symbol(name), Value::F64(v)] => {
                assert_eq!(name, "v");
                assert!(v.is_finite());
            }
            other => panic!("unexpected fact {other:?}"),
        },
        other => panic!("unexpected fact {other:?}"),
    }
}

#[test]
fn test_nested_when_body_uses_inner_match_only() {
    let mut ws = Workspace::new();
    add_card(
        &mut ws,
        Rect::new(0.0, 0.0, 100.0, 100.0),
        "(claim a 1) (claim b 2) (when (a $x) (when (b $y) (claim pair $x $y)))",
    );
    ws.update_frame();
    let facts: Vec<String> = ws
        .program()
        .db()
        .facts()
        .iter()
        .map(|f| f.root.to_string())
        .collect();
    assert_eq!(facts, vec!["(a 1)", "(b 2)", "(pair $x 2)"]);
}
