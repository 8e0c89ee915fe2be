use bramble_core::{CellId, CellKind, CellTree, Keyword, LanguageConfig, Point, relex};
use pretty_assertions::assert_eq;

/// Lex `text` into a hole inside a list and return `(kind, text)` for every resulting cell.
fn relex_in_list(text: &str) -> Vec<(CellKind, String)> {
    let lang = LanguageConfig::default();
    let mut tree = CellTree::new();
    let root = tree.alloc(CellKind::List);
    let list = tree.alloc(CellKind::List);
    let hole = tree.alloc(CellKind::Hole);
    tree.push_child(root, list).unwrap();
    tree.push_child(list, hole).unwrap();

    let outcome = relex(&mut tree, hole, text, &lang, Point::in_text(hole, 0)).unwrap();
    assert_eq!(tree[list].children(), outcome.cells.as_slice());
    outcome
        .cells
        .iter()
        .map(|&c| (tree[c].kind, tree[c].text.clone()))
        .collect()
}

/// Lex `text` into a lone hole and return the tree with the resulting cells.
fn relex_cells(text: &str) -> (CellTree, Vec<CellId>) {
    let lang = LanguageConfig::default();
    let mut tree = CellTree::new();
    let list = tree.alloc(CellKind::List);
    let hole = tree.alloc(CellKind::Hole);
    tree.push_child(list, hole).unwrap();
    let outcome = relex(&mut tree, hole, text, &lang, Point::in_text(hole, 0)).unwrap();
    (tree, outcome.cells)
}

#[test]
fn test_keyword_lexes_to_single_keyword_cell() {
    let lang = LanguageConfig::default();
    let mut tree = CellTree::new();
    let list = tree.alloc(CellKind::List);
    let hole = tree.alloc(CellKind::Hole);
    tree.push_child(list, hole).unwrap();

    let outcome = relex(&mut tree, hole, "when", &lang, Point::in_text(hole, 4)).unwrap();
    assert_eq!(outcome.cells, vec![hole]);
    let cell = &tree[hole];
    assert_eq!(cell.kind, CellKind::Keyword);
    assert_eq!(cell.keyword, Some(Keyword::When));
    assert_eq!(cell.keyword.map(Keyword::token_name), Some("KW_WHEN"));
    assert_eq!(cell.text, "when");
    assert_eq!(outcome.cursor, Point::in_text(hole, 4));
}

#[test]
fn test_identifier_run_stays_one_symbol() {
    assert_eq!(
        relex_in_list("whenfoo"),
        vec![(CellKind::Symbol, "whenfoo".to_string())]
    );
}

#[test]
fn test_placeholder_splits_off_symbol() {
    assert_eq!(
        relex_in_list("wh$x"),
        vec![
            (CellKind::Symbol, "wh".to_string()),
            (CellKind::Placeholder, "$x".to_string()),
        ]
    );
}

#[test]
fn test_empty_text_is_a_hole() {
    assert_eq!(relex_in_list(""), vec![(CellKind::Hole, String::new())]);
}

#[test]
fn test_mixed_tokens_split_into_siblings() {
    assert_eq!(
        relex_in_list("x+1.5"),
        vec![
            (CellKind::Symbol, "x".to_string()),
            (CellKind::Symbol, "+".to_string()),
            (CellKind::Float, "1.5".to_string()),
        ]
    );
}

#[test]
fn test_long_fraction_stays_finite() {
    let text = format!("1.{}", "1".repeat(400));
    let (tree, cells) = relex_cells(&text);
    assert_eq!(cells.len(), 1);
    let cell = &tree[cells[0]];
    assert_eq!(cell.kind, CellKind::Float);
    assert!(cell.float_value.is_finite());
    assert!((cell.float_value - 1.111_111_111).abs() < 1e-6);
}

#[test]
fn test_float_value_parses_exactly() {
    let (tree, cells) = relex_cells("0.1");
    assert_eq!(tree[cells[0]].float_value, 0.1);
}

#[test]
fn test_long_integer_saturates() {
    let (tree, cells) = relex_cells("99999999999999999999999");
    assert_eq!(cells.len(), 1);
    assert_eq!(tree[cells[0]].kind, CellKind::Int);
    assert_eq!(tree[cells[0]].int_value, u64::MAX);
}

#[test]
fn test_trailing_dot_is_int_then_symbol() {
    assert_eq!(
        relex_in_list("1."),
        vec![
            (CellKind::Int, "1".to_string()),
            (CellKind::Symbol, ".".to_string()),
        ]
    );
}
