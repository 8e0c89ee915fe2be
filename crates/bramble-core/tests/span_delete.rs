use bramble_core::{CellId, CellKind, CellSpan, Editor, InputEvent, Key, Modifiers, Point};
use pretty_assertions::assert_eq;

fn abcd(editor: &mut Editor) -> (CellId, [CellId; 4]) {
    let root = editor.new_root();
    let tree = editor.tree_mut();
    let cells = ["A", "B", "C", "D"].map(|t| tree.alloc_text(CellKind::Symbol, t));
    for cell in cells {
        tree.push_child(root, cell).unwrap();
    }
    (root, cells)
}

fn texts(editor: &Editor, parent: CellId) -> Vec<String> {
    editor.tree()[parent]
        .children()
        .iter()
        .map(|&c| editor.tree()[c].text.clone())
        .collect()
}

#[test]
fn test_span_between_after_a_and_before_d() {
    let mut editor = Editor::with_defaults();
    let (_, [a, b, c, d]) = abcd(&mut editor);
    let tree = editor.tree();

    let after_a = tree.point_after(a).unwrap();
    let before_d = tree.point_before(d).unwrap();
    let expected = CellSpan { start: b, end: c };
    assert_eq!(tree.span_from_points(after_a, before_d), Some(expected));
    assert_eq!(tree.span_from_points(before_d, after_a), Some(expected));
    assert_eq!(tree.span_cells(expected), vec![b, c]);
}

#[test]
fn test_delete_span_leaves_a_d_with_cursor_before_d() {
    let mut editor = Editor::with_defaults();
    let (root, [a, b, _, d]) = abcd(&mut editor);
    let after_a = editor.tree().point_after(a).unwrap();
    let before_d = editor.tree().point_before(d).unwrap();
    editor.set_selection(before_d, after_a);

    editor.delete().unwrap();
    assert_eq!(texts(&editor, root), vec!["A", "D"]);
    assert_eq!(editor.cursor(), Point::between(root, Some(d)));
    assert_eq!(editor.mark(), editor.cursor());
    assert!(editor.tree().get(b).is_none());
}

#[test]
fn test_span_reaches_into_nested_list() {
    let mut editor = Editor::with_defaults();
    let (root, [a, _, _, d]) = abcd(&mut editor);
    let tree = editor.tree_mut();
    let inner = tree.alloc(CellKind::List);
    let x = tree.alloc_text(CellKind::Symbol, "x");
    tree.push_child(inner, x).unwrap();
    tree.insert_after(a, inner).unwrap();

    // From inside the nested list to the gap before D: the list and everything up to D.
    let inside = Point::in_text(x, 1);
    let before_d = Point::between(root, Some(d));
    let span = editor.tree().span_from_points(inside, before_d).unwrap();
    assert_eq!(span.start, inner);
    assert_eq!(editor.tree().span_cells(span).len(), 3);
}

#[test]
fn test_backspace_twice_removes_the_selected_cell() {
    let mut editor = Editor::with_defaults();
    let (root, [_, _, c, d]) = abcd(&mut editor);
    editor.set_cursor(Point::between(root, Some(d)));

    let backspace = InputEvent::Key {
        key: Key::Backspace,
        mods: Modifiers::empty(),
    };
    editor.handle_input(&backspace).unwrap();
    assert_eq!(editor.cursor(), Point::in_text(c, 1));
    editor.handle_input(&backspace).unwrap();

    assert_eq!(texts(&editor, root), vec!["A", "B", "D"]);
    assert_eq!(editor.cursor(), Point::between(root, Some(d)));
}
