use bramble_core::{CellId, CellKind, CellTree, Point};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WORDS: &[&str] = &["a", "claim", "x1", "é", "e\u{301}", "日本", "$q", "👍🏽"];

fn random_children(tree: &mut CellTree, parent: CellId, rng: &mut StdRng, depth: usize) {
    for _ in 0..rng.gen_range(0..5) {
        let cell = match rng.gen_range(0..4) {
            0 => tree.alloc(CellKind::Hole),
            1 if depth < 3 => {
                let list = tree.alloc(CellKind::List);
                random_children(tree, list, rng, depth + 1);
                list
            }
            2 => tree.alloc_text(CellKind::String, WORDS[rng.gen_range(0..WORDS.len())]),
            _ => tree.alloc_text(CellKind::Symbol, WORDS[rng.gen_range(0..WORDS.len())]),
        };
        tree.push_child(parent, cell).unwrap();
    }
}

fn forward_walk(tree: &CellTree, root: CellId) -> Vec<Point> {
    let mut points = vec![Point::between(root, tree.first_child(root))];
    loop {
        let last = *points.last().unwrap();
        let next = tree.next_point(last);
        if next == last {
            return points;
        }
        points.push(next);
        assert!(points.len() < 10_000, "walk does not terminate");
    }
}

#[test]
fn test_boundaries_are_fixed_points() {
    let mut tree = CellTree::new();
    let root = tree.alloc(CellKind::List);
    let a = tree.alloc_text(CellKind::Symbol, "a");
    tree.push_child(root, a).unwrap();

    let first = Point::between(root, Some(a));
    let last = Point::between(root, None);
    assert_eq!(tree.prev_point(first), first);
    assert_eq!(tree.next_point(last), last);

    let empty = tree.alloc(CellKind::List);
    let only = Point::between(empty, None);
    assert_eq!(tree.prev_point(only), only);
    assert_eq!(tree.next_point(only), only);
}

#[test]
fn test_round_trip_on_both_sides_of_a_hole() {
    let mut tree = CellTree::new();
    let root = tree.alloc(CellKind::List);
    let a = tree.alloc_text(CellKind::Symbol, "a");
    let hole = tree.alloc(CellKind::Hole);
    let b = tree.alloc_text(CellKind::Symbol, "b");
    for cell in [a, hole, b] {
        tree.push_child(root, cell).unwrap();
    }

    // Left side: stepping into the hole and back.
    let before = Point::between(root, Some(hole));
    let inside = tree.next_point(before);
    assert_eq!(inside, Point::in_text(hole, 0));
    assert_eq!(tree.prev_point(inside), before);

    // Right side: a hole has no inner boundaries, so the next step leaves it.
    let after = tree.next_point(inside);
    assert_eq!(after, Point::between(root, Some(b)));
    assert_eq!(tree.prev_point(after), inside);
}

#[test]
fn test_round_trip_through_nested_lists() {
    let mut tree = CellTree::new();
    let root = tree.alloc(CellKind::List);
    let outer = tree.alloc(CellKind::List);
    let inner = tree.alloc(CellKind::List);
    let word = tree.alloc_text(CellKind::Symbol, "hi");
    tree.push_child(root, outer).unwrap();
    tree.push_child(outer, inner).unwrap();
    tree.push_child(inner, word).unwrap();

    let points = forward_walk(&tree, root);
    assert_eq!(
        points,
        vec![
            Point::between(root, Some(outer)),
            Point::between(outer, Some(inner)),
            Point::between(inner, Some(word)),
            Point::in_text(word, 0),
            Point::in_text(word, 1),
            Point::in_text(word, 2),
            Point::between(inner, None),
            Point::between(outer, None),
            Point::between(root, None),
        ]
    );
    for pair in points.windows(2) {
        assert_eq!(tree.prev_point(pair[1]), pair[0]);
    }
}

#[test]
fn test_random_trees_walk_back_the_same_way() {
    let mut rng = StdRng::seed_from_u64(0x6272_616d);
    for _ in 0..200 {
        let mut tree = CellTree::new();
        let root = tree.alloc(CellKind::List);
        random_children(&mut tree, root, &mut rng, 0);

        let forward = forward_walk(&tree, root);
        for pair in forward.windows(2) {
            assert_eq!(tree.prev_point(pair[1]), pair[0]);
            assert_eq!(tree.next_point(pair[0]), pair[1]);
        }

        let mut backward = vec![*forward.last().unwrap()];
        loop {
            let last = *backward.last().unwrap();
            let prev = tree.prev_point(last);
            if prev == last {
                break;
            }
            backward.push(prev);
        }
        backward.reverse();
        assert_eq!(backward, forward);
    }
}
