use bramble_core::{Direction, InputEvent, Key, Modifiers, Rect, Workspace};

fn setup_tracing() {
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn type_text(ws: &mut Workspace, text: &str) {
    ws.handle_input(&InputEvent::Text(text.to_string()))
        .expect("typing failed");
}

fn press(ws: &mut Workspace, key: Key) {
    ws.handle_input(&InputEvent::Key {
        key,
        mods: Modifiers::empty(),
    })
    .expect("key failed");
}

fn main() {
    setup_tracing();

    let mut ws = Workspace::new();
    let pointer = ws.add_card(Rect::new(0.0, 0.0, 200.0, 120.0));
    let target = ws.add_card(Rect::new(260.0, 0.0, 200.0, 120.0));

    // (when (self points right at $q) (wish $q is labeled "neighbor"))
    ws.focus_card(pointer).expect("card exists");
    type_text(&mut ws, "(when (self points right at $q");
    press(&mut ws, Key::Right);
    press(&mut ws, Key::Right);
    type_text(&mut ws, "(wish $q is labeled \"neighbor");

    // (wish self is highlighted "blue")
    ws.focus_card(target).expect("card exists");
    type_text(&mut ws, "(wish self is highlighted \"blue");
    ws.unfocus();

    let report = ws.update_frame();
    println!(
        "frame {}: {} facts after {} passes",
        report.frame, report.fact_count, report.passes
    );
    for fact in ws.program().db().facts() {
        println!("  {}", fact.root);
    }

    let snapshot = ws.snapshot();
    for card in &snapshot.cards {
        println!(
            "{} label={:?} highlight={:?}",
            card.id, card.label, card.highlight
        );
        for dir in Direction::ALL {
            let whisker = card.whiskers[dir.index()];
            if whisker.shown {
                println!("  whisker {} bold={}", dir.name(), whisker.bold);
            }
        }
        for cell in &card.cells {
            println!(
                "  {:indent$}{:?} {:?} at ({}, {})",
                "",
                cell.kind,
                cell.text,
                cell.rect.x,
                cell.rect.y,
                indent = cell.depth * 2
            );
        }
    }
}
