//! Full render cycle: reactive values reconciled into the engine's scene,
//! laid out, painted and diffed into the in-memory terminal.

mod common;

use common::{headless_engine, init_tracing};
use std::time::{Duration, Instant};
use termscene::reconciler::{Anchor, Props, Reconciler, SceneAdapter, Value};
use termscene::renderer::InputAction;
use termscene::scene::PropValue;

fn frame_row(engine: &termscene::RenderEngine<Vec<u8>>, y: u32) -> String {
    engine.previous_frame().expect("a frame was rendered").row_text(y)
}

#[test]
fn test_signal_update_repaints_only_changed_cells() {
    init_tracing();
    let mut engine = headless_engine(20, 3);
    let root = engine.root();
    let r = Reconciler::new(SceneAdapter::new(engine.scene()));

    let count = r.runtime().create_signal(0);
    let c = count.clone();
    r.insert(
        &root,
        Value::dynamic(move || Value::from(format!("count {}", c.get()))),
        Anchor::Exclusive,
    );

    let later = Instant::now() + Duration::from_secs(1);
    assert!(engine.tick(later).unwrap());
    assert!(frame_row(&engine, 0).starts_with("count 0"));
    assert_eq!(engine.stats().last_frame_cells, 60);

    count.set(7);
    assert!(engine.tick(later + Duration::from_secs(1)).unwrap());
    assert!(frame_row(&engine, 0).starts_with("count 7"));
    assert_eq!(engine.stats().last_frame_cells, 1);

    // Nothing changed since: no frame is due
    assert!(!engine.tick(later + Duration::from_secs(2)).unwrap());
}

#[test]
fn test_keypress_drives_signal() {
    let mut engine = headless_engine(10, 2);
    let root = engine.root();
    let r = Reconciler::new(SceneAdapter::new(engine.scene()));

    let count = r.runtime().create_signal(0);
    let c = count.clone();
    engine.on_keypress(move |key| {
        if key == "+" {
            c.update(|n| *n += 1);
        }
    });
    let c = count.clone();
    r.insert(&root, Value::dynamic(move || Value::from(c.get())), Anchor::Exclusive);

    assert_eq!(engine.handle_input(b"+"), InputAction::Forwarded);
    assert_eq!(engine.handle_input(b"+"), InputAction::Forwarded);
    engine.render_frame().unwrap();
    assert!(frame_row(&engine, 0).starts_with('2'));

    assert_eq!(engine.handle_input(b"\x03"), InputAction::Quit);
    assert!(engine.is_destroyed());
    // Updates after teardown hit dead handles and are ignored
    count.set(9);
    assert_eq!(engine.handle_input(b"+"), InputAction::Ignored);
}

#[test]
fn test_hidden_branch_is_released_on_next_frame() {
    let mut engine = headless_engine(20, 4);
    let root = engine.root();
    let r = Reconciler::new(SceneAdapter::new(engine.scene()));

    let panel = r.create_element("box").unwrap();
    r.spread(
        &panel,
        Props::new()
            .prop("height", 2)
            .prop("backgroundColor", "blue")
            .child(Value::from("inside")),
        false,
    );

    let open = r.runtime().create_signal(true);
    let o = open.clone();
    r.insert(
        &root,
        Value::dynamic(move || if o.get() { Value::node(panel) } else { Value::from("closed") }),
        Anchor::Exclusive,
    );
    engine.render_frame().unwrap();
    assert!(frame_row(&engine, 0).starts_with("inside"));

    open.set(false);
    engine.render_frame().unwrap();
    assert_eq!(engine.stats().last_released, 1);
    assert!(!engine.scene().borrow().contains(panel));
    assert!(frame_row(&engine, 0).starts_with("closed"));
}

#[test]
fn test_list_reorder_moves_rows() {
    let mut engine = headless_engine(8, 4);
    let root = engine.root();
    let r = Reconciler::new(SceneAdapter::new(engine.scene()));

    let rows: Vec<_> = ["one", "two", "three"]
        .into_iter()
        .map(|label| {
            let node = r.create_element("text").unwrap();
            r.set_prop(&node, "content", PropValue::from(label), None);
            node
        })
        .collect();
    let order = r.runtime().create_signal(rows.clone());
    let o = order.clone();
    r.insert(
        &root,
        Value::dynamic(move || Value::list(o.get().into_iter().map(Value::node))),
        Anchor::Exclusive,
    );
    engine.render_frame().unwrap();
    assert!(frame_row(&engine, 2).starts_with("three"));

    order.set(vec![rows[2], rows[1], rows[0]]);
    engine.render_frame().unwrap();
    assert!(frame_row(&engine, 0).starts_with("three"));
    assert!(frame_row(&engine, 2).starts_with("one"));
    assert_eq!(engine.stats().last_released, 0);
}

#[test]
fn test_resize_forces_full_repaint() {
    let mut engine = headless_engine(10, 2);
    let root = engine.root();
    let r = Reconciler::new(SceneAdapter::new(engine.scene()));
    r.insert(&root, Value::from("static"), Anchor::Exclusive);

    engine.render_frame().unwrap();
    engine.render_frame().unwrap();
    assert_eq!(engine.stats().last_frame_cells, 0);

    assert!(engine.handle_resize(12, 3));
    engine.render_frame().unwrap();
    assert_eq!(engine.stats().last_frame_cells, 36);
    assert!(frame_row(&engine, 0).starts_with("static"));
}
