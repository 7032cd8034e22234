//! Integration tests for the DiagramView API
//!
//! These tests drive a view through its public surface the way a front end
//! would: pointer and keyboard events in, scenes and callbacks out.

use std::{cell::RefCell, rc::Rc};

use tessera::{
    DiagramView, InputEvent, Key, Outcome,
    config::AppConfig,
    geometry::{Point, Size},
    model::{DiagramConnection, DiagramData, DiagramNode, LayoutType},
};

/// Point inside the "eq" rectangle of [`portfolio`] on a 400x300 canvas.
const ON_EQUITIES: Point = Point::new(50.0, 150.0);

fn portfolio() -> DiagramData {
    DiagramData::new(LayoutType::Treemap, "Portfolio").with_nodes(vec![
        DiagramNode::new("eq", "Equities").with_percentage(60.0),
        DiagramNode::new("fi", "Fixed income").with_percentage(40.0),
    ])
}

fn view(data: DiagramData) -> DiagramView {
    DiagramView::new(data, AppConfig::default(), Size::new(400.0, 300.0))
        .expect("default config is valid")
}

type Commits = Rc<RefCell<Vec<(String, String)>>>;

fn record_commits(view: &mut DiagramView) -> Commits {
    let commits: Commits = Rc::default();
    let sink = Rc::clone(&commits);
    view.set_on_label_change(move |node_id, label| {
        sink.borrow_mut()
            .push((node_id.to_string(), label.to_string()));
    });
    commits
}

fn click(view: &mut DiagramView, position: Point) -> Vec<Outcome> {
    let mut outcomes = view.handle_event(InputEvent::PointerDown(position)).unwrap();
    outcomes.extend(view.handle_event(InputEvent::PointerUp(position)).unwrap());
    outcomes
}

#[test]
fn test_click_starts_edit_with_current_label() {
    let mut view = view(portfolio());

    let outcomes = click(&mut view, ON_EQUITIES);

    assert!(outcomes.contains(&Outcome::EditStarted("eq".to_string())));
    assert_eq!(view.interaction().editing(), Some(("eq", "Equities")));
}

#[test]
fn test_cancel_leaves_data_unchanged() {
    let original = portfolio();
    let mut view = view(original.clone());
    let commits = record_commits(&mut view);

    click(&mut view, ON_EQUITIES);
    view.handle_event(InputEvent::Text(" (US)".to_string()))
        .unwrap();
    let outcomes = view.handle_event(InputEvent::Key(Key::Escape)).unwrap();

    assert_eq!(outcomes, vec![Outcome::EditCancelled("eq".to_string())]);
    assert!(view.interaction().editing().is_none());
    assert!(commits.borrow().is_empty());
    assert_eq!(view.data(), &original);
}

#[test]
fn test_commit_fires_callback_once() {
    let original = portfolio();
    let mut view = view(original.clone());
    let commits = record_commits(&mut view);

    click(&mut view, ON_EQUITIES);
    for _ in 0.."Equities".len() {
        view.handle_event(InputEvent::Key(Key::Backspace)).unwrap();
    }
    view.handle_event(InputEvent::Text("Stocks".to_string()))
        .unwrap();
    view.handle_event(InputEvent::Key(Key::Enter)).unwrap();
    // Nothing left to commit
    view.handle_event(InputEvent::Commit).unwrap();

    assert_eq!(
        commits.borrow().as_slice(),
        &[("eq".to_string(), "Stocks".to_string())]
    );
    assert_eq!(view.data(), &original);
}

#[test]
fn test_caller_applies_committed_label() {
    let mut view = view(portfolio());
    let commits = record_commits(&mut view);

    click(&mut view, ON_EQUITIES);
    view.handle_event(InputEvent::Text("!".to_string())).unwrap();
    view.handle_event(InputEvent::Commit).unwrap();

    let (node_id, label) = commits.borrow()[0].clone();
    let next = view
        .data()
        .with_node_label(&node_id, &label)
        .expect("node exists");
    view.replace_data(next);

    let scene = view.render_scene().unwrap();
    assert!(scene.texts().any(|text| text == "Equities!"));
}

#[test]
fn test_unresolvable_connection_matches_omitting_it() {
    let mut plain = view(portfolio());
    let mut dangling = view(
        portfolio().with_connections(vec![DiagramConnection::new("eq", "ghost").with_label("?")]),
    );

    assert_eq!(
        plain.render_scene().unwrap(),
        dangling.render_scene().unwrap()
    );
    assert_eq!(plain.render_svg().unwrap(), dangling.render_svg().unwrap());
}

#[test]
fn test_background_drag_pans_without_editing() {
    let mut view = view(portfolio());

    // The header band has no nodes
    view.handle_event(InputEvent::PointerDown(Point::new(200.0, 20.0)))
        .unwrap();
    let outcomes = view
        .handle_event(InputEvent::PointerMove(Point::new(230.0, 40.0)))
        .unwrap();
    view.handle_event(InputEvent::PointerUp(Point::new(230.0, 40.0)))
        .unwrap();

    assert!(outcomes.contains(&Outcome::ViewportChanged));
    assert_eq!(view.viewport().pan(), Point::new(30.0, 20.0));
    assert!(view.interaction().editing().is_none());
}

#[test]
fn test_wheel_zoom_stays_in_range() {
    let mut view = view(portfolio());

    for _ in 0..100 {
        view.handle_event(InputEvent::Wheel {
            position: ON_EQUITIES,
            delta_y: -1.0,
        })
        .unwrap();
    }
    assert_eq!(view.viewport().zoom(), 4.0);

    for _ in 0..100 {
        view.handle_event(InputEvent::Wheel {
            position: ON_EQUITIES,
            delta_y: 1.0,
        })
        .unwrap();
    }
    assert_eq!(view.viewport().zoom(), 0.25);
}

#[test]
fn test_export_writes_title_named_png() {
    let dir = tempfile::tempdir().unwrap();
    let mut view = view(portfolio());

    let image = view
        .export(tessera::ExportTier::Small, dir.path())
        .unwrap()
        .wait()
        .unwrap();

    assert_eq!(image.path(), dir.path().join("Portfolio.png"));
    assert_eq!(image.width(), 800);
    assert_eq!(view.viewport().zoom(), 1.0);
}
