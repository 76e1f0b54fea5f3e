//! End-to-end drawing through the engine: input phases, commits, undo.

use std::sync::{Arc, Mutex};

use vektor_stroke::config::{BlendMode, EngineConfig, StrokeStyle};
use vektor_stroke::{Committed, DrawingEngine, HistoryEvent, PointerPhase, Sample, ToolKind};

fn stroke(offset: f64, n: usize) -> Vec<Sample> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            Sample::new(offset + t * 4.0, 20.0 + (t * 0.4).sin() * 6.0, 0.3 + 0.05 * t, t * 12.0)
        })
        .collect()
}

fn draw(engine: &mut DrawingEngine, samples: &[Sample]) -> Option<Committed> {
    let (head, tail) = samples.split_at(samples.len() / 2);
    engine.handle_samples(PointerPhase::Start, &head[..1]);
    engine.handle_samples(PointerPhase::Move, &head[1..]);
    engine.pump();
    engine.handle_samples(PointerPhase::Move, tail);
    engine.pump();
    engine.handle_samples(PointerPhase::End, &[])
}

fn batch_vertices(engine: &DrawingEngine) -> usize {
    engine
        .scene()
        .layer(engine.active_layer())
        .map(|l| l.batch().iter().map(|b| b.vertex_count()).sum())
        .unwrap_or(0)
}

fn child_count(engine: &DrawingEngine) -> usize {
    engine
        .scene()
        .layer(engine.active_layer())
        .map(|l| l.children().len())
        .unwrap_or(0)
}

#[test]
fn test_pen_strokes_merge_and_undo() {
    let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();

    let first = draw(&mut engine, &stroke(0.0, 12)).unwrap();
    let after_first = batch_vertices(&engine);
    let second = draw(&mut engine, &stroke(100.0, 12)).unwrap();
    let after_second = batch_vertices(&engine);

    // Same material lands in the same batch
    let (Committed::Batch { key: a, .. }, Committed::Batch { key: b, .. }) = (&first, &second) else {
        panic!("pen strokes must be batched");
    };
    assert_eq!(a, b);
    assert!(after_second > after_first);

    assert!(engine.undo());
    assert_eq!(batch_vertices(&engine), after_first);
    assert!(engine.undo());
    assert_eq!(batch_vertices(&engine), 0);
    assert!(!engine.undo());

    assert!(engine.redo());
    assert!(engine.redo());
    assert_eq!(batch_vertices(&engine), after_second);
}

#[test]
fn test_materials_split_batches() {
    let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();
    draw(&mut engine, &stroke(0.0, 8)).unwrap();
    engine.set_style(StrokeStyle::new(0x3366ff, 0.5, BlendMode::Multiply));
    draw(&mut engine, &stroke(50.0, 8)).unwrap();

    let layer = engine.scene().layer(engine.active_layer()).unwrap();
    assert_eq!(layer.batch().len(), 2);
}

#[test]
fn test_mesh_tools_add_nodes() {
    let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();
    for kind in [ToolKind::VectorPen, ToolKind::Rope, ToolKind::ContourBrush] {
        engine.set_active_tool(kind);
        let committed = draw(&mut engine, &stroke(0.0, 16));
        assert!(
            matches!(committed, Some(Committed::Node { .. })),
            "{} should add a node",
            kind.as_str()
        );
    }
    assert_eq!(child_count(&engine), 3);

    engine.begin_group();
    assert!(engine.undo());
    engine.end_group("noop");
    assert_eq!(child_count(&engine), 2);

    let layer = engine.active_layer();
    let node = engine.scene().layer(layer).unwrap().children()[0];
    assert!(engine.remove_node(layer, node));
    assert_eq!(child_count(&engine), 1);
    assert!(engine.undo());
    assert_eq!(engine.scene().layer(layer).unwrap().children()[0], node);
}

#[test]
fn test_grouped_strokes_undo_together() {
    let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();
    engine.set_active_tool(ToolKind::RasterPen);

    engine.begin_group();
    draw(&mut engine, &stroke(0.0, 10)).unwrap();
    draw(&mut engine, &stroke(60.0, 10)).unwrap();
    engine.end_group("two strokes");
    assert_eq!(engine.history().undo_len(), 1);

    let merged = batch_vertices(&engine);
    assert!(engine.undo());
    assert_eq!(batch_vertices(&engine), 0);
    assert!(engine.redo());
    assert_eq!(batch_vertices(&engine), merged);
}

#[test]
fn test_history_limit_and_events() {
    let mut config = EngineConfig::default();
    config.history.limit = 3;
    let mut engine = DrawingEngine::init(config).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    engine.add_history_listener(move |e| sink.lock().unwrap().push(e));

    for i in 0..5 {
        draw(&mut engine, &stroke(i as f64 * 80.0, 6)).unwrap();
    }
    assert_eq!(engine.history().undo_len(), 3);

    let mut undone = 0;
    while engine.undo() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    // The two oldest strokes survive eviction
    assert!(batch_vertices(&engine) > 0);

    let events = events.lock().unwrap();
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, HistoryEvent::Evicted { .. }))
            .count(),
        2
    );
}

#[test]
fn test_cancel_and_degenerate_input_commit_nothing() {
    let mut engine = DrawingEngine::init(EngineConfig::default()).unwrap();

    engine.handle_samples(PointerPhase::Start, &stroke(0.0, 5));
    assert!(engine.preview().is_some());
    engine.handle_samples(PointerPhase::Cancel, &[]);
    assert!(engine.preview().is_none());
    assert!(engine.handle_samples(PointerPhase::End, &[]).is_none());

    engine.handle_samples(PointerPhase::Start, &[Sample::untimed(f64::NAN, 1.0, 0.5)]);
    assert!(engine.handle_samples(PointerPhase::End, &[Sample::untimed(3.0, 3.0, 0.5)]).is_none());
    assert!(!engine.can_undo());
}
