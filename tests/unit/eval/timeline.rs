use super::*;
use crate::script::ast::{TimelineEvent, VideoSpec, VisualElement};

fn circle(id: &str, x: f64, y: f64) -> VisualElement {
    VisualElement {
        id: id.to_owned(),
        at: Point::new(x, y),
        kind: VisualKind::Circle { radius: 10.0 },
    }
}

fn fade(target: &str, direction: FadeDirection, duration: f64) -> AnimationCommand {
    AnimationCommand::Fade(Fade {
        target: target.to_owned(),
        direction,
        duration,
    })
}

fn event(time: f64, commands: Vec<AnimationCommand>) -> TimelineEvent {
    TimelineEvent { time, commands }
}

fn scene(visuals: Vec<VisualElement>, timeline: Vec<TimelineEvent>) -> SceneSpec {
    SceneSpec {
        title: "test".to_owned(),
        duration: 5.0,
        narration: None,
        visuals,
        timeline,
    }
}

fn opacity(s: &SceneSpec, id: &str, t: f64) -> f64 {
    evaluate_scene(s, t)
        .into_iter()
        .rev()
        .find(|e| e.id == id)
        .unwrap()
        .opacity
}

#[test]
fn baseline_is_fully_visible_at_declared_anchor() {
    let s = scene(vec![circle("a", 3.0, -4.0), circle("b", 0.0, 0.0)], vec![]);
    let states = evaluate_scene(&s, 2.0);
    assert_eq!(states.len(), 2);
    assert_eq!(states[0].id, "a");
    assert_eq!(states[0].position, Point::new(3.0, -4.0));
    assert_eq!(states[0].opacity, 1.0);
    assert_eq!(states[0].kind, VisualKind::Circle { radius: 10.0 });
    assert_eq!(states[1].id, "b");
}

#[test]
fn fade_in_interpolates_linearly_and_clamps() {
    let s = scene(
        vec![circle("a", 0.0, 0.0)],
        vec![event(1.0, vec![fade("a", FadeDirection::In, 2.0)])],
    );
    assert_eq!(opacity(&s, "a", 0.5), 1.0);
    assert_eq!(opacity(&s, "a", 1.0), 0.0);
    assert_eq!(opacity(&s, "a", 2.0), 0.5);
    assert_eq!(opacity(&s, "a", 3.0), 1.0);
    for t in [3.0, 3.5, 10.0, 1e6] {
        assert_eq!(opacity(&s, "a", t), 1.0);
    }
}

#[test]
fn fade_out_interpolates_linearly_and_clamps() {
    let s = scene(
        vec![circle("a", 0.0, 0.0)],
        vec![event(0.0, vec![fade("a", FadeDirection::Out, 4.0)])],
    );
    assert_eq!(opacity(&s, "a", 1.0), 0.75);
    for t in [4.0, 4.1, 100.0] {
        assert_eq!(opacity(&s, "a", t), 0.0);
    }
}

#[test]
fn instant_hide_is_permanent_and_targeted() {
    let s = scene(
        vec![circle("x", 0.0, 0.0), circle("y", 0.0, 0.0)],
        vec![event(0.0, vec![fade("x", FadeDirection::Out, 0.0)])],
    );
    for t in [0.0, 0.001, 1.0, 4.99, 60.0] {
        assert_eq!(opacity(&s, "x", t), 0.0);
        assert_eq!(opacity(&s, "y", t), 1.0);
    }
}

#[test]
fn instant_show_is_permanent() {
    let s = scene(
        vec![circle("x", 0.0, 0.0)],
        vec![
            event(0.0, vec![fade("x", FadeDirection::Out, 0.0)]),
            event(2.0, vec![fade("x", FadeDirection::In, 0.0)]),
        ],
    );
    assert_eq!(opacity(&s, "x", 1.999), 0.0);
    assert_eq!(opacity(&s, "x", 2.0), 1.0);
    assert_eq!(opacity(&s, "x", 9.0), 1.0);
}

#[test]
fn hide_then_fade_in_example() {
    let s = scene(
        vec![circle("c", 0.0, 0.0)],
        vec![
            event(0.0, vec![fade("c", FadeDirection::Out, 0.0)]),
            event(1.0, vec![fade("c", FadeDirection::In, 1.0)]),
        ],
    );
    assert_eq!(opacity(&s, "c", 0.0), 0.0);
    assert_eq!(opacity(&s, "c", 1.5), 0.5);
    assert_eq!(opacity(&s, "c", 3.0), 1.0);
}

#[test]
fn declaration_order_beats_chronological_order() {
    // The 2s event is declared first; the 1s event is applied after it.
    let s = scene(
        vec![circle("x", 0.0, 0.0)],
        vec![
            event(2.0, vec![fade("x", FadeDirection::Out, 0.5)]),
            event(1.0, vec![fade("x", FadeDirection::In, 1.0)]),
        ],
    );
    assert_eq!(opacity(&s, "x", 1.5), 0.5);
    // Both windows have ended; sorted by time the result would be 0.
    assert_eq!(opacity(&s, "x", 3.0), 1.0);
}

#[test]
fn later_command_in_same_event_overwrites() {
    let s = scene(
        vec![circle("x", 0.0, 0.0)],
        vec![event(
            0.0,
            vec![
                fade("x", FadeDirection::In, 2.0),
                fade("x", FadeDirection::Out, 2.0),
            ],
        )],
    );
    assert_eq!(opacity(&s, "x", 0.5), 0.75);
}

#[test]
fn unmatched_command_leaves_earlier_result() {
    let s = scene(
        vec![circle("x", 0.0, 0.0)],
        vec![
            event(0.0, vec![fade("x", FadeDirection::Out, 1.0)]),
            event(4.0, vec![fade("x", FadeDirection::In, 1.0)]),
        ],
    );
    assert_eq!(opacity(&s, "x", 2.0), 0.0);
    assert_eq!(opacity(&s, "x", 4.5), 0.5);
}

#[test]
fn unresolved_target_is_a_no_op() {
    let s = scene(
        vec![circle("a", 0.0, 0.0), circle("b", 0.0, 0.0)],
        vec![event(0.0, vec![fade("missing_id", FadeDirection::Out, 0.0)])],
    );
    for t in [0.0, 1.0, 10.0] {
        let states = evaluate_scene(&s, t);
        assert!(states.iter().all(|e| e.opacity == 1.0));
    }
}

#[test]
fn duplicate_ids_resolve_to_last_declared() {
    let s = scene(
        vec![circle("d", 1.0, 0.0), circle("d", 2.0, 0.0)],
        vec![event(0.0, vec![fade("d", FadeDirection::Out, 0.0)])],
    );
    let states = evaluate_scene(&s, 1.0);
    assert_eq!(states[0].opacity, 1.0);
    assert_eq!(states[1].opacity, 0.0);
}

#[test]
fn non_finite_time_leaves_baseline() {
    let s = scene(
        vec![circle("a", 0.0, 0.0)],
        vec![event(0.0, vec![fade("a", FadeDirection::Out, 1.0)])],
    );
    assert_eq!(opacity(&s, "a", f64::NAN), 1.0);
}

#[test]
fn evaluation_is_deterministic() {
    let s = scene(
        vec![circle("a", 0.0, 0.0), circle("b", 5.0, 5.0)],
        vec![
            event(0.3, vec![fade("a", FadeDirection::In, 0.7)]),
            event(0.1, vec![fade("b", FadeDirection::Out, 1.3)]),
        ],
    );
    for i in 0..50 {
        let t = f64::from(i) * 0.037;
        assert_eq!(evaluate_scene(&s, t), evaluate_scene(&s, t));
    }
}

#[test]
fn evaluate_program_rejects_unknown_scene() {
    let program = Program {
        video: VideoSpec {
            dimensions: Canvas {
                width: 64,
                height: 32,
            },
        },
        scenes: vec![scene(vec![circle("a", 0.0, 0.0)], vec![])],
    };
    let snap = evaluate_program(&program, 0, 0.25).unwrap();
    assert_eq!(snap.canvas.width, 64);
    assert_eq!(snap.time, 0.25);
    assert_eq!(snap.elements.len(), 1);

    let err = evaluate_program(&program, 3, 0.0).unwrap_err();
    assert!(err.to_string().contains("scene index 3 is out of range"));
}
