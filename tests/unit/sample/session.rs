use super::*;
use crate::sample::sink::InMemorySink;

const SCRIPT: &str = r#"
video { dimensions: (320, 180) }

scene "first" {
  duration: 1s
  narration: "One."
  visuals: { circle(id: "c", at: (0, 0), radius: 8) }
  timeline: { at 0.5s { fade("c", out, duration: 0.25s) } }
}

scene "second" {
  duration: 0.5s
  visuals: { text(id: "t", at: (10, 10), content: "Two") }
}
"#;

fn program() -> Program {
    crate::parse(SCRIPT).unwrap()
}

fn opts(fps: u32) -> SampleOpts {
    SampleOpts {
        fps: Fps::new(fps, 1).unwrap(),
        ..SampleOpts::default()
    }
}

#[test]
fn samples_scenes_in_order_with_configs() {
    let p = program();
    let session = SampleSession::new(&p, opts(4)).unwrap();
    let mut sink = InMemorySink::new();
    let stats = session.sample_all(&mut sink).unwrap();

    let scenes = sink.scenes();
    assert_eq!(scenes.len(), 2);
    assert_eq!(scenes[0].0.title, "first");
    assert_eq!(scenes[0].0.frame_count, 4);
    assert_eq!(scenes[0].0.narration.as_deref(), Some("One."));
    assert_eq!(scenes[1].0.scene, 1);
    assert_eq!(scenes[1].0.frame_count, 2);
    assert_eq!(stats.frames_total, 6);

    let frames: Vec<u64> = scenes[0].1.iter().map(|f| f.frame.0).collect();
    assert_eq!(frames, vec![0, 1, 2, 3]);
    let opacities: Vec<f64> = scenes[0]
        .1
        .iter()
        .map(|f| f.snapshot.elements[0].opacity)
        .collect();
    assert_eq!(opacities, vec![1.0, 1.0, 1.0, 0.0]);
}

#[test]
fn static_frames_are_flagged() {
    let p = program();
    let session = SampleSession::new(&p, opts(4)).unwrap();
    let mut sink = InMemorySink::new();
    let stats = session.sample_scene(0, &mut sink).unwrap();

    let repeats: Vec<bool> = sink.frames().map(|f| f.repeats_previous).collect();
    assert_eq!(repeats, vec![false, true, true, false]);
    assert_eq!(stats.frames_static, 2);
}

#[test]
fn narration_extends_the_sampled_range() {
    let p = program();
    let mut o = opts(4);
    o.narration_secs.insert(1, 2.0);
    let session = SampleSession::new(&p, o).unwrap();
    assert_eq!(session.plan(0).unwrap().frame_count, 4);
    assert_eq!(session.plan(1).unwrap().frame_count, 8);
}

#[test]
fn parallel_matches_sequential() {
    let p = program();
    let mut seq = InMemorySink::new();
    SampleSession::new(&p, opts(60))
        .unwrap()
        .sample_all(&mut seq)
        .unwrap();

    let par_opts = SampleOpts {
        parallel: true,
        threads: Some(3),
        chunk_size: 7,
        ..opts(60)
    };
    let mut par = InMemorySink::new();
    SampleSession::new(&p, par_opts)
        .unwrap()
        .sample_all(&mut par)
        .unwrap();

    assert_eq!(seq.scenes(), par.scenes());
}

#[test]
fn rejects_bad_configuration() {
    let p = program();
    let zero_fps = SampleOpts {
        fps: Fps { num: 0, den: 1 },
        ..SampleOpts::default()
    };
    assert!(SampleSession::new(&p, zero_fps).is_err());

    let zero_threads = SampleOpts {
        parallel: true,
        threads: Some(0),
        ..SampleOpts::default()
    };
    assert!(SampleSession::new(&p, zero_threads).is_err());

    let session = SampleSession::new(&p, SampleOpts::default()).unwrap();
    let mut sink = InMemorySink::new();
    assert!(session.sample_scene(9, &mut sink).is_err());
}
