//! Advisory checks over a parsed program.
//!
//! The evaluator tolerates every condition reported here; this pass only surfaces them so a
//! human or automated author can fix the script.

use std::collections::{BTreeMap, HashSet};

use crate::script::ast::{Program, SceneSpec};

/// How serious a [`Diagnostic`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Evaluation proceeds; output may not be what the author meant.
    Warning,
}

/// What a [`Diagnostic`] is about.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Two elements of one scene share an id; fades reach only the last one.
    DuplicateElementId {
        /// The repeated id.
        id: String,
    },
    /// A fade names an id no element of the scene declares.
    UnresolvedTarget {
        /// The dangling id.
        target: String,
        /// Index of the event in declaration order.
        event: usize,
    },
    /// An event is declared after one with a later time.
    TimelineOutOfOrder {
        /// Index of the event in declaration order.
        event: usize,
    },
    /// An event starts after the scene's declared duration.
    EventAfterSceneEnd {
        /// Index of the event in declaration order.
        event: usize,
    },
}

/// One finding of [`validate_program`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Diagnostic {
    /// Always [`Severity::Warning`] today.
    pub severity: Severity,
    /// Index of the scene in declaration order.
    pub scene: usize,
    /// Title of that scene.
    pub scene_title: String,
    /// Structured finding.
    #[serde(flatten)]
    pub kind: DiagnosticKind,
    /// Human-readable summary.
    pub message: String,
}

/// Collect warnings for every scene of `program`, scene by scene in declaration order.
#[tracing::instrument(skip(program), fields(scenes = program.scenes.len()))]
pub fn validate_program(program: &Program) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (index, scene) in program.scenes.iter().enumerate() {
        validate_scene(index, scene, &mut out);
    }
    tracing::debug!(count = out.len(), "validated program");
    out
}

fn validate_scene(index: usize, scene: &SceneSpec, out: &mut Vec<Diagnostic>) {
    let mut push = |kind: DiagnosticKind, message: String| {
        out.push(Diagnostic {
            severity: Severity::Warning,
            scene: index,
            scene_title: scene.title.clone(),
            kind,
            message,
        });
    };

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for v in &scene.visuals {
        *counts.entry(v.id.as_str()).or_default() += 1;
    }
    for (id, n) in counts.iter().filter(|(_, n)| **n > 1) {
        push(
            DiagnosticKind::DuplicateElementId { id: (*id).to_owned() },
            format!("element id \"{id}\" is declared {n} times; fades affect only the last one"),
        );
    }

    let declared: HashSet<&str> = scene.visuals.iter().map(|v| v.id.as_str()).collect();
    let mut latest = f64::NEG_INFINITY;
    for (event_idx, event) in scene.timeline.iter().enumerate() {
        if event.time < latest {
            push(
                DiagnosticKind::TimelineOutOfOrder { event: event_idx },
                format!(
                    "event at {}s is declared after an event at {latest}s; events apply in declaration order",
                    event.time
                ),
            );
        }
        latest = latest.max(event.time);

        if event.time > scene.duration {
            push(
                DiagnosticKind::EventAfterSceneEnd { event: event_idx },
                format!(
                    "event at {}s starts after the scene's declared duration of {}s",
                    event.time, scene.duration
                ),
            );
        }

        for command in &event.commands {
            let target = command.target();
            if !declared.contains(target) {
                push(
                    DiagnosticKind::UnresolvedTarget {
                        target: target.to_owned(),
                        event: event_idx,
                    },
                    format!("fade target \"{target}\" does not match any element in this scene"),
                );
            }
        }
    }
}
