//! Pipeline scheduler (spec §4.9): runs the fixed step sequence over one
//! document, isolating failures so a broken step never reaches the writer.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::{error, info, instrument};

use crate::document::Document;
use crate::error::{OptimizeError, Result};
use crate::io;
use crate::options::Options;
use crate::steps::{draco, merge, prune, quantize, sanitize, simplify, texture, StepStats};

/// Checked at each step boundary only; a step already running is not
/// interrupted (spec §5: "in-step cancellation is best-effort only").
pub trait CancellationToken: Send + Sync {
    fn is_cancelled(&self) -> bool;
}

/// A token that never cancels, for callers that don't need one.
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// A simple flag-backed token usable across threads.
#[derive(Default)]
pub struct FlagCancellationToken(AtomicBool);

impl FlagCancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CancellationToken for FlagCancellationToken {
    fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStatus {
    Start,
    Done,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressEvent {
    pub step: &'static str,
    pub status: ProgressStatus,
    pub index: usize,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type ProgressSink<'a> = dyn FnMut(ProgressEvent) + 'a;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub step: &'static str,
    pub success: bool,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StepStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    pub success: bool,
    pub processing_time_ms: u64,
    pub original_size: usize,
    pub optimized_size: usize,
    pub compression_ratio: f64,
    pub steps: Vec<StepResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<&'static str>,
}

const STEP_NAMES: [&str; 8] = [
    "repair-input",
    "clean",
    "merge",
    "simplify",
    "quantize",
    "draco",
    "texture",
    "repair-output",
];

/// Runs the full pipeline with no cancellation support (spec §6 entry point).
pub fn execute(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &Options,
    progress: Option<&mut ProgressSink<'_>>,
) -> Result<PipelineResult> {
    execute_with_cancellation(input_path, output_path, options, progress, &NeverCancelled)
}

#[instrument(skip(input_path, output_path, options, progress, cancellation))]
pub fn execute_with_cancellation(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    options: &Options,
    mut progress: Option<&mut ProgressSink<'_>>,
    cancellation: &dyn CancellationToken,
) -> Result<PipelineResult> {
    let started = Instant::now();

    let mut doc = io::read(input_path.as_ref())?;
    let original_size = std::fs::metadata(input_path.as_ref())
        .map(|m| m.len() as usize)
        .unwrap_or(0);

    let enabled = enabled_steps(options);
    let total = enabled.len();
    let mut steps = Vec::with_capacity(total);

    for (index, step) in enabled.iter().enumerate() {
        if cancellation.is_cancelled() {
            return Err(OptimizeError::Cancelled);
        }

        emit(&mut progress, ProgressEvent {
            step: step.name,
            status: ProgressStatus::Start,
            index,
            total,
            duration_ms: None,
            error: None,
        });

        let start = Instant::now();
        match (step.run)(&mut doc, options) {
            Ok(stats) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                info!(step = step.name, duration_ms, "step completed");
                emit(&mut progress, ProgressEvent {
                    step: step.name,
                    status: ProgressStatus::Done,
                    index,
                    total,
                    duration_ms: Some(duration_ms),
                    error: None,
                });
                steps.push(StepResult {
                    step: step.name,
                    success: true,
                    duration_ms,
                    stats,
                    error: None,
                });
            }
            Err(err) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                error!(step = step.name, error = %err, "step failed");
                emit(&mut progress, ProgressEvent {
                    step: step.name,
                    status: ProgressStatus::Error,
                    index,
                    total,
                    duration_ms: Some(duration_ms),
                    error: Some(err.to_string()),
                });
                steps.push(StepResult {
                    step: step.name,
                    success: false,
                    duration_ms,
                    stats: None,
                    error: Some(err.to_string()),
                });
                return Ok(PipelineResult {
                    success: false,
                    processing_time_ms: started.elapsed().as_millis() as u64,
                    original_size,
                    optimized_size: 0,
                    compression_ratio: 1.0,
                    steps,
                    failed_step: Some(step.name),
                });
            }
        }
    }

    let write_result = io::write(&doc, output_path.as_ref());
    let optimized_size = match write_result {
        Ok(()) => std::fs::metadata(output_path.as_ref())
            .map(|m| m.len() as usize)
            .unwrap_or(0),
        Err(err) => {
            error!(error = %err, "write failed");
            return Ok(PipelineResult {
                success: false,
                processing_time_ms: started.elapsed().as_millis() as u64,
                original_size,
                optimized_size: 0,
                compression_ratio: 1.0,
                steps,
                failed_step: Some("write"),
            });
        }
    };

    let compression_ratio = if original_size == 0 {
        1.0
    } else {
        optimized_size as f64 / original_size as f64
    };

    Ok(PipelineResult {
        success: true,
        processing_time_ms: started.elapsed().as_millis() as u64,
        original_size,
        optimized_size,
        compression_ratio,
        steps,
        failed_step: None,
    })
}

struct EnabledStep {
    name: &'static str,
    run: fn(&mut Document, &Options) -> Result<Option<StepStats>>,
}

/// The two repair passes always run; every other step is gated by its own
/// `enabled` flag (spec §4.9).
fn enabled_steps(options: &Options) -> Vec<EnabledStep> {
    let mut steps = vec![EnabledStep {
        name: STEP_NAMES[0],
        run: |doc, _opts| sanitize::repair_input(doc).map(|s| Some(StepStats::Sanitize(s))),
    }];

    if options.clean.enabled {
        steps.push(EnabledStep {
            name: STEP_NAMES[1],
            run: |doc, opts| prune::run(doc, &opts.clean).map(|s| Some(StepStats::Prune(s))),
        });
    }
    if options.merge.enabled {
        steps.push(EnabledStep {
            name: STEP_NAMES[2],
            run: |doc, _opts| merge::run(doc).map(|s| Some(StepStats::Merge(s))),
        });
    }
    if options.simplify.enabled {
        steps.push(EnabledStep {
            name: STEP_NAMES[3],
            run: |doc, opts| simplify::run(doc, &opts.simplify).map(|s| Some(StepStats::Simplify(s))),
        });
    }
    if options.quantize.enabled {
        steps.push(EnabledStep {
            name: STEP_NAMES[4],
            run: |doc, opts| quantize::run(doc, &opts.quantize).map(|s| Some(StepStats::Quantize(s))),
        });
    }
    if options.draco.enabled {
        steps.push(EnabledStep {
            name: STEP_NAMES[5],
            run: |doc, opts| draco::run(doc, &opts.draco).map(|s| Some(StepStats::Draco(s))),
        });
    }
    if options.texture.enabled {
        steps.push(EnabledStep {
            name: STEP_NAMES[6],
            run: |doc, opts| texture::run(doc, &opts.texture).map(|s| Some(StepStats::Texture(s))),
        });
    }

    steps.push(EnabledStep {
        name: STEP_NAMES[7],
        run: |doc, _opts| sanitize::repair_output(doc).map(|s| Some(StepStats::Sanitize(s))),
    });

    steps
}

fn emit(progress: &mut Option<&mut ProgressSink<'_>>, event: ProgressEvent) {
    if let Some(sink) = progress.as_mut() {
        sink(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Accessor, AccessorType, Mesh, Primitive, Semantic};
    use std::collections::BTreeMap;

    fn write_minimal_glb(path: &std::path::Path) {
        let mut doc = Document::new();
        let positions = doc.add_accessor(Accessor::from_f32(
            AccessorType::Vec3,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        ));
        let mut attributes = BTreeMap::new();
        attributes.insert(Semantic::Position, positions);
        let mesh_id = doc.add_mesh(Mesh {
            name: None,
            primitives: vec![Primitive {
                attributes,
                indices: None,
                material: None,
                mode: None,
                draco: None,
            }],
        });
        let node_id = doc.add_node(crate::document::Node {
            mesh: Some(mesh_id),
            ..Default::default()
        });
        doc.scenes.push(crate::document::Scene {
            name: None,
            root_nodes: vec![node_id],
        });
        doc.default_scene = Some(crate::document::SceneId(0));
        io::write(&doc, path).unwrap();
    }

    #[test]
    fn disabled_steps_do_not_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.glb");
        let output = dir.path().join("out.glb");
        write_minimal_glb(&input);

        let result = execute(&input, &output, &Options::default(), None).unwrap();
        assert!(result.success);
        // Only the two always-on repair passes should have run.
        assert_eq!(result.steps.len(), 2);
        assert!(output.exists());
    }

    #[test]
    fn failing_step_stops_the_pipeline_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.glb");
        let output = dir.path().join("out.glb");
        write_minimal_glb(&input);

        let mut options = Options::default();
        options.simplify.enabled = true;
        options.simplify.target_ratio = Some(0.5);
        options.simplify.target_count = Some(10); // mutually exclusive -> InvalidOptions

        let result = execute(&input, &output, &options, None).unwrap();
        assert!(!result.success);
        assert_eq!(result.failed_step, Some("simplify"));
        assert!(!output.exists());
    }

    #[test]
    fn cancellation_before_a_step_boundary_raises_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.glb");
        let output = dir.path().join("out.glb");
        write_minimal_glb(&input);

        let token = FlagCancellationToken::new();
        token.cancel();
        let err = execute_with_cancellation(&input, &output, &Options::default(), None, &token)
            .unwrap_err();
        assert_eq!(err.kind(), "Cancelled");
    }
}
