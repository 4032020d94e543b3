//! Compilation orchestration.
//!
//! One `Compiler` drives the whole pipeline for a file, a batch, or a
//! project tree. Batch members are isolated from each other: a file that
//! fails to parse or transform becomes a `FileStatus::Failure` entry and the
//! rest of the batch proceeds.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{info, warn};

use crate::codegen::{CodeGenerator, GeneratedOutput, GenerationContext};
use crate::config::CompilerConfig;
use crate::convert::build_ast;
use crate::discovery::{mirrored_output_path, ResourceFileCopier, SourceFileFinder};
use crate::error::{CompileError, CompileResult};
use crate::events::{CompilationEvent, CompilationListener, EventDispatcher};
use crate::parse::{ScriptParser, SimpleParser};
use crate::transform::TransformPipeline;

// ═══════════════════════════════════════════════════════════════════════════════
// RESULTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Success,
    Failure,
    Skipped,
}

/// Outcome of one file. Status is assigned exactly once, at construction.
/// Failures carry the error message plus the underlying cause, when the
/// error wraps one (an io error behind a write failure, say).
#[derive(Debug, Clone)]
pub struct FileResult {
    pub source: PathBuf,
    pub output: Option<PathBuf>,
    pub status: FileStatus,
    pub duration: Duration,
    pub message: Option<String>,
    pub cause: Option<String>,
}

impl FileResult {
    pub fn success(source: PathBuf, output: PathBuf, duration: Duration) -> Self {
        Self {
            source,
            output: Some(output),
            status: FileStatus::Success,
            duration,
            message: None,
            cause: None,
        }
    }

    pub fn failure(source: PathBuf, error: &CompileError, duration: Duration) -> Self {
        Self {
            source,
            output: None,
            status: FileStatus::Failure,
            duration,
            message: Some(error.to_string()),
            cause: std::error::Error::source(error).map(ToString::to_string),
        }
    }

    pub fn skipped(source: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            source,
            output: None,
            status: FileStatus::Skipped,
            duration: Duration::ZERO,
            message: Some(reason.into()),
            cause: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == FileStatus::Success
    }
}

/// Aggregate over a batch, in submission order.
#[derive(Debug, Default)]
pub struct CompilationResult {
    results: Vec<FileResult>,
    pub duration: Duration,
    pub resources_copied: usize,
}

impl CompilationResult {
    pub fn new(results: Vec<FileResult>, duration: Duration) -> Self {
        Self {
            results,
            duration,
            resources_copied: 0,
        }
    }

    pub fn results(&self) -> &[FileResult] {
        &self.results
    }

    pub fn total_count(&self) -> usize {
        self.results.len()
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == FileStatus::Failure)
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == FileStatus::Skipped)
            .count()
    }

    pub fn is_all_success(&self) -> bool {
        self.failure_count() == 0
    }

    /// Files per second over the wall-clock batch duration.
    pub fn throughput(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            self.total_count() as f64 / secs
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Compiler {
    config: CompilerConfig,
    parser: Box<dyn ScriptParser>,
    events: EventDispatcher,
}

impl Compiler {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            parser: Box::new(SimpleParser::new()),
            events: EventDispatcher::new(),
        }
    }

    /// Swap in an external parse boundary (e.g. a TypeScript service
    /// adapter) in place of the built-in parser.
    pub fn with_parser(mut self, parser: Box<dyn ScriptParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn add_listener(&mut self, listener: Box<dyn CompilationListener>) {
        self.events.register(listener);
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Run the in-memory pipeline on one source text: parse, convert,
    /// transform, generate. No filesystem involvement.
    pub fn compile_source(&self, file_name: &str, source: &str) -> CompileResult<GeneratedOutput> {
        let tree = self.parser.parse(file_name, source)?;
        let mut file = build_ast(&tree)?;

        let pipeline = TransformPipeline::new(&self.config);
        let transform_ctx = pipeline.run(&mut file)?;

        let mut gen_ctx = GenerationContext::new(&self.config, file_name);
        gen_ctx.builder_methods = transform_ctx.builder_methods;
        CodeGenerator::new().generate(&file, gen_ctx)
    }

    fn compile_to_disk(&self, source: &Path, output: &Path) -> CompileResult<()> {
        let text = fs::read_to_string(source)?;
        let file_name = source
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| source.display().to_string());

        let generated = self.compile_source(&file_name, &text)?;

        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output, &generated.code).map_err(|source| CompileError::Write {
            path: output.to_path_buf(),
            source,
        })?;

        // The map sits next to the code file and is never referenced from
        // it, so the code text is identical with maps on or off.
        if let Some(map) = generated.source_map {
            let map_path = map_path_for(output);
            fs::write(&map_path, map.to_json()).map_err(|source| CompileError::Write {
                path: map_path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Compile one file, reporting the outcome instead of propagating it.
    pub fn compile_file(&self, source: &Path, output: &Path) -> FileResult {
        let started = Instant::now();
        self.events.fire(&CompilationEvent::FileStarted {
            source: source.to_path_buf(),
        });

        match self.compile_to_disk(source, output) {
            Ok(()) => {
                let duration = started.elapsed();
                self.events.fire(&CompilationEvent::FileSucceeded {
                    source: source.to_path_buf(),
                    output: Some(output.to_path_buf()),
                    duration,
                });
                FileResult::success(source.to_path_buf(), output.to_path_buf(), duration)
            }
            Err(error) => {
                self.events.fire(&CompilationEvent::FileFailed {
                    source: source.to_path_buf(),
                    message: error.to_string(),
                });
                FileResult::failure(source.to_path_buf(), &error, started.elapsed())
            }
        }
    }

    fn finish_batch(&self, results: Vec<FileResult>, started: Instant) -> CompilationResult {
        let duration = started.elapsed();
        let result = CompilationResult::new(results, duration);
        self.events.fire(&CompilationEvent::BatchCompleted {
            total: result.total_count(),
            succeeded: result.success_count(),
            failed: result.failure_count(),
            duration,
        });
        info!(
            total = result.total_count(),
            failed = result.failure_count(),
            ?duration,
            "batch finished"
        );
        result
    }

    /// Compile `(source, output)` pairs one after another, in input order.
    pub fn compile_batch(&self, jobs: &[(PathBuf, PathBuf)]) -> CompilationResult {
        let started = Instant::now();
        self.events
            .fire(&CompilationEvent::BatchStarted { total: jobs.len() });

        let results = jobs
            .iter()
            .map(|(source, output)| self.compile_file(source, output))
            .collect();
        self.finish_batch(results, started)
    }

    /// Compile the batch on a rayon pool sized by the configuration. Each
    /// worker runs a fully independent pipeline; results come back in
    /// submission order regardless of completion order.
    pub fn compile_parallel(&self, jobs: &[(PathBuf, PathBuf)]) -> CompilationResult {
        let threads = self.config.effective_threads();
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool,
            Err(error) => {
                warn!(%error, "thread pool unavailable; compiling sequentially");
                return self.compile_batch(jobs);
            }
        };

        let started = Instant::now();
        self.events
            .fire(&CompilationEvent::BatchStarted { total: jobs.len() });

        let results = pool.install(|| {
            jobs.par_iter()
                .map(|(source, output)| self.compile_file(source, output))
                .collect()
        });
        self.finish_batch(results, started)
    }

    /// Discover sources under `project_root`, compile them to mirrored
    /// paths under `build_root`, and optionally copy resources verbatim.
    pub fn compile_project(
        &self,
        project_root: &Path,
        build_root: &Path,
        copy_resources: bool,
    ) -> CompileResult<CompilationResult> {
        let sources = SourceFileFinder::new().find(project_root)?;
        let jobs = sources
            .iter()
            .map(|source| {
                mirrored_output_path(source, project_root, build_root)
                    .map(|output| (source.clone(), output))
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let mut result = if self.config.effective_threads() > 1 {
            self.compile_parallel(&jobs)
        } else {
            self.compile_batch(&jobs)
        };

        if copy_resources {
            result.resources_copied =
                ResourceFileCopier::new().copy_all(project_root, build_root)?;
        }
        Ok(result)
    }
}

/// `Index.js` → `Index.js.map`.
fn map_path_for(output: &Path) -> PathBuf {
    let mut os = output.as_os_str().to_owned();
    os.push(".map");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_source(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    const GOOD: &str = "@Component\nstruct App {\n  build() {\n    Text('hi')\n  }\n}\n";

    #[test]
    fn test_compile_file_writes_code_and_map() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "App.ets", GOOD);
        let output = dir.path().join("out/App.js");

        let compiler = Compiler::new(CompilerConfig::default());
        let result = compiler.compile_file(&source, &output);

        assert!(result.is_success());
        assert!(output.exists());
        assert!(dir.path().join("out/App.js.map").exists());
        let code = fs::read_to_string(&output).unwrap();
        assert!(code.contains("Text.create('hi');"));
        assert!(!code.contains("sourceMappingURL"));
    }

    #[test]
    fn test_map_file_absent_when_disabled() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "App.ets", GOOD);
        let output = dir.path().join("App.js");

        let config = CompilerConfig::default().with_source_map(false);
        let result = Compiler::new(config).compile_file(&source, &output);

        assert!(result.is_success());
        assert!(!dir.path().join("App.js.map").exists());
    }

    #[test]
    fn test_write_failure_carries_underlying_cause() {
        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "App.ets", GOOD);
        let output = dir.path().join("out.js");
        // A directory squatting on the output path makes the write fail.
        fs::create_dir_all(&output).unwrap();

        let result = Compiler::new(CompilerConfig::default()).compile_file(&source, &output);

        assert_eq!(result.status, FileStatus::Failure);
        let message = result.message.unwrap();
        assert!(message.contains("failed to write"));
        let cause = result.cause.expect("io error behind the write failure");
        assert!(!cause.is_empty());
        assert_ne!(cause, message);
    }

    #[test]
    fn test_batch_isolates_failures_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let good = write_source(dir.path(), "Good.ets", GOOD);
        let missing = dir.path().join("Missing.ets");
        let also_good = write_source(dir.path(), "Also.ets", GOOD);

        let jobs = vec![
            (good, dir.path().join("Good.js")),
            (missing.clone(), dir.path().join("Missing.js")),
            (also_good, dir.path().join("Also.js")),
        ];
        let result = Compiler::new(CompilerConfig::default()).compile_batch(&jobs);

        assert_eq!(result.total_count(), 3);
        assert_eq!(result.success_count(), 2);
        assert_eq!(result.failure_count(), 1);
        assert!(!result.is_all_success());
        assert_eq!(result.results()[1].source, missing);
        assert_eq!(result.results()[1].status, FileStatus::Failure);
        assert!(result.results()[1].message.is_some());
    }

    #[test]
    fn test_parallel_matches_sequential_outcomes() {
        let dir = TempDir::new().unwrap();
        let mut jobs = Vec::new();
        for i in 0..6 {
            let source = write_source(dir.path(), &format!("F{}.ets", i), GOOD);
            jobs.push((source, dir.path().join(format!("out/F{}.js", i))));
        }
        jobs.push((dir.path().join("Gone.ets"), dir.path().join("out/Gone.js")));

        let sequential = Compiler::new(CompilerConfig::default()).compile_batch(&jobs);
        let config = CompilerConfig::default().with_thread_count(3);
        let parallel = Compiler::new(config).compile_parallel(&jobs);

        assert_eq!(parallel.total_count(), sequential.total_count());
        assert_eq!(parallel.success_count(), sequential.success_count());
        assert_eq!(parallel.failure_count(), 1);
        // Submission order survives parallel execution.
        for (i, r) in parallel.results().iter().enumerate() {
            assert_eq!(r.source, jobs[i].0);
            assert_eq!(r.status, sequential.results()[i].status);
        }
    }

    #[test]
    fn test_project_mirrors_structure_and_copies_resources() {
        let project = TempDir::new().unwrap();
        let build = TempDir::new().unwrap();
        write_source(project.path(), "pages/Index.ets", GOOD);
        write_source(project.path(), "resources/app.json", "{}");

        let compiler = Compiler::new(CompilerConfig::default().with_thread_count(1));
        let result = compiler
            .compile_project(project.path(), build.path(), true)
            .unwrap();

        assert!(result.is_all_success());
        assert_eq!(result.total_count(), 1);
        assert_eq!(result.resources_copied, 1);
        assert!(build.path().join("pages/Index.js").exists());
        assert!(build.path().join("resources/app.json").exists());
    }

    #[test]
    fn test_events_fire_in_order() {
        use std::sync::{Arc, Mutex};

        let dir = TempDir::new().unwrap();
        let source = write_source(dir.path(), "App.ets", GOOD);
        let jobs = vec![(source, dir.path().join("App.js"))];

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let mut compiler = Compiler::new(CompilerConfig::default());
        compiler.add_listener(Box::new(move |event: &CompilationEvent| {
            let tag = match event {
                CompilationEvent::BatchStarted { .. } => "batch-started",
                CompilationEvent::FileStarted { .. } => "file-started",
                CompilationEvent::FileSucceeded { .. } => "file-succeeded",
                CompilationEvent::FileFailed { .. } => "file-failed",
                CompilationEvent::BatchCompleted { .. } => "batch-completed",
            };
            sink.lock().unwrap().push(tag.to_string());
        }));

        let result = compiler.compile_batch(&jobs);
        assert!(result.is_all_success());
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "batch-started",
                "file-started",
                "file-succeeded",
                "batch-completed"
            ]
        );
    }

    #[test]
    fn test_throughput_is_finite() {
        let result = CompilationResult::new(Vec::new(), Duration::from_millis(10));
        assert_eq!(result.total_count(), 0);
        assert!(result.throughput().is_finite());
    }
}
