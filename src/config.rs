//! Compiler configuration.
//!
//! One value struct passed by the caller into every pipeline instance; there
//! is no process-wide configuration state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CompileMode {
    /// Traditional bundle output.
    JsBundle,
    /// Stage-model, module.json based output.
    ModuleJson,
    /// Plain ES module output.
    EsModule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerConfig {
    pub compile_mode: CompileMode,

    /// Partial-update rendering: `initialRender` plus per-element reactive
    /// bookkeeping. When false, full render: a plain recursive `render`.
    pub partial_update_mode: bool,

    /// Emit plain JavaScript with no UI-runtime scaffolding at all.
    pub pure_javascript: bool,

    /// Emit an adjacent `.map` file next to each output file. Toggling this
    /// never changes the generated code text.
    pub generate_source_map: bool,

    /// Worker count for parallel batch mode. `None` means hardware
    /// concurrency.
    pub thread_count: Option<usize>,

    pub project_path: Option<String>,
    pub build_path: Option<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            compile_mode: CompileMode::ModuleJson,
            partial_update_mode: true,
            pure_javascript: false,
            generate_source_map: true,
            thread_count: None,
            project_path: None,
            build_path: None,
        }
    }
}

impl CompilerConfig {
    pub fn with_partial_update(mut self, on: bool) -> Self {
        self.partial_update_mode = on;
        self
    }

    pub fn with_pure_javascript(mut self, on: bool) -> Self {
        self.pure_javascript = on;
        self
    }

    pub fn with_source_map(mut self, on: bool) -> Self {
        self.generate_source_map = on;
        self
    }

    pub fn with_thread_count(mut self, threads: usize) -> Self {
        self.thread_count = Some(threads);
        self
    }

    /// Effective worker count for parallel compilation.
    pub fn effective_threads(&self) -> usize {
        match self.thread_count {
            Some(n) if n > 0 => n.min(num_cpus::get()),
            _ => num_cpus::get(),
        }
    }
}
