//! # ets2js
//!
//! Compiler core turning declarative-UI ETS/ArkTS sources into runnable
//! JavaScript.
//!
//! ## Pipeline Invariants
//!
//! 1. **Tree Boundary**: the front end hands over a kind-tagged JSON tree;
//!    everything downstream works on the typed AST built from it.
//! 2. **Erasure over Failure**: unknown syntax kinds and compile-time-only
//!    declarations erase to placeholders; they are logged, never errors.
//! 3. **Stage Order**: decorator properties expand before build methods are
//!    restructured, and components are rewritten last. Each stage sees the
//!    previous stage's output.
//! 4. **Mode Split**: partial-update, full-render, and pure-JavaScript
//!    output differ only in the generator and in which transform stages
//!    run; the AST shapes are shared.
//! 5. **Batch Isolation**: one file's failure never aborts a batch. Every
//!    file produces exactly one `FileResult`.
//! 6. **Map Neutrality**: toggling source maps never changes the generated
//!    code text; the map is a purely adjacent artifact.

pub mod ast;
pub mod builtins;
pub mod codegen;
pub mod compile;
pub mod component;
pub mod config;
pub mod convert;
pub mod discovery;
pub mod error;
pub mod events;
pub mod parse;
pub mod sourcemap;
pub mod transform;
pub mod writer;


pub use codegen::{CodeGenerator, GeneratedOutput, GenerationContext};
pub use compile::{CompilationResult, Compiler, FileResult, FileStatus};
pub use config::{CompileMode, CompilerConfig};
pub use convert::build_ast;
pub use error::{CompileError, CompileResult};
pub use events::{CompilationEvent, CompilationListener};
pub use parse::{ScriptParser, SimpleParser};
pub use transform::TransformPipeline;
