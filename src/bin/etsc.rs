//! Command-line front end for the ets2js compiler core.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use ets2js::discovery::{mirrored_output_path, SourceFileFinder};
use ets2js::{CompilationResult, Compiler, CompilerConfig};

#[derive(Parser, Debug)]
#[command(name = "etsc", about = "Compile ETS declarative-UI sources to JavaScript")]
struct Cli {
    /// Source file, or source root with --batch/--parallel/--project.
    input: PathBuf,

    /// Output file, or build root with --batch/--parallel/--project.
    output: PathBuf,

    /// Compile every source under the input root, one after another.
    #[arg(long, conflicts_with_all = ["parallel", "project"])]
    batch: bool,

    /// Compile every source under the input root on a worker pool.
    #[arg(long, conflicts_with = "project")]
    parallel: bool,

    /// Like --parallel, plus resource handling for a whole project tree.
    #[arg(long)]
    project: bool,

    /// Copy non-source resource files into the build tree (project mode).
    #[arg(long, requires = "project")]
    copy_resources: bool,

    /// Worker threads for parallel compilation. Defaults to the number of
    /// logical CPUs.
    #[arg(long)]
    threads: Option<usize>,

    /// Emit plain JavaScript with no UI-runtime scaffolding.
    #[arg(long)]
    pure_js: bool,

    /// Use the full-render protocol instead of partial update.
    #[arg(long)]
    full_render: bool,

    /// Do not write .js.map files.
    #[arg(long)]
    no_source_map: bool,
}

fn config_from(cli: &Cli) -> CompilerConfig {
    let mut config = CompilerConfig::default()
        .with_partial_update(!cli.full_render)
        .with_pure_javascript(cli.pure_js)
        .with_source_map(!cli.no_source_map);
    if let Some(threads) = cli.threads {
        config = config.with_thread_count(threads);
    }
    config
}

fn report(result: &CompilationResult) -> ExitCode {
    for file in result.results() {
        if let Some(message) = &file.message {
            match &file.cause {
                Some(cause) => {
                    error!(source = %file.source.display(), cause = %cause, "{message}")
                }
                None => error!(source = %file.source.display(), "{message}"),
            }
        }
    }
    if result.is_all_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn run_batch(compiler: &Compiler, cli: &Cli) -> ExitCode {
    let jobs = match SourceFileFinder::new().find(&cli.input).and_then(|sources| {
        sources
            .iter()
            .map(|source| {
                mirrored_output_path(source, &cli.input, &cli.output)
                    .map(|output| (source.clone(), output))
            })
            .collect::<Result<Vec<_>, _>>()
    }) {
        Ok(jobs) => jobs,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let result = if cli.parallel {
        compiler.compile_parallel(&jobs)
    } else {
        compiler.compile_batch(&jobs)
    };
    report(&result)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let compiler = Compiler::new(config_from(&cli));

    if cli.project {
        match compiler.compile_project(&cli.input, &cli.output, cli.copy_resources) {
            Ok(result) => report(&result),
            Err(err) => {
                error!("{err}");
                ExitCode::FAILURE
            }
        }
    } else if cli.batch || cli.parallel {
        run_batch(&compiler, &cli)
    } else {
        let result = compiler.compile_file(&cli.input, &cli.output);
        match &result.message {
            None => ExitCode::SUCCESS,
            Some(message) => {
                match &result.cause {
                    Some(cause) => {
                        error!(source = %result.source.display(), cause = %cause, "{message}")
                    }
                    None => error!(source = %result.source.display(), "{message}"),
                }
                ExitCode::FAILURE
            }
        }
    }
}
