//! `forge-meta` command line driver
//!
//! ```text
//! forge-meta build <INPUT> [--config forge-meta.toml] [--out dist/meta] [--shape library]
//! forge-meta check <INPUT> [--disable dynamic-slot]
//! ```
//!
//! Log verbosity follows the `FORGE_LOG` environment variable.

use anyhow::{bail, Context, Result};
use clap::Parser;
use forge_meta::{BuildConfig, BuildSession, CheckCategory, DiagnosticSeverity, ModuleInput};
use std::path::{Path, PathBuf};

mod cli;
mod input;

use cli::{Args, Command, CommonArgs, ShapeArg};
use input::BuildInput;

fn main() -> Result<()> {
    // Use FORGE_LOG env var for log level configuration, default to "info"
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("FORGE_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Build {
            common,
            out,
            modules_out,
            shape,
        } => build(&common, &out, modules_out, shape),
        Command::Check { common } => check(&common),
    }
}

fn load_config(common: &CommonArgs) -> Result<BuildConfig> {
    let mut config = match common.config {
        Some(ref path) => BuildConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => BuildConfig::default(),
    };

    for code in &common.disable {
        let Some(category) = CheckCategory::from_code(code) else {
            let known: Vec<&str> = CheckCategory::ALL.iter().map(|c| c.code()).collect();
            bail!(
                "Unknown check `{}`\nAvailable checks: {}",
                code,
                known.join(", ")
            );
        };
        config = config.disable(category);
    }

    Ok(config)
}

fn process_all(session: &mut BuildSession<'_>, input: &BuildInput) {
    for component in &input.components {
        match session.process_component(component) {
            Some(metadata) => println!("  ✓ <{}> {}", metadata.tag_name(), component.name),
            None => {
                println!("  ✗ <{}> {}", component.tag_name, component.name);
                if let Some(first) = session
                    .diagnostics()
                    .for_component(&component.name)
                    .find(|d| d.severity == DiagnosticSeverity::Error)
                {
                    println!("      {}", first.message);
                }
            }
        }
    }
}

fn build(
    common: &CommonArgs,
    out: &Path,
    modules_out: Option<PathBuf>,
    shape: Option<ShapeArg>,
) -> Result<()> {
    let mut config = load_config(common)?;
    if let Some(shape) = shape {
        config = config.with_output_shape(shape.into());
    }
    let input = BuildInput::load(&common.input)?;

    println!(
        "Building metadata for {} component(s)...",
        input.components.len()
    );
    let mut session = BuildSession::new(&input.model, config);
    process_all(&mut session, &input);

    let written = session
        .write_outputs(out)
        .with_context(|| format!("Failed to write outputs to {}", out.display()))?;

    if !input.modules.is_empty() {
        let modules_out = modules_out.unwrap_or_else(|| out.join("modules"));
        println!("\nAssembling {} module(s)...", input.modules.len());
        for module in &input.modules {
            let errors_before = session.diagnostics().error_count();
            let module_input =
                ModuleInput::new(&module.name, &module.primary, modules_out.join(&module.name));
            match session.assemble_module(&module_input, &module.components) {
                Some(assembled) => println!(
                    "  ✓ {} -> {} ({} dependencies)",
                    module.name,
                    assembled.output.display(),
                    assembled.closure.len()
                ),
                None if session.diagnostics().error_count() > errors_before => {
                    println!("  ✗ {}", module.name)
                }
                None => println!("  - {} (skipped)", module.name),
            }
        }
    }

    report(&session);
    session.finish()?;

    println!(
        "\nBuild complete: {} file(s) written to {}",
        written.len(),
        out.display()
    );
    Ok(())
}

fn check(common: &CommonArgs) -> Result<()> {
    let config = load_config(common)?;
    let input = BuildInput::load(&common.input)?;

    println!("Checking {} component(s)...", input.components.len());
    let mut session = BuildSession::new(&input.model, config);
    process_all(&mut session, &input);

    report(&session);
    session.finish()?;
    println!("\nNo errors found");
    Ok(())
}

fn report(session: &BuildSession<'_>) {
    let diagnostics = session.diagnostics();
    if diagnostics.diagnostics().is_empty() {
        return;
    }
    eprintln!();
    for diagnostic in diagnostics.diagnostics() {
        eprintln!("{}", diagnostic);
    }
    eprintln!(
        "\n{} error(s), {} warning(s)",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );
}
