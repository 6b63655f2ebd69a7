use clap::{Parser, Subcommand, ValueEnum};
use forge_meta::OutputShape;
use std::path::PathBuf;

/// Generate component metadata and type declarations.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build metadata, fragments and assembled module declarations.
    Build {
        #[command(flatten)]
        common: CommonArgs,

        /// Directory for `{tag}.rt.json`, `{tag}.dt.json` and fragments.
        #[arg(short, long, default_value = "dist/meta")]
        out: PathBuf,

        /// Directory assembled modules are written under, one subdirectory per module.
        #[arg(long)]
        modules_out: Option<PathBuf>,

        /// Declaration output shape (overrides the config file).
        #[arg(long, value_enum)]
        shape: Option<ShapeArg>,
    },

    /// Run every check and report diagnostics without writing anything.
    Check {
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(clap::Args, Debug)]
pub struct CommonArgs {
    /// Build input: a JSON file, or a directory searched for `*.json` files.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Build configuration (TOML).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Check category to disable (repeatable), e.g. `dynamic-slot`.
    #[arg(long = "disable", value_name = "CHECK")]
    pub disable: Vec<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeArg {
    Library,
    SingleComponent,
}

impl From<ShapeArg> for OutputShape {
    fn from(shape: ShapeArg) -> Self {
        match shape {
            ShapeArg::Library => OutputShape::Library,
            ShapeArg::SingleComponent => OutputShape::SingleComponent,
        }
    }
}
