//! Command-line interface definitions for `component-collection`.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use component_collection::{ArtifactSelection, CollectMode, NodePath};

/// Parsed CLI arguments.
#[derive(Debug, Parser)]
#[command(name = "component-collection")]
#[command(about = "Collect named scene components and generate typed accessors")]
#[command(version)]
pub struct Args {
    /// Project root searched for the settings file.
    #[arg(long, value_name = "path", default_value = ".", global = true)]
    pub project: Utf8PathBuf,
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the settings file and built-in templates.
    Init,
    /// List registered collectors and generators.
    List,
    /// Scan a scene into a target file.
    Collect {
        /// Scene document to scan.
        #[command(flatten)]
        files: TargetFiles,
        /// Merge behaviour for existing entries.
        #[arg(long, value_enum, default_value_t = ModeArg::Update)]
        mode: ModeArg,
        /// Node path to scan from, e.g. `1/0`; defaults to the stored root.
        #[arg(long, value_name = "path")]
        root: Option<NodePath>,
    },
    /// Remove entries whose component no longer exists.
    Prune {
        /// Scene and target files.
        #[command(flatten)]
        files: TargetFiles,
    },
    /// Generate the per-target source files.
    Generate {
        /// Scene and target files.
        #[command(flatten)]
        files: TargetFiles,
        /// Which files to write.
        #[arg(long, value_enum, default_value_t = ArtifactArg::Components)]
        artifact: ArtifactArg,
        /// Replace existing files without asking.
        #[arg(long)]
        force: bool,
    },
    /// Generate the type-wide extension file.
    Extension {
        /// Replace an existing file without asking.
        #[arg(long)]
        force: bool,
    },
}

/// Scene and target locations shared by per-target commands.
#[derive(Debug, clap::Args)]
pub struct TargetFiles {
    /// Scene document (TOML, or JSON by extension).
    #[arg(long, value_name = "file")]
    pub scene: Utf8PathBuf,
    /// Target state file.
    #[arg(long, value_name = "file")]
    pub target: Utf8PathBuf,
}

/// `--mode` values.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Replace stored entries.
    Update,
    /// Append and keep the first of each field name.
    Add,
}

impl From<ModeArg> for CollectMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Update => Self::Update,
            ModeArg::Add => Self::Add,
        }
    }
}

/// `--artifact` values.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ArtifactArg {
    /// Fields and accessors.
    Components,
    /// Behaviour scaffold.
    Behaviour,
    /// Both.
    All,
}

impl From<ArtifactArg> for ArtifactSelection {
    fn from(value: ArtifactArg) -> Self {
        match value {
            ArtifactArg::Components => Self::Components,
            ArtifactArg::Behaviour => Self::Behaviour,
            ArtifactArg::All => Self::All,
        }
    }
}
