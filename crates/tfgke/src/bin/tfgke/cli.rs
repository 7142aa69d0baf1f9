//! tfgke cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    ///
    /// This is equivalent to running { cd <directory>; tfgke ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve an attribute path of a loaded cluster
    ///
    /// Reads state from stdin unless any other source is provided (via --input-*)
    Get(GetCommand),

    /// Evaluate hcl expression against loaded clusters
    ///
    /// Reads state from stdin unless any other source is provided (via --input-*)
    #[command(alias = "eval")]
    Evaluate(EvaluateCommand),

    /// Render a google_container_cluster data block
    Synth(SynthCommand),

    /// Print the schema of the data source (or of the node at a path)
    Schema(SchemaCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct GetCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Instance to read, required when more than one is loaded
    #[clap(short = 'n', long = "name")]
    pub name: Option<String>,

    /// Print the terraform token for the path instead of resolving it
    ///
    /// No state is read.
    #[clap(short = 't', long = "token")]
    pub token: bool,

    /// Attribute path, e.g. `addons_config[0].http_load_balancing[0].disabled`
    pub path: String,
}

#[derive(Parser, Debug)]
pub struct EvaluateCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// HCL expression to evaluate
    pub expression: String,
}

#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Load state files (*.tfstate, *.json) from work directory
    #[clap(short = 'w', long = "input-workdir")]
    pub workdir: bool,

    /// Load a file
    #[clap(short = 'f', long = "input-file")]
    pub files: Vec<PathBuf>,

    /// Load state files from given directory
    #[clap(short = 'd', long = "input-dir")]
    pub directories: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct SynthCommand {
    /// Construct id, the second label of the data block
    #[clap(long = "id", default_value = "this")]
    pub id: String,

    /// Read the block arguments from a JSON or YAML file
    #[clap(short = 'c', long = "config", conflicts_with("name"))]
    pub config: Option<PathBuf>,

    /// Cluster name
    #[clap(long = "name", required_unless_present("config"))]
    pub name: Option<String>,

    #[clap(long = "location")]
    pub location: Option<String>,

    #[clap(long = "project")]
    pub project: Option<String>,

    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: SynthFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum SynthFormat {
    #[default]
    Hcl,
    Json,
}

impl std::fmt::Display for SynthFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthFormat::Hcl => f.write_str("hcl"),
            SynthFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct SchemaCommand {
    /// Load the schema from `terraform providers schema -json` output instead
    #[clap(short = 's', long = "schema-file")]
    pub schema_file: Option<PathBuf>,

    #[clap(flatten)]
    pub output: OutputArgs,

    /// Path to a nested block or attribute
    pub path: Option<String>,
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[clap(flatten)]
    pub input: InputArgs,

    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Loaded instances
    States,
    /// Accessors of the typed facades that do not match the embedded schema
    Facades,
}
