mod cli;

use tfgke::cluster::{
    ClusterReference, DataGoogleContainerCluster, DataGoogleContainerClusterConfig,
    TF_RESOURCE_TYPE,
};
use tfgke::path::{AttributePath, DataSourceAddress};
use tfgke::resolve::Resolve;
use tfgke::schema::{self, Node};
use tfgke::state::ClusterStates;
use tfgke::value::Value;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("TFGKE_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Get(get_cli) => get(get_cli),
        cli::Command::Evaluate(eval_cli) => evaluate(eval_cli),
        cli::Command::Synth(synth_cli) => synth(synth_cli),
        cli::Command::Schema(schema_cli) => print_schema(schema_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn get(cli: cli::GetCommand) -> anyhow::Result<()> {
    let requested: AttributePath = cli.path.parse()?;
    let path = schema::google_container_cluster().canonical_path(&requested)?;

    if cli.token {
        let name = cli.name.as_deref().unwrap_or("this");
        let address = DataSourceAddress::new(TF_RESOURCE_TYPE.to_string(), name.to_string());
        println!("{}", address.interpolation(&path));
        return Ok(());
    }

    let states = load(&cli.input)?;
    let resolver = states.single_or(cli.name.as_deref())?;
    let value = resolver.resolve(&path)?;

    output(&cli.output, &value)?;
    Ok(())
}

pub fn evaluate(cli: cli::EvaluateCommand) -> anyhow::Result<()> {
    let states = load(&cli.input)?;
    let value = states.evaluate(&cli.expression)?;

    output(&cli.output, &value)?;
    Ok(())
}

pub fn synth(cli: cli::SynthCommand) -> anyhow::Result<()> {
    let config = match (&cli.config, &cli.name) {
        (Some(config_path), _) => {
            let contents = std::fs::read_to_string(config_path)?;
            // JSON is valid YAML
            serde_yaml::from_str::<DataGoogleContainerClusterConfig>(&contents)?
        }
        (None, Some(name)) => DataGoogleContainerClusterConfig::new(name),
        (None, None) => anyhow::bail!("either --name or --config is required"),
    };

    let mut cluster = DataGoogleContainerCluster::new(&cli.id, config)?;
    if let Some(location) = cli.location {
        cluster.set_location(location);
    }
    if let Some(project) = cli.project {
        cluster.set_project(project);
    }

    match cli.format {
        cli::SynthFormat::Hcl => print!("{}", cluster.to_hcl()?),
        cli::SynthFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), &cluster.to_json())?;
            println!();
        }
    }
    Ok(())
}

pub fn print_schema(cli: cli::SchemaCommand) -> anyhow::Result<()> {
    let loaded;
    let block = match &cli.schema_file {
        Some(schema_file) => {
            let contents = std::fs::read_to_string(schema_file)?;
            loaded = schema::ProviderSchema::from_json(&contents)?;
            loaded.data_source(TF_RESOURCE_TYPE)?
        }
        None => schema::google_container_cluster(),
    };

    let path: AttributePath = match &cli.path {
        Some(path) => path.parse()?,
        None => AttributePath::root(),
    };

    let node = match block.walk(&path)? {
        Node::Block(block) => serde_json::to_value(block)?,
        Node::Nested(nested) => serde_json::to_value(nested)?,
        Node::Type(ty) => serde_json::to_value(ty)?,
    };

    output(&cli.output, &Value::from(node))
}

fn load(input: &cli::InputArgs) -> anyhow::Result<ClusterStates> {
    let mut states = ClusterStates::default();

    if !input.workdir && input.files.is_empty() && input.directories.is_empty() {
        let stdin = std::io::read_to_string(std::io::stdin())?;
        states.load_str(&stdin, "main")?;
        return Ok(states);
    }

    if input.workdir {
        states.load_directory(&std::env::current_dir()?)?;
    }

    for file_path in &input.files {
        states.load_file(file_path)?;
    }

    for dir_path in &input.directories {
        states.load_directory(dir_path)?;
    }

    anyhow::ensure!(!states.is_empty(), "No google_container_cluster data sources loaded");

    Ok(states)
}

fn output(output: &cli::OutputArgs, value: &Value) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => {
            serde_json::to_writer_pretty(std::io::stdout(), value)?;
            println!();
        }
    };

    Ok(())
}

/// (tfgke-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    use cli::DevSubCommand::*;

    match cli.command {
        States => {
            let states = load(&cli.input)?;
            println!("{states:#?}");
        }
        Facades => {
            for issue in ClusterReference::schema_issues(schema::google_container_cluster()) {
                println!("{issue}");
            }
        }
    }

    Ok(())
}
