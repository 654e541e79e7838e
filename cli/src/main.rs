use std::fs;
use std::path::{Path, PathBuf};

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use command_tree_builder::{BuildHandlers, CommandTreeBuilder, ParserInstance, construct};
use command_tree_core::{ConversionSchema, is_yaml_path};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Output format for parsed arguments.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "command-tree")]
#[command(about = "Build and run command-line parsers from declarative command trees")]
struct Cli {
    /// Log build steps to stderr (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build the command tree and parse the arguments after `--`.
    Run(RunArgs),
    /// Build the command tree and list the registered commands.
    Check(InputArgs),
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Conversion schema file (JSON, or YAML by extension).
    #[arg(long)]
    schema: Option<PathBuf>,
    /// File containing the command collective (JSON, or YAML by extension).
    #[arg(long)]
    commands: PathBuf,
    /// Program name shown in usage and help output.
    #[arg(long, default_value = "app")]
    name: String,
}

#[derive(Debug, Args)]
struct RunArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Arguments handed to the built parser.
    #[arg(last = true)]
    args: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run_run(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "command_tree=debug,command_tree_core=debug,command_tree_builder=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_document(path: &Path) -> Result<Value, String> {
    let content = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    if is_yaml_path(path) {
        serde_yaml::from_str(&content)
            .map_err(|err| format!("failed to parse {}: {err}", path.display()))
    } else {
        serde_json::from_str(&content)
            .map_err(|err| format!("failed to parse {}: {err}", path.display()))
    }
}

fn build(input: &InputArgs) -> Result<CommandTreeBuilder, String> {
    let schema = match &input.schema {
        Some(path) => ConversionSchema::load(path)
            .map_err(|err| format!("failed to load schema {}: {err}", path.display()))?,
        None => ConversionSchema::default(),
    };
    let container = load_document(&input.commands)?;

    let handlers = BuildHandlers::default().on_fail(|context| {
        eprint!("{}", context.error.render());
    });
    let mut builder = construct(ParserInstance::new(input.name.clone()), schema, handlers);
    builder
        .build_all_commands(&container)
        .map_err(|err| err.to_string())?;

    debug!(
        commands = builder.instance().command_names().count(),
        "Command tree built"
    );
    Ok(builder)
}

fn run_run(args: RunArgs) -> Result<(), String> {
    let builder = build(&args.input)?;

    let parsed = match builder.parse(&args.args) {
        Ok(parsed) => parsed,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            return Ok(());
        }
        Err(err) => {
            // Without commands there is no fail handler to report it.
            if builder.instance().command_names().next().is_none() {
                eprint!("{}", err.render());
            }
            return Err("command line rejected".to_string());
        }
    };

    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&parsed).map_err(|err| err.to_string())?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&parsed).map_err(|err| err.to_string())?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_check(args: InputArgs) -> Result<(), String> {
    let builder = build(&args)?;
    let instance = builder.instance();

    for name in instance.command_names() {
        let usage = instance.usage(name).unwrap_or(name);
        if instance.default_command() == Some(name) {
            println!("{usage} (default)");
        } else {
            println!("{usage}");
        }
    }
    Ok(())
}
