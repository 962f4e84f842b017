//! protomask - field mask CLI tool
//!
//! A command line tool for inspecting YAML/JSON messages and applying
//! field mask updates to them.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

use protomask::{all, DynamicMessage, FieldMask, Mask, MessageType, Parser, SchemaMask, Updater};

#[derive(Debug, ClapParser)]
#[command(name = "protomask", version, about = "Apply field mask updates to YAML/JSON messages")]
struct Cli {
    /// Path to the schema file
    #[arg(short, long, global = true)]
    schema: Option<PathBuf>,

    /// Name of the message type to use (default: first in the schema)
    #[arg(short, long, global = true)]
    type_name: Option<String>,

    /// Output location. Use '-' for stdout
    #[arg(short, long, global = true, default_value = "-")]
    output: String,

    /// Log more; repeat for trace output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all message types in the schema
    ListTypes,
    /// Validate a YAML/JSON message against the schema
    Validate { file: PathBuf },
    /// Print the mask of all populated top-level fields of a message
    Mask { file: PathBuf },
    /// Apply the masked fields of one message onto another
    Update {
        #[arg(long)]
        target: PathBuf,
        #[arg(long)]
        update: PathBuf,
        /// Comma separated field paths (default: all populated fields of the target)
        #[arg(long)]
        mask: Option<Mask>,
        /// Leave the target untouched if any path fails
        #[arg(long)]
        atomic: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let schema_path = cli.schema.ok_or("Missing required --schema argument")?;
    let schema_content = fs::read_to_string(&schema_path)
        .map_err(|e| format!("Failed to read schema file {:?}: {}", schema_path, e))?;

    let parser = Parser::new(&schema_content).map_err(|e| format!("Failed to parse schema: {}", e))?;

    let type_name = cli.type_name.unwrap_or_else(|| {
        parser.type_names().first().map(|s| s.to_string()).unwrap_or_default()
    });
    if type_name.is_empty() {
        return Err("No message types found in schema".into());
    }
    tracing::debug!(schema = ?schema_path, type_name = %type_name, "loaded schema");

    let mut output: Box<dyn Write> = if cli.output == "-" {
        Box::new(io::stdout())
    } else {
        Box::new(
            fs::File::create(&cli.output)
                .map_err(|e| format!("Failed to create output file {:?}: {}", cli.output, e))?,
        )
    };

    match cli.command {
        Command::ListTypes => list_types(&parser, &mut output)?,
        Command::Validate { file } => validate(&parser, &type_name, &file, &mut output)?,
        Command::Mask { file } => mask(&parser, &type_name, &file, &mut output)?,
        Command::Update {
            target,
            update,
            mask,
            atomic,
        } => apply_update(&parser, &type_name, &target, &update, mask, atomic, &mut output)?,
    }

    Ok(())
}

fn message_type(parser: &Parser, type_name: &str) -> Result<MessageType, Box<dyn std::error::Error>> {
    let mt = parser.type_by_name(type_name);
    if !mt.is_valid() {
        return Err(format!("Type '{}' not found in schema", type_name).into());
    }
    Ok(mt)
}

fn read_message(mt: &MessageType, file: &Path) -> Result<DynamicMessage, Box<dyn std::error::Error>> {
    let content =
        fs::read_to_string(file).map_err(|e| format!("Failed to read file {:?}: {}", file, e))?;
    let message = mt
        .from_yaml(&content)
        .map_err(|e| format!("Failed to parse {:?}: {}", file, e))?;
    Ok(message)
}

fn list_types(parser: &Parser, output: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(output, "Types in schema:")?;
    for name in parser.type_names() {
        writeln!(output, "  - {}", name)?;
    }
    Ok(())
}

fn validate(
    parser: &Parser,
    type_name: &str,
    file: &Path,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mt = message_type(parser, type_name)?;
    read_message(&mt, file)?;
    writeln!(output, "Validation successful")?;
    Ok(())
}

fn mask(
    parser: &Parser,
    type_name: &str,
    file: &Path,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mt = message_type(parser, type_name)?;
    let message = read_message(&mt, file)?;
    writeln!(output, "{}", all(&message))?;
    Ok(())
}

fn apply_update(
    parser: &Parser,
    type_name: &str,
    target_file: &Path,
    update_file: &Path,
    mask: Option<Mask>,
    atomic: bool,
    output: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mt = message_type(parser, type_name)?;
    let mut target = read_message(&mt, target_file)?;
    let update = read_message(&mt, update_file)?;

    let mask = mask.unwrap_or_else(|| all(&target));
    let mask = SchemaMask::new(target.descriptor(), mask.paths().iter().cloned())
        .map_err(|e| format!("Invalid mask '{}': {}", mask, e))?;

    Updater::builder()
        .atomic(atomic)
        .build()
        .apply(&mut target, &update, &mask)
        .map_err(|e| format!("Update failed: {}", e))?;

    write!(output, "{}", target.to_yaml()?)?;
    Ok(())
}
