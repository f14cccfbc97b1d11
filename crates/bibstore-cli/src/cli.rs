use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "bibstore",
    about = "bibstore: keep a bibliography and export it as BibTeX",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the state snapshot and exported .bib files
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a reference to the library
    Add(AddArgs),
    /// Remove a reference by citation key
    Remove(RemoveArgs),
    /// List references in the library
    List,
    /// Write the library to <name>.bib
    Export(ExportArgs),
    /// Print the contents of <name>.bib
    Show(ShowArgs),
    /// Empty the state snapshot
    Clear,
    /// Print the sanitized form of a file name
    Sanitize(SanitizeArgs),
}

#[derive(Args)]
pub struct AddArgs {
    pub key: String,
    #[arg(short = 't', long = "type", default_value = "misc")]
    pub entry_type: String,
    /// Field as name=value; may be repeated
    #[arg(short, long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
    /// Replace an existing reference with the same key
    #[arg(long)]
    pub replace: bool,
}

#[derive(Args)]
pub struct RemoveArgs {
    pub key: String,
}

#[derive(Args)]
pub struct ExportArgs {
    pub name: String,
}

#[derive(Args)]
pub struct ShowArgs {
    pub name: String,
}

#[derive(Args)]
pub struct SanitizeArgs {
    pub name: String,
}

fn parse_field(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {s:?}"))?;
    Ok((name.trim().to_string(), value.trim().to_string()))
}
