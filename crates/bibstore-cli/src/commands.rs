use std::io;

use anyhow::Context;
use bibstore_store::{sanitize_filename, ReferenceStore, StoreConfig, StoreError};
use bibstore_types::{CitationKey, EntryType, Reference, ReferenceLibrary};
use colored::Colorize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    if let Command::Sanitize(args) = &cli.command {
        println!("{}", sanitize_filename(&args.name));
        return Ok(());
    }

    let store = open_store(&cli)?;
    match cli.command {
        Command::Add(args) => cmd_add(&store, args),
        Command::Remove(args) => cmd_remove(&store, args),
        Command::List => cmd_list(&store, &cli.format),
        Command::Export(args) => cmd_export(&store, args),
        Command::Show(args) => {
            print!("{}", store.import_bibtex_or_empty(&args.name));
            Ok(())
        }
        Command::Clear => cmd_clear(&store),
        Command::Sanitize(_) => Ok(()),
    }
}

fn open_store(cli: &Cli) -> anyhow::Result<ReferenceStore> {
    let mut config = match &cli.config {
        Some(path) => StoreConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StoreConfig::default(),
    };
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    tracing::debug!(
        root = %config.root.display(),
        state = %config.state_file,
        "opening store"
    );
    Ok(ReferenceStore::new(config))
}

/// Load the library for a command that will act on it.
///
/// A missing or cleared snapshot yields an empty library. Any other failure
/// (corruption, a newer format version) is an error, so the snapshot is never
/// overwritten with data it could not read.
fn load_library(store: &ReferenceStore) -> anyhow::Result<ReferenceLibrary> {
    match store.load::<ReferenceLibrary>() {
        Ok(library) => Ok(library),
        Err(StoreError::EmptySnapshot(_)) => Ok(ReferenceLibrary::new()),
        Err(StoreError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
            Ok(ReferenceLibrary::new())
        }
        Err(e) => Err(e).with_context(|| {
            format!("reading library {}", store.state_path().display())
        }),
    }
}

fn cmd_add(store: &ReferenceStore, args: AddArgs) -> anyhow::Result<()> {
    let key = CitationKey::parse(&args.key)?;
    let entry_type: EntryType = args.entry_type.parse()?;

    let mut reference = Reference::new(key, entry_type);
    for (name, value) in args.fields {
        reference.set_field(name, value)?;
    }

    let mut library = load_library(store)?;
    let verb = if args.replace {
        library.upsert(reference.clone());
        "Saved"
    } else {
        library.add(reference.clone())?;
        "Added"
    };
    store.save(&library).context("saving library")?;

    println!(
        "{} {} {} ({} references)",
        "✓".green().bold(),
        verb,
        reference.key.to_string().yellow(),
        library.len()
    );
    Ok(())
}

fn cmd_remove(store: &ReferenceStore, args: RemoveArgs) -> anyhow::Result<()> {
    let key = CitationKey::parse(&args.key)?;
    let mut library = load_library(store)?;
    if library.remove(&key).is_none() {
        anyhow::bail!("no reference with key {key}");
    }
    store.save(&library).context("saving library")?;
    println!("Removed {}", key.to_string().yellow());
    Ok(())
}

fn cmd_list(store: &ReferenceStore, format: &OutputFormat) -> anyhow::Result<()> {
    let library = load_library(store)?;
    match format {
        OutputFormat::Json => {
            let refs: Vec<&Reference> = library.iter().collect();
            println!("{}", serde_json::to_string_pretty(&refs)?);
        }
        OutputFormat::Text => {
            if library.is_empty() {
                println!("No references.");
            }
            for r in &library {
                let title = r.field("title").unwrap_or("(untitled)");
                println!(
                    "{} {} {}",
                    r.key.to_string().yellow().bold(),
                    r.entry_type.to_string().cyan(),
                    title
                );
            }
        }
    }
    Ok(())
}

fn cmd_export(store: &ReferenceStore, args: ExportArgs) -> anyhow::Result<()> {
    let library = load_library(store)?;
    let (path, count) = store
        .export_bibtex(&args.name, &library)
        .with_context(|| format!("writing {}", store.bibtex_path(&args.name).display()))?;
    println!(
        "{} Wrote {} references to {}",
        "✓".green().bold(),
        count,
        path.display().to_string().bold()
    );
    Ok(())
}

fn cmd_clear(store: &ReferenceStore) -> anyhow::Result<()> {
    store.clear().context("clearing state snapshot")?;
    println!("{} Cleared {}", "✓".green().bold(), store.state_path().display());
    Ok(())
}
