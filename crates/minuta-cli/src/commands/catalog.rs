//! Catalog command - inspect the placeholder catalog and templates.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use minuta_core::catalog::{PlaceholderCatalog, PlaceholderKind, scan_template_tokens};
use minuta_core::MinutaConfig;

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    command: CatalogCommand,
}

#[derive(Subcommand)]
enum CatalogCommand {
    /// List catalog tokens
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Report which template tokens the catalog covers
    Check {
        /// Template file
        template: PathBuf,
    },
}

pub async fn run(args: CatalogArgs, config: MinutaConfig) -> anyhow::Result<()> {
    let catalog = PlaceholderCatalog::from_config(&config.catalog)?;

    match args.command {
        CatalogCommand::List { json } => list(&catalog, json),
        CatalogCommand::Check { template } => check(&catalog, &template),
    }
}

fn list(catalog: &PlaceholderCatalog, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog.entries())?);
        return Ok(());
    }

    for entry in catalog.iter() {
        let kind = match entry.kind {
            PlaceholderKind::Extracted => style("extracted").dim(),
            PlaceholderKind::CurrentDate => style("date").cyan(),
        };
        println!("{:<40} {}", entry.token.as_str(), kind);
    }
    println!();
    println!("{} placeholders", catalog.len());

    Ok(())
}

fn check(catalog: &PlaceholderCatalog, template: &Path) -> anyhow::Result<()> {
    let text = fs::read_to_string(template)?;
    let tokens = scan_template_tokens(&text);

    if tokens.is_empty() {
        println!("{} No placeholders found in {}", style("ℹ").blue(), template.display());
        return Ok(());
    }

    let mut unknown = 0;
    for token in &tokens {
        if catalog.contains(token) {
            println!("{} {}", style("✓").green(), token);
        } else {
            unknown += 1;
            println!("{} {} (not in catalog)", style("✗").red(), token);
        }
    }

    println!();
    println!(
        "{} of {} placeholders are known",
        tokens.len() - unknown,
        tokens.len()
    );

    if unknown > 0 {
        anyhow::bail!("{} placeholder(s) are not in the catalog", unknown);
    }
    Ok(())
}
