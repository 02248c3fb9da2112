use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::reference::ReferenceCatalog;
use crate::plugin::{self, null::COMPUTE_MD5};

#[derive(Args)]
pub struct RefArgs {
    /// Reference FASTA file
    #[arg(required = true)]
    pub reference: PathBuf,

    /// Name of the aligner plugin used to load the reference
    #[arg(long, default_value = plugin::null::PLUGIN_NAME)]
    pub plugin: String,

    /// Compute the MD5 of every contig (reads the whole FASTA)
    #[arg(long)]
    pub md5: bool,
}

pub fn run(args: RefArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut plugin = plugin::load_aligner(&args.plugin)?;
    let mut options = plugin.load_options();
    if args.md5 {
        options = options.with_parameter(COMPUTE_MD5, 1);
    }
    plugin.initialize(&options)?;

    let catalog = plugin.load_reference(&args.reference)?;
    if verbose {
        eprintln!(
            "Loaded {} contigs from {}",
            catalog.len(),
            catalog.path().display()
        );
    }

    match format {
        OutputFormat::Text => print_text(&catalog),
        OutputFormat::Json => print_json(&catalog)?,
        OutputFormat::Tsv => print_tsv(&catalog),
    }

    catalog.unload();
    plugin.shutdown()?;
    Ok(())
}

fn print_text(catalog: &ReferenceCatalog) {
    println!(
        "Reference: {} ({} contigs)\n",
        catalog.path().display(),
        catalog.len()
    );
    println!("{:<25} {:>15} MD5", "Name", "Length");
    println!("{}", "-".repeat(80));
    for contig in catalog {
        println!(
            "{:<25} {:>15} {}",
            contig.name,
            contig.length,
            contig.md5.as_deref().unwrap_or("-")
        );
    }
}

fn print_json(catalog: &ReferenceCatalog) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "path": catalog.path().display().to_string(),
        "contig_count": catalog.len(),
        "contigs": catalog.contigs(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv(catalog: &ReferenceCatalog) {
    println!("name\tlength\tmd5\tassembly\tspecies\turi");
    for contig in catalog {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            contig.name,
            contig.length,
            contig.md5.as_deref().unwrap_or(""),
            contig.assembly_identifier.as_deref().unwrap_or(""),
            contig.species.as_deref().unwrap_or(""),
            contig.uri.as_deref().unwrap_or("")
        );
    }
}
