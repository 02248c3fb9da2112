use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::sam::{ComparisonReport, SamComparator};

#[derive(Args)]
pub struct CompareArgs {
    /// First SAM file
    #[arg(required = true)]
    pub sam_a: PathBuf,

    /// Second SAM file
    #[arg(required = true)]
    pub sam_b: PathBuf,
}

/// Compare the two files; returns whether they are equal
pub fn run(args: CompareArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<bool> {
    let report = SamComparator::compare_files(&args.sam_a, &args.sam_b)?;

    if verbose {
        eprintln!(
            "Compared {} records ({} mismatches)",
            report.records_compared,
            report.mismatches.len()
        );
    }

    match format {
        OutputFormat::Text => print_text_report(&args, &report),
        OutputFormat::Json => print_json_report(&args, &report)?,
        OutputFormat::Tsv => print_tsv_report(&report),
    }

    Ok(report.is_equal())
}

fn print_text_report(args: &CompareArgs, report: &ComparisonReport) {
    for mismatch in &report.mismatches {
        println!("{mismatch}");
    }
    if !report.headers_equal {
        println!("headers are different");
    }

    if report.is_equal() {
        println!(
            "{} and {} are equal ({} records)",
            args.sam_a.display(),
            args.sam_b.display(),
            report.records_compared
        );
    } else {
        println!(
            "{} and {} differ ({} mismatches in {} records)",
            args.sam_a.display(),
            args.sam_b.display(),
            report.mismatches.len(),
            report.records_compared
        );
    }
}

fn print_json_report(args: &CompareArgs, report: &ComparisonReport) -> anyhow::Result<()> {
    let output = serde_json::json!({
        "sam_a": args.sam_a.display().to_string(),
        "sam_b": args.sam_b.display().to_string(),
        "equal": report.is_equal(),
        "report": report,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_report(report: &ComparisonReport) {
    println!("equal\theaders_equal\trecords_compared\tmismatches");
    println!(
        "{}\t{}\t{}\t{}",
        report.is_equal(),
        report.headers_equal,
        report.records_compared,
        report.mismatches.len()
    );
}
