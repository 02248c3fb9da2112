use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Args;
use tracing::info;

use crate::core::batch::ReadBatch;
use crate::core::quality::QualityEncoding;
use crate::parsing::reads::{FastqPairReader, FastqReader, FragmentReader, PrqReader};
use crate::plugin::{self, AlignerOptions};
use crate::sam::{format_sam_batch, format_sam_header_with_program};

/// Layout of the read input files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Tab-separated `ID SEQ1 QUAL1 [SEQ2 QUAL2]`, one fragment per line
    #[default]
    Prq,
    /// One FASTQ per mate (paired) or a single FASTQ per input (--se)
    Fastq,
    /// One FASTQ with mates alternating
    Interleaved,
}

#[derive(Args)]
pub struct AlignArgs {
    /// Reference FASTA file
    #[arg(required = true)]
    pub reference: PathBuf,

    /// Read files; prq is read from stdin when none are given
    pub input: Vec<PathBuf>,

    /// Single-end reads
    #[arg(long)]
    pub se: bool,

    /// Layout of the input files
    #[arg(long, value_enum, default_value_t = InputFormat::Prq)]
    pub input_format: InputFormat,

    /// Base qualities are Illumina (Phred+64) encoded
    #[arg(long)]
    pub illumina: bool,

    /// Number of fragments aligned per batch
    #[arg(long, default_value = "10000")]
    pub batch_size: usize,

    /// Name of the aligner plugin
    #[arg(long, default_value = plugin::null::PLUGIN_NAME)]
    pub plugin: String,

    /// JSON file with aligner options
    #[arg(long)]
    pub options: Option<PathBuf>,

    /// Number of aligner threads (overrides the options file)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Output SAM file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl AlignArgs {
    fn reads_per_fragment(&self) -> usize {
        if self.se {
            1
        } else {
            2
        }
    }

    fn encoding(&self) -> QualityEncoding {
        if self.illumina {
            QualityEncoding::Illumina
        } else {
            QualityEncoding::Sanger
        }
    }
}

pub fn run(args: AlignArgs, verbose: bool) -> anyhow::Result<()> {
    if args.batch_size == 0 {
        bail!("--batch-size must be at least 1");
    }
    let Some(batch_reads) = args.batch_size.checked_mul(args.reads_per_fragment()) else {
        bail!("--batch-size {} is too large", args.batch_size);
    };

    // Open inputs first so that bad paths fail before the reference is loaded
    let mut readers = open_readers(&args)?;

    let mut plugin = plugin::load_aligner(&args.plugin)?;
    let mut options = match &args.options {
        Some(path) => AlignerOptions::from_json_file(path)
            .with_context(|| format!("Failed to read options from {}", path.display()))?,
        None => plugin.load_options(),
    };
    if let Some(threads) = args.threads {
        options.n_threads = threads;
    }
    plugin.initialize(&options)?;
    info!(
        aligner = %plugin.aligner_name(),
        version = %plugin.aligner_version(),
        "Using aligner"
    );

    let reference = plugin.load_reference(&args.reference)?;
    let mut aligner = plugin.create_aligner(&options)?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    writeln!(out, "{}", format_sam_header_with_program(&reference, &*plugin))?;

    let reads_per_fragment = args.reads_per_fragment();
    info!(
        mode = if reads_per_fragment == 2 { "paired-end" } else { "single-end" },
        "Reading input"
    );

    let mut batch = ReadBatch::new(reads_per_fragment)?;
    batch.reserve(batch_reads)?;

    let mut total = 0;
    for reader in &mut readers {
        loop {
            batch.clear();
            let n = reader.read_fragments(&mut batch, args.batch_size)?;
            if n == 0 {
                break;
            }
            aligner.align(&reference, &mut batch)?;
            writeln!(out, "{}", format_sam_batch(&reference, &batch)?)?;
            total += n;
            if verbose {
                eprintln!("Aligned {total} fragments");
            }
        }
    }
    out.flush()?;

    info!(fragments = total, "Alignment finished");
    drop(aligner);
    reference.unload();
    plugin.shutdown()?;
    Ok(())
}

fn open_readers(args: &AlignArgs) -> anyhow::Result<Vec<Box<dyn FragmentReader>>> {
    let encoding = args.encoding();
    let mut readers: Vec<Box<dyn FragmentReader>> = Vec::new();

    match args.input_format {
        InputFormat::Prq => {
            let rpf = args.reads_per_fragment();
            if args.input.is_empty() {
                let stdin: Box<dyn BufRead> = Box::new(io::stdin().lock());
                readers.push(Box::new(PrqReader::new(stdin, rpf, encoding)?));
            }
            for path in &args.input {
                let reader = PrqReader::from_path(path, rpf, encoding)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                readers.push(Box::new(reader));
            }
        }
        InputFormat::Fastq if args.se => {
            if args.input.is_empty() {
                bail!("FASTQ input needs at least one file");
            }
            for path in &args.input {
                let reader = FastqReader::from_path(path, false, encoding)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                readers.push(Box::new(reader));
            }
        }
        InputFormat::Fastq => {
            let [first, second] = args.input.as_slice() else {
                bail!("paired FASTQ input needs exactly two files (or use --se)");
            };
            let reader = FastqPairReader::from_paths(first, second, encoding)
                .with_context(|| {
                    format!("Failed to open {} and {}", first.display(), second.display())
                })?;
            readers.push(Box::new(reader));
        }
        InputFormat::Interleaved => {
            if args.se {
                bail!("interleaved input is always paired-end; drop --se");
            }
            if args.input.is_empty() {
                bail!("interleaved FASTQ input needs at least one file");
            }
            for path in &args.input {
                let reader = FastqReader::from_path(path, true, encoding)
                    .with_context(|| format!("Failed to open {}", path.display()))?;
                readers.push(Box::new(reader));
            }
        }
    }

    Ok(readers)
}
