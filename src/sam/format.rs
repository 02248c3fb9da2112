//! Render references and aligned fragments as SAM text.
//!
//! Every record of a fragment depends on its mate (flags, mate columns and
//! template length), so formatting always works on a whole fragment. Only
//! single-end and paired-end fragments can be rendered.
//!
//! Returned text never ends with a newline; callers add line terminators.

use std::fmt::Write as _;

use crate::core::alignment::{insert_size, AlignmentRecord};
use crate::core::batch::ReadBatch;
use crate::core::cigar::CigarOp;
use crate::core::read::Read;
use crate::core::reference::{ContigRef, ReferenceCatalog};
use crate::core::tag::format_tag;
use crate::error::{Error, Result};
use crate::plugin::AlignerPlugin;
use crate::utils::validation::reverse_complement;

pub const SAM_VERSION: &str = "1.6";

const FLAG_PAIRED: u16 = 0x1;
const FLAG_PROPER_PAIR: u16 = 0x2;
const FLAG_UNMAPPED: u16 = 0x4;
const FLAG_MATE_UNMAPPED: u16 = 0x8;
const FLAG_REVERSE: u16 = 0x10;
const FLAG_MATE_REVERSE: u16 = 0x20;
const FLAG_FIRST: u16 = 0x40;
const FLAG_SECOND: u16 = 0x80;
const FLAG_SECONDARY: u16 = 0x100;
const FLAG_SUPPLEMENTARY: u16 = 0x800;

/// `@HD` plus one `@SQ\tSN:<name>\tLN:<length>` line per contig, in catalog
/// order
#[must_use]
pub fn format_sam_header(catalog: &ReferenceCatalog) -> String {
    build_header(catalog, false)
}

/// Like [`format_sam_header`], but each `@SQ` line also carries the contig's
/// `AS`, `M5`, `SP` and `UR` values when they are known
#[must_use]
pub fn format_sam_header_with_metadata(catalog: &ReferenceCatalog) -> String {
    build_header(catalog, true)
}

fn build_header(catalog: &ReferenceCatalog, metadata: bool) -> String {
    let mut out = format!("@HD\tVN:{SAM_VERSION}\tSO:unsorted");
    for contig in catalog {
        if metadata {
            out.push_str("\n@SQ");
            for (tag, value) in contig.sam_fields() {
                let _ = write!(out, "\t{tag}:{value}");
            }
        } else {
            let _ = write!(out, "\n@SQ\tSN:{}\tLN:{}", contig.name, contig.length);
        }
    }
    out
}

/// [`format_sam_header`] followed by `@PG` and `@CO` lines naming the aligner
#[must_use]
pub fn format_sam_header_with_program(
    catalog: &ReferenceCatalog,
    plugin: &dyn AlignerPlugin,
) -> String {
    let name = plugin.aligner_name();
    let mut out = format_sam_header(catalog);
    let _ = write!(
        out,
        "\n@PG\tID:rapi ({name})\tPN:rapi ({name})\tVN:{} ({})",
        plugin.plugin_version(),
        plugin.aligner_version()
    );
    out.push_str(
        "\n@CO\tFile generated through the RAPI aligner interface using the specified aligner plug-in",
    );
    out
}

/// SAM records of the fragment whose first read has the flat index `start_read`
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if the batch is neither single- nor
/// paired-end, if `start_read` is not the first read of a fragment, or if an
/// alignment refers to another reference; `Error::Index` if there is no
/// complete fragment at `start_read`.
pub fn format_sam(catalog: &ReferenceCatalog, batch: &ReadBatch, start_read: usize) -> Result<String> {
    let stride = batch.n_reads_per_fragment();
    check_stride(stride)?;
    if start_read % stride != 0 {
        return Err(Error::invalid(format!(
            "read {start_read} does not start a {stride}-read fragment"
        )));
    }

    let index = start_read / stride;
    if index >= batch.n_fragments() {
        return Err(Error::Index {
            what: "read",
            index: start_read,
            bound: batch.n_fragments() * stride,
        });
    }

    let fragment = batch.fragment(index)?;
    let reads: Vec<&Read> = fragment.iter().collect();
    format_sam_fragment(catalog, &reads)
}

/// SAM records of every complete fragment of `batch`, one per line
///
/// # Errors
///
/// See [`format_sam`].
pub fn format_sam_batch(catalog: &ReferenceCatalog, batch: &ReadBatch) -> Result<String> {
    check_stride(batch.n_reads_per_fragment())?;
    let mut lines = Vec::with_capacity(batch.n_fragments());
    for fragment in batch {
        let reads: Vec<&Read> = fragment.iter().collect();
        lines.push(format_sam_fragment(catalog, &reads)?);
    }
    Ok(lines.join("\n"))
}

/// SAM records of one fragment given as its reads in mate order.
///
/// Each read yields one line per alignment, or a single unmapped line when
/// it has no alignments.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` unless there are 1 or 2 reads, or if an
/// alignment refers to another reference.
pub fn format_sam_fragment(catalog: &ReferenceCatalog, reads: &[&Read]) -> Result<String> {
    let mut out = String::new();
    match *reads {
        [read] => format_read(&mut out, catalog, read, None, 0)?,
        [first, second] => {
            format_read(&mut out, catalog, first, Some(second), FLAG_FIRST)?;
            out.push('\n');
            format_read(&mut out, catalog, second, Some(first), FLAG_SECOND)?;
        }
        _ => return Err(stride_error(reads.len())),
    }
    Ok(out)
}

fn stride_error(stride: usize) -> Error {
    Error::invalid(format!(
        "only single and paired reads can be written as SAM (got {stride} reads per fragment)"
    ))
}

fn check_stride(stride: usize) -> Result<()> {
    if (1..=2).contains(&stride) {
        Ok(())
    } else {
        Err(stride_error(stride))
    }
}

fn format_read(
    out: &mut String,
    catalog: &ReferenceCatalog,
    read: &Read,
    mate: Option<&Read>,
    order_flag: u16,
) -> Result<()> {
    if read.n_alignments() == 0 {
        return format_record(out, catalog, read, None, mate, order_flag);
    }
    for i in 0..read.n_alignments() {
        if i > 0 {
            out.push('\n');
        }
        format_record(out, catalog, read, Some(i), mate, order_flag)?;
    }
    Ok(())
}

/// Where a record sits, possibly borrowed from its mate
#[derive(Debug, Clone, Copy)]
struct Placement {
    contig: Option<ContigRef>,
    position: u64,
    reverse: bool,
}

impl Placement {
    fn of(aln: &AlignmentRecord) -> Self {
        Self {
            contig: aln.contig_ref(),
            position: aln.position(),
            reverse: aln.reverse_strand(),
        }
    }
}

fn contig_name(catalog: &ReferenceCatalog, contig: ContigRef) -> Result<&str> {
    catalog
        .resolve(contig)
        .map(|c| c.name.as_str())
        .ok_or_else(|| Error::invalid("alignment refers to a contig of another reference"))
}

fn format_record(
    out: &mut String,
    catalog: &ReferenceCatalog,
    read: &Read,
    aln_index: Option<usize>,
    mate: Option<&Read>,
    order_flag: u16,
) -> Result<()> {
    let unaligned = AlignmentRecord::unmapped();
    let aln = match aln_index {
        Some(i) => read.get_aln(i)?,
        None => &unaligned,
    };
    let mate_aln = mate
        .and_then(|m| m.alignments().first())
        .unwrap_or(&unaligned);
    let paired = mate.is_some();

    let mut placement = Placement::of(aln);
    let mut mate_placement = Placement::of(mate_aln);
    if paired {
        if !aln.mapped() && mate_aln.mapped() {
            placement = mate_placement;
        } else if aln.mapped() && !mate_aln.mapped() {
            mate_placement = placement;
        }
    }

    let supplementary = aln_index.is_some_and(|i| i > 0) && !aln.secondary();

    let mut flag = order_flag;
    if paired {
        flag |= FLAG_PAIRED;
        if !mate_aln.mapped() {
            flag |= FLAG_MATE_UNMAPPED;
        }
        if mate_placement.reverse {
            flag |= FLAG_MATE_REVERSE;
        }
    }
    if !aln.mapped() {
        flag |= FLAG_UNMAPPED;
    }
    if placement.reverse {
        flag |= FLAG_REVERSE;
    }
    if aln.mapped() {
        if aln.prop_paired() {
            flag |= FLAG_PROPER_PAIR;
        }
        if aln.secondary() {
            flag |= FLAG_SECONDARY;
        }
    }
    if supplementary {
        flag |= FLAG_SUPPLEMENTARY;
    }

    let _ = write!(out, "{}\t{flag}\t", read.id());

    match placement.contig {
        Some(contig) => {
            let _ = write!(
                out,
                "{}\t{}\t{}\t{}",
                contig_name(catalog, contig)?,
                placement.position + 1,
                aln.mapq(),
                aln.cigar().render(supplementary)
            );
        }
        None => out.push_str("*\t0\t0\t*"),
    }
    out.push('\t');

    match mate_placement.contig {
        Some(mate_contig) => {
            let same_contig = placement.contig == Some(mate_contig);
            if same_contig {
                out.push('=');
            } else {
                out.push_str(contig_name(catalog, mate_contig)?);
            }
            let tlen = if aln.mapped() && same_contig {
                insert_size(aln, mate_aln)?
            } else {
                0
            };
            let _ = write!(out, "\t{}\t{tlen}", mate_placement.position + 1);
        }
        None => out.push_str("*\t0\t0"),
    }
    out.push('\t');

    if aln.secondary() {
        out.push_str("*\t*");
    } else {
        push_seq_qual(out, read, aln, supplementary, placement.reverse);
    }

    if !aln.cigar().is_empty() {
        let _ = write!(out, "\tNM:i:{}", aln.n_mismatches());
    }
    if aln.score() >= 0 {
        let _ = write!(out, "\tAS:i:{}", aln.score());
    }
    for (key, value) in aln.extra_tags() {
        out.push('\t');
        out.push_str(&format_tag(key, value));
    }

    Ok(())
}

/// SEQ and QUAL columns; supplementary records drop their clipped bases.
fn push_seq_qual(
    out: &mut String,
    read: &Read,
    aln: &AlignmentRecord,
    supplementary: bool,
    reverse: bool,
) {
    let clip_len = |op: Option<CigarOp>| -> usize {
        match op {
            Some(op) if supplementary && op.kind.is_clip() => op.len as usize,
            _ => 0,
        }
    };
    let front_trim = clip_len(aln.cigar().first());
    let rear_trim = clip_len(aln.cigar().last());

    // CIGAR order runs along the reference, so on the reverse strand the
    // leading clip is at the end of the stored sequence.
    let len = read.len();
    let (start, end) = if reverse {
        (rear_trim, len.saturating_sub(front_trim))
    } else {
        (front_trim, len.saturating_sub(rear_trim))
    };
    let start = start.min(end);

    let seq = &read.seq()[start..end];
    let qual = read.qual().map(|q| &q[start..end]);

    if reverse {
        out.push_str(&reverse_complement(seq).to_ascii_uppercase());
        out.push('\t');
        match qual {
            Some(q) => out.extend(q.chars().rev()),
            None => out.push('*'),
        }
    } else {
        out.push_str(seq);
        out.push('\t');
        out.push_str(qual.unwrap_or("*"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::Contig;
    use crate::core::quality::QualityEncoding;
    use crate::error::ErrorKind;

    fn catalog() -> ReferenceCatalog {
        ReferenceCatalog::new(
            "mem.fa",
            vec![
                Contig::new("chr1", 100_000).with_md5("6aef897c3d6ff0c78aff06ac189178dd"),
                Contig::new("chr2", 500),
            ],
        )
        .unwrap()
    }

    fn single(seq: &str, qual: Option<&str>) -> ReadBatch {
        let mut batch = ReadBatch::new(1).unwrap();
        batch.append("r1", seq, qual, QualityEncoding::Sanger).unwrap();
        batch
    }

    fn pair() -> ReadBatch {
        let mut batch = ReadBatch::new(2).unwrap();
        batch
            .append("p1", "ACGT", Some("ABCD"), QualityEncoding::Sanger)
            .unwrap();
        batch
            .append("p1", "ACGG", Some("ABCD"), QualityEncoding::Sanger)
            .unwrap();
        batch
    }

    #[test]
    fn test_header() {
        let header = format_sam_header(&catalog());
        assert_eq!(
            header,
            "@HD\tVN:1.6\tSO:unsorted\n\
             @SQ\tSN:chr1\tLN:100000\n\
             @SQ\tSN:chr2\tLN:500"
        );
    }

    #[test]
    fn test_header_with_metadata() {
        let header = format_sam_header_with_metadata(&catalog());
        assert_eq!(
            header,
            "@HD\tVN:1.6\tSO:unsorted\n\
             @SQ\tSN:chr1\tLN:100000\tM5:6aef897c3d6ff0c78aff06ac189178dd\n\
             @SQ\tSN:chr2\tLN:500"
        );
    }

    #[test]
    fn test_header_with_program() {
        let plugin = crate::plugin::null::NullPlugin::new();
        let header = format_sam_header_with_program(&catalog(), &plugin);
        let lines: Vec<&str> = header.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[3].starts_with("@PG\tID:rapi (null)\tPN:rapi (null)\tVN:"));
        assert!(lines[4].starts_with("@CO\t"));
    }

    #[test]
    fn test_unaligned_single_read() {
        let batch = single("ACGT", Some("EEEE"));
        assert_eq!(
            format_sam(&catalog(), &batch, 0).unwrap(),
            "r1\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\tEEEE\tAS:i:0"
        );
    }

    #[test]
    fn test_missing_quality() {
        let cat = catalog();
        let mut batch = single("ACGT", None);
        let aln = AlignmentRecord::aligned(cat.contig_ref(1).unwrap(), 9)
            .with_cigar("4M".parse().unwrap())
            .with_mapq(37)
            .with_score(4)
            .with_counts(1, 0, 0);
        batch.set_alignments(0, 0, vec![aln]).unwrap();

        assert_eq!(
            format_sam(&cat, &batch, 0).unwrap(),
            "r1\t0\tchr2\t10\t37\t4M\t*\t0\t0\tACGT\t*\tNM:i:1\tAS:i:4"
        );
    }

    #[test]
    fn test_proper_pair() {
        let cat = catalog();
        let mut batch = pair();
        let chr1 = cat.contig_ref(0).unwrap();
        let r1 = AlignmentRecord::aligned(chr1, 32460)
            .with_cigar("60M".parse().unwrap())
            .with_mapq(60)
            .with_score(60)
            .with_proper_pair(true);
        let r2 = AlignmentRecord::aligned(chr1, 32521)
            .with_cigar("60M".parse().unwrap())
            .with_mapq(60)
            .with_score(60)
            .with_proper_pair(true)
            .with_reverse_strand(true);
        batch.set_alignments(0, 0, vec![r1]).unwrap();
        batch.set_alignments(0, 1, vec![r2]).unwrap();

        let sam = format_sam(&cat, &batch, 0).unwrap();
        let lines: Vec<&str> = sam.lines().collect();
        assert_eq!(
            lines[0],
            "p1\t99\tchr1\t32461\t60\t60M\t=\t32522\t121\tACGT\tABCD\tNM:i:0\tAS:i:60"
        );
        assert_eq!(
            lines[1],
            "p1\t147\tchr1\t32522\t60\t60M\t=\t32461\t-121\tCCGT\tDCBA\tNM:i:0\tAS:i:60"
        );
    }

    #[test]
    fn test_mate_unmapped_shares_coordinates() {
        let cat = catalog();
        let mut batch = pair();
        let mapped = AlignmentRecord::aligned(cat.contig_ref(0).unwrap(), 99)
            .with_cigar("4M".parse().unwrap())
            .with_mapq(20);
        batch.set_alignments(0, 0, vec![mapped]).unwrap();
        batch
            .set_alignments(0, 1, vec![AlignmentRecord::unmapped()])
            .unwrap();

        let sam = format_sam(&cat, &batch, 0).unwrap();
        let lines: Vec<&str> = sam.lines().collect();
        assert_eq!(
            lines[0],
            "p1\t73\tchr1\t100\t20\t4M\t=\t100\t0\tACGT\tABCD\tNM:i:0\tAS:i:0"
        );
        assert_eq!(
            lines[1],
            "p1\t133\tchr1\t100\t0\t*\t=\t100\t0\tACGG\tABCD\tAS:i:0"
        );
    }

    #[test]
    fn test_mates_on_different_contigs() {
        let cat = catalog();
        let mut batch = pair();
        let r1 = AlignmentRecord::aligned(cat.contig_ref(0).unwrap(), 0)
            .with_cigar("4M".parse().unwrap());
        let r2 = AlignmentRecord::aligned(cat.contig_ref(1).unwrap(), 7)
            .with_cigar("4M".parse().unwrap());
        batch.set_alignments(0, 0, vec![r1]).unwrap();
        batch.set_alignments(0, 1, vec![r2]).unwrap();

        let sam = format_sam(&cat, &batch, 0).unwrap();
        let first: Vec<&str> = sam.lines().next().unwrap().split('\t').collect();
        assert_eq!(&first[6..9], &["chr2", "8", "0"]);
    }

    #[test]
    fn test_supplementary_forces_hard_clips() {
        let cat = catalog();
        let mut batch = single("AACCGGTT", Some("ABCDEFGH"));
        let primary = AlignmentRecord::aligned(cat.contig_ref(0).unwrap(), 10)
            .with_cigar("8M".parse().unwrap());
        let forward = AlignmentRecord::aligned(cat.contig_ref(1).unwrap(), 5)
            .with_cigar("2S4M2S".parse().unwrap());
        let reverse = AlignmentRecord::aligned(cat.contig_ref(1).unwrap(), 50)
            .with_cigar("3S5M".parse().unwrap())
            .with_reverse_strand(true);
        batch
            .set_alignments(0, 0, vec![primary, forward, reverse])
            .unwrap();

        let sam = format_sam(&cat, &batch, 0).unwrap();
        let lines: Vec<Vec<&str>> = sam.lines().map(|l| l.split('\t').collect()).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0][1], "0");
        assert_eq!(lines[0][9], "AACCGGTT");

        assert_eq!(lines[1][1], "2048");
        assert_eq!(lines[1][5], "2H4M2H");
        assert_eq!(lines[1][9], "CCGG");
        assert_eq!(lines[1][10], "CDEF");

        assert_eq!(lines[2][1], "2064");
        assert_eq!(lines[2][5], "3H5M");
        assert_eq!(lines[2][9], "CGGTT");
        assert_eq!(lines[2][10], "EDCBA");
    }

    #[test]
    fn test_secondary_omits_sequence() {
        let cat = catalog();
        let mut batch = single("AACCGGTT", Some("ABCDEFGH"));
        let primary = AlignmentRecord::aligned(cat.contig_ref(0).unwrap(), 10)
            .with_cigar("8M".parse().unwrap());
        let secondary = AlignmentRecord::aligned(cat.contig_ref(1).unwrap(), 5)
            .with_cigar("2S6M".parse().unwrap())
            .with_secondary(true);
        batch.set_alignments(0, 0, vec![primary, secondary]).unwrap();

        let sam = format_sam(&cat, &batch, 0).unwrap();
        let second: Vec<&str> = sam.lines().nth(1).unwrap().split('\t').collect();
        assert_eq!(second[1], "256");
        assert_eq!(second[5], "2S6M");
        assert_eq!(&second[9..11], &["*", "*"]);
    }

    #[test]
    fn test_extra_tags_in_insertion_order() {
        let cat = catalog();
        let mut batch = single("ACGT", Some("EEEE"));
        let aln = AlignmentRecord::aligned(cat.contig_ref(0).unwrap(), 0)
            .with_cigar("4M".parse().unwrap())
            .with_score(-1)
            .with_tag("MD", "4")
            .unwrap()
            .with_tag("XS", 12)
            .unwrap()
            .with_tag("XF", 0.5)
            .unwrap();
        batch.set_alignments(0, 0, vec![aln]).unwrap();

        let sam = format_sam(&cat, &batch, 0).unwrap();
        assert!(sam.ends_with("\tEEEE\tNM:i:0\tMD:Z:4\tXS:i:12\tXF:f:0.500000"));
    }

    #[test]
    fn test_foreign_contig() {
        let cat = catalog();
        let other = catalog();
        let mut batch = single("ACGT", None);
        let aln = AlignmentRecord::aligned(other.contig_ref(0).unwrap(), 0)
            .with_cigar("4M".parse().unwrap());
        batch.set_alignments(0, 0, vec![aln]).unwrap();

        let err = format_sam(&cat, &batch, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_start_read_checks() {
        let cat = catalog();
        let batch = pair();
        assert_eq!(
            format_sam(&cat, &batch, 1).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(format_sam(&cat, &batch, 2).unwrap_err().kind(), ErrorKind::Index);

        let mut triple = ReadBatch::new(3).unwrap();
        for _ in 0..3 {
            triple.append("t", "A", None, QualityEncoding::Sanger).unwrap();
        }
        assert_eq!(
            format_sam(&cat, &triple, 0).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );
    }

    #[test]
    fn test_format_batch() {
        let mut batch = ReadBatch::new(1).unwrap();
        batch.append("a", "AC", None, QualityEncoding::Sanger).unwrap();
        batch.append("b", "GT", None, QualityEncoding::Sanger).unwrap();

        let sam = format_sam_batch(&catalog(), &batch).unwrap();
        let names: Vec<&str> = sam.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
