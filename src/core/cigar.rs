use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Largest op length that fits the packed representation
pub const MAX_OP_LEN: u32 = (1 << 28) - 1;

/// CIGAR operation, numbered as in the BAM encoding (`MIDNSHP=X`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CigarKind {
    Match,
    Insertion,
    Deletion,
    Skip,
    SoftClip,
    HardClip,
    Pad,
    SequenceMatch,
    SequenceMismatch,
}

const KINDS: [CigarKind; 9] = [
    CigarKind::Match,
    CigarKind::Insertion,
    CigarKind::Deletion,
    CigarKind::Skip,
    CigarKind::SoftClip,
    CigarKind::HardClip,
    CigarKind::Pad,
    CigarKind::SequenceMatch,
    CigarKind::SequenceMismatch,
];

impl CigarKind {
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Self::Match => 'M',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
            Self::Skip => 'N',
            Self::SoftClip => 'S',
            Self::HardClip => 'H',
            Self::Pad => 'P',
            Self::SequenceMatch => '=',
            Self::SequenceMismatch => 'X',
        }
    }

    /// # Errors
    ///
    /// Returns `Error::Format` for a character that is not a CIGAR operation.
    pub fn from_symbol(symbol: char) -> Result<Self> {
        KINDS
            .iter()
            .copied()
            .find(|k| k.symbol() == symbol)
            .ok_or_else(|| Error::Format(format!("Unrecognized CIGAR operation '{symbol}'")))
    }

    fn code(self) -> u32 {
        match self {
            Self::Match => 0,
            Self::Insertion => 1,
            Self::Deletion => 2,
            Self::Skip => 3,
            Self::SoftClip => 4,
            Self::HardClip => 5,
            Self::Pad => 6,
            Self::SequenceMatch => 7,
            Self::SequenceMismatch => 8,
        }
    }

    /// Whether the operation consumes reference bases
    #[must_use]
    pub fn consumes_reference(self) -> bool {
        matches!(
            self,
            Self::Match | Self::Deletion | Self::Skip | Self::SequenceMatch | Self::SequenceMismatch
        )
    }

    #[must_use]
    pub fn is_clip(self) -> bool {
        matches!(self, Self::SoftClip | Self::HardClip)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CigarOp {
    pub kind: CigarKind,
    pub len: u32,
}

impl CigarOp {
    #[must_use]
    pub fn new(kind: CigarKind, len: u32) -> Self {
        Self { kind, len }
    }

    /// `(symbol, length)` pair, e.g. `('M', 60)`
    #[must_use]
    pub fn as_pair(&self) -> (char, u32) {
        (self.kind.symbol(), self.len)
    }
}

/// An alignment shape, stored packed as `len << 4 | op`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cigar(Vec<u32>);

impl Cigar {
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if an op length does not fit in 28 bits.
    pub fn from_ops(ops: impl IntoIterator<Item = CigarOp>) -> Result<Self> {
        let mut packed = Vec::new();
        for op in ops {
            if op.len > MAX_OP_LEN {
                return Err(Error::invalid(format!(
                    "CIGAR op length {} exceeds maximum {MAX_OP_LEN}",
                    op.len
                )));
            }
            packed.push((op.len << 4) | op.kind.code());
        }
        Ok(Self(packed))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Decoded operations, in order
    pub fn ops(&self) -> impl Iterator<Item = CigarOp> + '_ {
        self.0.iter().map(|&v| CigarOp {
            // codes are only ever written by `from_ops`
            kind: KINDS[(v & 0xf) as usize],
            len: v >> 4,
        })
    }

    #[must_use]
    pub fn first(&self) -> Option<CigarOp> {
        self.ops().next()
    }

    #[must_use]
    pub fn last(&self) -> Option<CigarOp> {
        self.ops().last()
    }

    /// Number of reference bases covered by the alignment
    #[must_use]
    pub fn reference_span(&self) -> u64 {
        self.ops()
            .filter(|op| op.kind.consumes_reference())
            .map(|op| u64::from(op.len))
            .sum()
    }

    /// Render the CIGAR, optionally writing every clip as a hard clip
    #[must_use]
    pub fn render(&self, force_hard_clip: bool) -> String {
        if self.is_empty() {
            return "*".to_string();
        }
        let mut out = String::with_capacity(self.len() * 4);
        for op in self.ops() {
            let kind = if force_hard_clip && op.kind.is_clip() {
                CigarKind::HardClip
            } else {
                op.kind
            };
            let _ = write!(out, "{}{}", op.len, kind.symbol());
        }
        out
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(false))
    }
}

impl FromStr for Cigar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "*" || s.is_empty() {
            return Ok(Self::default());
        }

        let mut ops = Vec::new();
        let mut len: Option<u32> = None;
        for c in s.chars() {
            if let Some(digit) = c.to_digit(10) {
                let next = len
                    .unwrap_or(0)
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(digit))
                    .ok_or_else(|| Error::Format(format!("CIGAR length overflow in '{s}'")))?;
                len = Some(next);
            } else {
                let kind = CigarKind::from_symbol(c)?;
                let op_len = len
                    .take()
                    .ok_or_else(|| Error::Format(format!("CIGAR op '{c}' without length in '{s}'")))?;
                ops.push(CigarOp::new(kind, op_len));
            }
        }
        if len.is_some() {
            return Err(Error::Format(format!("Trailing length in CIGAR '{s}'")));
        }
        Self::from_ops(ops)
    }
}
