//! # Capture Comparator
//!
//! Lock-step comparison of two captured messages, typically the same protocol
//! step produced by two independent implementations.
//!
//! Each comparison is run twice: over the full bytes, and again after skipping
//! the 4-byte framing prefix of both sides. Header-only differences (packet
//! lengths) are expected, and the second pass keeps them from hiding payload
//! differences.
//!
//! Mismatches are data, not errors. The only failure is asking a
//! [`CaptureSet`] for a label it does not hold.

use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::serialization::MultiFormat;
use crate::error::{Result, WireError};
use crate::protocol::packet::FRAMING_PREFIX_LEN;

/// First differing byte of two sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteDiff {
    pub offset: usize,
    pub left: u8,
    pub right: u8,
}

/// Outcome of one lock-step comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Divergence {
    /// First offset, within the common length, where the bytes differ
    pub first_diff: Option<ByteDiff>,
    /// Length of the shorter sequence, when the lengths differ
    pub length_mismatch: Option<usize>,
}

impl Divergence {
    #[inline]
    pub fn first_diff_offset(&self) -> Option<usize> {
        self.first_diff.map(|d| d.offset)
    }

    #[inline]
    pub fn is_identical(&self) -> bool {
        self.first_diff.is_none() && self.length_mismatch.is_none()
    }

    /// Earliest point at which the sequences stop agreeing
    pub fn divergence_offset(&self) -> Option<usize> {
        match (self.first_diff_offset(), self.length_mismatch) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Compare two byte sequences in lock-step
pub fn compare(left: &[u8], right: &[u8]) -> Divergence {
    let first_diff = left
        .iter()
        .zip(right)
        .position(|(a, b)| a != b)
        .map(|offset| ByteDiff {
            offset,
            left: left[offset],
            right: right[offset],
        });
    let length_mismatch = (left.len() != right.len()).then(|| left.len().min(right.len()));

    Divergence {
        first_diff,
        length_mismatch,
    }
}

/// Full comparison report for two labeled captures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub left_label: String,
    pub right_label: String,
    pub left_len: usize,
    pub right_len: usize,
    /// Comparison over the complete sequences
    pub full: Divergence,
    /// Comparison after skipping the framing prefix; offsets are relative to it
    pub payload: Divergence,
}

impl MultiFormat for ComparisonReport {}

impl ComparisonReport {
    #[inline]
    pub fn is_identical(&self) -> bool {
        self.full.is_identical()
    }
}

fn past_prefix(seq: &[u8]) -> &[u8] {
    seq.get(FRAMING_PREFIX_LEN..).unwrap_or_default()
}

/// Compare two captures over the full bytes and past the framing prefix
pub fn compare_captures(
    left_label: &str,
    left: &[u8],
    right_label: &str,
    right: &[u8],
) -> ComparisonReport {
    let report = ComparisonReport {
        left_label: left_label.to_string(),
        right_label: right_label.to_string(),
        left_len: left.len(),
        right_len: right.len(),
        full: compare(left, right),
        payload: compare(past_prefix(left), past_prefix(right)),
    };
    debug!(
        left = left_label,
        right = right_label,
        divergence = ?report.full.divergence_offset(),
        "compared captures"
    );
    report
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Comparing {} ({} bytes) vs {} ({} bytes)",
            self.left_label, self.left_len, self.right_label, self.right_len
        )?;
        if let Some(diff) = self.full.first_diff {
            writeln!(
                f,
                "First divergence at offset {:#06x}: {:#04x} (A) vs {:#04x} (B)",
                diff.offset, diff.left, diff.right
            )?;
        }
        match self.full.length_mismatch {
            Some(offset) => writeln!(
                f,
                "Lengths differ; the shorter sequence ends at offset {offset:#06x}"
            )?,
            None if self.full.first_diff.is_none() => writeln!(f, "Sequences identical")?,
            None => {}
        }
        match self.payload.first_diff {
            Some(diff) => write!(
                f,
                "Payload divergence at offset {:#06x} (after {}-byte prefix): {:#04x} vs {:#04x}",
                diff.offset, FRAMING_PREFIX_LEN, diff.left, diff.right
            ),
            None => write!(
                f,
                "Payload identical over common length (after {FRAMING_PREFIX_LEN}-byte prefix)"
            ),
        }
    }
}

/// Captured messages keyed by label (e.g. `op9`, `auth-phase1`)
#[derive(Debug, Clone, Default)]
pub struct CaptureSet {
    captures: BTreeMap<String, Bytes>,
}

impl CaptureSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a capture, replacing any previous one with the same label
    pub fn insert(&mut self, label: impl Into<String>, data: impl Into<Bytes>) {
        self.captures.insert(label.into(), data.into());
    }

    pub fn get(&self, label: &str) -> Result<&Bytes> {
        self.captures
            .get(label)
            .ok_or_else(|| WireError::MissingCapture(label.to_string()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.captures.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Compare one of our captures against one from `other`
    ///
    /// # Errors
    /// Returns `WireError::MissingCapture` if either label is absent
    pub fn compare_with(
        &self,
        label: &str,
        other: &CaptureSet,
        other_label: &str,
    ) -> Result<ComparisonReport> {
        let left = self.get(label)?;
        let right = other.get(other_label)?;
        Ok(compare_captures(label, left, other_label, right))
    }
}
