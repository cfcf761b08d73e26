//! Upload gate: decide whether an upload needs re-encoding at all.
//!
//! Uploads that are already small in bytes and pixels go to the service
//! untouched; oversized ones are routed through the size-targeting
//! compressor.

use serde::{Deserialize, Serialize};

/// Thresholds above which an upload is re-encoded before submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPolicy {
    /// Raw uploads larger than this many bytes are re-encoded.
    pub max_raw_bytes: usize,
    /// Uploads with a longer side above this many pixels are re-encoded.
    pub max_dimension: u32,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            // 1.5 MiB
            max_raw_bytes: 3 * 1024 * 1024 / 2,
            max_dimension: 2048,
        }
    }
}

/// Why an upload was routed through compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntakeReason {
    /// Raw byte size above the policy threshold.
    FileSize,
    /// Pixel dimensions above the policy threshold.
    HighResolution,
}

impl IntakeReason {
    /// Human-readable label for status output.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntakeReason::FileSize => "file size",
            IntakeReason::HighResolution => "high resolution",
        }
    }
}

/// Outcome of assessing an upload against an [`UploadPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntakeDecision {
    /// Route through [`compress_to_target`](crate::compress_to_target).
    Compress {
        /// Which thresholds were exceeded.
        reasons: Vec<IntakeReason>,
    },
    /// Already small enough to submit as-is.
    KeepOriginal,
}

impl IntakeDecision {
    /// True when the upload should be re-encoded.
    pub fn requires_compression(&self) -> bool {
        matches!(self, IntakeDecision::Compress { .. })
    }
}

/// Assess an upload's raw size and pixel dimensions against a policy.
pub fn assess_upload(
    size_bytes: usize,
    width: u32,
    height: u32,
    policy: &UploadPolicy,
) -> IntakeDecision {
    let mut reasons = Vec::new();
    if size_bytes > policy.max_raw_bytes {
        reasons.push(IntakeReason::FileSize);
    }
    if width.max(height) > policy.max_dimension {
        reasons.push(IntakeReason::HighResolution);
    }

    if reasons.is_empty() {
        IntakeDecision::KeepOriginal
    } else {
        IntakeDecision::Compress { reasons }
    }
}
