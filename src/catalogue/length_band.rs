// ==========================================
// Fieldwork costing - interview length band parser
// ==========================================
// "< N min|phút" -> (0, N-1)
// "> N min|phút" -> (N+1, 999)
// "A-B ..."      -> (A, B)
// "N"            -> (N, N)
// anything else  -> (0, 60)
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound used for open-ended "> N" bands
pub const OPEN_BAND_MAX: u32 = 999;

/// Range assumed for labels that do not parse
pub const FALLBACK_RANGE: LengthRange = LengthRange { min: 0, max: 60 };

static LESS_THAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^<\s*(\d+)\s*(min|phút)?$").expect("valid regex"));
static GREATER_THAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^>\s*(\d+)\s*(min|phút)?$").expect("valid regex"));
static RANGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\s*-\s*(\d+)").expect("valid regex"));
static BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)$").expect("valid regex"));

/// Inclusive interview-length interval in minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LengthRange {
    pub min: u32,
    pub max: u32,
}

impl LengthRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, minutes: u32) -> bool {
        self.min <= minutes && minutes <= self.max
    }

    /// Canonical label used when rebuilding bands from stored ranges
    pub fn label(&self) -> String {
        if self.min == 0 {
            format!("< {} phút", self.max + 1)
        } else if self.max >= OPEN_BAND_MAX {
            format!("> {} phút", self.min.saturating_sub(1))
        } else {
            format!("{}-{} phút", self.min, self.max)
        }
    }
}

impl From<LengthRange> for (u32, u32) {
    fn from(r: LengthRange) -> Self {
        (r.min, r.max)
    }
}

fn capture_u32(re: &Regex, s: &str, group: usize) -> Option<u32> {
    re.captures(s)?.get(group)?.as_str().parse().ok()
}

/// Parse a duration band label (case-insensitive, trimmed)
pub fn parse_length_band(label: &str) -> LengthRange {
    let s = label.trim().to_lowercase();

    if let Some(n) = capture_u32(&LESS_THAN, &s, 1) {
        return LengthRange::new(0, n.saturating_sub(1));
    }
    if let Some(n) = capture_u32(&GREATER_THAN, &s, 1) {
        return LengthRange::new(n.saturating_add(1), OPEN_BAND_MAX);
    }
    if let Some(caps) = RANGE.captures(&s) {
        let lo = caps.get(1).and_then(|m| m.as_str().parse().ok());
        let hi = caps.get(2).and_then(|m| m.as_str().parse().ok());
        if let (Some(lo), Some(hi)) = (lo, hi) {
            return LengthRange::new(lo, hi);
        }
    }
    if let Some(n) = capture_u32(&BARE, &s, 1) {
        return LengthRange::new(n, n);
    }

    FALLBACK_RANGE
}
