//! Engineered features derived from part records or ad-hoc query input.
//!
//! Extraction never fails: malformed sizes become `None`, missing fields
//! become empty strings. Quoting decisions downstream rely on that
//! degradation instead of error paths.

use crate::record::PartRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Volume threshold below which a part is Small, in mm^3.
pub const SMALL_VOLUME_MM3: f64 = 1_000.0;
/// Volume threshold below which a part is Medium, in mm^3.
pub const MEDIUM_VOLUME_MM3: f64 = 100_000.0;

/// Size bucket, a pure function of parsed volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeLabel {
    Small,
    Medium,
    Large,
    Unknown,
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SizeLabel::Small => "Small",
            SizeLabel::Medium => "Medium",
            SizeLabel::Large => "Large",
            SizeLabel::Unknown => "Unknown",
        };
        f.write_str(s)
    }
}

/// Parse a dimension string like `"100x50x5"` or `"100x50x5 mm"` into a
/// volume in mm^3.
///
/// Accepts `x`, `X`, or `*` separators. Returns `None` for anything other
/// than exactly three positive numeric tokens; malformed input never raises.
pub fn parse_volume(size: &str) -> Option<f64> {
    let cleaned = size.to_lowercase().replace("mm", "");
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut dims = Vec::with_capacity(3);
    for token in trimmed.split(['x', '*']) {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let value: f64 = token.parse().ok()?;
        if !value.is_finite() || value <= 0.0 {
            return None;
        }
        dims.push(value);
    }

    if dims.len() == 3 {
        Some(dims[0] * dims[1] * dims[2])
    } else {
        None
    }
}

/// Bucket a parsed volume into a size label.
pub fn size_label(volume_mm3: Option<f64>) -> SizeLabel {
    match volume_mm3 {
        None => SizeLabel::Unknown,
        Some(v) if v < SMALL_VOLUME_MM3 => SizeLabel::Small,
        Some(v) if v < MEDIUM_VOLUME_MM3 => SizeLabel::Medium,
        Some(_) => SizeLabel::Large,
    }
}

/// Count comma-separated operations, discarding blank segments.
pub fn count_operations(operations: &str) -> usize {
    operations
        .split(',')
        .filter(|op| !op.trim().is_empty())
        .count()
}

/// Canonical engineered features for a part.
///
/// Recomputed from a stored record or ad-hoc user input, never stored
/// independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartFeatures {
    pub material: String,
    pub size_raw: String,
    pub volume_mm3: Option<f64>,
    pub size_label: SizeLabel,
    pub operations: String,
    pub operations_count: usize,
    pub finish: String,
    pub target_price: Option<f64>,
}

impl PartFeatures {
    /// Derive features from raw field values.
    ///
    /// Material is trimmed and capitalized; finish and price pass through
    /// unchanged. Missing values arrive as empty strings / `None` and stay
    /// that way.
    pub fn from_fields(
        material: &str,
        size: &str,
        operations: &str,
        finish: &str,
        target_price: Option<f64>,
    ) -> Self {
        let size_raw = size.trim().to_string();
        let operations = operations.trim().to_string();
        let volume_mm3 = parse_volume(&size_raw);

        Self {
            material: capitalize(material),
            volume_mm3,
            size_label: size_label(volume_mm3),
            operations_count: count_operations(&operations),
            operations,
            size_raw,
            finish: finish.trim().to_string(),
            target_price,
        }
    }

    pub fn from_record(record: &PartRecord) -> Self {
        Self::from_fields(
            &record.material,
            &record.size,
            &record.operations,
            &record.finish,
            record.target_price,
        )
    }

    /// Whether any machining operation is named. `"none"` counts as absent.
    pub fn has_operations(&self) -> bool {
        self.operations_count > 0 && !self.operations.eq_ignore_ascii_case("none")
    }

    /// Whether a finishing process is named. `"raw"` counts as absent.
    pub fn has_finish(&self) -> bool {
        !self.finish.is_empty()
            && !self.finish.eq_ignore_ascii_case("raw")
            && !self.finish.eq_ignore_ascii_case("none")
    }
}

/// Trim and capitalize the first character, lowercasing the rest.
fn capitalize(s: &str) -> String {
    let trimmed = s.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_volume_with_unit_suffix() {
        assert_eq!(parse_volume("100x50x5 mm"), Some(25_000.0));
    }

    #[test]
    fn test_parse_volume_separators() {
        assert_eq!(parse_volume("100X50X5"), Some(25_000.0));
        assert_eq!(parse_volume("100*50*5"), Some(25_000.0));
    }

    #[test]
    fn test_parse_volume_rejects_garbage() {
        assert_eq!(parse_volume("bad"), None);
        assert_eq!(parse_volume(""), None);
        assert_eq!(parse_volume("10xbadx5"), None);
    }

    #[test]
    fn test_parse_volume_wrong_token_count() {
        assert_eq!(parse_volume("10x5"), None);
        assert_eq!(parse_volume("10x5x2x1"), None);
    }

    #[test]
    fn test_parse_volume_rejects_non_positive_dimensions() {
        assert_eq!(parse_volume("10x0x5"), None);
        assert_eq!(parse_volume("10x-2x5"), None);
    }

    #[test]
    fn test_size_label_thresholds() {
        assert_eq!(size_label(Some(500.0)), SizeLabel::Small);
        assert_eq!(size_label(Some(5_000.0)), SizeLabel::Medium);
        assert_eq!(size_label(Some(500_000.0)), SizeLabel::Large);
        assert_eq!(size_label(None), SizeLabel::Unknown);
    }

    #[test]
    fn test_count_operations() {
        assert_eq!(count_operations("Drilling"), 1);
        assert_eq!(count_operations("drilling, milling, turning"), 3);
        assert_eq!(count_operations("drilling,, ,milling"), 2);
        assert_eq!(count_operations(""), 0);
    }

    #[test]
    fn test_from_fields_normalizes_material() {
        let features = PartFeatures::from_fields("  aluminum ", "100x50x5", "drilling", "anodized", Some(60.0));
        assert_eq!(features.material, "Aluminum");
        assert_eq!(features.volume_mm3, Some(25_000.0));
        assert_eq!(features.size_label, SizeLabel::Medium);
        assert_eq!(features.operations_count, 1);
        assert_eq!(features.target_price, Some(60.0));
    }

    #[test]
    fn test_from_fields_tolerates_missing_values() {
        let features = PartFeatures::from_fields("", "", "", "", None);
        assert_eq!(features.material, "");
        assert_eq!(features.volume_mm3, None);
        assert_eq!(features.size_label, SizeLabel::Unknown);
        assert_eq!(features.operations_count, 0);
        assert!(!features.has_operations());
        assert!(!features.has_finish());
    }

    #[test]
    fn test_none_and_raw_markers() {
        let features = PartFeatures::from_fields("Plastic", "80x60x3", "none", "raw", None);
        assert!(!features.has_operations());
        assert!(!features.has_finish());

        let features = PartFeatures::from_fields("Plastic", "80x60x3", "drilling", "anodized", None);
        assert!(features.has_operations());
        assert!(features.has_finish());
    }
}
