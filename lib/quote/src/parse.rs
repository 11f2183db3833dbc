//! Structural parsing of reasoning-provider responses.

use crate::breakdown::QuoteBreakdown;
use crate::error::QuoteError;

/// Parse a provider response into a breakdown.
///
/// Known wrapper markers (markdown code fences, leading commentary around a
/// single JSON object) are stripped before parsing. A response that still
/// fails structural parsing becomes [`QuoteError::UnparseableResponse`]
/// carrying the raw text; the caller decides whether to surface it verbatim
/// or retry.
pub fn parse_breakdown(raw: &str) -> Result<QuoteBreakdown, QuoteError> {
    let candidate = extract_object(strip_fences(raw)).ok_or_else(|| unparseable(raw, "no JSON object found"))?;

    serde_json::from_str(candidate).map_err(|e| unparseable(raw, &e.to_string()))
}

fn unparseable(raw: &str, reason: &str) -> QuoteError {
    QuoteError::UnparseableResponse {
        reason: reason.to_string(),
        raw: raw.to_string(),
    }
}

/// Strip markdown code fences, with or without a language tag.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the fence line (possibly "```json") and the closing fence.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

/// Slice out the outermost `{...}` object, tolerating surrounding prose.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_JSON: &str = r#"{"Base Material": 20, "Size Adjustment": 10, "Operations Fee": 20, "Finish Fee": 10, "Total Quote": 60, "Explanation": "Same features as reference."}"#;

    #[test]
    fn test_plain_json() {
        let breakdown = parse_breakdown(VALID_JSON).unwrap();
        assert_eq!(breakdown.total_quote, 60.0);
        assert_eq!(breakdown.base_material, 20.0);
    }

    #[test]
    fn test_fenced_json() {
        let fenced = format!("```json\n{VALID_JSON}\n```");
        let breakdown = parse_breakdown(&fenced).unwrap();
        assert_eq!(breakdown.total_quote, 60.0);
    }

    #[test]
    fn test_bare_fence() {
        let fenced = format!("```\n{VALID_JSON}\n```");
        assert!(parse_breakdown(&fenced).is_ok());
    }

    #[test]
    fn test_surrounding_prose() {
        let wrapped = format!("Here is the breakdown:\n{VALID_JSON}\nLet me know!");
        assert!(parse_breakdown(&wrapped).is_ok());
    }

    #[test]
    fn test_missing_explanation_defaults_empty() {
        let json = r#"{"Base Material": 20, "Size Adjustment": 10, "Operations Fee": 20, "Finish Fee": 10, "Total Quote": 60}"#;
        let breakdown = parse_breakdown(json).unwrap();
        assert!(breakdown.explanation.is_empty());
    }

    #[test]
    fn test_garbage_carries_raw_payload() {
        let raw = "I cannot produce a quote for this part.";
        let err = parse_breakdown(raw).unwrap_err();
        match err {
            QuoteError::UnparseableResponse { raw: carried, .. } => {
                assert_eq!(carried, raw);
            }
            other => panic!("expected UnparseableResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_object_carries_raw_payload() {
        let raw = r#"{"Base Material": "a lot", "Total Quote": 60}"#;
        let err = parse_breakdown(raw).unwrap_err();
        assert!(matches!(err, QuoteError::UnparseableResponse { .. }));
    }
}
