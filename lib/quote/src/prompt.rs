//! Few-shot prompt for the reasoning provider.
//!
//! The provider only proposes a distribution; every arithmetic constraint is
//! re-enforced deterministically afterwards. The prompt still states the
//! constraints so proposals start close to valid.

use quotx_features::PartFeatures;

/// Build the quoting prompt for one query/match pair.
pub fn quote_prompt(
    query_text: &str,
    matched_document: &str,
    matched_features: &PartFeatures,
    reference_price: f64,
) -> String {
    let features_json =
        serde_json::to_string(matched_features).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"Provide a detailed, logical, and transparent price breakdown for a new CNC part, using the closest past job as a reference.

Follow these rules strictly:

1. Anchor the Total Quote to the reference job's price (CHF {reference_price}). Do not invent new totals.
2. Base Material + Size Adjustment + Operations Fee + Finish Fee must equal the Total Quote.
3. Distribute the cost using the features:
   - Base Material scales with volume and material type (Steel > Aluminum > Plastic > ABS > Brass > Copper > Bronze).
   - Size Adjustment is higher for larger or unusually shaped parts.
   - Operations Fee grows with the number and complexity of operations (simple drilling < multiple operations < complex CNC machining).
   - Finish Fee applies only when the finish is not "raw"; higher for anodized, painted, polished, brushed, or tin plated.
4. If the new part is much smaller or simpler and the math gives a very low quote, apply the minimum total charge of CHF 10 to cover business overhead.
5. If the new part is more complex, explain that in the breakdown, but never raise the total above the reference price.
6. Never assign more than 60% to any single category.
7. If operations or finish are "none", set their fees to 0.
8. Output a one-line, specific explanation naming the dominant cost drivers.

Worked examples:

Example 1 (same features):
New part: "Aluminum bracket, 100x50x5 mm, drilling, anodized", reference price CHF 60.
{{"Base Material": 20, "Size Adjustment": 10, "Operations Fee": 20, "Finish Fee": 10, "Total Quote": 60, "Explanation": "Same features as reference, distributed by standard business logic."}}

Example 2 (much smaller part):
New part: "Aluminum bracket, 10x5x0.5 mm, drilling, anodized", reference price CHF 60.
{{"Base Material": 3, "Size Adjustment": 2, "Operations Fee": 3, "Finish Fee": 2, "Total Quote": 10, "Explanation": "Part is much smaller; minimum charge of CHF 10 applies to cover setup and handling."}}

Example 3 (more complex finish):
New part: "Aluminum bracket, 100x50x5 mm, drilling, anodized, polished, painted", reference price CHF 60.
{{"Base Material": 18, "Size Adjustment": 8, "Operations Fee": 17, "Finish Fee": 17, "Total Quote": 60, "Explanation": "Finish fee is higher due to multiple premium processes."}}

Example 4 (no operations, raw finish):
New part: "Plastic cover, 80x60x3 mm, none, raw", reference price CHF 10.
{{"Base Material": 7, "Size Adjustment": 3, "Operations Fee": 0, "Finish Fee": 0, "Total Quote": 10, "Explanation": "No operations or finish, so minimum business charge applies."}}

Example 5 (large part, cheap material):
New part: "ABS housing, 200x150x20 mm, injection molding, raw", reference price CHF 60.
{{"Base Material": 35, "Size Adjustment": 15, "Operations Fee": 7, "Finish Fee": 3, "Total Quote": 60, "Explanation": "Larger part, but ABS is lower cost; majority of cost in material and size."}}

Respond with only a valid JSON object (no markdown fences, no commentary) using exactly these keys: "Base Material", "Size Adjustment", "Operations Fee", "Finish Fee", "Total Quote", "Explanation".

Reference:
- New part: "{query_text}"
- Closest past part: "{matched_document}"
- Reference features: {features_json}
- Reference price: CHF {reference_price}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_reference_and_query() {
        let matched = PartFeatures::from_fields("Aluminum", "100x50x5", "drilling", "anodized", Some(60.0));
        let prompt = quote_prompt(
            "Steel gear, 30x30x10 mm, milling, painted",
            "Material: Aluminum | Size: 100x50x5 | ...",
            &matched,
            60.0,
        );

        assert!(prompt.contains("CHF 60"));
        assert!(prompt.contains("Steel gear, 30x30x10 mm, milling, painted"));
        assert!(prompt.contains("\"Total Quote\""));
        assert!(prompt.contains("minimum total charge of CHF 10"));
    }
}
