//! Cost-rank tables for materials, machining operations, and finishes.
//!
//! The orderings come from shop practice: structural metals cost more than
//! light metals, light metals more than plastics; simple drilling is cheaper
//! than multi-operation or full CNC work; premium finishes add real process
//! time while "raw" adds none.

/// Relative stock-cost rank of a material. Unknown materials sit mid-table.
pub fn material_rank(material: &str) -> f64 {
    match material.trim().to_lowercase().as_str() {
        "steel" | "stainless steel" => 1.0,
        "aluminum" | "aluminium" => 0.85,
        "plastic" => 0.6,
        "abs" => 0.55,
        "brass" => 0.5,
        "copper" => 0.45,
        "bronze" => 0.4,
        "" => 0.6,
        _ => 0.65,
    }
}

/// Complexity tier of a single named operation.
pub fn operation_tier(operation: &str) -> f64 {
    match operation.trim().to_lowercase().as_str() {
        "cnc machining" | "injection molding" | "hobbing" => 3.0,
        "milling" | "turning" | "punching" | "laser cut" | "laser cutting" => 2.0,
        "drilling" => 1.0,
        "" | "none" => 0.0,
        _ => 1.5,
    }
}

/// Summed complexity over a comma-separated operation list.
pub fn operations_complexity(operations: &str) -> f64 {
    if operations.trim().eq_ignore_ascii_case("none") {
        return 0.0;
    }
    operations
        .split(',')
        .map(operation_tier)
        .sum()
}

/// Process tier of a single named finish.
pub fn finish_tier(finish: &str) -> f64 {
    match finish.trim().to_lowercase().as_str() {
        "anodized" | "polished" => 1.0,
        "tin plated" | "plated" => 0.9,
        "painted" => 0.8,
        "brushed" => 0.7,
        "" | "raw" | "none" => 0.0,
        _ => 0.5,
    }
}

/// Summed process tier over a comma-separated finish list.
pub fn finish_complexity(finish: &str) -> f64 {
    if finish.trim().eq_ignore_ascii_case("raw") || finish.trim().eq_ignore_ascii_case("none") {
        return 0.0;
    }
    finish.split(',').map(finish_tier).sum()
}
