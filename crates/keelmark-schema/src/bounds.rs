//! Refinement bounds: a secondary static table, independent of the
//! schema and alias map, clamping a handful of refinable numeric paths
//! into a plausible naval range before they ever reach `set`.
//!
//! Exists to keep agent-proposed refinements inside plausible ranges, not
//! to replace schema or mutation-gate checking. A path absent from the
//! table is simply unclamped.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterBounds {
    pub min: f64,
    pub max: f64,
}

const PARAMETER_BOUNDS: &[(&str, ParameterBounds)] = &[
    ("mission.max_speed_kts", ParameterBounds { min: 0.0, max: 100.0 }),
    ("mission.crew_berthed", ParameterBounds { min: 0.0, max: 100.0 }),
    ("mission.range_nm", ParameterBounds { min: 0.0, max: 10_000.0 }),
    ("hull.loa", ParameterBounds { min: 5.0, max: 200.0 }),
    ("mission.cargo_capacity_mt", ParameterBounds { min: 0.0, max: 10_000.0 }),
];

/// Bounds for `path`, if any are declared. The path is looked up as
/// given — callers pass the canonical path, already alias-normalized.
pub fn get_bounds(path: &str) -> Option<ParameterBounds> {
    PARAMETER_BOUNDS
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(_, bounds)| *bounds)
}

/// Clamp `value` into `path`'s declared range. Paths with no entry pass
/// through unchanged.
pub fn clamp_to_bounds(path: &str, value: f64) -> f64 {
    match get_bounds(path) {
        Some(bounds) => value.clamp(bounds.min, bounds.max),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_value_is_clamped() {
        assert_eq!(clamp_to_bounds("hull.loa", 4.0), 5.0);
        assert_eq!(clamp_to_bounds("hull.loa", 250.0), 200.0);
    }

    #[test]
    fn in_range_value_passes_through() {
        assert_eq!(clamp_to_bounds("hull.loa", 30.0), 30.0);
    }

    #[test]
    fn path_absent_from_table_is_unclamped() {
        assert_eq!(clamp_to_bounds("hull.beam", 9999.0), 9999.0);
    }
}
