//! The refinable-path registry: a closed enumeration of paths a
//! mutation gate will let a user or agent write outside of internal
//! kernel writes.
//!
//! Membership is exact, not prefix-matched — every path here names a
//! specific field, never a section. Kernel-owned paths (`kernel.*`,
//! `phase_states.*`, `metadata.*`) and computed outputs (`weight.*`,
//! `stability.*`, `compliance.status`, hull displacement and hull type)
//! are deliberately excluded: a phase or validator writes those, not a
//! user framing an intent-bearing action.

const REFINABLE_PATHS: &[&str] = &[
    // Principal dimensions.
    "hull.loa",
    "hull.lwl",
    "hull.beam",
    "hull.beam_wl",
    "hull.draft",
    "hull.depth",
    // Form coefficients.
    "hull.cb",
    "hull.cp",
    "hull.cm",
    "hull.cwp",
    // Deadrise.
    "hull.deadrise_deg",
    // Mission speeds, range, crew.
    "mission.max_speed_kts",
    "mission.cruise_speed_kts",
    "mission.range_nm",
    "mission.crew_count",
    "mission.cargo_capacity_mt",
    // Required-GM knob.
    "mission.gm_required_m",
    // Propulsion quantities.
    "propulsion.num_engines",
    "propulsion.num_propellers",
];

/// Is `path` refinable? Expects an already alias-normalized, canonical
/// path — callers resolve aliases first.
pub fn is_refinable(path: &str) -> bool {
    REFINABLE_PATHS.contains(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn principal_dimensions_are_refinable() {
        assert!(is_refinable("hull.loa"));
        assert!(is_refinable("hull.beam"));
    }

    #[test]
    fn computed_outputs_are_not_refinable() {
        assert!(!is_refinable("weight.lightship_weight_mt"));
        assert!(!is_refinable("stability.gm_transverse_m"));
        assert!(!is_refinable("hull.displacement_m3"));
        assert!(!is_refinable("hull.hull_type"));
        assert!(!is_refinable("compliance.status"));
    }

    #[test]
    fn kernel_owned_namespaces_are_not_refinable() {
        assert!(!is_refinable("kernel.status"));
        assert!(!is_refinable("phase_states.hull"));
        assert!(!is_refinable("metadata.anything"));
    }

    #[test]
    fn membership_is_exact_not_prefix_matched() {
        assert!(!is_refinable("hull"));
        assert!(!is_refinable("mission"));
    }
}
