//! Static declaration of every valid state path: for each of the 27
//! design-state sections, the names of its schema-declared fields.
//!
//! A section's `extra` catch-all (see `keelmark_types::design_state`) is
//! not part of this table — it absorbs any field the schema doesn't name.
//! A path still only counts as *schema-valid* when it reaches a named
//! field, or explicitly opts into the catch-all via a literal `extra`
//! second segment (`hull.extra.some_future_field`); any other unknown
//! second segment under a section is `InvalidPath`.

use keelmark_types::SECTION_NAMES;

/// Schema-declared fields for sections that carry named fields today.
/// Sections absent from this list are "open": every field in them lives
/// in `extra` until the schema grows a named field for it.
const SECTION_FIELDS: &[(&str, &[&str])] = &[
    (
        "mission",
        &[
            "vessel_type",
            "max_speed_kts",
            "cruise_speed_kts",
            "range_nm",
            "crew_count",
            "cargo_capacity_mt",
            "gm_required_m",
            "loa_m",
        ],
    ),
    (
        "hull",
        &[
            "loa",
            "lwl",
            "beam",
            "beam_wl",
            "draft",
            "depth",
            "cb",
            "cp",
            "cm",
            "cwp",
            "displacement_m3",
            "displacement_kg",
            "displacement_mt",
            "hull_type",
            "hull_family",
            "deadrise_deg",
        ],
    ),
    ("propulsion", &["num_engines", "num_propellers", "total_installed_power_kw"]),
    ("weight", &["lightship_weight_mt", "full_load_displacement_mt"]),
    ("stability", &["gm_transverse_m", "gz_curve"]),
    ("compliance", &["fail_count", "status"]),
    (
        "kernel",
        &[
            "status",
            "current_phase",
            "phase_history",
            "gate_status",
            "validation_summary",
            "validation_complete",
            "current_session",
        ],
    ),
];

/// Top-level fields of the design state outside the 27 sections. All are
/// "open": once the first segment resolves here, any further segment is
/// schema-valid (these back open maps or bookkeeping collections, not
/// typed records).
const TOP_LEVEL_OPEN_FIELDS: &[&str] = &[
    "design_id",
    "design_name",
    "version",
    "design_version",
    "created_at",
    "updated_at",
    "created_by",
    "phase_states",
    "phase_metadata",
    "agents",
    "orchestration",
    "decisions",
    "metadata",
    "history",
    "locked_parameters",
];

fn section_fields(section: &str) -> Option<&'static [&'static str]> {
    SECTION_FIELDS
        .iter()
        .find(|(name, _)| *name == section)
        .map(|(_, fields)| *fields)
}

/// Is `section` one of the 27 design-state sections?
pub fn is_section(section: &str) -> bool {
    SECTION_NAMES.contains(&section)
}

/// Checks a path against the static schema. Expects an already
/// alias-normalized path — callers resolve aliases first via
/// [`crate::alias::normalize_path`].
pub fn is_valid_path(path: &str) -> bool {
    let mut parts = path.splitn(3, '.');
    let Some(first) = parts.next() else {
        return false;
    };

    if TOP_LEVEL_OPEN_FIELDS.contains(&first) {
        return true;
    }

    if !is_section(first) {
        return false;
    }

    let Some(second) = parts.next() else {
        // Bare section name, e.g. "hull" — always valid.
        return true;
    };

    if second == "extra" {
        // `section.extra.<anything>` is the explicit open-escape-hatch
        // form; a bare `section.extra` is also valid (refers to the map
        // itself).
        return true;
    }

    match section_fields(first) {
        Some(fields) => fields.contains(&second),
        // Sections with no named fields yet are entirely open: every
        // field in them lives in `extra`.
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_fields_are_valid() {
        assert!(is_valid_path("hull.loa"));
        assert!(is_valid_path("mission.max_speed_kts"));
        assert!(is_valid_path("stability.gm_transverse_m"));
    }

    #[test]
    fn unknown_field_under_a_closed_section_is_invalid() {
        assert!(!is_valid_path("hull.not_a_real_field"));
    }

    #[test]
    fn extra_escape_hatch_is_valid() {
        assert!(is_valid_path("hull.extra.some_future_field"));
        assert!(is_valid_path("hull.extra"));
    }

    #[test]
    fn open_section_accepts_any_second_segment() {
        assert!(is_valid_path("structural_design.anything_at_all"));
    }

    #[test]
    fn unknown_top_level_segment_is_invalid() {
        assert!(!is_valid_path("not_a_section.foo"));
    }

    #[test]
    fn bare_section_name_is_valid() {
        assert!(is_valid_path("hull"));
    }

    #[test]
    fn top_level_open_fields_accept_any_suffix() {
        assert!(is_valid_path("metadata.whatever"));
        assert!(is_valid_path("phase_metadata.hull.entered_by"));
    }
}
