//! Informal/legacy path names that rewrite to a canonical path before the
//! schema or mutation gate ever sees them.
//!
//! Two shapes, consulted in order: full-path aliases match the entire
//! dotted path; prefix aliases match (and rewrite) only the first
//! segment, so a prefix alias transparently covers every field under it.
//! Neither shape chains — an alias audit test below enforces that no
//! alias's target is itself an alias.

/// `full path -> canonical full path`.
const FULL_PATH_ALIASES: &[(&str, &str)] = &[
    ("mission.max_speed_knots", "mission.max_speed_kts"),
    ("mission.crew_berthed", "mission.crew_count"),
    ("weight.lightship", "weight.lightship_weight_mt"),
    ("weight.lightship_mt", "weight.lightship_weight_mt"),
    ("stability.gm", "stability.gm_transverse_m"),
    ("stability.gm_m", "stability.gm_transverse_m"),
];

/// `first segment -> canonical first segment`. Applies to the whole
/// subtree: `structure.hull_material` normalizes to
/// `structural_design.hull_material`.
const PREFIX_ALIASES: &[(&str, &str)] = &[("structure", "structural_design")];

/// Resolve `path` to its canonical form. Paths with no alias entry pass
/// through unchanged.
pub fn normalize_path(path: &str) -> String {
    if let Some((_, canonical)) = FULL_PATH_ALIASES.iter().find(|(alias, _)| *alias == path) {
        return (*canonical).to_string();
    }

    let mut parts = path.splitn(2, '.');
    let first = parts.next().unwrap_or(path);
    if let Some((_, canonical_prefix)) = PREFIX_ALIASES.iter().find(|(alias, _)| *alias == first) {
        return match parts.next() {
            Some(rest) => format!("{canonical_prefix}.{rest}"),
            None => (*canonical_prefix).to_string(),
        };
    }

    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_path_alias_resolves_to_canonical() {
        assert_eq!(normalize_path("mission.max_speed_knots"), "mission.max_speed_kts");
        assert_eq!(normalize_path("stability.gm"), "stability.gm_transverse_m");
        assert_eq!(normalize_path("weight.lightship_mt"), "weight.lightship_weight_mt");
    }

    #[test]
    fn prefix_alias_rewrites_any_suffix() {
        assert_eq!(
            normalize_path("structure.hull_material"),
            "structural_design.hull_material"
        );
        assert_eq!(normalize_path("structure"), "structural_design");
    }

    #[test]
    fn unaliased_path_passes_through() {
        assert_eq!(normalize_path("hull.loa"), "hull.loa");
    }

    #[test]
    fn alias_no_chain() {
        let all_aliases: Vec<&str> = FULL_PATH_ALIASES
            .iter()
            .map(|(a, _)| *a)
            .chain(PREFIX_ALIASES.iter().map(|(a, _)| *a))
            .collect();
        for (_, canonical) in FULL_PATH_ALIASES {
            assert!(
                !all_aliases.contains(canonical),
                "{canonical} is itself an alias"
            );
        }
        for (_, canonical) in PREFIX_ALIASES {
            assert!(
                !all_aliases.contains(canonical),
                "{canonical} is itself an alias"
            );
        }
    }
}
