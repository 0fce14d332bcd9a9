//! Convergence test for the propose/validate/mutate loop. Default
//! thresholds: `min_validators_passed=2`, `min_score=85.0`,
//! `gm_margin_m=0.1`, plus a plateau rule over the last three scores.

use keelmark_types::Severity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceCriteria {
    pub min_validators_passed: u32,
    pub min_score: f64,
    pub gm_margin_m: f64,
    /// Below this, even a max-iteration exit is not usable.
    pub soft_floor: f64,
    pub plateau_window: usize,
    pub plateau_delta: f64,
}

impl Default for ConvergenceCriteria {
    fn default() -> Self {
        Self {
            min_validators_passed: 2,
            min_score: 85.0,
            gm_margin_m: 0.1,
            soft_floor: 70.0,
            plateau_window: 3,
            plateau_delta: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergenceReason {
    ScoreAndGmMet,
    Plateaued,
}

impl ConvergenceCriteria {
    /// `score_history` must include the current iteration's score as its
    /// last element.
    pub fn is_converged(
        &self,
        score: f64,
        validators_passed: u32,
        worst_severity: Option<Severity>,
        gm_actual: Option<f64>,
        gm_required: f64,
        score_history: &[f64],
    ) -> Option<ConvergenceReason> {
        let severity_ok = worst_severity.map(|s| s <= Severity::Warning).unwrap_or(true);
        let gm_ok = gm_actual.map(|gm| gm >= gm_required + self.gm_margin_m).unwrap_or(false);

        if validators_passed >= self.min_validators_passed
            && score >= self.min_score
            && severity_ok
            && gm_ok
        {
            return Some(ConvergenceReason::ScoreAndGmMet);
        }

        if score_history.len() >= self.plateau_window && score >= self.soft_floor {
            let window = &score_history[score_history.len() - self.plateau_window..];
            let spread = window.iter().cloned().fold(f64::MIN, f64::max)
                - window.iter().cloned().fold(f64::MAX, f64::min);
            if spread < self.plateau_delta {
                return Some(ConvergenceReason::Plateaued);
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_when_all_thresholds_met() {
        let criteria = ConvergenceCriteria::default();
        let reason = criteria.is_converged(90.0, 3, Some(Severity::Warning), Some(1.0), 0.5, &[90.0]);
        assert_eq!(reason, Some(ConvergenceReason::ScoreAndGmMet));
    }

    #[test]
    fn does_not_converge_when_gm_margin_not_met() {
        let criteria = ConvergenceCriteria::default();
        let reason = criteria.is_converged(95.0, 3, Some(Severity::Info), Some(0.55), 0.5, &[95.0]);
        assert_eq!(reason, None);
    }

    #[test]
    fn critical_finding_blocks_convergence_even_at_high_score() {
        let criteria = ConvergenceCriteria::default();
        let reason = criteria.is_converged(99.0, 5, Some(Severity::Critical), Some(2.0), 0.5, &[99.0]);
        assert_eq!(reason, None);
    }

    #[test]
    fn plateaued_scores_above_soft_floor_converge() {
        let criteria = ConvergenceCriteria::default();
        let history = vec![71.0, 71.5, 71.2];
        let reason = criteria.is_converged(71.2, 1, Some(Severity::Warning), None, 0.5, &history);
        assert_eq!(reason, Some(ConvergenceReason::Plateaued));
    }

    #[test]
    fn plateaued_scores_below_soft_floor_do_not_converge() {
        let criteria = ConvergenceCriteria::default();
        let history = vec![40.0, 40.5, 40.2];
        let reason = criteria.is_converged(40.2, 1, Some(Severity::Warning), None, 0.5, &history);
        assert_eq!(reason, None);
    }
}
