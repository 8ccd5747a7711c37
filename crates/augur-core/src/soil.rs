//! Hydrologic soil group assignment from soil depth, sand and clay fractions.
//!
//! Every classifier is an ordered rule list evaluated top to bottom. All rules
//! are tested and the *last* matching rule decides the group, so a later rule
//! overrides an earlier one. For the threshold classifiers this means the clay
//! rule, listed last, turns any high-clay soil into group D even when it is deep
//! enough to be group A.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catchment::Catchment;
use crate::error::{HydroError, Result};

// ── Soil groups ───────────────────────────────────────────────────────────────

/// Hydrologic soil group, from highest infiltration (A) to lowest (D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoilGroup {
    A,
    B,
    C,
    D,
}

impl SoilGroup {
    pub const ALL: [SoilGroup; 4] = [SoilGroup::A, SoilGroup::B, SoilGroup::C, SoilGroup::D];

    /// Column index in a curve number table.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            SoilGroup::A => "A",
            SoilGroup::B => "B",
            SoilGroup::C => "C",
            SoilGroup::D => "D",
        }
    }
}

impl fmt::Display for SoilGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SoilGroup {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(SoilGroup::A),
            "B" => Ok(SoilGroup::B),
            "C" => Ok(SoilGroup::C),
            "D" => Ok(SoilGroup::D),
            other => Err(HydroError::LookupFailure(format!(
                "soil group '{other}' is not a curve number column (expected A, B, C or D)"
            ))),
        }
    }
}

// ── Inputs ────────────────────────────────────────────────────────────────────

/// Soil attributes sampled over one catchment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilSample {
    /// Depth to bedrock in metres.
    pub depth: f64,
    /// Sand fraction 0-1.
    pub sand: f64,
    /// Clay fraction 0-1.
    pub clay: f64,
}

/// Thresholds of the depth/sand/clay classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoilThresholds {
    /// Soils at least this deep (m) are group A.
    pub depth: f64,
    /// Shallow soils with at least this sand fraction are group B, otherwise C.
    pub sand: f64,
    /// Soils with at least this clay fraction are group D.
    pub clay: f64,
}

impl SoilThresholds {
    /// Thresholds used by the AUGUR tool.
    pub const AUGUR: SoilThresholds = SoilThresholds { depth: 0.4, sand: 0.5, clay: 0.4 };
}

impl Default for SoilThresholds {
    fn default() -> Self {
        Self::AUGUR
    }
}

// ── Rule tables ───────────────────────────────────────────────────────────────

type Predicate = fn(&SoilSample, &SoilThresholds) -> bool;

fn is_deep(s: &SoilSample, t: &SoilThresholds) -> bool {
    s.depth >= t.depth
}

fn is_shallow_sandy(s: &SoilSample, t: &SoilThresholds) -> bool {
    s.depth < t.depth && s.sand >= t.sand
}

fn is_shallow_fine(s: &SoilSample, t: &SoilThresholds) -> bool {
    s.depth < t.depth && s.sand < t.sand
}

fn is_clayey(s: &SoilSample, t: &SoilThresholds) -> bool {
    s.clay >= t.clay
}

/// Depth → A, shallow+sandy → B, shallow+not sandy → C, then clay → D.
static THRESHOLD_RULES: [(SoilGroup, Predicate); 4] = [
    (SoilGroup::A, is_deep),
    (SoilGroup::B, is_shallow_sandy),
    (SoilGroup::C, is_shallow_fine),
    (SoilGroup::D, is_clayey),
];

const REGIONAL_DEPTH: f64 = 0.5;

fn regional_a(s: &SoilSample, _: &SoilThresholds) -> bool {
    s.depth >= REGIONAL_DEPTH && s.clay < 0.1
}

fn regional_b(s: &SoilSample, _: &SoilThresholds) -> bool {
    s.depth >= REGIONAL_DEPTH && s.clay >= 0.1 && s.clay < 0.2
}

fn regional_c(s: &SoilSample, _: &SoilThresholds) -> bool {
    s.depth >= REGIONAL_DEPTH && s.sand < 0.5 && s.clay >= 0.2 && s.clay < 0.4
}

fn regional_d(s: &SoilSample, _: &SoilThresholds) -> bool {
    s.clay >= 0.4 && s.sand < 0.5
}

fn regional_shallow(s: &SoilSample, _: &SoilThresholds) -> bool {
    s.depth < REGIONAL_DEPTH
}

/// USDA-style split: deep soils are graded by clay content, all shallow soils are D.
static REGIONAL_RULES: [(SoilGroup, Predicate); 5] = [
    (SoilGroup::A, regional_a),
    (SoilGroup::B, regional_b),
    (SoilGroup::C, regional_c),
    (SoilGroup::D, regional_d),
    (SoilGroup::D, regional_shallow),
];

// ── Classifier ────────────────────────────────────────────────────────────────

/// The interchangeable soil classification variants.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilClassifier {
    /// AUGUR thresholds (depth 0.4 m, sand 0.5, clay 0.4).
    #[default]
    Fixed,
    /// Same rules as `Fixed` with caller-supplied thresholds.
    Parametrized(SoilThresholds),
    /// Regional rules with a 0.5 m depth gate.
    Regional,
}

impl FromStr for SoilClassifier {
    type Err = HydroError;

    /// Parses the named (non-parametrised) classifiers.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" | "augur" => Ok(SoilClassifier::Fixed),
            "regional" | "usa" => Ok(SoilClassifier::Regional),
            other => Err(HydroError::config(format!("unknown soil classifier '{other}'"))),
        }
    }
}

impl SoilClassifier {
    fn rules(&self) -> (&'static [(SoilGroup, Predicate)], SoilThresholds) {
        match *self {
            SoilClassifier::Fixed => (&THRESHOLD_RULES, SoilThresholds::AUGUR),
            SoilClassifier::Parametrized(t) => (&THRESHOLD_RULES, t),
            SoilClassifier::Regional => (&REGIONAL_RULES, SoilThresholds::AUGUR),
        }
    }

    /// Group of the last matching rule, or `None` when no rule matches.
    pub fn classify(&self, sample: &SoilSample) -> Option<SoilGroup> {
        let (rules, thresholds) = self.rules();
        rules
            .iter()
            .filter(|(_, applies)| applies(sample, &thresholds))
            .last()
            .map(|&(group, _)| group)
    }

    /// Classify a catchment. Missing soil attributes leave it unclassified.
    pub fn classify_catchment(&self, catchment: &Catchment) -> Option<SoilGroup> {
        catchment.soil_sample().and_then(|s| self.classify(&s))
    }

    /// Classify every catchment, keeping the unclassified marker as `None`.
    pub fn classify_all(&self, catchments: &[Catchment]) -> Vec<Option<SoilGroup>> {
        catchments.iter().map(|c| self.classify_catchment(c)).collect()
    }
}

// ── Unclassified rows ─────────────────────────────────────────────────────────

/// What a batch does with catchments that no rule classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnclassifiedPolicy {
    /// Fail the batch with the number of unclassified rows.
    #[default]
    Reject,
    /// Drop unclassified rows and carry on with the rest.
    Exclude,
}

impl FromStr for UnclassifiedPolicy {
    type Err = HydroError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnclassifiedPolicy::Reject),
            "exclude" => Ok(UnclassifiedPolicy::Exclude),
            other => Err(HydroError::config(format!("unknown unclassified policy '{other}'"))),
        }
    }
}

/// Apply `policy` to per-row classifications.
///
/// Returns `(row index, group)` for every row that takes part in the batch,
/// in dataset order.
pub fn resolve_unclassified(
    groups: &[Option<SoilGroup>],
    policy: UnclassifiedPolicy,
) -> Result<Vec<(usize, SoilGroup)>> {
    let missing = groups.iter().filter(|g| g.is_none()).count();
    if missing > 0 && policy == UnclassifiedPolicy::Reject {
        return Err(HydroError::ClassificationFailure { count: missing });
    }
    Ok(groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| g.map(|g| (i, g)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(depth: f64, sand: f64, clay: f64) -> SoilSample {
        SoilSample { depth, sand, clay }
    }

    #[test]
    fn fixed_rules_assign_each_group() {
        let c = SoilClassifier::Fixed;
        assert_eq!(c.classify(&sample(0.8, 0.2, 0.1)), Some(SoilGroup::A));
        assert_eq!(c.classify(&sample(0.3, 0.6, 0.1)), Some(SoilGroup::B));
        assert_eq!(c.classify(&sample(0.3, 0.3, 0.1)), Some(SoilGroup::C));
        assert_eq!(c.classify(&sample(0.3, 0.3, 0.5)), Some(SoilGroup::D));
    }

    #[test]
    fn clay_rule_overrides_deep_soil() {
        // Deep enough for A, but the clay rule runs last.
        let c = SoilClassifier::Fixed;
        assert_eq!(c.classify(&sample(2.0, 0.1, 0.4)), Some(SoilGroup::D));
    }

    #[test]
    fn high_clay_is_always_d_for_threshold_rules() {
        let t = SoilThresholds { depth: 1.3, sand: 0.35, clay: 0.25 };
        let c = SoilClassifier::Parametrized(t);
        for depth in [0.0, 0.5, 1.3, 4.0, 9.9] {
            for sand in [0.0, 0.2, 0.35, 0.8, 1.0] {
                for clay in [0.25, 0.3, 0.6, 1.0] {
                    let g = c.classify(&sample(depth, sand, clay));
                    assert_eq!(
                        g,
                        Some(SoilGroup::D),
                        "depth={depth} sand={sand} clay={clay} gave {g:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn parametrized_with_augur_thresholds_matches_fixed() {
        let p = SoilClassifier::Parametrized(SoilThresholds::AUGUR);
        for &(d, s, c) in &[(0.1, 0.1, 0.1), (0.4, 0.5, 0.39), (0.39, 0.5, 0.2), (1.0, 0.9, 0.45)] {
            assert_eq!(
                p.classify(&sample(d, s, c)),
                SoilClassifier::Fixed.classify(&sample(d, s, c))
            );
        }
    }

    #[test]
    fn threshold_boundaries_are_inclusive() {
        let c = SoilClassifier::Fixed;
        assert_eq!(c.classify(&sample(0.4, 0.0, 0.0)), Some(SoilGroup::A));
        assert_eq!(c.classify(&sample(0.0, 0.5, 0.0)), Some(SoilGroup::B));
    }

    #[test]
    fn threshold_rules_leave_nan_depth_unclassified() {
        let c = SoilClassifier::Fixed;
        assert_eq!(c.classify(&sample(f64::NAN, 0.3, 0.1)), None);
        // Clay still applies on its own.
        assert_eq!(c.classify(&sample(f64::NAN, 0.3, 0.5)), Some(SoilGroup::D));
    }

    #[test]
    fn regional_rules() {
        let c = SoilClassifier::Regional;
        assert_eq!(c.classify(&sample(1.0, 0.4, 0.05)), Some(SoilGroup::A));
        assert_eq!(c.classify(&sample(1.0, 0.4, 0.15)), Some(SoilGroup::B));
        assert_eq!(c.classify(&sample(1.0, 0.4, 0.3)), Some(SoilGroup::C));
        assert_eq!(c.classify(&sample(1.0, 0.4, 0.5)), Some(SoilGroup::D));
        // Every shallow soil ends up D, whatever it matched before.
        assert_eq!(c.classify(&sample(0.2, 0.9, 0.05)), Some(SoilGroup::D));
    }

    #[test]
    fn regional_rules_have_gaps() {
        // Deep, sandy, clay in [0.2, 0.4): neither C (needs sand < 0.5) nor D.
        let c = SoilClassifier::Regional;
        assert_eq!(c.classify(&sample(1.0, 0.7, 0.3)), None);
        // Deep, sandy, very clayey: D needs sand < 0.5.
        assert_eq!(c.classify(&sample(1.0, 0.7, 0.5)), None);
    }

    #[test]
    fn soil_group_parsing() {
        assert_eq!("b".parse::<SoilGroup>().unwrap(), SoilGroup::B);
        assert!(matches!("E".parse::<SoilGroup>(), Err(HydroError::LookupFailure(_))));
        assert!(matches!("".parse::<SoilGroup>(), Err(HydroError::LookupFailure(_))));
    }

    #[test]
    fn classifier_parsing_rejects_unknown_names() {
        assert_eq!("regional".parse::<SoilClassifier>().unwrap(), SoilClassifier::Regional);
        assert!(matches!(
            "fao".parse::<SoilClassifier>(),
            Err(HydroError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn reject_policy_counts_unclassified_rows() {
        let groups = [Some(SoilGroup::A), None, Some(SoilGroup::C), None];
        assert_eq!(
            resolve_unclassified(&groups, UnclassifiedPolicy::Reject),
            Err(HydroError::ClassificationFailure { count: 2 })
        );
    }

    #[test]
    fn exclude_policy_keeps_row_indices() {
        let groups = [Some(SoilGroup::A), None, Some(SoilGroup::C)];
        let kept = resolve_unclassified(&groups, UnclassifiedPolicy::Exclude).unwrap();
        assert_eq!(kept, vec![(0, SoilGroup::A), (2, SoilGroup::C)]);
    }
}
