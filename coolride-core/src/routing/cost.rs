//! Thermal edge costs.
//!
//! Every edge is tested against the overlays of the request and discounted
//! by the first matching rule of an ordered table.

use std::fmt;

use log::{debug, info};
use petgraph::graph::EdgeIndex;
use rayon::prelude::*;
use serde::Serialize;

use crate::Error;
use crate::config::CoolingWeights;
use crate::model::RoadNetwork;
use crate::overlay::{OverlayHits, OverlaySet};

/// Overlay combination a rule fires on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    TreeShadowWater,
    TreeShadow,
    Water,
    Tree,
    Shadow,
    ParkConnector,
    Always,
}

impl Condition {
    pub fn matches(self, hits: &OverlayHits) -> bool {
        match self {
            Condition::TreeShadowWater => hits.tree && hits.shadow && hits.water,
            Condition::TreeShadow => hits.tree && hits.shadow,
            Condition::Water => hits.water,
            Condition::Tree => hits.tree,
            Condition::Shadow => hits.shadow,
            Condition::ParkConnector => hits.park_connector,
            Condition::Always => true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Condition::TreeShadowWater => "tree+shadow+water",
            Condition::TreeShadow => "tree+shadow",
            Condition::Water => "water",
            Condition::Tree => "tree",
            Condition::Shadow => "shadow",
            Condition::ParkConnector => "park connector",
            Condition::Always => "unshaded",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightRule {
    Fixed(f64),
    /// `base`, further scaled by `factor` at local hours outside
    /// `before_hour..=after_hour`.
    LowSunScaled {
        base: f64,
        factor: f64,
        before_hour: u32,
        after_hour: u32,
    },
}

impl WeightRule {
    pub fn weight(&self, local_hour: u32) -> f64 {
        match *self {
            WeightRule::Fixed(weight) => weight,
            WeightRule::LowSunScaled {
                base,
                factor,
                before_hour,
                after_hour,
            } => {
                if local_hour < before_hour || local_hour > after_hour {
                    base * factor
                } else {
                    base
                }
            }
        }
    }

    /// Every weight this rule can produce.
    fn extremes(&self) -> [f64; 2] {
        match *self {
            WeightRule::Fixed(weight) => [weight, weight],
            WeightRule::LowSunScaled { base, factor, .. } => [base, base * factor],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolRule {
    pub priority: u8,
    pub condition: Condition,
    pub weight: WeightRule,
}

/// Ordered first-match rule table. The last rule always matches.
#[derive(Debug, Clone)]
pub struct CoolingPolicy {
    rules: Vec<CoolRule>,
}

impl CoolingPolicy {
    /// Builds the standard seven-rule table.
    ///
    /// Fails when any resulting weight lies outside `(0, 1]`.
    pub fn from_weights(weights: &CoolingWeights) -> Result<Self, Error> {
        let rules = rule_table(weights);
        for rule in &rules {
            for weight in rule.weight.extremes() {
                if !(weight > 0.0 && weight <= 1.0) {
                    return Err(Error::InvalidData(format!(
                        "cooling weight {weight} for rule '{}' is outside (0, 1]",
                        rule.condition
                    )));
                }
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CoolRule] {
        &self.rules
    }

    /// Position of the first rule matching `hits`.
    pub fn classify(&self, hits: &OverlayHits) -> usize {
        self.rules
            .iter()
            .position(|rule| rule.condition.matches(hits))
            .unwrap_or(self.rules.len() - 1)
    }

    pub fn weight_for(&self, hits: &OverlayHits, local_hour: u32) -> f64 {
        self.rules[self.classify(hits)].weight.weight(local_hour)
    }
}

impl Default for CoolingPolicy {
    fn default() -> Self {
        Self {
            rules: rule_table(&CoolingWeights::default()),
        }
    }
}

fn rule_table(weights: &CoolingWeights) -> Vec<CoolRule> {
    let table = [
        (Condition::TreeShadowWater, WeightRule::Fixed(weights.ultimate)),
        (Condition::TreeShadow, WeightRule::Fixed(weights.tree_and_shadow)),
        (Condition::Water, WeightRule::Fixed(weights.water)),
        (Condition::Tree, WeightRule::Fixed(weights.tree)),
        (
            Condition::Shadow,
            WeightRule::LowSunScaled {
                base: weights.building_shadow,
                factor: weights.low_sun_factor,
                before_hour: weights.low_sun_before_hour,
                after_hour: weights.low_sun_after_hour,
            },
        ),
        (Condition::ParkConnector, WeightRule::Fixed(weights.park_connector)),
        (Condition::Always, WeightRule::Fixed(1.0)),
    ];

    table
        .into_iter()
        .enumerate()
        .map(|(i, (condition, weight))| CoolRule {
            priority: (i + 1) as u8,
            condition,
            weight,
        })
        .collect()
}

/// Number of edges settled by one rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleCount {
    pub condition: Condition,
    pub edges: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSummary {
    pub edges: usize,
    pub rules: Vec<RuleCount>,
}

impl AnnotationSummary {
    pub fn count(&self, condition: Condition) -> usize {
        self.rules
            .iter()
            .find(|count| count.condition == condition)
            .map_or(0, |count| count.edges)
    }

    /// Edges discounted by any overlay.
    pub fn cooled_edges(&self) -> usize {
        self.edges - self.count(Condition::Always)
    }
}

/// Assigns `cool_cost = length × weight` to every edge of `network`.
///
/// Overlay tests run in parallel; costs are written on the calling thread.
pub fn annotate(
    network: &mut RoadNetwork,
    overlays: &OverlaySet,
    policy: &CoolingPolicy,
    local_hour: u32,
) -> Result<AnnotationSummary, Error> {
    let shared: &RoadNetwork = network;
    let classified: Vec<(EdgeIndex, usize)> = shared
        .graph
        .edge_indices()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|edge| {
            let hits = shared
                .edge_line(edge)
                .map(|line| overlays.hits(&line))
                .unwrap_or_default();
            (edge, policy.classify(&hits))
        })
        .collect();

    let mut counts = vec![0usize; policy.rules().len()];
    for (edge, rule) in classified {
        let length = network
            .edge(edge)
            .map(|e| e.length)
            .ok_or_else(|| Error::InvalidData(format!("unknown edge {}", edge.index())))?;
        let weight = policy.rules()[rule].weight.weight(local_hour);
        network.set_cool_cost(edge, length * weight)?;
        counts[rule] += 1;
    }

    let summary = AnnotationSummary {
        edges: network.edge_count(),
        rules: policy
            .rules()
            .iter()
            .zip(counts)
            .map(|(rule, edges)| RuleCount {
                condition: rule.condition,
                edges,
            })
            .collect(),
    };
    for count in &summary.rules {
        debug!("Rule {}: {} edges", count.condition, count.edges);
    }
    info!(
        "Annotated {} edges, {} cooled",
        summary.edges,
        summary.cooled_edges()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use geo::{Polygon, polygon};

    use super::*;
    use crate::overlay::OverlayRegion;

    fn hits(park_connector: bool, tree: bool, shadow: bool, water: bool) -> OverlayHits {
        OverlayHits {
            park_connector,
            tree,
            shadow,
            water,
        }
    }

    #[test]
    fn first_match_wins() {
        let policy = CoolingPolicy::default();
        let noon = 12;
        assert_eq!(policy.weight_for(&hits(true, true, true, true), noon), 0.35);
        assert_eq!(policy.weight_for(&hits(false, true, true, false), noon), 0.45);
        assert_eq!(policy.weight_for(&hits(true, false, true, true), noon), 0.55);
        assert_eq!(policy.weight_for(&hits(true, true, false, false), noon), 0.6);
        assert_eq!(policy.weight_for(&hits(true, false, true, false), noon), 0.7);
        assert_eq!(policy.weight_for(&hits(true, false, false, false), noon), 0.5);
        assert_eq!(policy.weight_for(&OverlayHits::default(), noon), 1.0);
    }

    #[test]
    fn shadow_is_stronger_with_low_sun() {
        let policy = CoolingPolicy::default();
        let shadow = hits(false, false, true, false);
        assert!((policy.weight_for(&shadow, 9) - 0.42).abs() < 1e-12);
        assert!((policy.weight_for(&shadow, 17) - 0.42).abs() < 1e-12);
        assert_eq!(policy.weight_for(&shadow, 10), 0.7);
        assert_eq!(policy.weight_for(&shadow, 16), 0.7);
    }

    #[test]
    fn every_weight_is_in_the_known_set() {
        let policy = CoolingPolicy::default();
        let allowed = [0.35, 0.45, 0.5, 0.55, 0.6, 0.42, 0.7, 1.0];
        for mask in 0..16u8 {
            let h = hits(mask & 1 != 0, mask & 2 != 0, mask & 4 != 0, mask & 8 != 0);
            for hour in 0..24 {
                let w = policy.weight_for(&h, hour);
                assert!(w > 0.0 && w <= 1.0);
                assert!(allowed.iter().any(|a| (a - w).abs() < 1e-12), "{w}");
            }
        }
    }

    #[test]
    fn rejects_weights_above_one() {
        let weights = CoolingWeights {
            water: 1.2,
            ..CoolingWeights::default()
        };
        assert!(CoolingPolicy::from_weights(&weights).is_err());
    }

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon<f64> {
        polygon![(x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)]
    }

    #[test]
    fn annotates_each_edge_once() {
        let mut network = RoadNetwork::new();
        network.add_node(1, 0.0, 0.0);
        network.add_node(2, 0.001, 0.0);
        network.add_node(3, 0.002, 0.0);
        network.add_edge(1, 2, 0, 100.0, None).unwrap();
        network.add_edge(2, 3, 0, 100.0, None).unwrap();
        network.add_edge(2, 3, 1, 0.0, None).unwrap();

        let overlays = OverlaySet {
            tree: OverlayRegion::area(vec![square(0.0015, -0.001, 0.0025, 0.001)].into()),
            ..OverlaySet::unconstrained()
        };
        let policy = CoolingPolicy::default();
        let summary = annotate(&mut network, &overlays, &policy, 12).unwrap();

        assert!(network.is_annotated());
        assert_eq!(summary.edges, 3);
        assert_eq!(summary.count(Condition::Tree), 2);
        assert_eq!(summary.count(Condition::Always), 1);
        assert_eq!(summary.cooled_edges(), 2);

        let costs: Vec<f64> = network
            .graph
            .edge_weights()
            .filter_map(|edge| edge.cool_cost())
            .collect();
        assert_eq!(costs, vec![100.0, 60.0, 0.0]);

        assert!(matches!(
            annotate(&mut network, &overlays, &policy, 12),
            Err(Error::AlreadyAnnotated(_))
        ));
    }
}
