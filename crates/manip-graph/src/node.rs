// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Nodes (modes) and weighted transition selection.
use manip_math::Prng;

use crate::constraint::NumericalConstraint;
use crate::ComponentId;

/// A mode of the robot and its environment.
///
/// Membership is decided by the component's constraints (plus the owning
/// selector's and the graph's). Path constraints are kept apart: they only
/// restrict motion that stays inside the node.
#[derive(Debug, Clone, Default)]
pub struct Node {
    selector: Option<ComponentId>,
    path_constraints: Vec<NumericalConstraint>,
    out_edges: Vec<ComponentId>,
    waypoint_of: Option<ComponentId>,
}

impl Node {
    pub(crate) fn in_selector(selector: ComponentId) -> Self {
        Self {
            selector: Some(selector),
            ..Self::default()
        }
    }

    pub(crate) fn waypoint(edge: ComponentId) -> Self {
        Self {
            waypoint_of: Some(edge),
            ..Self::default()
        }
    }

    /// Owning subgraph; `None` for waypoint nodes.
    pub fn selector(&self) -> Option<ComponentId> {
        self.selector
    }

    /// Constraints applied to paths that stay in this node.
    pub fn path_constraints(&self) -> &[NumericalConstraint] {
        &self.path_constraints
    }

    /// Outgoing edges, in creation order.
    pub fn out_edges(&self) -> &[ComponentId] {
        &self.out_edges
    }

    /// The waypoint edge owning this node, if it is an intermediate waypoint.
    pub fn waypoint_of(&self) -> Option<ComponentId> {
        self.waypoint_of
    }

    pub(crate) fn push_out_edge(&mut self, edge: ComponentId) {
        self.out_edges.push(edge);
    }

    pub(crate) fn extend_path_constraints(
        &mut self,
        constraints: impl IntoIterator<Item = NumericalConstraint>,
    ) {
        self.path_constraints.extend(constraints);
    }
}

/// Draws one candidate with probability proportional to its weight.
///
/// Zero-weight candidates are never chosen; `None` when the total is zero.
pub(crate) fn weighted_choice(candidates: &[(ComponentId, u32)], prng: &mut Prng) -> Option<ComponentId> {
    let total: u64 = candidates.iter().map(|&(_, w)| u64::from(w)).sum();
    if total == 0 {
        return None;
    }
    let mut ticket = prng.next_below(total);
    for &(id, weight) in candidates {
        let weight = u64::from(weight);
        if ticket < weight {
            return Some(id);
        }
        ticket -= weight;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_weights_are_never_drawn() {
        let a = ComponentId::from_raw(1);
        let b = ComponentId::from_raw(2);
        let mut prng = Prng::from_seed_u64(7);
        for _ in 0..200 {
            assert_eq!(weighted_choice(&[(a, 0), (b, 3)], &mut prng), Some(b));
        }
        assert_eq!(weighted_choice(&[(a, 0)], &mut prng), None);
        assert_eq!(weighted_choice(&[], &mut prng), None);
    }

    #[test]
    fn draws_follow_weights() {
        let a = ComponentId::from_raw(1);
        let b = ComponentId::from_raw(2);
        let mut prng = Prng::from_seed_u64(42);
        let hits = (0..4000)
            .filter(|_| weighted_choice(&[(a, 1), (b, 3)], &mut prng) == Some(a))
            .count();
        assert!((800..1200).contains(&hits), "hits = {hits}");
    }
}
