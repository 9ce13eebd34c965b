//! A reservation of bandwidth across a path of links.

use crate::errors::GraphError;
use crate::graph::Graph;
use crate::link::LinkId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowState {
    Unplaced,
    Placed,
    Released,
}

/// Holds a fixed `bit_rate` reservation across a contiguous list of links.
///
/// Placement is all-or-nothing: if any link on the path cannot satisfy the reservation, none of
/// the links are touched and the flow stays `Unplaced`. Release is safe to call on any already
/// placed flow regardless of link order.
#[derive(Debug, Clone)]
pub struct DataFlow {
    link_ids: Vec<LinkId>,
    bit_rate: f64,
    state: FlowState,
}

impl DataFlow {
    pub fn new(link_ids: Vec<LinkId>, bit_rate: f64) -> Self {
        Self {
            link_ids,
            bit_rate,
            state: FlowState::Unplaced,
        }
    }

    pub fn bit_rate(&self) -> f64 {
        self.bit_rate
    }

    pub fn link_ids(&self) -> &[LinkId] {
        &self.link_ids
    }

    pub fn is_placed(&self) -> bool {
        self.state == FlowState::Placed
    }

    /// Reserves `bit_rate` on every link of the path. On failure, any links already reserved in
    /// this attempt are rolled back before returning the error.
    pub fn place(&mut self, graph: &mut Graph) -> Result<(), GraphError> {
        assert_eq!(self.state, FlowState::Unplaced, "data flow already placed");
        for (reserved, &link_id) in self.link_ids.iter().enumerate() {
            let link = graph.link_mut(link_id).expect("data flow references a live link");
            if let Err(err) = link.reserve(link_id, self.bit_rate) {
                for &done in &self.link_ids[..reserved] {
                    graph.link_mut(done).expect("link vanished mid-rollback").release(self.bit_rate);
                }
                return Err(err);
            }
        }
        self.state = FlowState::Placed;
        Ok(())
    }

    /// Releases the reservation. No-op if the flow was never placed.
    pub fn release(&mut self, graph: &mut Graph) {
        if self.state != FlowState::Placed {
            return;
        }
        for &link_id in &self.link_ids {
            graph.link_mut(link_id).expect("link vanished before release").release(self.bit_rate);
        }
        self.state = FlowState::Released;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_node_graph(bandwidth: f64) -> (Graph, LinkId) {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        let link_id = g.add_link(a, b, None, bandwidth, 0.0, None).unwrap();
        (g, link_id)
    }

    #[test]
    fn placement_reserves_and_release_restores() {
        let (mut g, link_id) = two_node_graph(100.0);
        let mut flow = DataFlow::new(vec![link_id], 40.0);
        flow.place(&mut g).unwrap();
        assert_eq!(g.link(link_id).unwrap().free_bandwidth(), 60.0);
        flow.release(&mut g);
        assert_eq!(g.link(link_id).unwrap().free_bandwidth(), 100.0);
    }

    #[test]
    fn placement_fails_cleanly_when_any_link_is_congested() {
        let mut g = Graph::new();
        let a = g.add_wired_node("a");
        let b = g.add_wired_node("b");
        let c = g.add_wired_node("c");
        let l1 = g.add_link(a, b, None, 100.0, 0.0, None).unwrap();
        let l2 = g.add_link(b, c, None, 10.0, 0.0, None).unwrap();

        let mut flow = DataFlow::new(vec![l1, l2], 50.0);
        let err = flow.place(&mut g).unwrap_err();
        assert_eq!(err, crate::errors::GraphError::InsufficientBandwidth(l2));
        // rollback: l1 must be untouched
        assert_eq!(g.link(l1).unwrap().free_bandwidth(), 100.0);
        assert!(!flow.is_placed());
    }
}
