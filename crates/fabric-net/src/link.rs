//! A directed link between two nodes.

use crate::errors::GraphError;

/// Unique link id, assigned in creation order.
pub type LinkId = usize;

/// A directed edge `src -> dst` with a bandwidth budget shared by its active data flows.
#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) src: crate::graph::NodeId,
    pub(crate) dst: crate::graph::NodeId,
    max_bandwidth: f64,
    free_bandwidth: f64,
    base_latency: f64,
    distance: Option<f64>,
    active_flows: usize,
}

impl Link {
    pub(crate) fn new(
        src: crate::graph::NodeId,
        dst: crate::graph::NodeId,
        max_bandwidth: f64,
        base_latency: f64,
        distance: Option<f64>,
    ) -> Self {
        assert!(max_bandwidth > 0.0, "link bandwidth must be > 0");
        Self {
            src,
            dst,
            max_bandwidth,
            free_bandwidth: max_bandwidth,
            base_latency,
            distance,
            active_flows: 0,
        }
    }

    pub fn src(&self) -> crate::graph::NodeId {
        self.src
    }

    pub fn dst(&self) -> crate::graph::NodeId {
        self.dst
    }

    pub fn max_bandwidth(&self) -> f64 {
        self.max_bandwidth
    }

    pub fn free_bandwidth(&self) -> f64 {
        self.free_bandwidth
    }

    pub fn base_latency(&self) -> f64 {
        self.base_latency
    }

    pub fn distance(&self) -> Option<f64> {
        self.distance
    }

    pub fn active_flow_count(&self) -> usize {
        self.active_flows
    }

    /// Reserves `bit_rate` on this link. Fails without mutating state if insufficient.
    pub(crate) fn reserve(&mut self, link_id: LinkId, bit_rate: f64) -> Result<(), GraphError> {
        if bit_rate > self.free_bandwidth {
            return Err(GraphError::InsufficientBandwidth(link_id));
        }
        self.free_bandwidth -= bit_rate;
        self.active_flows += 1;
        Ok(())
    }

    /// Releases a previously reserved `bit_rate`. Releasing more than was ever reserved on this
    /// link is a caller bug, not a reportable runtime condition.
    pub(crate) fn release(&mut self, bit_rate: f64) {
        self.free_bandwidth += bit_rate;
        assert!(
            self.free_bandwidth <= self.max_bandwidth + 1e-9,
            "released more bandwidth than was reserved"
        );
        self.active_flows = self
            .active_flows
            .checked_sub(1)
            .expect("release called with no active flows");
    }
}
