//
// Helix — edge weight functions for shortest-path queries (§4.B).
//

use helix_topology::Edge;

/// A weight function assigns a non-negative integer cost to an edge.
/// Boxed so callers (the path engine and the TE engine's CSPF recompute)
/// can close over per-call state such as an excluded link or a candidate's
/// own contribution being subtracted out.
pub type WeightFn<'a> = Box<dyn Fn(&Edge) -> u32 + 'a>;

/// Plain hop-count weight: every active edge costs 1.
pub fn unit_weight() -> WeightFn<'static> {
    Box::new(|_edge: &Edge| 1)
}

/// CSPF weight per §4.B: `w(e) = 1 + alpha * usage(e) / cap(e)`.
///
/// `alpha` is fixed at 1000 per the Open Question decision in
/// SPEC_FULL.md §9: large enough that any non-saturated edge is always
/// preferred to any saturated one, while among non-saturated edges the
/// hop-count term (bounded well under 1000 hops in any realistic
/// topology) keeps dominating.
pub const CSPF_ALPHA: u32 = 1000;

pub fn cspf_weight() -> WeightFn<'static> {
    Box::new(|edge: &Edge| {
        let utilisation = edge.utilisation().clamp(0.0, 1.0);
        1 + (CSPF_ALPHA as f64 * utilisation).round() as u32
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use helix_utils::{Dpid, PortNo};

    fn edge(usage_bps: f64, capacity_bps: u64) -> Edge {
        Edge {
            from: Dpid(1),
            from_port: PortNo(1),
            to: Dpid(2),
            to_port: PortNo(1),
            capacity_bps,
            usage_bps,
            active: true,
        }
    }

    #[test]
    fn non_saturated_edge_always_cheaper_than_saturated() {
        let w = cspf_weight();
        let cheap = w(&edge(10.0, 100.0));
        let expensive = w(&edge(99.0, 100.0));
        assert!(cheap < expensive);

        // Even a long chain of non-saturated edges (bounded hop count)
        // should stay below one saturated edge.
        let saturated = w(&edge(100.0, 100.0));
        assert!(cheap.saturating_mul(64) < saturated);
    }
}
