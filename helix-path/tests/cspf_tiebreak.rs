//
// Literal reproduction of spec.md §8 scenario S6 "CSPF tie-break".
//

use std::net::Ipv4Addr;

use helix_path::{cspf_weight, shortest_path, switches, TieBreak};
use helix_topology::Topology;
use helix_utils::{Dpid, HostId, MacAddr, PortNo};

fn host(n: u8) -> HostId {
    HostId {
        mac: MacAddr([0, 0, 0, 0, 0, n]),
        ip: Ipv4Addr::new(10, 0, 0, n.into()),
    }
}

/// Two equal-cost (under the §4.B CSPF weight) two-hop routes from src to
/// dst: s1-s2-s3 with one heavily-used and one lightly-used leg, and
/// s1-s4-s3 with two evenly-used legs. Both sum to the same total CSPF
/// weight, so the path engine falls through to the tie-break on maximum
/// edge utilisation.
fn two_equal_cost_routes() -> Topology {
    let mut topo = Topology::new();
    topo.add_link(Dpid(1), PortNo(1), Dpid(2), PortNo(1), 1_000_000);
    topo.add_link(Dpid(2), PortNo(2), Dpid(3), PortNo(1), 1_000_000);
    topo.add_link(Dpid(1), PortNo(2), Dpid(4), PortNo(1), 1_000_000);
    topo.add_link(Dpid(4), PortNo(2), Dpid(3), PortNo(2), 1_000_000);

    topo.host_discovered(host(1), Dpid(1), PortNo(100));
    topo.host_discovered(host(2), Dpid(3), PortNo(100));

    // Route via s2: 30% then 10% -> weight (1+300)+(1+100) = 402, max util 0.30.
    topo.set_port_usage(Dpid(1), PortNo(1), 300_000.0).unwrap();
    topo.set_port_usage(Dpid(2), PortNo(2), 100_000.0).unwrap();
    // Route via s4: 20% then 20% -> weight (1+200)+(1+200) = 402, max util 0.20.
    topo.set_port_usage(Dpid(1), PortNo(2), 200_000.0).unwrap();
    topo.set_port_usage(Dpid(4), PortNo(2), 200_000.0).unwrap();
    topo
}

#[test]
fn cspf_recomp_breaks_equal_cost_ties_on_lower_max_utilisation() {
    let topo = two_equal_cost_routes();
    let weight = cspf_weight();

    let path = shortest_path(&topo, host(1), host(2), &weight, TieBreak::UsageThenLenThenLex)
        .expect("both routes are connected");

    // The s4 route (max utilisation 0.20) must win over the s2 route
    // (max utilisation 0.30) despite both summing to the same weight.
    assert_eq!(switches(&path), vec![Dpid(1), Dpid(4), Dpid(3)]);
}

#[test]
fn cspf_recomp_tie_break_is_idempotent_on_identical_inputs() {
    let topo = two_equal_cost_routes();
    let weight = cspf_weight();

    let first = shortest_path(&topo, host(1), host(2), &weight, TieBreak::UsageThenLenThenLex);
    let second = shortest_path(&topo, host(1), host(2), &weight, TieBreak::UsageThenLenThenLex);
    assert_eq!(first, second);
}
