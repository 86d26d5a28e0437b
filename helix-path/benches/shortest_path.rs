use std::hint::black_box;
use std::net::Ipv4Addr;
use std::sync::LazyLock as Lazy;

use criterion::{criterion_group, criterion_main, Criterion};
use helix_path::{shortest_path, unit_weight, TieBreak};
use helix_topology::Topology;
use helix_utils::{Dpid, HostId, MacAddr, PortNo};

const RING_SIZE: u64 = 64;

fn host(n: u8) -> HostId {
    HostId {
        mac: MacAddr([0, 0, 0, 0, 0, n]),
        ip: Ipv4Addr::new(10, 0, 0, n.into()),
    }
}

static TOPOLOGY: Lazy<Topology> = Lazy::new(|| {
    let mut topo = Topology::new();
    for i in 0..RING_SIZE {
        let next = (i + 1) % RING_SIZE;
        topo.add_link(
            Dpid(i),
            PortNo(1),
            Dpid(next),
            PortNo(0),
            1_000_000_000,
        );
    }
    topo.host_discovered(host(1), Dpid(0), PortNo(100));
    topo.host_discovered(host(2), Dpid(RING_SIZE / 2), PortNo(100));
    topo
});

fn shortest_path_queries(n: u64) {
    let w = unit_weight();
    for _ in 0..n {
        black_box(shortest_path(
            &TOPOLOGY,
            host(1),
            host(2),
            &w,
            TieBreak::HopsThenLex,
        ));
    }
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("shortest_path over 64-switch ring", |b| {
        b.iter(|| shortest_path_queries(black_box(1000)))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
