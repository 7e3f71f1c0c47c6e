use criterion::{
    BenchmarkGroup, Criterion, Throughput, black_box, criterion_group, criterion_main,
    measurement::WallTime,
};
use manet_core::{
    mobility::RandomWaypointConfig,
    network::Network,
    position::Rectangle,
    random::Uniform,
    routing::{Connectivity, ProactiveRouting, RoutingKind, RoutingProtocol},
    scheduler::Simulator,
    time::SimTime,
};
use std::time::Duration;

const EVENTS: u64 = 100_000;

fn schedule_and_run(c: &mut Criterion) {
    c.bench_function("schedule_and_run", |b| {
        b.iter(|| {
            let mut sim = Simulator::new(0u64);
            for i in 0..EVENTS {
                sim.schedule_in(Duration::from_micros(i % 1_000), |sim| {
                    *sim.world_mut() += 1;
                    Ok(())
                });
            }
            sim.run().unwrap();
            black_box(*sim.world())
        })
    });
}

fn self_rescheduling(c: &mut Criterion) {
    fn tick(sim: &mut Simulator<u64>) -> anyhow::Result<()> {
        *sim.world_mut() += 1;
        sim.schedule_in(Duration::from_millis(1), tick);
        Ok(())
    }

    c.bench_function("self_rescheduling", |b| {
        b.iter(|| {
            let mut sim = Simulator::new(0u64);
            sim.schedule_now(tick);
            sim.stop_at(SimTime::from_secs(100));
            sim.run().unwrap();
            black_box(*sim.world())
        })
    });
}

fn bench_routing_size(group: &mut BenchmarkGroup<'_, WallTime>, size: usize) {
    let mut network = Network::new();
    network.create_nodes(size);
    RandomWaypointConfig {
        area: Rectangle::new(0.0, 500.0, 0.0, 500.0).unwrap(),
        speed: Uniform::new(0.0, 20.0).unwrap(),
        pause: Duration::ZERO,
    }
    .install(&mut network, 1);
    network.configure_wireless_medium(manet_core::medium::WirelessMedium::builder().build());

    let connectivity: Connectivity = network.connectivity(SimTime::from_secs(10));
    let mut routing = ProactiveRouting::new(RoutingKind::Olsr, Duration::from_secs(2));

    group.throughput(Throughput::Elements(size as u64));
    group.bench_function(format!("{size}"), |b| {
        b.iter(|| routing.update(black_box(&connectivity)))
    });
}

fn routing_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("routing_update");

    for size in [20, 50, 100, 200] {
        bench_routing_size(&mut group, size);
    }

    group.finish();
}

criterion_group!(benches, schedule_and_run, self_rescheduling, routing_update);
criterion_main!(benches);
