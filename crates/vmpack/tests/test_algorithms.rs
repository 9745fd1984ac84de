use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use vmpack::core::config::ExperimentConfig;
use vmpack::core::migration::MigrationTracker;
use vmpack::core::placement_algorithm::{AlgorithmKind, AlgorithmOptions, GreedyPacker, PlacementAlgorithm};
use vmpack::core::placement_algorithms::drf::{DominantResourceFairness, HostSelection};
use vmpack::core::placement_algorithms::first_fit::FirstFit;
use vmpack::core::placement_algorithms::ilp::ExactAssignment;
use vmpack::core::placement_algorithms::least_full::LeastFull;
use vmpack::core::placement_algorithms::lp_rounding::{LpRounding, RepairStrategy};
use vmpack::core::placement_algorithms::most_full::MostFull;
use vmpack::core::resources::ResourceVector;
use vmpack::core::scenario::{ResourceRanges, Scenario};

fn rv(cpu: f64, mem: f64, net: f64, disk: f64) -> ResourceVector {
    ResourceVector::new(cpu, mem, net, disk)
}

const EPSILON: f64 = 0.001;

/// Six hosts and six VMs with clearly distinguishable loads.
fn reference_scenario() -> Scenario {
    Scenario::from_parts(
        vec![
            rv(80., 12., 600., 250.),
            rv(60., 10., 500., 200.),
            rv(50., 9., 400., 180.),
            rv(90., 16., 700., 300.),
            rv(30., 6., 350., 150.),
            rv(65., 11., 550., 230.),
        ],
        vec![
            rv(35., 6., 280., 110.),
            rv(40., 8., 300., 130.),
            rv(30., 5., 250., 100.),
            rv(45., 9., 320., 140.),
            rv(36., 7., 290., 115.),
            rv(50., 10., 350., 150.),
        ],
    )
    .unwrap()
}

fn hosts_of(algorithm: &dyn PlacementAlgorithm, scenario: &Scenario, num_vms: u32) -> Vec<Option<u32>> {
    let outcome = algorithm.place(scenario, num_vms).unwrap();
    (0..num_vms).map(|vm| outcome.assignment.host_of(vm)).collect()
}

#[test]
fn first_fit_walks_hosts_in_id_order() {
    let scenario = reference_scenario();
    let algorithm = GreedyPacker::new(FirstFit::new());
    assert_eq!(
        hosts_of(&algorithm, &scenario, 6),
        vec![Some(0), Some(1), Some(0), Some(2), Some(3), Some(5)]
    );
}

#[test]
fn most_full_prefers_loaded_hosts() {
    let scenario = reference_scenario();
    let algorithm = GreedyPacker::new(MostFull::new());
    assert_eq!(
        hosts_of(&algorithm, &scenario, 6),
        vec![Some(0), Some(1), Some(0), Some(2), Some(3), Some(5)]
    );
}

#[test]
fn least_full_spreads_and_may_strand_the_last_vm() {
    let scenario = reference_scenario();
    let algorithm = GreedyPacker::new(LeastFull::new());
    assert_eq!(
        hosts_of(&algorithm, &scenario, 6),
        vec![Some(0), Some(1), Some(2), Some(3), Some(5), None]
    );
}

#[test]
fn drf_first_fit_places_fairest_vm_first() {
    let scenario = reference_scenario();
    let algorithm = DominantResourceFairness::new(HostSelection::FirstFit, EPSILON);
    assert_eq!(
        hosts_of(&algorithm, &scenario, 6),
        vec![Some(0), Some(2), Some(0), Some(3), Some(1), Some(5)]
    );
}

#[test]
fn exact_assignment_places_no_fewer_than_first_fit() {
    let scenario = reference_scenario();
    let exact = ExactAssignment::new(Duration::from_secs(20));
    let outcome = exact.place(&scenario, 6).unwrap();
    assert!(!outcome.fell_back);
    assert_eq!(outcome.assignment.placed_count(), 6);
}

#[test]
fn exact_assignment_falls_back_on_exhausted_budget() {
    let mut rng = StdRng::seed_from_u64(7);
    let scenario = Scenario::generate(
        10,
        60,
        &ResourceRanges::default_host_ranges(),
        &ResourceRanges::default_vm_ranges(),
        &mut rng,
    )
    .unwrap();

    let exact = ExactAssignment::new(Duration::ZERO);
    let outcome = exact.place(&scenario, 60).unwrap();
    assert!(outcome.fell_back);
    assert!(outcome.assignment.placed_count() > 0);
}

#[test]
fn lp_rounding_places_an_integral_relaxation() {
    let scenario = Scenario::from_parts(
        vec![rv(10., 10., 10., 10.), rv(10., 10., 10., 10.)],
        vec![rv(6., 6., 6., 6.), rv(6., 6., 6., 6.)],
    )
    .unwrap();

    for repair in [RepairStrategy::MostFull, RepairStrategy::FirstFit] {
        let outcome = LpRounding::new(repair).place(&scenario, 2).unwrap();
        assert_eq!(outcome.assignment.placed_count(), 2);
        // Neither host fits both VMs, so they must land on distinct hosts.
        assert_ne!(outcome.assignment.host_of(0), outcome.assignment.host_of(1));
    }
}

#[test]
fn lp_rounding_single_host_single_vm() {
    let scenario = Scenario::from_parts(vec![rv(10., 10., 10., 10.)], vec![rv(6., 6., 6., 6.)]).unwrap();
    let outcome = LpRounding::new(RepairStrategy::MostFull).place(&scenario, 1).unwrap();
    assert_eq!(outcome.assignment.host_of(0), Some(0));
}

#[test]
fn drf_best_fit_l2_prefers_the_tighter_host() {
    let scenario = Scenario::from_parts(
        vec![rv(10., 10., 10., 10.), rv(4., 4., 4., 4.)],
        vec![rv(3., 3., 3., 3.), rv(3., 3., 3., 3.)],
    )
    .unwrap();
    let algorithm = DominantResourceFairness::new(HostSelection::BestFitL2, EPSILON);
    let outcome = algorithm.place(&scenario, 2).unwrap();
    // First VM leaves the smallest normalized residual on the small host,
    // the second no longer fits there.
    assert_eq!(outcome.assignment.host_of(0), Some(1));
    assert_eq!(outcome.assignment.host_of(1), Some(0));
}

#[test]
fn drf_scarcity_picks_the_smallest_bottleneck_host() {
    let scenario = Scenario::from_parts(
        vec![rv(10., 10., 10., 10.), rv(20., 20., 20., 20.)],
        vec![rv(8., 2., 2., 2.)],
    )
    .unwrap();
    let algorithm = DominantResourceFairness::new(HostSelection::ScarcityBottleneck { alpha: 0.7 }, EPSILON);
    let outcome = algorithm.place(&scenario, 1).unwrap();
    // Post-placement cpu utilization is 0.8 on the small host, 0.4 on the
    // large one.
    assert_eq!(outcome.assignment.host_of(0), Some(1));
}

#[test]
fn drf_stops_when_a_resource_is_exhausted_everywhere() {
    let scenario = Scenario::from_parts(
        vec![rv(10., 10., 10., 1.)],
        vec![rv(1., 1., 1., 1.), rv(1., 1., 1., 1.)],
    )
    .unwrap();
    let algorithm = DominantResourceFairness::new(HostSelection::FirstFit, EPSILON);
    let outcome = algorithm.place(&scenario, 2).unwrap();
    assert_eq!(outcome.assignment.placed_count(), 1);
    assert!(!outcome.hit_iteration_cap);
}

#[test]
fn drf_skips_unplaceable_vms_and_continues() {
    let scenario = Scenario::from_parts(
        vec![rv(10., 10., 10., 10.)],
        vec![rv(20., 1., 1., 1.), rv(2., 2., 2., 2.)],
    )
    .unwrap();
    let algorithm = DominantResourceFairness::new(HostSelection::FirstFit, EPSILON);
    let outcome = algorithm.place(&scenario, 2).unwrap();
    assert_eq!(outcome.assignment.host_of(0), None);
    assert_eq!(outcome.assignment.host_of(1), Some(0));
}

#[test]
fn no_algorithm_overcommits_a_host() {
    let scenario = reference_scenario();
    let options = AlgorithmOptions {
        solver_budget: Duration::from_secs(20),
        epsilon: EPSILON,
        seed: 123,
    };
    for kind in ExperimentConfig::default_algorithms() {
        let outcome = kind.build(&options).place(&scenario, 6).unwrap();
        let mut per_host = vec![ResourceVector::zero(); scenario.num_hosts()];
        for (vm, host) in outcome.assignment.iter() {
            per_host[host as usize] += scenario.vm_pool[vm as usize];
        }
        for (host, demand) in per_host.iter().enumerate() {
            assert!(
                demand.fits_within(&scenario.hosts[host]),
                "{} overcommits host {}",
                kind.name(),
                host
            );
        }
    }
}

#[test]
fn reruns_are_identical_and_produce_no_migrations() {
    let scenario = reference_scenario();
    let options = AlgorithmOptions {
        solver_budget: Duration::from_secs(20),
        epsilon: EPSILON,
        seed: 123,
    };
    for kind in [
        AlgorithmKind::FirstFit,
        AlgorithmKind::MostFull,
        AlgorithmKind::LeastFull,
        AlgorithmKind::Random,
        AlgorithmKind::DrfFirstFit,
        AlgorithmKind::DrfBestFitL2,
        AlgorithmKind::DrfScarcity { alpha: 0.7 },
    ] {
        let algorithm = kind.build(&options);
        let first = algorithm.place(&scenario, 6).unwrap();
        let second = algorithm.place(&scenario, 6).unwrap();

        let mut tracker = MigrationTracker::new();
        tracker.record(&first.assignment);
        assert_eq!(tracker.record(&second.assignment), 0, "{} drifted between runs", kind.name());
    }
}

#[test]
fn growing_workload_keeps_placed_prefix_migration_bounded() {
    let scenario = reference_scenario();
    let algorithm = GreedyPacker::new(FirstFit::new());
    let mut tracker = MigrationTracker::new();
    for num_vms in [3, 6] {
        let outcome = algorithm.place(&scenario, num_vms).unwrap();
        let migrations = tracker.record(&outcome.assignment);
        assert!(migrations <= num_vms);
    }
}
