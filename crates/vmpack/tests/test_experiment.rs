use vmpack::core::assignment::AllocationRun;
use vmpack::core::config::ExperimentConfig;
use vmpack::core::placement_algorithm::AlgorithmKind;
use vmpack::core::resources::ResourceVector;
use vmpack::experiment::{run_trial, Experiment, ExperimentResults};
use vmpack::report::write_csv_reports;

fn rv(cpu: f64, mem: f64, net: f64, disk: f64) -> ResourceVector {
    ResourceVector::new(cpu, mem, net, disk)
}

fn small_config() -> ExperimentConfig {
    ExperimentConfig::from_str(
        r#"
num_hosts: 3
initial_vms: 3
max_vms: 9
increment_vms: 3
monte_carlo_iterations: 4
algorithms:
  - FirstFit
  - MostFull
  - DrfFirstFit
"#,
    )
}

#[test]
fn config_defaults_match_the_reference_setup() {
    let config = ExperimentConfig::default();
    assert_eq!(config.num_hosts, 3);
    assert_eq!(config.initial_vms, 3);
    assert_eq!(config.max_vms, 100);
    assert_eq!(config.increment_vms, 3);
    assert_eq!(config.monte_carlo_iterations, 500);
    assert_eq!(config.base_seed, 123);
    assert_eq!(config.epsilon, 0.001);
    assert_eq!(config.solver_budget.as_secs(), 20);
    assert_eq!(config.algorithms.len(), 11);
    assert!(config.validate().is_ok());
}

#[test]
fn config_parses_algorithm_roster_from_yaml() {
    let config = ExperimentConfig::from_str(
        r#"
num_hosts: 5
algorithms:
  - Ilp
  - FirstFit
  - DrfScarcity:
      alpha: 0.5
"#,
    );
    assert_eq!(config.num_hosts, 5);
    assert_eq!(
        config.algorithms,
        vec![
            AlgorithmKind::Ilp,
            AlgorithmKind::FirstFit,
            AlgorithmKind::DrfScarcity { alpha: 0.5 },
        ]
    );
    assert_eq!(config.algorithms[2].name(), "DrfScarcity_0.5");
}

#[test]
fn config_rejects_a_broken_sweep() {
    let config = ExperimentConfig::from_str("initial_vms: 10\nmax_vms: 5\n");
    assert!(config.validate().is_err());
    assert!(Experiment::new(config).is_err());
}

#[test]
fn trial_runs_the_full_sweep_for_every_algorithm() {
    let config = small_config();
    let runs = run_trial(&config, 0).unwrap();
    // 3 algorithms x 3 workload sizes.
    assert_eq!(runs.len(), 9);
    for run in &runs {
        assert!(run.placed <= run.num_vms);
        assert!(run.used.fits_within(&run.total));
    }

    // Same trial index replays identically.
    let replay = run_trial(&config, 0).unwrap();
    for (a, b) in runs.iter().zip(replay.iter()) {
        assert_eq!(a.placed, b.placed);
        assert_eq!(a.migrations, b.migrations);
    }
}

#[test]
fn aggregation_averages_per_trial_rates() {
    // Capacities are redrawn per trial, so utilization must be the mean of
    // the per-trial rates rather than a pooled used/total ratio.
    let runs = vec![
        AllocationRun {
            algorithm: "FirstFit".to_string(),
            num_vms: 3,
            placed: 3,
            used: rv(30., 30., 30., 30.),
            total: rv(100., 100., 100., 100.),
            migrations: 0,
            fell_back: false,
            hit_iteration_cap: false,
        },
        AllocationRun {
            algorithm: "FirstFit".to_string(),
            num_vms: 3,
            placed: 2,
            used: rv(10., 10., 10., 10.),
            total: rv(300., 300., 300., 300.),
            migrations: 1,
            fell_back: false,
            hit_iteration_cap: false,
        },
    ];
    let results = ExperimentResults::from_trials(runs);
    assert_eq!(results.rows.len(), 1);
    let row = &results.rows[0];
    assert_eq!(row.trials, 2);
    assert_eq!(row.placed_vms, 2.5);
    // 5 placed out of 6 requested across both trials.
    assert!((row.alloc_rate - 5. * 100. / 6.).abs() < 1e-9);
    // Per-trial cpu rates are 30% and 10/3 %, their mean is 50/3 %.
    assert!((row.cpu_util_rate - 50. / 3.).abs() < 1e-9);
    assert!((row.ram_util_rate - 50. / 3.).abs() < 1e-9);
    assert_eq!(row.migrations, 0.5);
    assert!((row.migration_rate - 1. * 100. / 6.).abs() < 1e-9);
}

#[test]
fn experiment_groups_rows_per_algorithm_and_size() {
    let mut config = small_config();
    config.monte_carlo_iterations = 2;
    let results = Experiment::new(config).unwrap().run(2);
    // 3 algorithms x 3 sizes, aggregated; one raw run each per trial.
    assert_eq!(results.rows.len(), 9);
    assert_eq!(results.runs.len(), 18);
    for row in &results.rows {
        assert_eq!(row.trials, 2);
        assert!(row.alloc_rate > 0.);
        assert!(row.alloc_rate <= 100.);
    }
}

#[test]
fn experiment_clamps_the_thread_count() {
    let mut config = small_config();
    config.monte_carlo_iterations = 1;
    let results = Experiment::new(config).unwrap().run(0);
    assert_eq!(results.rows.len(), 9);
}

#[test]
fn csv_report_writes_the_header_once() {
    let runs = vec![AllocationRun {
        algorithm: "FirstFit".to_string(),
        num_vms: 3,
        placed: 3,
        used: rv(30., 30., 30., 30.),
        total: rv(100., 100., 100., 100.),
        migrations: 0,
        fell_back: false,
        hit_iteration_cap: false,
    }];
    let results = ExperimentResults::from_trials(runs);

    let dir = tempfile::tempdir().unwrap();
    write_csv_reports(&results, dir.path()).unwrap();
    write_csv_reports(&results, dir.path()).unwrap();

    let content = std::fs::read_to_string(dir.path().join("FirstFit.csv")).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "placedVMs,numVMs,allocRate,cpuUtilRate,ramUtilRate,netUtilRate,diskUtilRate,migrations,migrationRate"
    );
    assert!(lines[1].starts_with("3,3,100"));
}
