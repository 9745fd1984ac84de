use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use vmpack::core::config::ExperimentConfig;
use vmpack::experiment::Experiment;
use vmpack::report::write_csv_reports;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Runs Monte Carlo comparison of VM placement algorithms
struct Args {
    /// Path to YAML file with experiment configuration (defaults are used if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for produced per-algorithm CSV files and results JSON
    #[arg(short, long, default_value = "results")]
    output: PathBuf,

    /// Number of threads to use (default - use all available cores)
    #[arg(short, long, default_value_t = std::thread::available_parallelism().unwrap().get())]
    threads: usize,
}

fn main() -> std::io::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ExperimentConfig::from_file(path.to_str().unwrap()),
        None => ExperimentConfig::default(),
    };
    let experiment = Experiment::new(config).unwrap_or_else(|err| panic!("Invalid config: {}", err));

    let results = experiment.run(args.threads);

    write_csv_reports(&results, &args.output)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))?;
    std::fs::File::create(args.output.join("results.json"))?
        .write_all(serde_json::to_string_pretty(&results).unwrap().as_bytes())
}
