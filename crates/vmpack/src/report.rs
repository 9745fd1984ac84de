//! CSV report output.

use std::fs::OpenOptions;
use std::path::Path;

use csv::WriterBuilder;

use crate::experiment::ExperimentResults;

const HEADER: [&str; 9] = [
    "placedVMs",
    "numVMs",
    "allocRate",
    "cpuUtilRate",
    "ramUtilRate",
    "netUtilRate",
    "diskUtilRate",
    "migrations",
    "migrationRate",
];

/// Appends one row per algorithm run (trial x workload size) to one CSV file
/// per algorithm in the output directory. The header is written only when
/// the file is new or empty, so repeated invocations accumulate rows under a
/// single header.
pub fn write_csv_reports(results: &ExperimentResults, output_dir: &Path) -> csv::Result<()> {
    std::fs::create_dir_all(output_dir)?;
    for run in &results.runs {
        let path = output_dir.join(format!("{}.csv", run.algorithm));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let write_header = file.metadata()?.len() == 0;
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if write_header {
            writer.write_record(HEADER)?;
        }
        let rates = run.util_rates();
        writer.write_record(&[
            format!("{}", run.placed),
            format!("{}", run.num_vms),
            format!("{}", run.alloc_rate()),
            format!("{}", rates[0]),
            format!("{}", rates[1]),
            format!("{}", rates[2]),
            format!("{}", rates[3]),
            format!("{}", run.migrations),
            format!("{}", run.migration_rate()),
        ])?;
        writer.flush()?;
    }
    Ok(())
}
