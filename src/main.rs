use env_logger::Env;
use log::info;
use std::process::ExitCode;
use sysmetrix::{render, MetricsCollector, SnapshotConfig, SysMetrixError};
use tokio::runtime::Runtime;

fn run(config: SnapshotConfig) -> Result<String, SysMetrixError> {
    let runtime = Runtime::new()?;
    let output_mode = config.output_mode;
    let collector = MetricsCollector::new(config);

    let snapshot = runtime.block_on(collector.collect());
    info!(
        "Snapshot ready: {} cores, {} volumes",
        snapshot.cores.len(),
        snapshot.disk_usage.len()
    );

    Ok(render(&snapshot, output_mode)?)
}

fn main() -> ExitCode {
    // Diagnostics go to stderr so stdout carries only the JSON document.
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    match run(SnapshotConfig::default()) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::from(1)
        }
    }
}
