use std::io;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use roomdesk::engine::Engine;
use roomdesk::limits::DEFAULT_DATA_FILE;
use roomdesk::shell::{OutputFormat, Shell, ShellOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries command output; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roomdesk=info")),
        )
        .with_writer(io::stderr)
        .init();

    let metrics_port: Option<u16> = std::env::var("ROOMDESK_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    roomdesk::observability::init(metrics_port)?;

    let data_file =
        std::env::var("ROOMDESK_DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.into());

    let mut options = ShellOptions::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => options.format = OutputFormat::Json,
            "--yes" | "-y" => options.assume_yes = true,
            other => return Err(format!("unknown argument: {other}").into()),
        }
    }

    info!("roomdesk starting");
    info!("  data_file: {data_file}");
    info!("  output: {:?}", options.format);
    info!("  metrics: {}", metrics_port.map_or("disabled".to_string(), |p| format!("http://127.0.0.1:{p}/metrics")));

    let engine = Engine::new(PathBuf::from(&data_file));
    let stdout = io::stdout();
    let mut shell = Shell::new(engine, stdout.lock(), options);
    shell.run(io::stdin().lock())?;

    info!("roomdesk stopped");
    Ok(())
}
