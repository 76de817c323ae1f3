use anyhow::Context;
use spectroplot::{
    default_config_path, init_logging, list_ports, Config, DetachedSpectrometer, PlotterService,
    BUILD_DATE, VERSION,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const TELEMETRY_FLUSH: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;
    tracing::info!("SpectroPlot {} (built {})", VERSION, BUILD_DATE);

    let arg = std::env::args().nth(1);
    if arg.as_deref() == Some("--list-ports") {
        for port in list_ports()? {
            println!("{}\t{}", port.port_name, port.description);
        }
        return Ok(());
    }

    let path = match arg {
        Some(path) => PathBuf::from(path),
        None => default_config_path()?,
    };
    let config = Config::load_or_default(&path)
        .with_context(|| format!("loading {}", path.display()))?;

    let service = tokio::task::spawn_blocking(move || {
        PlotterService::start(&config, Box::new(DetachedSpectrometer))
    })
    .await?
    .context("starting plotter service")?;
    let service = Arc::new(service);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut ticker = tokio::time::interval(TELEMETRY_FLUSH);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                result.context("waiting for ctrl-c")?;
                tracing::info!("Shutdown requested");
                break;
            }
            _ = ticker.tick() => {
                for line in service.drain_telemetry() {
                    tracing::info!(target: "telemetry", "{}", line);
                }
                if !service.is_monitoring() {
                    tracing::error!("Link monitor stopped; exiting");
                    break;
                }
            }
        }
    }

    let stopping = service.clone();
    tokio::task::spawn_blocking(move || stopping.shutdown()).await?;
    Ok(())
}
