use crate::common;

/// Boot sequence (load -> sweep -> re-arm), then keep the sweeper and
/// timers alive until Ctrl-C.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let engine = common::open_engine()?;

    let armed = engine.bootstrap()?;
    let _sweeper = engine.start_sweeper();
    tracing::info!(armed, "lectern daemon running, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("lectern daemon shutting down");
    Ok(())
}
