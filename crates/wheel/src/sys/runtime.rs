use anyhow::Context;
use async_channel::Sender;
use cycles::config::Config;
use cycles::events::WheelEvent;
use tokio::runtime::Runtime;

/// Starts the runtime hosting the config watcher and the drag tickers. The caller
/// keeps it alive for as long as the UI runs. `loaded` is the config the host
/// started from; only changes against it are posted.
pub fn start_background_services(
    loaded: Config,
    tx: Sender<WheelEvent>,
) -> anyhow::Result<Runtime> {
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;

    rt.spawn(async move {
        cycles::config::run_async_watcher(loaded, tx).await;
    });

    Ok(rt)
}
