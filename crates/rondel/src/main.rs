use rondel::config;
use rondel::events::MenuEvent;
use rondel::menu::{Carousel, SnapDriver};
use rondel::persist::FileSelectionStore;
use rondel::sys::runtime;
use std::sync::Arc;
use std::time::Duration;

fn build_carousel(config: &config::MenuConfig, store: &Arc<FileSelectionStore>) -> Carousel {
    Carousel::from_config(config, Some(store.clone()), Arc::new(SnapDriver))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config_path = config::write_default_config()?;
    log::debug!("Using config at {}", config_path.display());

    let config = config::load_or_setup();
    let store = Arc::new(FileSelectionStore::at_default()?);
    let mut carousel = build_carousel(&config, &store);

    let (tx, rx) = async_channel::bounded(32);
    runtime::start_background_services(tx.clone());

    if let Some(title) = &config.title {
        log::info!(
            "{} ready with {} items",
            title,
            carousel.main_ring().lock().len()
        );
    }

    let mut frames = tokio::time::interval(Duration::from_millis(16));
    loop {
        tokio::select! {
            event = rx.recv() => {
                match event {
                    Ok(MenuEvent::ConfigReload) => match config::load_config() {
                        Ok(new_config) => {
                            carousel = build_carousel(&new_config, &store);
                            log::info!("Configuration reloaded");
                        }
                        Err(e) => log::error!("Failed to reload config: {}", e),
                    },
                    Ok(event) => carousel.apply(event).await,
                    Err(_) => break,
                }
            }
            _ = frames.tick() => {
                let frame = carousel.tick(1.0 / 60.0);
                if frame.main.settled {
                    let ring = carousel.main_ring();
                    let ring = ring.lock();
                    if let Some(item) = ring.item(ring.current_index()) {
                        log::info!("Selected {}", item.label);
                    }
                }
                if let Some(report) = frame.submenu
                    && report.settled
                    && let Some(ring) = carousel.submenu().active_ring()
                {
                    let ring = ring.lock();
                    if let Some(item) = ring.item(ring.current_index()) {
                        log::info!("Submenu selected {}", item.label);
                    }
                }
            }
        }
    }

    Ok(())
}
