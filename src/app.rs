// Process wiring: one bus, one background worker, and one task per view
// context, all over a shared on-disk namespace. Each view keeps its own
// store handle, renders synchronously after its own writes, and hears
// everyone else's writes on the bus.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use crate::core::bus::AlertBus;
use crate::core::feed::FeedView;
use crate::core::map::MapView;
use crate::core::notify::{LogNotifier, NotificationDispatcher, Notifier};
use crate::core::storage::LocalStore;
use crate::core::store::AlertStore;
use crate::core::worker::AlertWorker;

/// Resolve the data directory: `TANAW_DATA_DIR` override, else a dot
/// directory under the user's home.
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TANAW_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".local/share/tanaw")
}

pub fn run() -> io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(data_dir()))
}

async fn serve(dir: PathBuf) -> io::Result<()> {
    log::info!("tanaw starting, data dir {:?}", dir);

    let bus = AlertBus::new();
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let dispatcher = Arc::new(NotificationDispatcher::new(notifier));
    let kv = LocalStore::new(dir);

    let worker = AlertWorker::spawn(kv.clone(), dispatcher.clone(), bus.handle().subscribe());
    let port = worker.port();

    // Map view context.
    let map_store = AlertStore::new(kv.clone(), bus.handle(), dispatcher.clone())
        .with_worker_port(port.clone());
    let map = MapView::new(map_store, dispatcher.clone());
    log::info!("map view up with {} markers", map.markers().len());
    tokio::spawn(async move {
        let mut sub = map.subscribe();
        while let Some(message) = sub.recv().await {
            let (markers, focus) = map.on_bus_message(&message);
            log::info!("map re-rendered: {} markers", markers.len());
            if let Some(target) = focus {
                log::info!(
                    "map focusing {:.4},{:.4} at zoom {}",
                    target.center.lat,
                    target.center.lng,
                    target.zoom
                );
            }
        }
    });

    // Feed view context.
    let feed_store = AlertStore::new(kv.clone(), bus.handle(), dispatcher.clone())
        .with_worker_port(port.clone());
    let feed = FeedView::new(feed_store, dispatcher.clone());
    log::info!("feed view up with {} cards", feed.render().count);
    tokio::spawn(async move {
        let mut sub = feed.subscribe();
        while let Some(message) = sub.recv().await {
            let render = feed.on_bus_message(&message);
            log::info!("feed re-rendered: {} cards", render.count);
        }
    });

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");
    Ok(())
}
