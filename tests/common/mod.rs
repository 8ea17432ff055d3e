#![allow(dead_code)]

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use cardserve::handlers::{HEADERS, file_router};
use cardserve::http::connection::Dispatcher;
use cardserve::http::request::HeaderStore;
use cardserve::storage::DiskVolume;
use cardserve::time::TickSource;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const DEVICE_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// A scratch directory removed again on drop.
pub struct TempRoot {
    path: PathBuf,
}

impl TempRoot {
    pub fn new(tag: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "cardserve-{}-{}-{}",
            tag,
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = std::fs::remove_dir_all(&path);
        std::fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, relative: &str, content: &[u8]) {
        let file = self.path.join(relative);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(file, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> Option<Vec<u8>> {
        std::fs::read(self.path.join(relative)).ok()
    }
}

impl Drop for TempRoot {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

/// Tick source the test moves by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualTicks(Arc<AtomicU32>);

impl ManualTicks {
    pub fn at(millis: u32) -> Self {
        Self(Arc::new(AtomicU32::new(millis)))
    }

    pub fn set(&self, millis: u32) {
        self.0.store(millis, Ordering::Relaxed);
    }

    pub fn advance(&self, millis: u32) {
        let now = self.0.load(Ordering::Relaxed);
        self.set(now.wrapping_add(millis));
    }
}

impl TickSource for ManualTicks {
    fn millis(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }
}

pub fn dispatcher(root: &TempRoot) -> Dispatcher<DiskVolume> {
    Dispatcher::new(
        file_router(),
        DiskVolume::new(root.path()),
        HeaderStore::new(HEADERS),
        Arc::new(DEVICE_IP),
    )
}

/// Sends `request`, runs the dispatcher on the server half and returns
/// what it reported plus everything the client received.
pub async fn exchange<V>(web: &mut Dispatcher<V>, request: &[u8]) -> (bool, String) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    client.write_all(request).await.unwrap();

    let processed = web.serve(server).await;

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    (processed, String::from_utf8_lossy(&response).into_owned())
}

/// Like `exchange`, but the client stops sending after `request`.
pub async fn exchange_then_hang_up<V>(web: &mut Dispatcher<V>, request: &[u8]) -> (bool, String) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    client.write_all(request).await.unwrap();
    client.shutdown().await.unwrap();

    let processed = web.serve(server).await;

    let mut response = Vec::new();
    client.read_to_end(&mut response).await.unwrap();
    (processed, String::from_utf8_lossy(&response).into_owned())
}
