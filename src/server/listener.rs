use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, lookup_host};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::config::Config;
use crate::discovery::Discovery;
use crate::handlers::file_router;
use crate::http::connection::Dispatcher;
use crate::http::request::HeaderStore;
use crate::net::{LocalAddress, StaticLease};
use crate::storage::DiskVolume;
use crate::time::{Clock, SystemTicks, TimeSync};

async fn resolve(addr: &str) -> anyhow::Result<SocketAddr> {
    lookup_host(addr)
        .await
        .with_context(|| format!("cannot resolve {addr}"))?
        .next()
        .with_context(|| format!("no address for {addr}"))
}

fn advertised_ip(cfg: &Config, bound: SocketAddr) -> Ipv4Addr {
    match (cfg.server.advertise_ip, bound.ip()) {
        (Some(ip), _) => ip,
        (None, IpAddr::V4(ip)) if !ip.is_unspecified() => ip,
        _ => Ipv4Addr::LOCALHOST,
    }
}

/// The device's service loop: HTTP requests, discovery queries and clock
/// upkeep, one at a time, each run to completion.
pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let listener = TcpListener::bind(&cfg.server.listen_addr)
        .await
        .with_context(|| format!("cannot listen on {}", cfg.server.listen_addr))?;
    let bound = listener.local_addr()?;
    info!("Listening on {}", bound);

    let local: Arc<dyn LocalAddress> = Arc::new(advertised_ip(cfg, bound));
    let clock = Arc::new(Clock::new(SystemTicks::new(), cfg.time.offset_secs));

    tokio::fs::create_dir_all(&cfg.storage.root)
        .await
        .with_context(|| format!("cannot create {}", cfg.storage.root.display()))?;
    let volume = DiskVolume::new(&cfg.storage.root);

    let mut dispatcher = Dispatcher::new(
        file_router(),
        volume,
        HeaderStore::new(&cfg.server.headers),
        local.clone(),
    )
    .with_clock(clock.clone())
    .with_buffer_size(cfg.server.buffer_size)
    .with_timeout(cfg.server.request_timeout());

    let discovery = Discovery::bind(
        resolve(&cfg.discovery.bind_addr).await?,
        cfg.discovery.identity(),
        local,
        cfg.discovery.http_port,
    )
    .await
    .context("cannot bind discovery socket")?;
    info!("Discovery on {}", discovery.local_addr()?);

    let mut time_sync = TimeSync::bind(
        resolve(&cfg.time.bind_addr).await?,
        resolve(&cfg.time.server).await?,
        clock,
        StaticLease,
        cfg.time.policy(),
    )
    .await
    .context("cannot bind time socket")?;

    let mut maintenance = tokio::time::interval(cfg.time.maintenance_tick());
    maintenance.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    info!("Accepted connection from {}", peer);
                    dispatcher.serve(socket).await;
                }
                Err(e) => warn!(error = %e, "accept failed"),
            },

            query = discovery.recv_query() => match query {
                Ok(peer) => {
                    if let Err(e) = discovery.reply(peer).await {
                        warn!(%peer, error = %e, "discovery reply failed");
                    }
                }
                Err(e) => warn!(error = %e, "discovery receive failed"),
            },

            _ = maintenance.tick() => {
                time_sync.maintain().await;
            }
        }
    }
}
