//! NTP client keeping a [`Clock`] close to network time.
//!
//! One request packet goes out, then we wait up to the reply window for the
//! answer. Attempts are repeated a bounded number of times; running out of
//! attempts just leaves the clock where it was.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

use crate::net::{Lease, LeaseStatus, StaticLease};
use crate::time::calendar::format_time;
use crate::time::clock::{Clock, NTP_UNIX_OFFSET};

pub const NTP_PACKET_SIZE: usize = 48;
pub const NTP_PORT: u16 = 123;

/// Offset of the transmit timestamp's seconds field in a reply.
const TRANSMIT_SECS: usize = 40;

/// Client request: LI unsynchronized, version 4, mode client.
pub fn request_packet() -> [u8; NTP_PACKET_SIZE] {
    let mut packet = [0u8; NTP_PACKET_SIZE];
    packet[0] = 0b1110_0011; // LI, Version, Mode
    packet[1] = 0; // Stratum
    packet[2] = 6; // Polling interval
    packet[3] = 0xEC; // Precision
    // bytes 4..12: root delay and dispersion
    packet[12..16].copy_from_slice(&[49, 0x4E, 49, 52]);
    packet
}

/// Seconds since 1970 carried by a server reply, if it is long enough to
/// hold a transmit timestamp.
pub fn parse_reply(packet: &[u8]) -> Option<u32> {
    let secs: [u8; 4] = packet.get(TRANSMIT_SECS..TRANSMIT_SECS + 4)?.try_into().ok()?;
    Some(u32::from_be_bytes(secs).wrapping_sub(NTP_UNIX_OFFSET))
}

#[derive(Debug, Clone)]
pub struct SyncPolicy {
    /// Monotonic time between two syncs
    pub resync_interval: Duration,
    /// How long one attempt waits for the reply
    pub reply_window: Duration,
    /// Extra attempts after the first one
    pub retries: u32,
    /// Total lease maintenance calls while it keeps reporting errors
    pub lease_attempts: u32,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            resync_interval: Duration::from_secs(2 * 3600),
            reply_window: Duration::from_secs(3),
            retries: 2,
            lease_attempts: 3,
        }
    }
}

pub struct TimeSync<L = StaticLease> {
    socket: UdpSocket,
    server: SocketAddr,
    clock: Arc<Clock>,
    lease: L,
    policy: SyncPolicy,
}

impl<L: Lease> TimeSync<L> {
    pub async fn bind(
        bind_addr: SocketAddr,
        server: SocketAddr,
        clock: Arc<Clock>,
        lease: L,
        policy: SyncPolicy,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(bind_addr).await?;
        Ok(Self {
            socket,
            server,
            clock,
            lease,
            policy,
        })
    }

    pub fn clock(&self) -> &Arc<Clock> {
        &self.clock
    }

    /// Periodic upkeep: once the resync interval has passed (or the clock
    /// was never set), renew the network lease and ask for the time.
    ///
    /// Returns `true` when the clock was updated.
    pub async fn maintain(&mut self) -> bool {
        if !self.clock.needs_resync(self.policy.resync_interval) {
            return false;
        }

        let status = self.renew_lease();
        debug!(?status, "lease maintained");

        debug!(local = %format_time(self.clock.local_time()), "requesting time");
        self.request_time(self.policy.retries).await
    }

    fn renew_lease(&mut self) -> LeaseStatus {
        let mut status = self.lease.maintain();
        for _ in 1..self.policy.lease_attempts {
            if !status.is_error() {
                break;
            }
            warn!(?status, "lease maintenance failed, retrying");
            status = self.lease.maintain();
        }
        status
    }

    /// Up to `retries + 1` request/reply exchanges; the first reply wins.
    pub async fn request_time(&mut self, retries: u32) -> bool {
        for attempt in 0..=retries {
            match self.exchange().await {
                Ok(Some(unix_secs)) => {
                    self.clock.synchronize(unix_secs);
                    info!(
                        attempt,
                        time = %format_time(self.clock.local_time()),
                        "clock synchronized"
                    );
                    return true;
                }
                Ok(None) => debug!(attempt, "no reply from time server"),
                Err(e) => warn!(attempt, error = %e, "time request failed"),
            }
        }

        warn!(server = %self.server, "got no reply from time server");
        false
    }

    async fn exchange(&mut self) -> io::Result<Option<u32>> {
        self.socket.send_to(&request_packet(), self.server).await?;

        let deadline = Instant::now() + self.policy.reply_window;
        let mut buf = [0u8; NTP_PACKET_SIZE];
        loop {
            let (len, from) = match timeout_at(deadline, self.socket.recv_from(&mut buf)).await {
                Err(_) => return Ok(None),
                Ok(res) => res?,
            };
            if from != self.server {
                debug!(%from, "ignoring datagram from unexpected peer");
                continue;
            }
            return Ok(parse_reply(&buf[..len]));
        }
    }
}
