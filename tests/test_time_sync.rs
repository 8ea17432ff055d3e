mod common;

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use cardserve::net::{Lease, LeaseStatus, StaticLease};
use cardserve::time::clock::NTP_UNIX_OFFSET;
use cardserve::time::sync::{NTP_PACKET_SIZE, request_packet};
use cardserve::time::{Clock, SyncPolicy, TimeSync};
use common::ManualTicks;
use tokio::net::UdpSocket;

const UNIX_NOW: u32 = 1_700_000_000;

fn loopback() -> SocketAddr {
    "127.0.0.1:0".parse().unwrap()
}

fn quick_policy() -> SyncPolicy {
    SyncPolicy {
        reply_window: Duration::from_millis(200),
        ..SyncPolicy::default()
    }
}

fn reply_for(unix: u32) -> [u8; NTP_PACKET_SIZE] {
    let mut reply = [0u8; NTP_PACKET_SIZE];
    reply[0] = 0x24;
    reply[40..44].copy_from_slice(&(unix + NTP_UNIX_OFFSET).to_be_bytes());
    reply
}

/// Fake time server: drops the first `ignore` requests, answers the next
/// one and hands back what it received.
async fn fake_server(ignore: usize) -> (SocketAddr, tokio::task::JoinHandle<Vec<u8>>) {
    let socket = UdpSocket::bind(loopback()).await.unwrap();
    let addr = socket.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let mut buf = [0u8; 128];
        for _ in 0..ignore {
            socket.recv_from(&mut buf).await.unwrap();
        }
        let (len, peer) = socket.recv_from(&mut buf).await.unwrap();
        socket.send_to(&reply_for(UNIX_NOW), peer).await.unwrap();
        buf[..len].to_vec()
    });

    (addr, handle)
}

#[derive(Clone, Default)]
struct FailingLease {
    calls: Arc<AtomicU32>,
}

impl Lease for FailingLease {
    fn maintain(&mut self) -> LeaseStatus {
        self.calls.fetch_add(1, Ordering::Relaxed);
        LeaseStatus::RebindFailed
    }
}

#[test]
fn test_request_packet_layout() {
    let packet = request_packet();

    assert_eq!(packet.len(), 48);
    assert_eq!(&packet[..4], &[0xE3, 0x00, 0x06, 0xEC]);
    assert!(packet[4..12].iter().all(|&b| b == 0));
    assert_eq!(&packet[12..16], &[49, 0x4E, 49, 52]);
    assert!(packet[16..].iter().all(|&b| b == 0));
}

#[test]
fn test_lease_status_errors() {
    assert!(LeaseStatus::RenewFailed.is_error());
    assert!(LeaseStatus::RebindFailed.is_error());
    assert!(!LeaseStatus::Unchanged.is_error());
    assert!(!LeaseStatus::Renewed.is_error());
    assert!(!LeaseStatus::Rebound.is_error());
}

#[tokio::test]
async fn test_request_time_sets_clock() {
    let (server, handle) = fake_server(0).await;
    let clock = Arc::new(Clock::new(ManualTicks::at(42), 3600));
    let mut sync = TimeSync::bind(loopback(), server, clock.clone(), StaticLease, quick_policy())
        .await
        .unwrap();

    assert!(sync.request_time(0).await);
    assert_eq!(clock.local_time(), UNIX_NOW + 3600);

    let request = handle.await.unwrap();
    assert_eq!(request, request_packet());
}

#[tokio::test]
async fn test_request_time_retries_after_silence() {
    let (server, handle) = fake_server(1).await;
    let clock = Arc::new(Clock::new(ManualTicks::at(0), 0));
    let mut sync = TimeSync::bind(loopback(), server, clock.clone(), StaticLease, quick_policy())
        .await
        .unwrap();

    assert!(sync.request_time(2).await);
    assert_eq!(clock.synchronized_time(), Some(UNIX_NOW));
    handle.await.unwrap();
}

#[tokio::test]
async fn test_request_time_gives_up() {
    let silent = UdpSocket::bind(loopback()).await.unwrap();
    let clock = Arc::new(Clock::new(ManualTicks::at(0), 0));
    let policy = SyncPolicy {
        reply_window: Duration::from_millis(50),
        ..SyncPolicy::default()
    };
    let mut sync = TimeSync::bind(
        loopback(),
        silent.local_addr().unwrap(),
        clock.clone(),
        StaticLease,
        policy,
    )
    .await
    .unwrap();

    assert!(!sync.request_time(1).await);
    assert!(!clock.is_synchronized());

    let mut buf = [0u8; 64];
    for _ in 0..2 {
        let (len, _) = silent.recv_from(&mut buf).await.unwrap();
        assert_eq!(len, NTP_PACKET_SIZE);
    }
}

#[tokio::test]
async fn test_reply_from_other_peer_is_ignored() {
    let silent = UdpSocket::bind(loopback()).await.unwrap();
    let intruder = UdpSocket::bind(loopback()).await.unwrap();
    let clock = Arc::new(Clock::new(ManualTicks::at(0), 0));
    let mut sync = TimeSync::bind(
        loopback(),
        silent.local_addr().unwrap(),
        clock.clone(),
        StaticLease,
        quick_policy(),
    )
    .await
    .unwrap();

    let mut buf = [0u8; 64];
    let request = sync.request_time(0);
    tokio::pin!(request);

    // Let the request go out, then answer from the wrong address.
    let (_, client) = tokio::select! {
        received = silent.recv_from(&mut buf) => received.unwrap(),
        _ = &mut request => panic!("request finished before it was sent"),
    };
    intruder.send_to(&reply_for(UNIX_NOW), client).await.unwrap();

    assert!(!request.await);
    assert!(!clock.is_synchronized());
}

#[tokio::test]
async fn test_maintain_skips_fresh_clock() {
    let silent = UdpSocket::bind(loopback()).await.unwrap();
    let clock = Arc::new(Clock::new(ManualTicks::at(0), 0));
    clock.synchronize(UNIX_NOW);
    let lease = FailingLease::default();
    let mut sync = TimeSync::bind(
        loopback(),
        silent.local_addr().unwrap(),
        clock,
        lease.clone(),
        quick_policy(),
    )
    .await
    .unwrap();

    assert!(!sync.maintain().await);
    assert_eq!(lease.calls.load(Ordering::Relaxed), 0);
}

#[tokio::test]
async fn test_maintain_renews_lease_then_syncs() {
    let (server, handle) = fake_server(0).await;
    let clock = Arc::new(Clock::new(ManualTicks::at(0), 0));
    let lease = FailingLease::default();
    let mut sync = TimeSync::bind(loopback(), server, clock.clone(), lease.clone(), quick_policy())
        .await
        .unwrap();

    assert!(sync.maintain().await);
    assert_eq!(lease.calls.load(Ordering::Relaxed), 3);
    assert_eq!(sync.clock().local_time(), UNIX_NOW);
    handle.await.unwrap();
}
