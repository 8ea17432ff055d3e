//! Network capabilities consumed by the services.
//!
//! The socket layer itself is tokio's; this module only names the pieces the
//! HTTP and UDP services need from the host: a byte stream, the address the
//! device is reachable at, and the lease renewal hook of the network stack.

use std::net::Ipv4Addr;

use tokio::io::{AsyncRead, AsyncWrite};

/// A connected byte stream, e.g. an accepted `TcpStream`.
pub trait Connection: AsyncRead + AsyncWrite + Unpin {}

impl<T: AsyncRead + AsyncWrite + Unpin> Connection for T {}

/// Answers "which address are we reachable at right now".
pub trait LocalAddress: Send + Sync {
    fn local_ip(&self) -> Ipv4Addr;
}

impl LocalAddress for Ipv4Addr {
    fn local_ip(&self) -> Ipv4Addr {
        *self
    }
}

/// Outcome of a lease maintenance call, in the order DHCP clients usually
/// number them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaseStatus {
    Unchanged,
    RenewFailed,
    Renewed,
    RebindFailed,
    Rebound,
}

impl LeaseStatus {
    pub fn is_error(self) -> bool {
        matches!(self, LeaseStatus::RenewFailed | LeaseStatus::RebindFailed)
    }
}

/// Keeps the network configuration alive (DHCP renewal and friends).
pub trait Lease {
    fn maintain(&mut self) -> LeaseStatus;
}

/// A statically configured interface: there is never anything to renew.
#[derive(Debug, Default, Clone, Copy)]
pub struct StaticLease;

impl Lease for StaticLease {
    fn maintain(&mut self) -> LeaseStatus {
        LeaseStatus::Unchanged
    }
}
