//! Answers UDP discovery queries so peers can find the HTTP service.
//!
//! Any non-empty datagram counts as a query; empty ones are dropped. The reply is a sequence of
//! length-prefixed strings (prefix, description, dotted local IP) followed
//! by the HTTP port, all integers as 4-byte little endian.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use tokio::net::UdpSocket;
use tracing::debug;

use crate::net::LocalAddress;

/// Largest query we bother reading; the content is ignored anyway.
const QUERY_SIZE: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub prefix: String,
    pub description: String,
}

pub fn encode_reply(identity: &Identity, ip: Ipv4Addr, http_port: u32) -> BytesMut {
    let ip = ip.to_string();
    let segments = [identity.prefix.as_str(), identity.description.as_str(), ip.as_str()];

    let size = segments.iter().map(|s| 4 + s.len()).sum::<usize>() + 4;
    let mut packet = BytesMut::with_capacity(size);
    for segment in segments {
        packet.put_u32_le(segment.len() as u32);
        packet.put_slice(segment.as_bytes());
    }
    packet.put_u32_le(http_port);
    packet
}

pub struct Discovery {
    socket: UdpSocket,
    identity: Identity,
    local: Arc<dyn LocalAddress>,
    http_port: u32,
}

impl Discovery {
    pub async fn bind(
        addr: SocketAddr,
        identity: Identity,
        local: Arc<dyn LocalAddress>,
        http_port: u32,
    ) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        socket.set_broadcast(true)?;
        Ok(Self {
            socket,
            identity,
            local,
            http_port,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Waits for the next non-empty query and returns who sent it. Cancel
    /// safe.
    pub async fn recv_query(&self) -> io::Result<SocketAddr> {
        let mut query = [0u8; QUERY_SIZE];
        loop {
            let (len, peer) = self.socket.recv_from(&mut query).await?;
            if len == 0 {
                debug!(%peer, "ignoring empty discovery query");
                continue;
            }
            debug!(%peer, len, "discovery query");
            return Ok(peer);
        }
    }

    /// Sends our identity to `peer`, with the address we have right now.
    pub async fn reply(&self, peer: SocketAddr) -> io::Result<usize> {
        let packet = encode_reply(&self.identity, self.local.local_ip(), self.http_port);
        let sent = self.socket.send_to(&packet, peer).await?;
        debug!(%peer, bytes = sent, "discovery reply sent");
        Ok(sent)
    }

    /// Answers exactly one query.
    pub async fn serve_one(&self) -> io::Result<SocketAddr> {
        let peer = self.recv_query().await?;
        self.reply(peer).await?;
        Ok(peer)
    }
}
