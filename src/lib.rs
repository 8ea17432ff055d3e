//! cardserve - file server for a storage-backed device
//!
//! HTTP access to the volume plus the UDP services around it: network time
//! for file timestamps and discovery replies for peers.

pub mod config;
pub mod discovery;
pub mod handlers;
pub mod http;
pub mod net;
pub mod server;
pub mod storage;
pub mod time;
