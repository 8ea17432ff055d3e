//! HTTP protocol implementation.
//!
//! One request per connection, read and answered in bounded memory.
//!
//! # Architecture
//!
//! - **`connection`**: The [`Dispatcher`](connection::Dispatcher) running the request state machine
//! - **`reader`**: Line reads and body transfers with per-chunk timeouts
//! - **`parser`**: Request line tokenizing and percent decoding
//! - **`request`**: Methods, the request context and the header store
//! - **`router`**: Ordered route table with `*` prefix patterns
//! - **`response`**: Status codes
//! - **`writer`**: Response heads and file streaming
//! - **`mime`**: MIME type detection based on file extensions
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────────┐
//!        │ Idle                 │ ← Wait for a client
//!        └──────┬───────────────┘
//!               ▼
//!        ┌──────────────────────┐
//!        │ ReadingRequestLine   │ ── empty / timeout ──→ 408 ─┐
//!        └──────┬───────────────┘                             │
//!               ▼                                             │
//!        ┌──────────────────────┐                             │
//!        │ ReadingHeaders       │ ── timeout ──────────→ 408 ─┤
//!        └──────┬───────────────┘                             │
//!               ▼                                             │
//!        ┌──────────────────────┐                             │
//!        │ Routing              │ ── no route ─────────→ 404 ─┤
//!        └──────┬───────────────┘                             │
//!               ▼                                             │
//!        ┌──────────────────────┐                             │
//!        │ Handling             │                             │
//!        └──────┬───────────────┘                             │
//!               ▼                                             │
//!        ┌──────────────────────┐                             │
//!        │ Closing              │ ←───────────────────────────┘
//!        └──────────────────────┘   close, drop headers and path
//! ```

pub mod connection;
pub mod mime;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod router;
pub mod writer;
