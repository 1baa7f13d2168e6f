//! Wire protocol shared by the server and its clients.
//!
//! Commands and messages are JSON objects tagged by `"type"`, one per
//! WebSocket text frame.

/// Message types for the client-server protocol.
pub mod messages;
