// src/connection/mod.rs

//! Per-connection state and lifecycle: the `Session` abstraction and the
//! `ConnectionHandler` protocol pipeline.

pub mod handler;
pub mod session;

pub use handler::ConnectionHandler;
pub use session::{AttrValue, SendHandle, Session, WriteRequest};
