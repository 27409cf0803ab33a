//! Proxy Module
//!
//! The forwarding side of the server: one worker per client connection,
//! consulting the shared cache before contacting any origin.
//!
//! Only GET is supported. Requests are forwarded as HTTP/1.0 with
//! `Connection: close`, so every response ends at end of stream.

pub mod capture;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use handler::{handle_client, ProxyContext};
pub use server::serve;
