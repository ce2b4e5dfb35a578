//! HTTP Handlers

mod ping;
mod session;
mod websocket;

pub use ping::*;
pub use session::*;
pub use websocket::*;
