// Server module entry
// Listener setup, connection serving and shutdown signaling

pub mod conn;
pub mod listener;
pub mod shutdown;

pub use conn::serve;
pub use listener::create_listener;
