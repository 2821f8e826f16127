// Helper utilities shared by the channels and the remote

pub mod debounce;
pub mod endpoint;

pub use debounce::Debouncer;
pub use endpoint::websocket_endpoint;
