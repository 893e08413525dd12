pub mod conf;
pub mod mime;
pub mod server;
pub mod tracing;
pub mod types;
pub mod usage;
