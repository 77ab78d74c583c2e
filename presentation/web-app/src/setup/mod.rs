pub mod dependency_injection;
pub mod pipeline;
pub mod server;
