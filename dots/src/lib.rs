pub mod cache;
pub mod config;
pub mod geometry;
pub mod projection;
pub mod render;
pub mod session;
pub mod snapshot;
pub mod sync;
pub mod worker;
