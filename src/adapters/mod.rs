//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits defined in the ports module:
//! agent persistence and chart rendering.

pub mod in_memory_repository;
pub mod msgpack_repository;
pub mod png_chart;

pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
pub use png_chart::PngRewardsChart;
