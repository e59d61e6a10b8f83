//! # rpmsg Bench
//!
//! Benchmarking utilities for rpmsg performance testing.

pub mod latency;
pub mod loopback;
pub mod throughput;
