//! Throughput measurement over a [`Loopback`].

use crate::latency::LatencyCollector;
use crate::loopback::{Loopback, LoopbackError};
use std::time::{Duration, Instant};

/// Result of a throughput run.
#[derive(Debug, Clone)]
pub struct ThroughputResult {
    /// Round trips completed.
    pub messages: u64,
    /// Payload bytes echoed.
    pub bytes: u64,
    /// Total duration.
    pub duration: Duration,
}

impl ThroughputResult {
    /// Returns messages per second.
    #[must_use]
    pub fn messages_per_second(&self) -> f64 {
        self.messages as f64 / self.duration.as_secs_f64()
    }

    /// Returns bytes per second.
    #[must_use]
    pub fn bytes_per_second(&self) -> f64 {
        self.bytes as f64 / self.duration.as_secs_f64()
    }

    /// Returns megabytes per second.
    #[must_use]
    pub fn mb_per_second(&self) -> f64 {
        self.bytes_per_second() / (1024.0 * 1024.0)
    }
}

/// Runs `count` round trips of `payload`, recording each one in `latency`
/// when given.
///
/// # Errors
/// Stops at the first failed round trip.
pub fn run_round_trips(
    link: &mut Loopback,
    count: u64,
    payload: &[u8],
    mut latency: Option<&mut LatencyCollector>,
) -> Result<ThroughputResult, LoopbackError> {
    let mut bytes = 0u64;
    let start = Instant::now();
    for _ in 0..count {
        let len = match latency.as_deref_mut() {
            Some(collector) => collector.measure(|| link.round_trip(payload))?,
            None => link.round_trip(payload)?,
        };
        bytes += len as u64;
    }
    Ok(ThroughputResult {
        messages: count,
        bytes,
        duration: start.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rpmsg_vring::VringConfig;

    #[test]
    fn test_throughput_result_rates() {
        let result = ThroughputResult {
            messages: 1000,
            bytes: 1024 * 1024,
            duration: Duration::from_secs(1),
        };
        assert!((result.messages_per_second() - 1000.0).abs() < 0.001);
        assert!((result.bytes_per_second() - 1_048_576.0).abs() < 0.001);
        assert!((result.mb_per_second() - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_run_round_trips() {
        let mut link = Loopback::new(&VringConfig::default().depth(8)).unwrap();
        let mut latency = LatencyCollector::new().unwrap();

        let result = run_round_trips(&mut link, 50, &[7u8; 32], Some(&mut latency)).unwrap();
        assert_eq!(result.messages, 50);
        assert_eq!(result.bytes, 50 * 32);
        assert_eq!(latency.len(), 50);

        let result = run_round_trips(&mut link, 10, b"", None).unwrap();
        assert_eq!(result.bytes, 0);
    }
}
