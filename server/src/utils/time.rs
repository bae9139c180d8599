//! Time utility functions

use chrono::{DateTime, Duration, Utc};

/// Convert a UTC instant to nanoseconds since the Unix epoch
pub fn datetime_to_nanos(dt: DateTime<Utc>) -> u64 {
    match dt.timestamp_nanos_opt() {
        Some(nanos) if nanos >= 0 => nanos as u64,
        _ => {
            tracing::warn!(timestamp = %dt, "Timestamp outside representable range, using epoch");
            0
        }
    }
}

/// Convert fractional milliseconds to a signed duration
pub fn millis_to_duration(millis: f64) -> Duration {
    Duration::nanoseconds((millis * 1_000_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_datetime_to_nanos_epoch() {
        assert_eq!(datetime_to_nanos(DateTime::UNIX_EPOCH), 0);
    }

    #[test]
    fn test_datetime_to_nanos_known_value() {
        // 2024-01-01 00:00:00 UTC = 1704067200 seconds
        let dt = Utc.timestamp_opt(1_704_067_200, 500_000_000).unwrap();
        assert_eq!(datetime_to_nanos(dt), 1_704_067_200_500_000_000);
    }

    #[test]
    fn test_datetime_to_nanos_pre_epoch_clamps_to_zero() {
        let dt = Utc.timestamp_opt(-1, 0).unwrap();
        assert_eq!(datetime_to_nanos(dt), 0);
    }

    #[test]
    fn test_millis_to_duration_whole() {
        assert_eq!(millis_to_duration(250.0), Duration::milliseconds(250));
    }

    #[test]
    fn test_millis_to_duration_fractional() {
        assert_eq!(millis_to_duration(12.5), Duration::microseconds(12_500));
    }

    #[test]
    fn test_millis_to_duration_added_to_instant() {
        let start = Utc.timestamp_opt(1_704_067_200, 0).unwrap();
        let end = start + millis_to_duration(1.5);
        assert_eq!(
            datetime_to_nanos(end) - datetime_to_nanos(start),
            1_500_000
        );
    }
}
