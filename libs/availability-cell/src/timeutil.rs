use crate::models::AvailabilityError;

/// Parse a wall-clock time into minutes since midnight (0-1439).
///
/// Accepts `HH:MM` and `HH:MM:SS` (the store serializes `time` columns with
/// seconds); the seconds component is ignored at minute granularity.
pub fn time_to_minutes(value: &str) -> Result<i32, AvailabilityError> {
    let parts: Vec<&str> = value.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(AvailabilityError::InvalidFormat(format!(
            "Invalid time '{}', expected HH:MM",
            value
        )));
    }

    let hours: i32 = parts[0].parse().map_err(|_| {
        AvailabilityError::InvalidFormat(format!("Invalid hour in time '{}'", value))
    })?;
    let minutes: i32 = parts[1].parse().map_err(|_| {
        AvailabilityError::InvalidFormat(format!("Invalid minute in time '{}'", value))
    })?;

    if !(0..24).contains(&hours) || !(0..60).contains(&minutes) {
        return Err(AvailabilityError::InvalidFormat(format!(
            "Time '{}' out of range",
            value
        )));
    }

    Ok(hours * 60 + minutes)
}

/// Inverse of `time_to_minutes`: zero-padded `HH:MM`.
pub fn minutes_to_time(minutes: i32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// share a point iff `a_start < b_end && b_start < a_end`. Touching
/// endpoints are not an overlap, so a slot may begin exactly where a break
/// or a buffered booking ends.
pub fn intervals_overlap(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && b_start < a_end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hh_mm() {
        assert_eq!(time_to_minutes("09:30").unwrap(), 570);
        assert_eq!(time_to_minutes("00:00").unwrap(), 0);
        assert_eq!(time_to_minutes("23:59").unwrap(), 1439);
    }

    #[test]
    fn parses_postgres_time_with_seconds() {
        assert_eq!(time_to_minutes("09:30:00").unwrap(), 570);
        assert_eq!(time_to_minutes("17:00:59").unwrap(), 1020);
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "9", "abc", "12:xx", "25:00", "12:60", "-1:30", "12:30:00:00"] {
            assert!(
                time_to_minutes(bad).is_err(),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn formats_zero_padded() {
        assert_eq!(minutes_to_time(0), "00:00");
        assert_eq!(minutes_to_time(570), "09:30");
        assert_eq!(minutes_to_time(1439), "23:59");
    }

    #[test]
    fn round_trips_every_valid_minute() {
        for minutes in 0..1440 {
            let formatted = minutes_to_time(minutes);
            assert_eq!(time_to_minutes(&formatted).unwrap(), minutes);
        }
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        assert!(!intervals_overlap(0, 30, 30, 60));
        assert!(intervals_overlap(0, 31, 30, 60));
        assert!(!intervals_overlap(30, 60, 0, 30));
    }

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (0, 30, 30, 60),
            (0, 31, 30, 60),
            (540, 600, 570, 630),
            (540, 600, 600, 660),
            (0, 1440, 720, 721),
        ];
        for (a, b, c, d) in cases {
            assert_eq!(
                intervals_overlap(a, b, c, d),
                intervals_overlap(c, d, a, b),
                "symmetry broken for ({a},{b}) vs ({c},{d})"
            );
        }
    }

    #[test]
    fn containment_counts_as_overlap() {
        assert!(intervals_overlap(540, 720, 600, 630));
        assert!(intervals_overlap(600, 630, 540, 720));
    }
}
