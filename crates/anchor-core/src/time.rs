use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Returns the current instant formatted as an RFC 3339 UTC timestamp,
/// e.g. `2026-07-31T12:00:00Z`. This is the only place "now" is read in the
/// persisted data model; everywhere else a timestamp is threaded through
/// explicitly so the rest of the engine stays deterministic given a fixed
/// clock reading.
pub fn utc_now_rfc3339() -> String {
    format_rfc3339(OffsetDateTime::now_utc())
}

/// Formats an arbitrary instant as RFC 3339 UTC. Falls back to a fixed
/// epoch string if formatting itself fails, which only happens for
/// out-of-range years and should never occur for real clock readings.
pub fn format_rfc3339(instant: OffsetDateTime) -> String {
    instant
        .to_offset(time::UtcOffset::UTC)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_now_is_rfc3339_and_ends_in_z_or_offset() {
        let stamp = utc_now_rfc3339();
        assert!(stamp.contains('T'));
        assert!(OffsetDateTime::parse(&stamp, &Rfc3339).is_ok());
    }

    #[test]
    fn format_rfc3339_is_stable_for_fixed_instant() {
        let instant = OffsetDateTime::from_unix_timestamp(0).unwrap();
        assert_eq!(format_rfc3339(instant), "1970-01-01T00:00:00Z");
    }
}
