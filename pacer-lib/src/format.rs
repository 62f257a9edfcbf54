//src/format.rs
use crate::config::{ConfigError, Units};

const MPS_TO_KPH: f64 = 3.6;
const KM_TO_MILE: f64 = 0.621_371;

/// Parses `MM:SS` (or plain seconds) into seconds.
/// # Errors
/// Returns `ConfigError::InvalidTime` for anything else, including `0:00`.
pub fn parse_mmss(input: &str) -> Result<u32, ConfigError> {
    let trimmed = input.trim();
    let invalid = || ConfigError::InvalidTime(input.to_string());

    let total = match trimmed.split_once(':') {
        Some((mins, secs)) => {
            let mins: u32 = mins.trim().parse().map_err(|_| invalid())?;
            let secs: u32 = secs.trim().parse().map_err(|_| invalid())?;
            if secs >= 60 {
                return Err(invalid());
            }
            mins.checked_mul(60)
                .and_then(|m| m.checked_add(secs))
                .ok_or_else(invalid)?
        }
        None => trimmed.parse().map_err(|_| invalid())?,
    };

    if total == 0 {
        return Err(invalid());
    }
    Ok(total)
}

/// `MM:SS`, minutes are not wrapped into hours.
#[must_use]
pub fn format_mmss(sec: u32) -> String {
    format!("{:02}:{:02}", sec / 60, sec % 60)
}

/// `HH:MM:SS`, used for the session clock.
#[must_use]
pub fn format_hms(sec: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        sec / 3600,
        (sec % 3600) / 60,
        sec % 60
    )
}

#[must_use]
pub fn mps_to_kph(speed_mps: f64) -> f64 {
    speed_mps * MPS_TO_KPH
}

/// Speed text in the configured units, one decimal.
#[must_use]
pub fn format_speed(speed_mps: f64, units: Units) -> String {
    let kph = mps_to_kph(speed_mps);
    match units {
        Units::Metric => format!("{kph:.1} kph"),
        Units::Imperial => format!("{:.1} mph", kph * KM_TO_MILE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minutes_and_seconds() {
        assert_eq!(parse_mmss("8:00").unwrap(), 480);
        assert_eq!(parse_mmss(" 8:36 ").unwrap(), 516);
        assert_eq!(parse_mmss("95").unwrap(), 95);
    }

    #[test]
    fn rejects_bad_times() {
        assert!(parse_mmss("8:60").is_err());
        assert!(parse_mmss("abc").is_err());
        assert!(parse_mmss("0:00").is_err());
        assert!(parse_mmss("").is_err());
    }

    #[test]
    fn clock_formats() {
        assert_eq!(format_mmss(96), "01:36");
        assert_eq!(format_mmss(0), "00:00");
        assert_eq!(format_hms(3725), "01:02:05");
    }

    #[test]
    fn speed_text_follows_units() {
        let goal = 2000.0 / 480.0;
        assert_eq!(format_speed(goal, Units::Metric), "15.0 kph");
        assert_eq!(format_speed(goal, Units::Imperial), "9.3 mph");
    }
}
