use nmea::ParseResult;
use std::borrow::Cow;
use std::fmt;

use super::location::Location;
use crate::utils::error::BeaconError;

/// Talker + sentence id of the fix sentence this receiver is read for.
pub const FIX_SENTENCE_PREFIX: &str = "$GPGGA";

#[derive(Debug, Clone, PartialEq)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f32>,
    pub satellites: Option<u32>,
}

impl GpsFix {
    pub fn location(&self) -> Location {
        Location::new(self.latitude, self.longitude)
    }
}

impl fmt::Display for GpsFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lat={:.6}, lon={:.6}", self.latitude, self.longitude)?;
        if let Some(alt) = self.altitude {
            write!(f, ", alt={:.1}m", alt)?;
        }
        if let Some(sats) = self.satellites {
            write!(f, ", sats={}", sats)?;
        }
        Ok(())
    }
}

pub fn is_fix_sentence(line: &str) -> bool {
    line.starts_with(FIX_SENTENCE_PREFIX)
}

/// XOR of every byte between `$` and `*`.
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, b| acc ^ b)
}

// The parser insists on a `*hh` suffix; sentences sent without one get the
// computed checksum appended.
fn with_checksum(line: &str) -> Cow<'_, str> {
    if line.contains('*') {
        Cow::Borrowed(line)
    } else {
        let body = line.strip_prefix('$').unwrap_or(line);
        Cow::Owned(format!("{}*{:02X}", line, checksum(body)))
    }
}

/// Parses a `$GPGGA` line into a position.
///
/// A checksum, when present, must match. Empty latitude/longitude fields
/// (receiver has no fix yet) read as `0.0`; fix quality is not inspected.
pub fn parse_fix_sentence(line: &str) -> Result<GpsFix, BeaconError> {
    let line = line.trim();

    match nmea::parse_str(&with_checksum(line)) {
        Ok(ParseResult::GGA(gga)) => Ok(GpsFix {
            latitude: gga.latitude.unwrap_or(0.0),
            longitude: gga.longitude.unwrap_or(0.0),
            altitude: gga.altitude,
            satellites: gga.fix_satellites,
        }),
        Ok(_) => Err(BeaconError::InvalidData(format!(
            "Not a GGA sentence: {}",
            line
        ))),
        Err(e) => Err(BeaconError::InvalidData(format!(
            "Malformed NMEA sentence {:?}: {:?}",
            line, e
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GGA_37_1: &str = "$GPGGA,123519,3706.000,N,12212.000,W,1,08,0.9,545.4,M,46.9,M,,*57";
    const GGA_MUNICH: &str = "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47";
    const GGA_SYDNEY: &str = "$GPGGA,123519,3352.128,S,15112.558,E,1,08,0.9,10.0,M,20.0,M,,*62";
    const GGA_NO_FIX: &str = "$GPGGA,123519,,,,,0,00,,,M,,M,,*6B";

    #[test]
    fn test_parse_northern_western_hemisphere_signs() {
        let fix = parse_fix_sentence(GGA_37_1).unwrap();
        assert_eq!(fix.location(), Location::new(37.1, -122.2));
        assert_eq!(fix.satellites, Some(8));
    }

    #[test]
    fn test_parse_southern_eastern_hemisphere_signs() {
        let fix = parse_fix_sentence(GGA_SYDNEY).unwrap();
        assert!((fix.latitude + 33.8688).abs() < 1e-9);
        assert!((fix.longitude - 151.2093).abs() < 1e-9);
        assert_eq!(fix.altitude, Some(10.0));
    }

    #[test]
    fn test_checksum_matches_reference_sentences() {
        assert_eq!(checksum("GPGGA,123519,3706.000,N,12212.000,W,1,08,0.9,545.4,M,46.9,M,,"), 0x57);
        assert_eq!(checksum("GPGGA,123519,,,,,0,00,,,M,,M,,"), 0x6B);
    }

    #[test]
    fn test_sentence_without_checksum_is_accepted() {
        let bare = GGA_37_1.trim_end_matches("*57");
        let fix = parse_fix_sentence(bare).unwrap();
        assert_eq!(fix.location(), Location::new(37.1, -122.2));

        let fix = parse_fix_sentence(&format!("{}\r\n", GGA_SYDNEY.trim_end_matches("*62"))).unwrap();
        assert!(fix.latitude < 0.0 && fix.longitude > 0.0);
    }

    #[test]
    fn test_parse_with_trailing_crlf() {
        let line = format!("{}\r\n", GGA_MUNICH);
        let fix = parse_fix_sentence(&line).unwrap();
        assert!((fix.latitude - 48.1173).abs() < 1e-9);
        assert!((fix.longitude - 11.516666).abs() < 1e-6);
    }

    #[test]
    fn test_no_fix_reads_as_origin() {
        let fix = parse_fix_sentence(GGA_NO_FIX).unwrap();
        assert_eq!(fix.location(), Location::new(0.0, 0.0));
        assert_eq!(fix.location().to_string(), "0.0,0.0");

        let bare = parse_fix_sentence(GGA_NO_FIX.trim_end_matches("*6B")).unwrap();
        assert_eq!(bare.location(), Location::new(0.0, 0.0));
    }

    #[test]
    fn test_bad_checksum_is_rejected() {
        let corrupted = GGA_37_1.replace("*57", "*00");
        assert!(parse_fix_sentence(&corrupted).is_err());
    }

    #[test]
    fn test_truncated_sentence_is_rejected() {
        assert!(parse_fix_sentence("$GPGGA,123519,3706.0").is_err());
        assert!(parse_fix_sentence("$GPGGA,123519,3706.0*00").is_err());
    }

    #[test]
    fn test_prefix_filter() {
        assert!(is_fix_sentence(GGA_37_1));
        assert!(!is_fix_sentence("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A"));
        assert!(!is_fix_sentence("GPGGA without dollar"));
    }
}
