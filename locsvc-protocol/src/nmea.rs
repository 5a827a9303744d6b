//! NMEA 0183 GGA decoding.
//!
//! GGA field layout (only the first eight fields are used):
//! ```text
//! $GNGGA,hhmmss.sss,DDMM.MMMM,N,DDDMM.MMMM,E,q,ss,hdop,alt,M,sep,M,age,ref*hh
//!   id    utc        latitude  NS longitude EW | sats
//!                                             quality
//! ```
//!
//! Coordinates are degrees and decimal minutes packed into one number, so
//! `4656.2592` is 46° 56.2592'. The split is done on the digits themselves;
//! nothing is converted through floating point.
//!
//! Decoding never fails loudly. A sentence with another identifier is
//! [`Decoded::Ignored`], anything that cannot be read as a valid fix is
//! [`Decoded::NoFix`].

use core::fmt::Write;
use heapless::String;

/// Capacity of a formatted coordinate string
pub const DISPLAY_LEN: usize = 20;

/// Six-byte sentence identifier including the leading `$`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceId(pub [u8; 6]);

/// Multi-constellation GGA fix sentence
pub const GNGGA: SentenceId = SentenceId(*b"$GNGGA");

impl SentenceId {
    /// True if `line` starts with this identifier
    pub fn matches(&self, line: &[u8]) -> bool {
        line.starts_with(&self.0)
    }
}

/// Hemisphere letter of a coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Letter as shown on the display
    pub fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }

    fn latitude(field: &[u8]) -> Option<Self> {
        match field {
            b"N" => Some(Hemisphere::North),
            b"S" => Some(Hemisphere::South),
            _ => None,
        }
    }

    fn longitude(field: &[u8]) -> Option<Self> {
        match field {
            b"E" => Some(Hemisphere::East),
            b"W" => Some(Hemisphere::West),
            _ => None,
        }
    }
}

/// A latitude or longitude in degrees and decimal minutes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Coordinate {
    pub degrees: u16,
    pub minutes: u8,
    /// Thousandths of a minute, truncated
    pub milli_minutes: u16,
    pub hemisphere: Hemisphere,
}

impl Coordinate {
    /// Display form, e.g. `46 56.259' N`
    pub fn display(&self) -> String<DISPLAY_LEN> {
        let mut s = String::new();
        // Widest value is "180 59.999' W", well inside DISPLAY_LEN
        let _ = write!(
            s,
            "{} {:02}.{:03}' {}",
            self.degrees,
            self.minutes,
            self.milli_minutes,
            self.hemisphere.letter()
        );
        s
    }
}

/// UTC time of the fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UtcTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub millis: u16,
}

/// GGA fix quality indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FixQuality {
    /// No fix
    Invalid,
    /// Standalone GNSS fix
    Gps,
    /// Differential fix
    Differential,
    /// RTK, estimated, manual, simulation...
    Other(u8),
}

impl From<u8> for FixQuality {
    fn from(value: u8) -> Self {
        match value {
            0 => FixQuality::Invalid,
            1 => FixQuality::Gps,
            2 => FixQuality::Differential,
            n => FixQuality::Other(n),
        }
    }
}

/// A fully decoded GGA fix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GgaFix {
    pub time: UtcTime,
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub quality: FixQuality,
    pub satellites: u8,
}

/// Result of decoding one line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decoded {
    /// Different sentence; leave the display alone
    Ignored,
    /// Right sentence, but no usable position
    NoFix,
    /// Valid position
    Fix(GgaFix),
}

/// Decode `line` (without terminator) as sentence `id`
pub fn decode(line: &[u8], id: &SentenceId) -> Decoded {
    if !id.matches(line) {
        return Decoded::Ignored;
    }

    let body = match split_checksum(line) {
        Some(body) => body,
        None => return Decoded::NoFix,
    };

    match parse_fix(body) {
        Some(fix) if fix.quality != FixQuality::Invalid => Decoded::Fix(fix),
        _ => Decoded::NoFix,
    }
}

/// Strip and verify an optional `*hh` suffix
///
/// The checksum is the XOR of every byte between `$` and `*`.
fn split_checksum(line: &[u8]) -> Option<&[u8]> {
    let Some(star) = line.iter().position(|&b| b == b'*') else {
        return Some(line);
    };

    let (body, suffix) = (&line[..star], &line[star + 1..]);
    let expected = match suffix {
        [hi, lo] => (hex_digit(*hi)? << 4) | hex_digit(*lo)?,
        _ => return None,
    };
    let actual = body.iter().skip(1).fold(0u8, |acc, &b| acc ^ b);

    (actual == expected).then_some(body)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

fn parse_fix(body: &[u8]) -> Option<GgaFix> {
    let mut fields = body.split(|&b| b == b',');
    let _id = fields.next()?;
    let time = parse_time(fields.next()?)?;
    let lat = fields.next()?;
    let lat_hemi = Hemisphere::latitude(fields.next()?)?;
    let lon = fields.next()?;
    let lon_hemi = Hemisphere::longitude(fields.next()?)?;
    let quality = u8::try_from(parse_uint(fields.next()?)?).ok()?;
    let satellites = u8::try_from(parse_uint(fields.next()?)?).ok()?;

    Some(GgaFix {
        time,
        latitude: parse_coordinate(lat, lat_hemi, 90)?,
        longitude: parse_coordinate(lon, lon_hemi, 180)?,
        quality: FixQuality::from(quality),
        satellites,
    })
}

/// Parse a non-empty run of ASCII digits
fn parse_uint(field: &[u8]) -> Option<u32> {
    if field.is_empty() {
        return None;
    }
    field.iter().try_fold(0u32, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        acc.checked_mul(10)?.checked_add(u32::from(b - b'0'))
    })
}

/// First three fractional digits, right-padded with zeros
fn parse_thousandths(frac: &[u8]) -> Option<u16> {
    if !frac.iter().all(u8::is_ascii_digit) {
        return None;
    }
    let mut value = 0u16;
    for i in 0..3 {
        let digit = frac.get(i).map_or(0, |b| u16::from(b - b'0'));
        value = value * 10 + digit;
    }
    Some(value)
}

fn split_decimal(field: &[u8]) -> (&[u8], &[u8]) {
    match field.iter().position(|&b| b == b'.') {
        Some(dot) => (&field[..dot], &field[dot + 1..]),
        None => (field, &[]),
    }
}

/// `DDMM.MMMM` / `DDDMM.MMMM`
fn parse_coordinate(field: &[u8], hemisphere: Hemisphere, max_degrees: u16) -> Option<Coordinate> {
    let (whole, frac) = split_decimal(field);
    let whole = parse_uint(whole)?;
    let degrees = u16::try_from(whole / 100).ok()?;
    let minutes = (whole % 100) as u8;

    if minutes >= 60 || degrees > max_degrees {
        return None;
    }

    Some(Coordinate {
        degrees,
        minutes,
        milli_minutes: parse_thousandths(frac)?,
        hemisphere,
    })
}

/// `hhmmss.sss`
fn parse_time(field: &[u8]) -> Option<UtcTime> {
    let (whole, frac) = split_decimal(field);
    if whole.len() != 6 {
        return None;
    }
    let hhmmss = parse_uint(whole)?;
    let time = UtcTime {
        hours: (hhmmss / 10_000) as u8,
        minutes: (hhmmss / 100 % 100) as u8,
        seconds: (hhmmss % 100) as u8,
        millis: parse_thousandths(frac)?,
    };

    // 60 allows for a leap second
    (time.hours < 24 && time.minutes < 60 && time.seconds <= 60).then_some(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &[u8] = b"$GNGGA,114529.000,4656.2592,N,00725.8373,E,2,09,1.23";

    fn with_checksum(body: &str) -> std::string::String {
        let sum = body.bytes().skip(1).fold(0u8, |acc, b| acc ^ b);
        format!("{body}*{sum:02X}")
    }

    fn fix(line: &[u8]) -> GgaFix {
        match decode(line, &GNGGA) {
            Decoded::Fix(fix) => fix,
            other => panic!("expected fix, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_sentence_display() {
        let fix = fix(SAMPLE);
        assert_eq!(fix.latitude.display().as_str(), "46 56.259' N");
        assert_eq!(fix.longitude.display().as_str(), "7 25.837' E");
    }

    #[test]
    fn test_sample_sentence_fields() {
        let fix = fix(SAMPLE);
        assert_eq!(
            fix.time,
            UtcTime {
                hours: 11,
                minutes: 45,
                seconds: 29,
                millis: 0
            }
        );
        assert_eq!(fix.quality, FixQuality::Differential);
        assert_eq!(fix.satellites, 9);
        assert_eq!(fix.latitude.degrees, 46);
        assert_eq!(fix.latitude.minutes, 56);
        assert_eq!(fix.latitude.milli_minutes, 259);
        assert_eq!(fix.longitude.degrees, 7);
        assert_eq!(fix.longitude.minutes, 25);
    }

    #[test]
    fn test_other_sentences_are_ignored() {
        let rmc = b"$GNRMC,114529.000,A,4656.2592,N,00725.8373,E,0.0,0.0,010124,,,A";
        assert_eq!(decode(rmc, &GNGGA), Decoded::Ignored);
        let gps_only = b"$GPGGA,114529.000,4656.2592,N,00725.8373,E,1,05,1.0";
        assert_eq!(decode(gps_only, &GNGGA), Decoded::Ignored);
        assert_eq!(decode(b"", &GNGGA), Decoded::Ignored);
    }

    #[test]
    fn test_empty_fix_fields_are_no_fix() {
        let line = b"$GNGGA,114529.000,,,,,0,00,99.99,,,,,,";
        assert_eq!(decode(line, &GNGGA), Decoded::NoFix);
    }

    #[test]
    fn test_too_few_fields_is_no_fix() {
        assert_eq!(decode(b"$GNGGA,114529.000,4656.2592,N", &GNGGA), Decoded::NoFix);
        assert_eq!(decode(b"$GNGGA", &GNGGA), Decoded::NoFix);
    }

    #[test]
    fn test_invalid_quality_is_no_fix() {
        let line = b"$GNGGA,114529.000,4656.2592,N,00725.8373,E,0,09,1.23";
        assert_eq!(decode(line, &GNGGA), Decoded::NoFix);
    }

    #[test]
    fn test_wrong_axis_hemisphere_is_no_fix() {
        let line = b"$GNGGA,114529.000,4656.2592,E,00725.8373,N,1,09,1.23";
        assert_eq!(decode(line, &GNGGA), Decoded::NoFix);
    }

    #[test]
    fn test_out_of_range_minutes_is_no_fix() {
        let line = b"$GNGGA,114529.000,4675.0000,N,00725.8373,E,1,09,1.23";
        assert_eq!(decode(line, &GNGGA), Decoded::NoFix);
    }

    #[test]
    fn test_southern_western_fix() {
        let fix = fix(b"$GNGGA,000000.50,3352.1280,S,15112.5600,W,1,12,0.8,35.0,M");
        assert_eq!(fix.latitude.display().as_str(), "33 52.128' S");
        assert_eq!(fix.longitude.display().as_str(), "151 12.560' W");
        assert_eq!(fix.time.millis, 500);
        assert_eq!(fix.quality, FixQuality::Gps);
    }

    #[test]
    fn test_short_fraction_is_padded() {
        let fix = fix(b"$GNGGA,120000,4701.5,N,00800,E,1,04,2.0");
        assert_eq!(fix.latitude.display().as_str(), "47 01.500' N");
        assert_eq!(fix.longitude.display().as_str(), "8 00.000' E");
    }

    #[test]
    fn test_valid_checksum_accepted() {
        let line = with_checksum(core::str::from_utf8(SAMPLE).unwrap());
        assert!(matches!(decode(line.as_bytes(), &GNGGA), Decoded::Fix(_)));
    }

    #[test]
    fn test_bad_checksum_is_no_fix() {
        let mut line = with_checksum(core::str::from_utf8(SAMPLE).unwrap());
        // 4656.2592 -> 4656.3592: still a valid fix, but the suffix no longer matches
        line.replace_range(23..24, "3");
        assert_eq!(decode(line.as_bytes(), &GNGGA), Decoded::NoFix);
        assert_eq!(decode(b"$GNGGA,1*Z", &GNGGA), Decoded::NoFix);
    }

    #[test]
    fn test_fix_quality_from_u8() {
        assert_eq!(FixQuality::from(0), FixQuality::Invalid);
        assert_eq!(FixQuality::from(4), FixQuality::Other(4));
    }
}
