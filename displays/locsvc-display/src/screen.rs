//! Frame state: the three text fields on the panel
//!
//! Each updater rewrites its own field and reports whether the text
//! actually changed, so the render loop can skip redundant redraws.

use core::fmt::Write;

use heapless::String;
use locsvc_protocol::nmea::{self, Decoded, SentenceId, DISPLAY_LEN, GNGGA};

use crate::framebuffer::{Framebuffer, LINE_HEIGHT};

/// Maximum characters per field
pub const FIELD_LEN: usize = DISPLAY_LEN;

/// Shown for a coordinate while there is no valid fix
pub const NO_FIX: &str = "no fix";

/// Shown for the heading before the first sample
pub const NO_HEADING: &str = "---";

/// Text field identifiers, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Latitude,
    Longitude,
    Heading,
}

impl Field {
    /// All fields in drawing order
    pub const ALL: [Field; 3] = [Field::Latitude, Field::Longitude, Field::Heading];

    /// Top-left corner of the field in pixels
    pub const fn origin(self) -> (i32, i32) {
        match self {
            Field::Latitude => (0, 0),
            Field::Longitude => (0, LINE_HEIGHT),
            Field::Heading => (0, 2 * LINE_HEIGHT),
        }
    }
}

/// Text currently shown on the panel
#[derive(Clone)]
pub struct Screen {
    latitude: String<FIELD_LEN>,
    longitude: String<FIELD_LEN>,
    heading: String<FIELD_LEN>,
    sentence: SentenceId,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

/// Replace `dst` with `src`, truncated to capacity; returns whether it changed
fn replace<const N: usize>(dst: &mut String<N>, src: &str) -> bool {
    let mut next: String<N> = String::new();
    for c in src.chars() {
        if next.push(c).is_err() {
            break;
        }
    }
    if *dst == next {
        return false;
    }
    *dst = next;
    true
}

impl Screen {
    /// Placeholder text in every field, decoding `$GNGGA`
    pub fn new() -> Self {
        Self::with_sentence(GNGGA)
    }

    /// Placeholder text in every field, decoding `sentence` for position
    pub fn with_sentence(sentence: SentenceId) -> Self {
        let mut screen = Self {
            latitude: String::new(),
            longitude: String::new(),
            heading: String::new(),
            sentence,
        };
        replace(&mut screen.latitude, NO_FIX);
        replace(&mut screen.longitude, NO_FIX);
        replace(&mut screen.heading, NO_HEADING);
        screen
    }

    /// Current text of `field`
    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
            Field::Heading => &self.heading,
        }
    }

    /// Apply one NMEA line
    ///
    /// Other sentence types leave the fields untouched. A matching sentence
    /// without a usable fix shows [`NO_FIX`].
    pub fn update_gps(&mut self, line: &[u8]) -> bool {
        match nmea::decode(line, &self.sentence) {
            Decoded::Ignored => false,
            Decoded::NoFix => {
                let lat = replace(&mut self.latitude, NO_FIX);
                let lon = replace(&mut self.longitude, NO_FIX);
                lat | lon
            }
            Decoded::Fix(fix) => {
                log_trace!("screen: fix with {} satellites", fix.satellites);
                let lat = replace(&mut self.latitude, &fix.latitude.display());
                let lon = replace(&mut self.longitude, &fix.longitude.display());
                lat | lon
            }
        }
    }

    /// Apply one compass heading in degrees
    pub fn update_heading(&mut self, degrees: i16) -> bool {
        let mut text: String<FIELD_LEN> = String::new();
        let _ = write!(text, "{} deg", degrees);
        replace(&mut self.heading, &text)
    }

    /// Clear `fb` and print every field at its origin
    pub fn draw(&self, fb: &mut Framebuffer) {
        fb.clear();
        for field in Field::ALL {
            let (x, y) = field.origin();
            fb.print(self.text(field), x, y);
        }
    }
}
