//! Two-Line Element (TLE) set parser.
//!
//! Parses standard NORAD/CelesTrak TLE records (2-line, or 3-line with a name)
//! and validates them strictly: line numbers, column width, per-line checksums
//! and matching catalog numbers. A record that passes here is safe to hand to
//! the SGP4 model.
//!
//! # TLE Format Reference
//! ```text
//! Line 0 (optional): Satellite Name (up to 24 chars)
//! Line 1: 1 NNNNNC NNNNNAAA NNNNN.NNNNNNNN +.NNNNNNNN +NNNNN-N +NNNNN-N N NNNNN
//! Line 2: 2 NNNNN NNN.NNNN NNN.NNNN NNNNNNN NNN.NNNN NNN.NNNN NN.NNNNNNNNNNNNNN
//! ```
//!
//! # Example
//! ```
//! use orbit_radar::tle::Tle;
//!
//! let line1 = "1 25544U 98067A   24001.50000000  .00016717  00000-0  10270-3 0  9009";
//! let line2 = "2 25544  51.6400 208.5000 0007417  68.0000 292.1000 15.49560000400004";
//!
//! let tle = Tle::parse(line1, line2).unwrap();
//! assert_eq!(tle.norad_id, 25544);
//! ```

use hifitime::{Epoch, Unit};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

/// Width of a TLE data line, checksum included.
pub const LINE_WIDTH: usize = 69;

/// TLE parsing errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TleError {
    #[error("Line {line} must start with '{line}', got '{found}'")]
    InvalidLineStart { line: u8, found: char },

    #[error("Line {line} length must be 69 characters, got {len}")]
    InvalidLineLength { line: u8, len: usize },

    #[error("Line {0} contains non-ASCII characters")]
    NonAscii(u8),

    #[error("NORAD IDs don't match between lines: {0} vs {1}")]
    NoradIdMismatch(u32, u32),

    #[error("Checksum column on line {line} is not a digit: '{found}'")]
    InvalidChecksumDigit { line: u8, found: char },

    #[error("Checksum failed on line {line}: expected {expected}, computed {computed}")]
    ChecksumFailed {
        line: u8,
        expected: u8,
        computed: u8,
    },

    #[error("Failed to parse field '{field}': '{value}'")]
    ParseField { field: &'static str, value: String },

    #[error("Failed to parse implied-decimal field '{0}'")]
    ImpliedDecimal(String),

    #[error("Mean motion must be positive and finite, got {0} rev/day")]
    InvalidMeanMotion(f64),

    #[error("SGP4 model rejected the elements: {0}")]
    Model(String),

    #[error("No TLEs found in input")]
    Empty,
}

/// A parsed Two-Line Element set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tle {
    /// Satellite name (from line 0, if present).
    pub name: Option<String>,
    /// NORAD catalog number.
    pub norad_id: u32,
    /// International designator (launch year, launch number, piece).
    pub intl_designator: String,
    /// Classification (U=unclassified, C=classified, S=secret).
    pub classification: char,
    /// Epoch year (full 4-digit year).
    pub epoch_year: u16,
    /// Epoch day of year (fractional, 1.0 = Jan 1 00:00 UTC).
    pub epoch_day: f64,
    /// First derivative of mean motion (rev/day²) / 2.
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion (rev/day³) / 6.
    pub mean_motion_ddot: f64,
    /// B* drag term (1/Earth radii).
    pub bstar: f64,
    /// Element set number.
    pub element_set: u16,
    /// Inclination (degrees).
    pub inclination_deg: f64,
    /// Right ascension of ascending node (degrees).
    pub raan_deg: f64,
    /// Eccentricity (dimensionless).
    pub eccentricity: f64,
    /// Argument of perigee (degrees).
    pub arg_perigee_deg: f64,
    /// Mean anomaly (degrees).
    pub mean_anomaly_deg: f64,
    /// Mean motion (revolutions per day).
    pub mean_motion_rev_day: f64,
    /// Revolution number at epoch.
    pub rev_number: u32,
}

impl Tle {
    /// Parse a TLE from two lines (without satellite name).
    pub fn parse(line1: &str, line2: &str) -> Result<Self, TleError> {
        Self::parse_with_name(None, line1, line2)
    }

    /// Parse a TLE from three lines (with satellite name on line 0).
    pub fn parse_3line(line0: &str, line1: &str, line2: &str) -> Result<Self, TleError> {
        let name = line0.trim().trim_start_matches("0 ").to_string();
        let name = if name.is_empty() { None } else { Some(name) };
        Self::parse_with_name(name, line1, line2)
    }

    fn parse_with_name(name: Option<String>, line1: &str, line2: &str) -> Result<Self, TleError> {
        let l1 = validate_line(1, line1)?;
        let l2 = validate_line(2, line2)?;

        // ── Line 1 ──
        let norad_id_1: u32 = parse_field(&l1[2..7], "norad_id (line 1)")?;
        let classification = l1.as_bytes()[7] as char;
        let intl_designator = l1[9..17].trim().to_string();

        let epoch_year_2d: u16 = parse_field(&l1[18..20], "epoch_year")?;
        let epoch_year = if epoch_year_2d >= 57 {
            1900 + epoch_year_2d
        } else {
            2000 + epoch_year_2d
        };
        let epoch_day: f64 = parse_field(&l1[20..32], "epoch_day")?;
        if !(1.0..367.0).contains(&epoch_day) {
            return Err(TleError::ParseField {
                field: "epoch_day",
                value: l1[20..32].trim().to_string(),
            });
        }

        let mean_motion_dot: f64 = parse_field(&l1[33..43], "mean_motion_dot")?;
        let mean_motion_ddot = parse_implied_decimal(&l1[44..52])?;
        let bstar = parse_implied_decimal(&l1[53..61])?;
        let element_set: u16 = parse_field(&l1[64..68], "element_set")?;

        // ── Line 2 ──
        let norad_id_2: u32 = parse_field(&l2[2..7], "norad_id (line 2)")?;
        if norad_id_1 != norad_id_2 {
            return Err(TleError::NoradIdMismatch(norad_id_1, norad_id_2));
        }

        let inclination_deg: f64 = parse_field(&l2[8..16], "inclination")?;
        let raan_deg: f64 = parse_field(&l2[17..25], "raan")?;

        // Eccentricity has an implied leading decimal point
        let ecc_digits = l2[26..33].trim();
        if ecc_digits.is_empty() || !ecc_digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TleError::ParseField {
                field: "eccentricity",
                value: ecc_digits.to_string(),
            });
        }
        let eccentricity: f64 = parse_field(&format!("0.{ecc_digits}"), "eccentricity")?;

        let arg_perigee_deg: f64 = parse_field(&l2[34..42], "arg_perigee")?;
        let mean_anomaly_deg: f64 = parse_field(&l2[43..51], "mean_anomaly")?;
        let mean_motion_rev_day: f64 = parse_field(&l2[52..63], "mean_motion")?;
        if !mean_motion_rev_day.is_finite() || mean_motion_rev_day <= 0.0 {
            return Err(TleError::InvalidMeanMotion(mean_motion_rev_day));
        }
        let rev_number: u32 = parse_field(&l2[63..68], "rev_number")?;

        Ok(Tle {
            name,
            norad_id: norad_id_1,
            intl_designator,
            classification,
            epoch_year,
            epoch_day,
            mean_motion_dot,
            mean_motion_ddot,
            bstar,
            element_set,
            inclination_deg,
            raan_deg,
            eccentricity,
            arg_perigee_deg,
            mean_anomaly_deg,
            mean_motion_rev_day,
            rev_number,
        })
    }

    /// Parse every record found in a multi-record string.
    ///
    /// See [`records`] for how records and names are recognized.
    pub fn parse_batch(input: &str) -> Result<Vec<Self>, TleError> {
        let tles = records(input)
            .into_iter()
            .map(|r| r.parse())
            .collect::<Result<Vec<_>, _>>()?;

        if tles.is_empty() {
            return Err(TleError::Empty);
        }
        Ok(tles)
    }

    /// TLE epoch as a UTC instant.
    pub fn epoch(&self) -> Epoch {
        Epoch::from_gregorian_utc_at_midnight(self.epoch_year as i32, 1, 1)
            + Unit::Day * (self.epoch_day - 1.0)
    }

    /// Mean motion (rad/s).
    pub fn mean_motion_rad_s(&self) -> f64 {
        self.mean_motion_rev_day * TAU / SOLAR_DAY
    }

    /// Semi-major axis derived from mean motion (km).
    ///
    /// Uses Kepler's third law: a = (μ / n²)^(1/3)
    pub fn semi_major_axis(&self) -> f64 {
        (MU_EARTH / self.mean_motion_rad_s().powi(2)).cbrt()
    }

    /// Altitude above Earth's equator (km), assuming circular orbit.
    pub fn altitude(&self) -> f64 {
        self.semi_major_axis() - R_EARTH
    }
}

impl std::fmt::Display for Tle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (NORAD {}) {:.1} km, {:.1}° inc, {:.4} ecc, {:.2} rev/day",
            self.name.as_deref().unwrap_or("UNKNOWN"),
            self.norad_id,
            self.altitude(),
            self.inclination_deg,
            self.eccentricity,
            self.mean_motion_rev_day,
        )
    }
}

/// The raw lines of one record found in free-form text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TleRecord<'a> {
    pub name: Option<&'a str>,
    pub line1: &'a str,
    pub line2: &'a str,
}

impl TleRecord<'_> {
    pub fn parse(&self) -> Result<Tle, TleError> {
        match self.name {
            Some(name) => Tle::parse_3line(name, self.line1, self.line2),
            None => Tle::parse(self.line1, self.line2),
        }
    }
}

fn is_data_line(line: &str) -> bool {
    line.starts_with("1 ") || line.starts_with("2 ")
}

/// Split fetched text into records.
///
/// A `1 ` line followed by a `2 ` line is a record. The line right before it
/// is its name unless that line is itself a data line. Blank lines and
/// unrelated text are skipped; nothing is validated here.
pub fn records(input: &str) -> Vec<TleRecord<'_>> {
    let lines: Vec<&str> = input
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut found = Vec::new();
    let mut i = 0;
    while i + 1 < lines.len() {
        if lines[i].starts_with("1 ") && lines[i + 1].starts_with("2 ") {
            let name = i
                .checked_sub(1)
                .map(|j| lines[j])
                .filter(|l| !is_data_line(l));
            found.push(TleRecord {
                name,
                line1: lines[i],
                line2: lines[i + 1],
            });
            i += 2;
        } else {
            i += 1;
        }
    }
    found
}

/// Check line number, width, ASCII content and checksum of one data line.
fn validate_line(line: u8, raw: &str) -> Result<&str, TleError> {
    let text = raw.trim();
    if !text.is_ascii() {
        return Err(TleError::NonAscii(line));
    }
    if text.len() != LINE_WIDTH {
        return Err(TleError::InvalidLineLength {
            line,
            len: text.len(),
        });
    }

    let bytes = text.as_bytes();
    let expected_start = b'0' + line;
    if bytes[0] != expected_start || bytes[1] != b' ' {
        return Err(TleError::InvalidLineStart {
            line,
            found: bytes[0] as char,
        });
    }

    let found = bytes[LINE_WIDTH - 1];
    if !found.is_ascii_digit() {
        return Err(TleError::InvalidChecksumDigit {
            line,
            found: found as char,
        });
    }
    let expected = found - b'0';
    let computed = compute_checksum(&text[..LINE_WIDTH - 1]);
    if expected != computed {
        return Err(TleError::ChecksumFailed {
            line,
            expected,
            computed,
        });
    }

    Ok(text)
}

fn parse_field<T: std::str::FromStr>(s: &str, field: &'static str) -> Result<T, TleError> {
    s.trim().parse::<T>().map_err(|_| TleError::ParseField {
        field,
        value: s.trim().to_string(),
    })
}

/// Parse the TLE "implied decimal" format: " NNNNN-N" → float.
///
/// Examples: " 16538-4" → 0.16538e-4, "-11606-4" → -0.11606e-4
fn parse_implied_decimal(s: &str) -> Result<f64, TleError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0.0);
    }

    let bytes = s.as_bytes();
    let exp_pos = (1..bytes.len())
        .rev()
        .find(|&i| bytes[i] == b'+' || bytes[i] == b'-');

    let (mantissa_str, exp_str) = match exp_pos {
        Some(pos) => (&s[..pos], &s[pos..]),
        None => (s, "+0"),
    };

    let sign = if mantissa_str.starts_with('-') { "-" } else { "" };
    let digits = mantissa_str.trim_start_matches(['+', '-', ' ']);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TleError::ImpliedDecimal(s.to_string()));
    }

    format!("{sign}0.{digits}e{exp_str}")
        .parse::<f64>()
        .map_err(|_| TleError::ImpliedDecimal(s.to_string()))
}

/// Compute TLE checksum (mod-10 of sum of digits, '-' counts as 1).
fn compute_checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .map(|b| match b {
            b'0'..=b'9' => (b - b'0') as u32,
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}
