use std::{error::Error, fmt::Display, num::ParseIntError, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};

/// An inclusive range of spectrum indices. An unset bound extends to the
/// corresponding end of the run.
///
/// Deserializes from either `{ start, end }` or the `start-end` text form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScanRangeRepr")]
pub struct ScanRange {
    pub start: Option<usize>,
    pub end: Option<usize>,
}

impl ScanRange {
    pub fn new(start: Option<usize>, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// The whole run
    pub fn full() -> Self {
        Self::default()
    }

    pub fn is_full(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start.map(|s| s <= index).unwrap_or(true)
            && self.end.map(|e| index <= e).unwrap_or(true)
    }

    /// Resolve the unset bounds against a run of `len` spectra, clamping the
    /// end to the last spectrum. Returns `None` when nothing in the run falls
    /// within the range.
    pub fn resolve(&self, len: usize) -> Option<RangeInclusive<usize>> {
        if len == 0 {
            return None;
        }
        let start = self.start.unwrap_or(0);
        let end = self.end.unwrap_or(len - 1).min(len - 1);
        if start > end {
            None
        } else {
            Some(start..=end)
        }
    }
}

impl Display for ScanRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end) {
            (Some(s), Some(e)) => write!(f, "{s}-{e}"),
            (Some(s), None) => write!(f, "{s}-"),
            (None, Some(e)) => write!(f, "-{e}"),
            (None, None) => f.write_str("-"),
        }
    }
}

#[derive(Debug)]
pub enum ScanRangeParseError {
    MalformedStart(ParseIntError),
    MalformedEnd(ParseIntError),
}

impl Display for ScanRangeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanRangeParseError::MalformedStart(e) => {
                write!(f, "Failed to parse scan range start {e}")
            }
            ScanRangeParseError::MalformedEnd(e) => {
                write!(f, "Failed to parse scan range end {e}")
            }
        }
    }
}

impl Error for ScanRangeParseError {}

fn parse_bound(token: Option<&str>) -> Result<Option<usize>, ParseIntError> {
    match token.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some),
    }
}

impl FromStr for ScanRange {
    type Err = ScanRangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut tokens = if s.contains(':') {
            s.splitn(2, ':')
        } else if s.contains('-') {
            s.splitn(2, '-')
        } else {
            s.splitn(2, ' ')
        };
        let start = parse_bound(tokens.next()).map_err(ScanRangeParseError::MalformedStart)?;
        let end = parse_bound(tokens.next()).map_err(ScanRangeParseError::MalformedEnd)?;
        Ok(Self { start, end })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScanRangeRepr {
    Text(String),
    Start(usize),
    Bounds {
        start: Option<usize>,
        end: Option<usize>,
    },
}

impl TryFrom<ScanRangeRepr> for ScanRange {
    type Error = ScanRangeParseError;

    fn try_from(value: ScanRangeRepr) -> Result<Self, Self::Error> {
        match value {
            ScanRangeRepr::Text(text) => text.parse(),
            ScanRangeRepr::Start(start) => Ok(Self::new(Some(start), None)),
            ScanRangeRepr::Bounds { start, end } => Ok(Self::new(start, end)),
        }
    }
}

impl From<RangeInclusive<usize>> for ScanRange {
    fn from(value: RangeInclusive<usize>) -> Self {
        Self::new(Some(*value.start()), Some(*value.end()))
    }
}

impl From<(usize, usize)> for ScanRange {
    fn from(value: (usize, usize)) -> Self {
        Self::new(Some(value.0), Some(value.1))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_scan_range_fromstr() -> Result<(), ScanRangeParseError> {
        let r: ScanRange = "52-".parse()?;
        assert_eq!(r, ScanRange::new(Some(52), None));

        let r: ScanRange = "-52".parse()?;
        assert_eq!(r, ScanRange::new(None, Some(52)));

        let r: ScanRange = "32-52".parse()?;
        assert_eq!(r, ScanRange::new(Some(32), Some(52)));

        let r: ScanRange = "32:52".parse()?;
        assert_eq!(r, ScanRange::new(Some(32), Some(52)));

        let r: ScanRange = "-".parse()?;
        assert!(r.is_full());

        let r: ScanRange = "12".parse()?;
        assert_eq!(r, ScanRange::new(Some(12), None));
        Ok(())
    }

    #[test]
    fn test_scan_range_fromstr_malformed() {
        assert!(matches!(
            "a-".parse::<ScanRange>(),
            Err(ScanRangeParseError::MalformedStart(_))
        ));
        assert!(matches!(
            "-b".parse::<ScanRange>(),
            Err(ScanRangeParseError::MalformedEnd(_))
        ));
        assert!(matches!(
            "a-b".parse::<ScanRange>(),
            Err(ScanRangeParseError::MalformedStart(_))
        ));
    }

    #[test]
    fn test_display_roundtrip() -> Result<(), ScanRangeParseError> {
        for text in ["5-10", "5-", "-10", "-"] {
            let r: ScanRange = text.parse()?;
            assert_eq!(r.to_string(), text);
        }
        Ok(())
    }

    #[test]
    fn test_deserialize_forms() -> Result<(), serde_json::Error> {
        let r: ScanRange = serde_json::from_str(r#"{"start": 5, "end": 10}"#)?;
        assert_eq!(r, ScanRange::new(Some(5), Some(10)));

        let r: ScanRange = serde_json::from_str(r#"{"end": 10}"#)?;
        assert_eq!(r, ScanRange::new(None, Some(10)));

        let r: ScanRange = serde_json::from_str(r#""100-2500""#)?;
        assert_eq!(r, ScanRange::new(Some(100), Some(2500)));

        let r: ScanRange = serde_json::from_str("7")?;
        assert_eq!(r, ScanRange::new(Some(7), None));

        assert!(serde_json::from_str::<ScanRange>(r#""a-b""#).is_err());
        Ok(())
    }

    #[test]
    fn test_resolve() {
        assert_eq!(ScanRange::full().resolve(10), Some(0..=9));
        assert_eq!(ScanRange::new(Some(3), None).resolve(10), Some(3..=9));
        assert_eq!(ScanRange::new(None, Some(40)).resolve(10), Some(0..=9));
        assert_eq!(ScanRange::new(Some(12), None).resolve(10), None);
        assert_eq!(ScanRange::new(Some(5), Some(2)).resolve(10), None);
        assert_eq!(ScanRange::full().resolve(0), None);
    }

    #[test]
    fn test_contains() {
        let r = ScanRange::from(2..=4);
        assert!(!r.contains(1));
        assert!(r.contains(2));
        assert!(r.contains(4));
        assert!(!r.contains(5));
        assert!(ScanRange::full().contains(usize::MAX));
    }
}
