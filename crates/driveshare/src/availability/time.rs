use std::{fmt, str::FromStr};

use super::{AvailabilityError, Result};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// A wall-clock time with minute resolution, `00:00` to `23:59`.
///
/// Serializes as minutes since midnight.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u16", into = "u16"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    #[must_use]
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then(|| Self(hour * 60 + minute))
    }

    #[must_use]
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Minutes since midnight.
    #[must_use]
    pub const fn minutes(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn hour(self) -> u16 {
        self.0 / 60
    }

    #[must_use]
    pub const fn minute(self) -> u16 {
        self.0 % 60
    }
}

impl TryFrom<u16> for TimeOfDay {
    type Error = AvailabilityError;

    fn try_from(minutes: u16) -> Result<Self> {
        Self::from_minutes(minutes)
            .ok_or_else(|| AvailabilityError::InvalidTimeFormat(minutes.to_string()))
    }
}

impl From<TimeOfDay> for u16 {
    fn from(time: TimeOfDay) -> Self {
        time.0
    }
}

fn digits(component: &str, max_len: usize) -> Option<u16> {
    if component.is_empty()
        || component.len() > max_len
        || !component.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    component.parse().ok()
}

/// Parses `"H:MM"` or `"HH:MM"`. Surrounding whitespace is ignored; signs,
/// seconds and single-digit minutes are rejected.
impl FromStr for TimeOfDay {
    type Err = AvailabilityError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AvailabilityError::InvalidTimeFormat(s.to_string());
        let mut parts = s.trim().split(':');
        let (Some(hour), Some(minute), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if minute.len() != 2 {
            return Err(invalid());
        }
        let hour = digits(hour, 2).ok_or_else(invalid)?;
        let minute = digits(minute, 2).ok_or_else(invalid)?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Half-open interval `[start, end)` within one day. `start < end` always holds.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawInterval", into = "RawInterval"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    start: TimeOfDay,
    end: TimeOfDay,
}

/// Unchecked wire form of [`TimeInterval`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawInterval {
    start: TimeOfDay,
    end: TimeOfDay,
}

#[cfg(feature = "serde")]
impl TryFrom<RawInterval> for TimeInterval {
    type Error = AvailabilityError;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Self::new(raw.start, raw.end)
    }
}

#[cfg(feature = "serde")]
impl From<TimeInterval> for RawInterval {
    fn from(interval: TimeInterval) -> Self {
        Self {
            start: interval.start,
            end: interval.end,
        }
    }
}

impl TimeInterval {
    /// # Errors
    ///
    /// [`AvailabilityError::EndBeforeStart`] unless `start < end`.
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(AvailabilityError::EndBeforeStart { start, end })
        }
    }

    /// Parses both ends, then checks their order.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = start.parse()?;
        let end = end.parse()?;
        Self::new(start, end)
    }

    #[must_use]
    pub const fn start(&self) -> TimeOfDay {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> TimeOfDay {
        self.end
    }

    #[must_use]
    pub const fn duration_minutes(&self) -> u16 {
        self.end.0 - self.start.0
    }

    #[must_use]
    pub fn hours(&self) -> f64 {
        f64::from(self.duration_minutes()) / 60.0
    }

    /// True if `other` lies entirely within `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Half-open overlap: touching endpoints do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(start: &str, end: &str) -> TimeInterval {
        TimeInterval::parse(start, end).unwrap()
    }

    #[test]
    fn test_parse_valid_times() {
        assert_eq!("09:00".parse::<TimeOfDay>().unwrap().minutes(), 540);
        assert_eq!("9:30".parse::<TimeOfDay>().unwrap().minutes(), 570);
        assert_eq!("00:00".parse::<TimeOfDay>().unwrap().minutes(), 0);
        assert_eq!("23:59".parse::<TimeOfDay>().unwrap().minutes(), 1439);
        assert_eq!(" 12:05 ".parse::<TimeOfDay>().unwrap().to_string(), "12:05");
    }

    #[test]
    fn test_parse_rejects_malformed_times() {
        for bad in [
            "", "9", "0900", "09:00:00", "24:00", "12:60", "-1:00", "+9:00", "ab:cd", "9:5",
            ":30", "12:", "123:00", "09.00",
        ] {
            assert!(
                matches!(
                    bad.parse::<TimeOfDay>(),
                    Err(AvailabilityError::InvalidTimeFormat(_))
                ),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_interval_order() {
        assert!(matches!(
            TimeInterval::parse("11:00", "10:00"),
            Err(AvailabilityError::EndBeforeStart { .. })
        ));
        assert!(matches!(
            TimeInterval::parse("10:00", "10:00"),
            Err(AvailabilityError::EndBeforeStart { .. })
        ));
        assert!(matches!(
            TimeInterval::parse("10:00", "1000"),
            Err(AvailabilityError::InvalidTimeFormat(_))
        ));
    }

    #[test]
    fn test_touching_intervals_do_not_overlap() {
        let a = interval("09:00", "10:00");
        let b = interval("10:00", "11:00");
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_one_minute_overlap_is_detected() {
        let a = interval("09:00", "10:01");
        let b = interval("10:00", "11:00");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn test_containment() {
        let window = interval("08:00", "20:00");
        assert!(window.contains(&interval("08:00", "20:00")));
        assert!(window.contains(&interval("09:00", "11:00")));
        assert!(!window.contains(&interval("07:59", "09:00")));
        assert!(!window.contains(&interval("19:00", "20:01")));
    }

    #[test]
    fn test_new_rejects_out_of_range_components() {
        assert_eq!(TimeOfDay::new(23, 59).map(TimeOfDay::minutes), Some(1439));
        assert_eq!(TimeOfDay::new(24, 0), None);
        assert_eq!(TimeOfDay::new(12, 60), None);
        assert_eq!(TimeOfDay::new(2000, 0), None);
        assert_eq!(TimeOfDay::new(u16::MAX, 0), None);
        assert_eq!(TimeOfDay::new(0, u16::MAX), None);
        assert_eq!(TimeOfDay::from_minutes(1440), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_enforces_invariants() {
        let interval = interval("09:00", "10:30");
        let json = serde_json::to_string(&interval).unwrap();
        assert_eq!(json, r#"{"start":540,"end":630}"#);
        assert_eq!(serde_json::from_str::<TimeInterval>(&json).unwrap(), interval);

        assert!(serde_json::from_str::<TimeOfDay>("5000").is_err());
        assert!(serde_json::from_str::<TimeInterval>(r#"{"start":900,"end":600}"#).is_err());
        assert!(serde_json::from_str::<TimeInterval>(r#"{"start":600,"end":600}"#).is_err());
        assert!(serde_json::from_str::<TimeInterval>(r#"{"start":0,"end":1440}"#).is_err());
    }

    #[test]
    fn test_duration() {
        let i = interval("09:00", "11:30");
        assert_eq!(i.duration_minutes(), 150);
        assert!((i.hours() - 2.5).abs() < f64::EPSILON);
        assert_eq!(i.to_string(), "09:00-11:30");
    }
}
