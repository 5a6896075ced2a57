//! RTC value types
//!
//! Range-checked on construction so handlers cannot program the clock with
//! values the peripheral would reject.

use core::fmt;

/// Day of week, numbered the way the RTC stores it (Monday = 1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Weekday {
    Monday = 1,
    Tuesday = 2,
    Wednesday = 3,
    Thursday = 4,
    Friday = 5,
    Saturday = 6,
    Sunday = 7,
}

impl Weekday {
    /// Convert from the RTC index (1..=7).
    pub fn from_index(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Monday),
            2 => Some(Self::Tuesday),
            3 => Some(Self::Wednesday),
            4 => Some(Self::Thursday),
            5 => Some(Self::Friday),
            6 => Some(Self::Saturday),
            7 => Some(Self::Sunday),
            _ => None,
        }
    }

    /// RTC index
    pub fn index(self) -> u8 {
        self as u8
    }

    /// English name
    pub fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }
}

/// Name for a raw weekday index, empty when out of range.
pub fn weekday_name(index: u8) -> &'static str {
    Weekday::from_index(index).map(Weekday::name).unwrap_or("")
}

/// Wall-clock time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RtcTime {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl RtcTime {
    /// 24h time, `None` if any field is out of range.
    pub fn new(hours: u8, minutes: u8, seconds: u8) -> Option<Self> {
        if hours > 23 || minutes > 59 || seconds > 59 {
            return None;
        }
        Some(Self {
            hours,
            minutes,
            seconds,
        })
    }

    /// `HHMMSS` as one integer (script wire format).
    pub fn packed(&self) -> u32 {
        u32::from(self.hours) * 10_000 + u32::from(self.minutes) * 100 + u32::from(self.seconds)
    }
}

impl fmt::Display for RtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hours, self.minutes, self.seconds)
    }
}

/// Calendar date with a two-digit year (20YY)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RtcDate {
    pub day: u8,
    pub month: u8,
    pub year: u8,
    pub weekday: Weekday,
}

impl RtcDate {
    /// `None` if any field is out of range.
    pub fn new(day: u8, month: u8, year: u8, weekday: u8) -> Option<Self> {
        if !(1..=31).contains(&day) || !(1..=12).contains(&month) || year > 99 {
            return None;
        }
        Some(Self {
            day,
            month,
            year,
            weekday: Weekday::from_index(weekday)?,
        })
    }

    /// `YYMMDD` as one integer (script wire format).
    pub fn packed(&self) -> u32 {
        u32::from(self.year) * 10_000 + u32::from(self.month) * 100 + u32::from(self.day)
    }
}

impl Default for RtcDate {
    fn default() -> Self {
        Self {
            day: 1,
            month: 1,
            year: 0,
            weekday: Weekday::Saturday,
        }
    }
}

impl fmt::Display for RtcDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:02}.{:02}.20{:02}",
            self.weekday.name(),
            self.day,
            self.month,
            self.year
        )
    }
}
