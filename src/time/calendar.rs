//! Seconds since 1970 to calendar fields, and the packed FAT date/time
//! format file timestamps are kept in.

use std::fmt;

const SECS_PER_DAY: u32 = 86_400;

/// Days since 1970-01-01 of 2100-03-01. 2100 is not a leap year but the
/// day-count below treats it as one, so later dates are shifted by a day.
const NO_LEAP_2100: u32 = 47_541;

/// Days from the Julian-style epoch used below to 1970-01-01.
const EPOCH_OFFSET: u32 = 2 * 365 + 1 + 1524;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// FAT directory entry timestamp: `date` is `yyyyyyym mmmddddd` counted
/// from 1980, `time` is `hhhhhmmm mmmsssss` with two-second resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatTimestamp {
    pub date: u16,
    pub time: u16,
}

impl DateTime {
    /// Calendar fields of `secs` seconds since 1970-01-01 00:00:00.
    ///
    /// Valid for the whole `u32` range (up to 2106).
    pub fn from_unix(secs: u32) -> Self {
        let mut days = secs / SECS_PER_DAY;
        if days >= NO_LEAP_2100 {
            days += 1;
        }

        let b = days + EPOCH_OFFSET;
        let c = (b * 100 - 12_210) / 36_525;
        let d = (36_525 * c) / 100;
        let e = (b - d) * 10_000 / 306_001;

        let day = b - d - (e * 306_001) / 10_000;
        let month = if e >= 14 { e - 13 } else { e - 1 };
        let year = if month > 2 { c + 1964 } else { c + 1965 };

        let in_day = secs % SECS_PER_DAY;
        Self {
            year: year as u16,
            month: month as u8,
            day: day as u8,
            hour: (in_day / 3600) as u8,
            minute: (in_day % 3600 / 60) as u8,
            second: (in_day % 60) as u8,
        }
    }

    /// Dates before 1980 cannot be represented and collapse to
    /// 1980-01-01 00:00:00.
    pub fn to_fat(&self) -> FatTimestamp {
        if self.year < 1980 {
            return FatTimestamp {
                date: (1 << 5) | 1,
                time: 0,
            };
        }

        let date = ((self.year - 1980) << 9) | (u16::from(self.month) << 5) | u16::from(self.day);
        let time = (u16::from(self.hour) << 11)
            | (u16::from(self.minute) << 5)
            | u16::from(self.second >> 1);
        FatTimestamp { date, time }
    }

    pub fn from_fat(ts: FatTimestamp) -> Self {
        Self {
            year: 1980 + (ts.date >> 9),
            month: ((ts.date >> 5) & 0x0f) as u8,
            day: (ts.date & 0x1f) as u8,
            hour: (ts.time >> 11) as u8,
            minute: ((ts.time >> 5) & 0x3f) as u8,
            second: ((ts.time & 0x1f) * 2) as u8,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Time of day as `H:MM:SS`.
pub fn format_time(secs: u32) -> String {
    format!(
        "{}:{:02}:{:02}",
        secs % SECS_PER_DAY / 3600,
        secs % 3600 / 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_first_of_january_1970() {
        let dt = DateTime::from_unix(0);
        assert_eq!((dt.year, dt.month, dt.day), (1970, 1, 1));
    }
}
