use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Regulatory evaluation window. Day is a non-wrapping clock interval; Night
/// wraps past midnight. The gaps 20:00–21:00 and 06:00–07:00 belong to
/// neither period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Day,
    Night,
}

impl Period {
    pub const ALL: [Period; 2] = [Period::Day, Period::Night];

    pub fn contains(self, t: NaiveTime) -> bool {
        match self {
            Period::Day => t >= hms(7, 0, 0) && t <= hms(20, 0, 0),
            Period::Night => t >= hms(21, 0, 0) || t <= hms(6, 0, 0),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Night => "night",
        }
    }
}

/// Calendar classification of a date, a pure function of its weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayType {
    Ordinary,
    SundayHoliday,
}

impl DayType {
    pub fn of(date: NaiveDate) -> DayType {
        if date.weekday() == Weekday::Sun {
            DayType::SundayHoliday
        } else {
            DayType::Ordinary
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DayType::Ordinary => "ordinary",
            DayType::SundayHoliday => "sunday-holiday",
        }
    }
}

/// Date a sample is grouped under for daily aggregation.
///
/// Night samples measured after midnight belong to the evening that started
/// the night, so the timestamp is shifted back 6 h 59 min before taking the
/// date: anything from 00:00 through 06:59 lands on the previous day.
pub fn measurement_date(ts: NaiveDateTime) -> NaiveDate {
    (ts - Duration::minutes(6 * 60 + 59)).date()
}

fn hms(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}
