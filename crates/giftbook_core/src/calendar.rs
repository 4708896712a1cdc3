//! Traditional date subtitle for printed and exported documents.
//!
//! Produces `二〇二五年 蛇年 虎月 猪日 午时`: plain-digit year, zodiac of
//! the year, month and day, then the two-hour period (时辰).
//!
//! The day zodiac is a simplified `(year + month + day) mod 12` cycle, not an
//! astronomical stem-branch computation.

use crate::numeral::format_year_digits;
use chrono::{Datelike, NaiveDateTime, Timelike};

const ZODIACS: [&str; 12] = [
    "鼠", "牛", "虎", "兔", "龙", "蛇", "马", "羊", "猴", "鸡", "狗", "猪",
];
/// Month 1 starts at 寅 (tiger).
const MONTH_ZODIACS: [&str; 12] = [
    "虎", "兔", "龙", "蛇", "马", "羊", "猴", "鸡", "狗", "猪", "鼠", "牛",
];
const TIME_PERIODS: [&str; 12] = [
    "子时", "丑时", "寅时", "卯时", "辰时", "巳时", "午时", "未时", "申时", "酉时", "戌时", "亥时",
];

/// Zodiac animal of `year` (2020 → 鼠).
pub fn year_zodiac(year: i32) -> &'static str {
    ZODIACS[(year - 4).rem_euclid(12) as usize]
}

/// Zodiac animal of the 1-based `month`.
pub fn month_zodiac(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_ZODIACS[(month - 1) as usize],
        _ => ZODIACS[0],
    }
}

/// Simplified zodiac animal of a calendar day.
pub fn day_zodiac(year: i32, month: u32, day: u32) -> &'static str {
    let code = i64::from(year) + i64::from(month) + i64::from(day);
    ZODIACS[code.rem_euclid(12) as usize]
}

/// Two-hour period name for `hour` (0..=23), starting at 子时 for 00:00.
pub fn time_period(hour: u32) -> &'static str {
    TIME_PERIODS[(hour.min(23) / 2) as usize]
}

/// Full subtitle line for `now`.
pub fn traditional_subtitle(now: NaiveDateTime) -> String {
    let year = now.year();
    let year_text = u32::try_from(year)
        .map(format_year_digits)
        .unwrap_or_else(|_| year.to_string());
    format!(
        "{}年 {}年 {}月 {}日 {}",
        year_text,
        year_zodiac(year),
        month_zodiac(now.month()),
        day_zodiac(year, now.month(), now.day()),
        time_period(now.hour())
    )
}

#[cfg(test)]
mod tests {
    use super::{day_zodiac, month_zodiac, time_period, traditional_subtitle, year_zodiac};
    use chrono::NaiveDate;

    #[test]
    fn zodiac_cycles() {
        assert_eq!(year_zodiac(2020), "鼠");
        assert_eq!(year_zodiac(2025), "蛇");
        assert_eq!(month_zodiac(1), "虎");
        assert_eq!(month_zodiac(12), "牛");
        assert_eq!(day_zodiac(2025, 1, 1), "猪");
    }

    #[test]
    fn time_period_covers_two_hour_windows() {
        assert_eq!(time_period(0), "子时");
        assert_eq!(time_period(1), "子时");
        assert_eq!(time_period(12), "午时");
        assert_eq!(time_period(23), "亥时");
    }

    #[test]
    fn subtitle_joins_all_parts() {
        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .and_then(|date| date.and_hms_opt(12, 30, 0))
            .expect("valid datetime");
        assert_eq!(traditional_subtitle(now), "二〇二五年 蛇年 虎月 猪日 午时");
    }
}
