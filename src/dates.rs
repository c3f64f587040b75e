//! Date context injected into prompts so relative expressions such as
//! "วันนี้" or "สัปดาห์นี้" resolve to concrete dates.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime};
use serde::Serialize;

const THAI_WEEKDAYS: [&str; 7] = ["จันทร์", "อังคาร", "พุธ", "พฤหัสบดี", "ศุกร์", "เสาร์", "อาทิตย์"];
const THAI_MONTHS: [&str; 12] = [
    "มกราคม",
    "กุมภาพันธ์",
    "มีนาคม",
    "เมษายน",
    "พฤษภาคม",
    "มิถุนายน",
    "กรกฎาคม",
    "สิงหาคม",
    "กันยายน",
    "ตุลาคม",
    "พฤศจิกายน",
    "ธันวาคม",
];

/// Offset between the Gregorian and the Thai Buddhist-era year.
pub const BUDDHIST_ERA_OFFSET: i32 = 543;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateContext {
    pub today: String,
    pub yesterday: String,
    pub tomorrow: String,
    pub week_start: String,
    pub week_end: String,
    pub month_start: String,
    pub month_end: String,
    pub today_th: String,
    pub yesterday_th: String,
    pub day_of_week: String,
    pub day_of_month: u32,
    pub month: String,
    pub year_th: i32,
    pub year_ad: i32,
    pub week_number: u32,
    pub time: String,
}

impl DateContext {
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    pub fn from_datetime(now: NaiveDateTime) -> Self {
        let today = now.date();
        let yesterday = today - Duration::days(1);
        let tomorrow = today + Duration::days(1);

        let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
        let week_end = week_start + Duration::days(6);

        let month_start = today.with_day(1).unwrap_or(today);
        let month_end = last_day_of_month(today);

        Self {
            today: iso(today),
            yesterday: iso(yesterday),
            tomorrow: iso(tomorrow),
            week_start: iso(week_start),
            week_end: iso(week_end),
            month_start: iso(month_start),
            month_end: iso(month_end),
            today_th: thai_long_date(today),
            yesterday_th: thai_long_date(yesterday),
            day_of_week: thai_weekday(today).to_string(),
            day_of_month: today.day(),
            month: thai_month(today).to_string(),
            year_th: today.year() + BUDDHIST_ERA_OFFSET,
            year_ad: today.year(),
            week_number: today.iso_week().week(),
            time: now.format("%H:%M:%S").to_string(),
        }
    }
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn thai_weekday(date: NaiveDate) -> &'static str {
    THAI_WEEKDAYS[date.weekday().num_days_from_monday() as usize]
}

fn thai_month(date: NaiveDate) -> &'static str {
    THAI_MONTHS[date.month0() as usize]
}

/// e.g. `วันพุธที่ 15 มกราคม 2568`
fn thai_long_date(date: NaiveDate) -> String {
    format!(
        "วัน{}ที่ {} {} {}",
        thai_weekday(date),
        date.day(),
        thai_month(date),
        date.year() + BUDDHIST_ERA_OFFSET
    )
}

fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .unwrap_or(date)
}
