//! Pure month math behind the move-in date picker.

use chrono::{Datelike, Months, NaiveDate};

/// Clamp a date to the first of its month.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Move the displayed month by `delta` months, rolling the year over as
/// needed. Navigation is unbounded; only chrono's representable range caps
/// it, in which case the cursor stays put.
pub fn shift_month(start: NaiveDate, delta: i32) -> NaiveDate {
    let start = month_start(start);
    let shifted = if delta >= 0 {
        start.checked_add_months(Months::new(delta as u32))
    } else {
        start.checked_sub_months(Months::new(delta.unsigned_abs()))
    };
    shifted.unwrap_or(start)
}

/// Number of days in the month containing `start` (28..=31, leap-aware).
pub fn days_in_month(start: NaiveDate) -> u32 {
    shift_month(start, 1)
        .pred_opt()
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Weekday offset of the first of the month, with Sunday as 0.
pub fn weekday_offset(start: NaiveDate) -> u32 {
    month_start(start).weekday().num_days_from_sunday()
}

/// Day grid for one month: leading `None` cells up to the first weekday,
/// then `Some(day)` for each day of the month.
pub fn month_grid(start: NaiveDate) -> Vec<Option<u32>> {
    let offset = weekday_offset(start) as usize;
    let days = days_in_month(start);

    let mut cells = Vec::with_capacity(offset + days as usize);
    cells.resize(offset, None);
    cells.extend((1..=days).map(Some));
    cells
}
