use chrono::{Datelike, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Controls what zoom level the timeline displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Day, Granularity::Week, Granularity::Month];

    pub fn label(self) -> &'static str {
        match self {
            Granularity::Day => "Day",
            Granularity::Week => "Week",
            Granularity::Month => "Month",
        }
    }
}

/// Column widths and calendar conventions used when selecting a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub day_unit_width: f32,
    pub week_unit_width: f32,
    pub month_unit_width: f32,
    /// First day of a week column.
    pub week_start: Weekday,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            day_unit_width: 40.0,
            week_unit_width: 80.0,
            month_unit_width: 120.0,
            week_start: Weekday::Mon,
        }
    }
}

impl ScaleConfig {
    pub fn unit_width(&self, granularity: Granularity) -> f32 {
        let width = match granularity {
            Granularity::Day => self.day_unit_width,
            Granularity::Week => self.week_unit_width,
            Granularity::Month => self.month_unit_width,
        };
        if width.is_finite() && width > 0.0 {
            width
        } else {
            1.0
        }
    }
}

/// One whole column (day, week or month) of a window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub start: NaiveDate,
    pub left: f32,
    pub width: f32,
}

/// The contiguous calendar range currently rendered.
///
/// A window is a value: navigation and zoom build a new one instead of
/// mutating the old one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineWindow {
    /// First visible date (offset 0).
    pub start: NaiveDate,
    /// Last visible date, inclusive.
    pub end: NaiveDate,
    pub granularity: Granularity,
    /// Pixel width of one day, week or month column.
    pub unit_width: f32,
}

impl TimelineWindow {
    /// Build a window directly. Reversed bounds are swapped and a
    /// non-positive unit width falls back to one pixel.
    pub fn new(start: NaiveDate, end: NaiveDate, granularity: Granularity, unit_width: f32) -> Self {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        let unit_width = if unit_width.is_finite() && unit_width > 0.0 {
            unit_width
        } else {
            1.0
        };
        Self {
            start,
            end,
            granularity,
            unit_width,
        }
    }

    /// Compute the visible window for a granularity around an anchor date.
    ///
    /// - Day: the calendar month containing `anchor`.
    /// - Week: whole weeks from one month before `anchor` to two months after.
    /// - Month: whole months from two months before `anchor` to six months after.
    pub fn select(granularity: Granularity, anchor: NaiveDate, config: &ScaleConfig) -> Self {
        let (start, end) = match granularity {
            Granularity::Day => (first_of_month(anchor), last_of_month(anchor)),
            Granularity::Week => {
                let from = shift_months(anchor, -1);
                let to = shift_months(anchor, 2);
                (
                    week_start(from, config.week_start),
                    week_start(to, config.week_start) + chrono::Duration::days(6),
                )
            }
            Granularity::Month => (
                first_of_month(shift_months(anchor, -2)),
                last_of_month(shift_months(anchor, 6)),
            ),
        };
        Self::new(start, end, granularity, config.unit_width(granularity))
    }

    /// Convert a date to an x-pixel offset from the window start.
    ///
    /// Week and month columns interpolate linearly inside the column. Month
    /// columns divide by the length of the date's own month, so the
    /// pixels-per-day rate differs between months.
    pub fn to_offset(&self, date: NaiveDate) -> f32 {
        match self.granularity {
            Granularity::Day => {
                let days = (date - self.start).num_days() as f32;
                days * self.unit_width
            }
            Granularity::Week => {
                let days = (date - self.start).num_days();
                let column = days.div_euclid(7) as f32;
                let within = days.rem_euclid(7) as f32;
                column * self.unit_width + (within / 7.0) * self.unit_width
            }
            Granularity::Month => {
                let column = month_index(date) - month_index(self.start);
                let within = date.day0() as f32 / days_in_month(date) as f32;
                column as f32 * self.unit_width + within * self.unit_width
            }
        }
    }

    /// Convert an x-pixel offset back to a date, rounding to the nearest day.
    ///
    /// Offsets outside the window are not clamped here; see [`Self::clamp_offset`].
    /// Non-finite or huge offsets still yield some date and never panic.
    pub fn to_date(&self, offset: f32) -> NaiveDate {
        let units = offset / self.unit_width;
        match self.granularity {
            Granularity::Day => {
                let days = units.round() as i64;
                add_days(self.start, days)
            }
            Granularity::Week => {
                let column = units.floor();
                let within = ((units - column) * 7.0).round() as i64;
                add_days(self.start, (column as i64).saturating_mul(7).saturating_add(within))
            }
            Granularity::Month => {
                let column = units.floor();
                let month = first_of_month(shift_months(self.start, column as i32));
                let length = days_in_month(month);
                let day0 = (((units - column) * length as f32).round() as i64).min(length);
                add_days(month, day0)
            }
        }
    }

    /// Pixel width of the whole window.
    pub fn content_width(&self) -> f32 {
        self.to_offset(add_days(self.end, 1))
    }

    /// Clamp an offset to the addressable range `[0, to_offset(end)]`.
    /// NaN maps to zero.
    pub fn clamp_offset(&self, offset: f32) -> f32 {
        if offset.is_nan() {
            return 0.0;
        }
        offset.clamp(0.0, self.to_offset(self.end))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Segment the window into whole columns at its granularity.
    pub fn columns(&self) -> Vec<Column> {
        let mut columns = Vec::new();
        let mut date = self.start;
        while date <= self.end {
            let next = match self.granularity {
                Granularity::Day => add_days(date, 1),
                Granularity::Week => add_days(date, 7),
                Granularity::Month => first_of_month(shift_months(date, 1)),
            };
            let left = self.to_offset(date);
            columns.push(Column {
                start: date,
                left,
                width: self.to_offset(next) - left,
            });
            if next <= date {
                break;
            }
            date = next;
        }
        columns
    }
}

/// Navigation state for the scale selector: just the inputs, never the
/// derived window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSelector {
    pub granularity: Granularity,
    pub anchor: NaiveDate,
    pub config: ScaleConfig,
}

impl ScaleSelector {
    pub fn new(granularity: Granularity, anchor: NaiveDate, config: ScaleConfig) -> Self {
        Self {
            granularity,
            anchor,
            config,
        }
    }

    /// Recompute the window from scratch.
    pub fn window(&self) -> TimelineWindow {
        TimelineWindow::select(self.granularity, self.anchor, &self.config)
    }

    /// Move forward one window-equivalent step and return the new window.
    pub fn next(&mut self) -> TimelineWindow {
        self.anchor = self.step(1);
        self.window()
    }

    /// Move back one window-equivalent step and return the new window.
    pub fn prev(&mut self) -> TimelineWindow {
        self.anchor = self.step(-1);
        self.window()
    }

    pub fn set_granularity(&mut self, granularity: Granularity) -> TimelineWindow {
        self.granularity = granularity;
        self.window()
    }

    pub fn jump_to(&mut self, anchor: NaiveDate) -> TimelineWindow {
        self.anchor = anchor;
        self.window()
    }

    fn step(&self, direction: i32) -> NaiveDate {
        match self.granularity {
            Granularity::Day => shift_months(self.anchor, direction),
            Granularity::Week => add_days(self.anchor, 28 * direction as i64),
            Granularity::Month => shift_months(self.anchor, 3 * direction),
        }
    }
}

/// Start of the week containing `date`.
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (date.weekday().num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7;
    add_days(date, -(back as i64))
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    add_days(first_of_month(date), days_in_month(date) - 1)
}

pub fn days_in_month(date: NaiveDate) -> i64 {
    let first = first_of_month(date);
    let next = shift_months(first, 1);
    let days = (next - first).num_days();
    if days > 0 {
        days
    } else {
        31
    }
}

/// Shift by whole months, clamping the day to the target month's length.
/// Saturates at the calendar bounds instead of panicking.
fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// Saturates at the calendar bounds instead of panicking; a day count
/// too large for a `Duration` leaves `date` unchanged.
fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    chrono::Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(date)
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}
