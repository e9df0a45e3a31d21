//! Calendar and clock values: times with optional offsets, date-times,
//! and the two duration families.
//!
//! Dates are plain `time::Date`. Everything here is built on the `time`
//! crate; parsing accepts the ISO 8601 shapes FEEL literals use.

use std::cmp::Ordering;
use std::fmt;

use time::macros::format_description;
use time::{Date, Month, PrimitiveDateTime, UtcOffset};

use crate::error::FeelError;

// ──────────────────────────────────────────────
// Time of day
// ──────────────────────────────────────────────

/// A clock time, optionally pinned to a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    pub clock: time::Time,
    pub offset: Option<UtcOffset>,
}

impl Time {
    pub fn new(clock: time::Time, offset: Option<UtcOffset>) -> Self {
        Time { clock, offset }
    }

    /// The same instant expressed at `target`. Times without an offset, or a
    /// `None` target, are returned unchanged.
    pub fn at_offset(self, target: Option<UtcOffset>) -> Time {
        match (self.offset, target) {
            (Some(own), Some(target)) if own != target => {
                let shift = i64::from(target.whole_seconds()) - i64::from(own.whole_seconds());
                Time {
                    clock: self.clock + time::Duration::seconds(shift),
                    offset: Some(target),
                }
            }
            _ => self,
        }
    }

    /// Clock time shifted to UTC; times without an offset are taken as UTC.
    pub fn to_utc_clock(self) -> time::Time {
        self.at_offset(Some(UtcOffset::UTC)).clock
    }

    /// Comparison components in priority order: hour, minute, second, offset.
    fn components(&self) -> (u8, u8, u8, u32, Option<i32>) {
        (
            self.clock.hour(),
            self.clock.minute(),
            self.clock.second(),
            self.clock.nanosecond(),
            self.offset.map(|o| o.whole_seconds()),
        )
    }

    /// Orders `self` against `other` after normalizing `other` to this
    /// time's offset.
    pub fn compare(&self, other: &Time) -> Ordering {
        let normalized = other.at_offset(self.offset);
        self.components().cmp(&normalized.components())
    }

    pub fn with_clock(self, clock: time::Time) -> Time {
        Time { clock, ..self }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_clock(f, self.clock)?;
        write_offset(f, self.offset)
    }
}

// ──────────────────────────────────────────────
// Date and time
// ──────────────────────────────────────────────

/// A calendar date plus clock time, optionally pinned to a UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub local: PrimitiveDateTime,
    pub offset: Option<UtcOffset>,
}

impl DateTime {
    pub fn new(local: PrimitiveDateTime, offset: Option<UtcOffset>) -> Self {
        DateTime { local, offset }
    }

    /// Midnight of `date`, without an offset.
    pub fn at_midnight(date: Date) -> Self {
        DateTime {
            local: date.midnight(),
            offset: None,
        }
    }

    pub fn date(&self) -> Date {
        self.local.date()
    }

    pub fn time(&self) -> Time {
        Time::new(self.local.time(), self.offset)
    }

    /// The same instant expressed at `target`.
    pub fn at_offset(self, target: Option<UtcOffset>) -> Result<DateTime, FeelError> {
        match (self.offset, target) {
            (Some(own), Some(target)) if own != target => {
                let shift = i64::from(target.whole_seconds()) - i64::from(own.whole_seconds());
                let local = self
                    .local
                    .checked_add(time::Duration::seconds(shift))
                    .ok_or_else(|| FeelError::overflow("date and time offset shift"))?;
                Ok(DateTime {
                    local,
                    offset: Some(target),
                })
            }
            _ => Ok(self),
        }
    }

    /// Local date-time shifted to UTC; values without an offset are taken as UTC.
    pub fn to_utc(self) -> Result<PrimitiveDateTime, FeelError> {
        Ok(self.at_offset(Some(UtcOffset::UTC))?.local)
    }

    /// Comparison components in priority order: year, month, day, hour,
    /// minute, second, offset.
    #[allow(clippy::type_complexity)]
    fn components(&self) -> (i32, u8, u8, u8, u8, u8, u32, Option<i32>) {
        (
            self.local.year(),
            self.local.month() as u8,
            self.local.day(),
            self.local.hour(),
            self.local.minute(),
            self.local.second(),
            self.local.nanosecond(),
            self.offset.map(|o| o.whole_seconds()),
        )
    }

    /// Orders `self` against `other` after normalizing `other` to this
    /// value's offset.
    pub fn compare(&self, other: &DateTime) -> Result<Ordering, FeelError> {
        let normalized = other.at_offset(self.offset)?;
        Ok(self.components().cmp(&normalized.components()))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_date(f, self.local.date())?;
        f.write_str("T")?;
        write_clock(f, self.local.time())?;
        write_offset(f, self.offset)
    }
}

/// Comparison components of a date: year, month, day.
pub fn date_components(date: &Date) -> (i32, u8, u8) {
    (date.year(), date.month() as u8, date.day())
}

// ──────────────────────────────────────────────
// Durations
// ──────────────────────────────────────────────

/// A years-and-months duration, held as a signed month count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct YearMonthDuration {
    months: i64,
}

impl YearMonthDuration {
    pub fn from_months(months: i64) -> Self {
        YearMonthDuration { months }
    }

    pub fn total_months(&self) -> i64 {
        self.months
    }

    pub fn years(&self) -> i64 {
        self.months / 12
    }

    /// Month component after whole years are taken out.
    pub fn months(&self) -> i64 {
        self.months % 12
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.months.checked_add(other.months).map(Self::from_months)
    }

    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.months.checked_sub(other.months).map(Self::from_months)
    }

    pub fn negate(self) -> Self {
        Self::from_months(-self.months)
    }
}

impl fmt::Display for YearMonthDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.months < 0 {
            f.write_str("-")?;
        }
        let years = self.years().abs();
        let months = self.months().abs();
        f.write_str("P")?;
        if years > 0 {
            write!(f, "{}Y", years)?;
        }
        if months > 0 || years == 0 {
            write!(f, "{}M", months)?;
        }
        Ok(())
    }
}

/// A days-and-time duration with nanosecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DayTimeDuration(pub time::Duration);

impl DayTimeDuration {
    pub fn inner(&self) -> time::Duration {
        self.0
    }

    pub fn days(&self) -> i64 {
        self.0.whole_days()
    }

    pub fn hours(&self) -> i64 {
        self.0.whole_hours() % 24
    }

    pub fn minutes(&self) -> i64 {
        self.0.whole_minutes() % 60
    }

    pub fn seconds(&self) -> i64 {
        self.0.whole_seconds() % 60
    }

    pub fn negate(self) -> Self {
        DayTimeDuration(-self.0)
    }
}

impl fmt::Display for DayTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_negative() {
            f.write_str("-")?;
        }
        let abs = self.0.abs();
        let days = abs.whole_days();
        let hours = abs.whole_hours() % 24;
        let minutes = abs.whole_minutes() % 60;
        let seconds = abs.whole_seconds() % 60;
        let nanos = abs.subsec_nanoseconds();
        f.write_str("P")?;
        if days > 0 {
            write!(f, "{}D", days)?;
        }
        if hours > 0 || minutes > 0 || seconds > 0 || nanos > 0 || days == 0 {
            f.write_str("T")?;
            if hours > 0 {
                write!(f, "{}H", hours)?;
            }
            if minutes > 0 {
                write!(f, "{}M", minutes)?;
            }
            if seconds > 0 || nanos > 0 || (hours == 0 && minutes == 0) {
                if nanos > 0 {
                    let frac = format!("{:09}", nanos);
                    write!(f, "{}.{}S", seconds, frac.trim_end_matches('0'))?;
                } else {
                    write!(f, "{}S", seconds)?;
                }
            }
        }
        Ok(())
    }
}

/// A literal such as `P2Y1M10D` that carries both families. Shifting a date
/// by one steps the months first, then adds the elapsed part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeDuration {
    pub months: YearMonthDuration,
    pub elapsed: DayTimeDuration,
}

impl CompositeDuration {
    pub fn negate(self) -> Self {
        CompositeDuration {
            months: self.months.negate(),
            elapsed: self.elapsed.negate(),
        }
    }
}

impl fmt::Display for CompositeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.months.total_months() < 0 || self.elapsed.inner().is_negative();
        if negative {
            f.write_str("-")?;
        }
        let months = YearMonthDuration::from_months(self.months.total_months().saturating_abs());
        let months = months.to_string();
        let elapsed = DayTimeDuration(self.elapsed.inner().abs()).to_string();
        write!(f, "{}{}", months, elapsed.trim_start_matches('P'))
    }
}

/// Result of parsing an ISO 8601 duration literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDuration {
    YearMonth(YearMonthDuration),
    DayTime(DayTimeDuration),
    Composite(CompositeDuration),
}

// ──────────────────────────────────────────────
// Calendar arithmetic
// ──────────────────────────────────────────────

/// Steps `date` by whole months, clamping the day to the length of the
/// target month (Jan 31 + 1 month is the last day of February).
pub fn add_months(date: Date, months: i64) -> Result<Date, FeelError> {
    let overflow = || FeelError::overflow(format!("{} shifted by {} months", date, months));
    let index = i64::from(date.year()) * 12 + i64::from(date.month() as u8 - 1);
    let target = index.checked_add(months).ok_or_else(overflow)?;
    let year = i32::try_from(target.div_euclid(12)).map_err(|_| overflow())?;
    let month = Month::try_from((target.rem_euclid(12) + 1) as u8).map_err(|_| overflow())?;
    let day = date.day().min(month.length(year));
    Date::from_calendar_date(year, month, day).map_err(|_| overflow())
}

/// Shifts `date` by elapsed time and keeps the calendar day reached; a
/// partial day lands on the earlier date.
pub fn shift_date(date: Date, by: time::Duration) -> Result<Date, FeelError> {
    date.midnight()
        .checked_add(by)
        .map(|dt| dt.date())
        .ok_or_else(|| FeelError::overflow(format!("{} shifted by {}", date, DayTimeDuration(by))))
}

// ──────────────────────────────────────────────
// Parsing
// ──────────────────────────────────────────────

pub fn parse_date(text: &str) -> Result<Date, FeelError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(text.trim(), &format)
        .map_err(|e| FeelError::invalid_argument("date", format!("'{}': {}", text, e)))
}

/// Parses `hh:mm:ss[.fff][Z|±hh:mm]`, with an optional leading `T`.
pub fn parse_time(text: &str) -> Result<Time, FeelError> {
    let raw = text.trim();
    let raw = raw.strip_prefix('T').unwrap_or(raw);
    let (clock_text, offset) = split_offset(raw)
        .map_err(|message| FeelError::invalid_argument("time", format!("'{}': {}", text, message)))?;
    let clock = if clock_text.contains('.') {
        let format = format_description!("[hour]:[minute]:[second].[subsecond]");
        time::Time::parse(clock_text, &format)
    } else {
        let format = format_description!("[hour]:[minute]:[second]");
        time::Time::parse(clock_text, &format)
    }
    .map_err(|e| FeelError::invalid_argument("time", format!("'{}': {}", text, e)))?;
    Ok(Time::new(clock, offset))
}

/// Parses `yyyy-mm-ddThh:mm:ss[.fff][Z|±hh:mm]`; a bare date is midnight.
pub fn parse_date_time(text: &str) -> Result<DateTime, FeelError> {
    let raw = text.trim();
    match raw.split_once('T') {
        Some((date_text, time_text)) => {
            let date = parse_date(date_text).map_err(|_| {
                FeelError::invalid_argument("date and time", format!("invalid date in '{}'", text))
            })?;
            let time = parse_time(time_text).map_err(|_| {
                FeelError::invalid_argument("date and time", format!("invalid time in '{}'", text))
            })?;
            Ok(DateTime::new(PrimitiveDateTime::new(date, time.clock), time.offset))
        }
        None => Ok(DateTime::at_midnight(parse_date(raw)?)),
    }
}

fn split_offset(raw: &str) -> Result<(&str, Option<UtcOffset>), String> {
    if let Some(clock) = raw.strip_suffix('Z') {
        return Ok((clock, Some(UtcOffset::UTC)));
    }
    match raw.rfind(['+', '-']) {
        Some(pos) if pos > 0 => {
            let format = format_description!("[offset_hour sign:mandatory]:[offset_minute]");
            let offset = UtcOffset::parse(&raw[pos..], &format).map_err(|e| e.to_string())?;
            Ok((&raw[..pos], Some(offset)))
        }
        _ => Ok((raw, None)),
    }
}

/// Parses an ISO 8601 duration. Year/month components produce a
/// [`YearMonthDuration`]; week/day/time components a [`DayTimeDuration`].
/// A literal with both yields a [`CompositeDuration`].
pub fn parse_duration(text: &str) -> Result<ParsedDuration, FeelError> {
    let invalid = |message: &str| {
        FeelError::invalid_argument("duration", format!("'{}': {}", text, message))
    };
    let raw = text.trim();
    let (negative, raw) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let body = raw.strip_prefix('P').ok_or_else(|| invalid("missing 'P' designator"))?;
    let (date_part, time_part) = match body.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (body, None),
    };
    if date_part.is_empty() && time_part.is_none() {
        return Err(invalid("no components"));
    }

    let mut months: i64 = 0;
    let mut nanos: i128 = 0;
    let mut saw_year_month = false;
    let mut saw_day_time = false;

    for (amount, designator) in components(date_part).map_err(|m| invalid(&m))? {
        let whole = whole_component(amount).map_err(|m| invalid(&m))?;
        match designator {
            'Y' => {
                months = whole
                    .checked_mul(12)
                    .and_then(|m| months.checked_add(m))
                    .ok_or_else(|| invalid("out of range"))?;
                saw_year_month = true;
            }
            'M' => {
                months = months.checked_add(whole).ok_or_else(|| invalid("out of range"))?;
                saw_year_month = true;
            }
            'W' => {
                nanos += i128::from(whole) * 7 * 86_400 * NANOS;
                saw_day_time = true;
            }
            'D' => {
                nanos += i128::from(whole) * 86_400 * NANOS;
                saw_day_time = true;
            }
            other => return Err(invalid(&format!("unexpected designator '{}'", other))),
        }
    }
    if let Some(time_part) = time_part {
        if time_part.is_empty() {
            return Err(invalid("empty time section"));
        }
        for (amount, designator) in components(time_part).map_err(|m| invalid(&m))? {
            saw_day_time = true;
            let step: i128 = match designator {
                'H' => i128::from(whole_component(amount).map_err(|m| invalid(&m))?) * 3_600 * NANOS,
                'M' => i128::from(whole_component(amount).map_err(|m| invalid(&m))?) * 60 * NANOS,
                'S' => fractional_seconds(amount).map_err(|m| invalid(&m))?,
                other => return Err(invalid(&format!("unexpected designator '{}'", other))),
            };
            nanos += step;
        }
    }

    let months = YearMonthDuration::from_months(if negative { -months } else { months });
    let nanos = i64::try_from(if negative { -nanos } else { nanos })
        .map_err(|_| invalid("out of range"))?;
    let elapsed = DayTimeDuration(time::Duration::nanoseconds(nanos));
    Ok(match (saw_year_month, saw_day_time) {
        (true, true) => ParsedDuration::Composite(CompositeDuration { months, elapsed }),
        (true, false) => ParsedDuration::YearMonth(months),
        _ => ParsedDuration::DayTime(elapsed),
    })
}

const NANOS: i128 = 1_000_000_000;

/// Splits `3Y2M` into `[("3", 'Y'), ("2", 'M')]`.
fn components(section: &str) -> Result<Vec<(&str, char)>, String> {
    let mut out = Vec::new();
    let mut start = 0;
    for (idx, c) in section.char_indices() {
        if c.is_ascii_alphabetic() {
            if idx == start {
                return Err(format!("designator '{}' without a value", c));
            }
            out.push((&section[start..idx], c));
            start = idx + c.len_utf8();
        }
    }
    if start != section.len() {
        return Err(format!("trailing '{}' without a designator", &section[start..]));
    }
    Ok(out)
}

fn whole_component(amount: &str) -> Result<i64, String> {
    if !amount.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a whole number", amount));
    }
    amount
        .parse::<i64>()
        .map_err(|_| format!("'{}' is out of range", amount))
}

fn fractional_seconds(amount: &str) -> Result<i128, String> {
    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a valid seconds value", amount));
    }
    let whole = i128::from(whole_component(whole)?);
    let frac_nanos = if frac.is_empty() {
        0
    } else {
        let padded = format!("{:0<9}", frac);
        padded
            .parse::<i128>()
            .map_err(|_| format!("'{}' is not a valid seconds value", amount))?
    };
    Ok(whole * NANOS + frac_nanos)
}

// ──────────────────────────────────────────────
// Formatting
// ──────────────────────────────────────────────

pub(crate) fn write_date(f: &mut fmt::Formatter<'_>, date: Date) -> fmt::Result {
    let year = date.year();
    if year < 0 {
        write!(f, "-{:04}", -year)?;
    } else {
        write!(f, "{:04}", year)?;
    }
    write!(f, "-{:02}-{:02}", date.month() as u8, date.day())
}

fn write_clock(f: &mut fmt::Formatter<'_>, clock: time::Time) -> fmt::Result {
    write!(
        f,
        "{:02}:{:02}:{:02}",
        clock.hour(),
        clock.minute(),
        clock.second()
    )?;
    let nanos = clock.nanosecond();
    if nanos > 0 {
        let frac = format!("{:09}", nanos);
        write!(f, ".{}", frac.trim_end_matches('0'))?;
    }
    Ok(())
}

fn write_offset(f: &mut fmt::Formatter<'_>, offset: Option<UtcOffset>) -> fmt::Result {
    match offset {
        None => Ok(()),
        Some(o) if o.is_utc() => f.write_str("Z"),
        Some(o) => {
            let (h, m, _) = o.as_hms();
            let sign = if o.is_negative() { '-' } else { '+' };
            write!(f, "{}{:02}:{:02}", sign, h.unsigned_abs(), m.unsigned_abs())
        }
    }
}

/// Renders a date as `yyyy-mm-dd`.
pub fn format_date(date: Date) -> String {
    struct Iso(Date);
    impl fmt::Display for Iso {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write_date(f, self.0)
        }
    }
    Iso(date).to_string()
}
