//! `YANDEX.DATETIME` values.
//!
//! A date/time entity carries up to five fields (year, month, day, hour,
//! minute). Each field may be absolute ("September 15") or relative to the
//! moment of the request ("in two days"). Resolution composes the fields in
//! a caller-supplied IANA zone:
//!
//! - relative field: `now.field + value`
//! - absolute field: `value`
//! - missing date field: `now.field`
//! - missing time field: `0` when the value is absolute or a coarser field is
//!   absolute ("tomorrow at 10" is 10:00), otherwise `now.field` ("tomorrow"
//!   keeps the current time of day)
//!
//! Composition then rolls overflowing fields into the next larger unit the
//! way a "date from fields" constructor does: month 14 is February of the
//! following year, January 32 is February 1, hour -4 is 20:00 of the
//! previous day.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, CodecResult};

/// Index of the first time-of-day field (hour) in year..minute order.
const TIME_FIELDS: usize = 3;

/// Value of a `YANDEX.DATETIME` entity.
///
/// # Example
///
/// ```
/// use chrono::TimeZone;
/// use dialogs_core::ValueDateTime;
///
/// let value: ValueDateTime = serde_json::from_str(
///     r#"{"year": 1982, "month": 9, "day": 15, "hour": 22, "minute": 30}"#,
/// ).unwrap();
/// assert!(!value.is_relative());
///
/// let resolved = value.resolve("Europe/Moscow").unwrap();
/// let expected = chrono_tz::Europe::Moscow
///     .with_ymd_and_hms(1982, 9, 15, 22, 30, 0)
///     .unwrap();
/// assert_eq!(resolved, expected);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueDateTime {
    /// Year, or a year offset when `year_is_relative`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    /// Whether `year` is relative.
    #[serde(default)]
    pub year_is_relative: bool,

    /// Month (1-based), or a month offset when `month_is_relative`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    /// Whether `month` is relative.
    #[serde(default)]
    pub month_is_relative: bool,

    /// Day of month, or a day offset when `day_is_relative`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
    /// Whether `day` is relative.
    #[serde(default)]
    pub day_is_relative: bool,

    /// Hour, or an hour offset when `hour_is_relative`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<i32>,
    /// Whether `hour` is relative.
    #[serde(default)]
    pub hour_is_relative: bool,

    /// Minute, or a minute offset when `minute_is_relative`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minute: Option<i32>,
    /// Whether `minute` is relative.
    #[serde(default)]
    pub minute_is_relative: bool,
}

impl ValueDateTime {
    /// Returns `true` if at least one field is relative.
    #[must_use]
    pub const fn is_relative(&self) -> bool {
        self.year_is_relative
            || self.month_is_relative
            || self.day_is_relative
            || self.hour_is_relative
            || self.minute_is_relative
    }

    /// Resolves the value to a point in time in `zone`, relative to the
    /// current wall-clock time.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnknownZone`] if `zone` is not an IANA zone
    /// identifier, or [`CodecError::InvalidDateTime`] if the composed fields
    /// fall outside the supported calendar range.
    pub fn resolve(&self, zone: &str) -> CodecResult<DateTime<Tz>> {
        self.resolve_at(zone, Utc::now())
    }

    /// Resolves the value to a point in time in `zone`, treating `now` as
    /// the current wall-clock time.
    ///
    /// # Errors
    ///
    /// See [`ValueDateTime::resolve`].
    pub fn resolve_at(&self, zone: &str, now: DateTime<Utc>) -> CodecResult<DateTime<Tz>> {
        let tz: Tz = zone
            .parse()
            .map_err(|_| CodecError::UnknownZone(zone.to_string()))?;
        let now = now.with_timezone(&tz);

        let fields = [
            (self.year, self.year_is_relative, i64::from(now.year())),
            (self.month, self.month_is_relative, i64::from(now.month())),
            (self.day, self.day_is_relative, i64::from(now.day())),
            (self.hour, self.hour_is_relative, i64::from(now.hour())),
            (self.minute, self.minute_is_relative, i64::from(now.minute())),
        ];

        // Time fields below an absolute field (or in an absolute value) start
        // at zero; everything else missing takes "now".
        let mut pinned = !self.is_relative();
        let mut resolved = [0_i64; 5];
        for (i, (value, is_relative, current)) in fields.into_iter().enumerate() {
            resolved[i] = match (value, is_relative) {
                (Some(v), true) => current + i64::from(v),
                (Some(v), false) => {
                    pinned = true;
                    i64::from(v)
                }
                (None, _) if pinned && i >= TIME_FIELDS => 0,
                (None, _) => current,
            };
        }

        let [year, month, day, hour, minute] = resolved;
        compose(&tz, year, month, day, hour, minute)
    }
}

/// Builds a zoned date/time from possibly out-of-range fields.
fn compose(
    tz: &Tz,
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
) -> CodecResult<DateTime<Tz>> {
    let invalid = || {
        CodecError::InvalidDateTime(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02} in {tz}"
        ))
    };

    let month0 = month - 1;
    let year = i32::try_from(year + month0.div_euclid(12)).map_err(|_| invalid())?;
    let month = u32::try_from(month0.rem_euclid(12) + 1).map_err(|_| invalid())?;

    let local = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.checked_add_signed(Duration::days(day - 1)))
        .and_then(|date| date.checked_add_signed(Duration::hours(hour)))
        .and_then(|date| date.checked_add_signed(Duration::minutes(minute)))
        .ok_or_else(invalid)?;

    // A wall-clock time skipped by a DST transition is moved past the gap.
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            local
                .checked_add_signed(Duration::hours(1))
                .and_then(|shifted| tz.from_local_datetime(&shifted).earliest())
        })
        .ok_or_else(invalid)
}
