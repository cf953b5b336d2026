//! Wide-to-long expansion of CLIDATA rows
//!
//! A CLIDATA row carries one element for one station and month, with a cell
//! per day. [`RowExpander::expand`] walks those cells lazily and classifies
//! each one; [`DayCells::observations`] keeps only the usable values.
//!
//! A cell is missing when it is empty, equals a configured sentinel, or is
//! exactly zero while the zero policy is on. Days that do not exist in the
//! row's month (e.g. 30 February) are reported as invalid dates, and text
//! that is not a finite number as an invalid value.

use crate::Result;
use crate::app::models::{ClidataRow, ObservationKey, ObservationTuple};
use crate::config::{ElementRule, ImportConfig};
use crate::constants::DAYS_PER_ROW;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use std::iter::FusedIterator;

/// Classification of one day cell
#[derive(Debug, Clone, PartialEq)]
pub enum DayCell {
    Observation(ObservationTuple),
    Missing { day: u32 },
    InvalidDate { day: u32 },
    InvalidValue { day: u32, raw: String },
}

/// Policy for turning day cells into observations
#[derive(Debug, Clone)]
pub struct RowExpander {
    treat_zero_as_missing: bool,
    missing_sentinels: Vec<String>,
    default_time: NaiveTime,
    source_offset: FixedOffset,
}

impl RowExpander {
    pub fn new(config: &ImportConfig) -> Result<Self> {
        Ok(Self {
            treat_zero_as_missing: config.treat_zero_as_missing,
            missing_sentinels: config
                .missing_sentinels
                .iter()
                .map(|sentinel| sentinel.trim().to_string())
                .collect(),
            default_time: config.default_observation_time,
            source_offset: config.source_offset()?,
        })
    }

    /// Lazily expand a row whose station and element are already resolved.
    ///
    /// The returned iterator can be cloned to walk the row again.
    pub fn expand<'e, 'a>(
        &'e self,
        row: &'e ClidataRow<'a>,
        station_code: &'e str,
        rule: ElementRule,
    ) -> DayCells<'e, 'a> {
        DayCells {
            expander: self,
            row,
            station_code,
            rule,
            time: row.time.unwrap_or(self.default_time),
            next_day: 1,
        }
    }

    fn is_missing(&self, cell: &str) -> bool {
        cell.is_empty()
            || self
                .missing_sentinels
                .iter()
                .any(|sentinel| sentinel.eq_ignore_ascii_case(cell))
    }

    fn timestamp(&self, year: i32, month: u32, day: u32, time: NaiveTime) -> Option<DateTime<Utc>> {
        let local = NaiveDate::from_ymd_opt(year, month, day)?.and_time(time);
        self.source_offset
            .from_local_datetime(&local)
            .single()
            .map(|timestamp| timestamp.with_timezone(&Utc))
    }
}

/// Iterator over the day cells of one row
#[derive(Debug, Clone)]
pub struct DayCells<'e, 'a> {
    expander: &'e RowExpander,
    row: &'e ClidataRow<'a>,
    station_code: &'e str,
    rule: ElementRule,
    time: NaiveTime,
    next_day: u32,
}

impl<'e, 'a> DayCells<'e, 'a> {
    /// Only the cells that produce an observation
    pub fn observations(self) -> impl Iterator<Item = ObservationTuple> + 'e
    where
        'a: 'e,
    {
        self.filter_map(|cell| match cell {
            DayCell::Observation(tuple) => Some(tuple),
            _ => None,
        })
    }

    fn classify(&self, day: u32) -> DayCell {
        let expander = self.expander;
        let cell = self.row.day_value(day).map(str::trim).unwrap_or("");
        if expander.is_missing(cell) {
            return DayCell::Missing { day };
        }

        let Some(timestamp) = expander.timestamp(self.row.year, self.row.month, day, self.time)
        else {
            return DayCell::InvalidDate { day };
        };

        let value = match cell.parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                return DayCell::InvalidValue {
                    day,
                    raw: cell.to_string(),
                };
            }
        };

        if value == 0.0 && expander.treat_zero_as_missing {
            return DayCell::Missing { day };
        }

        let Some(converted) = self.rule.conversion.apply(value) else {
            return DayCell::InvalidValue {
                day,
                raw: cell.to_string(),
            };
        };

        DayCell::Observation(ObservationTuple {
            key: ObservationKey::new(self.station_code, timestamp),
            field: self.rule.field,
            value: converted,
        })
    }
}

impl Iterator for DayCells<'_, '_> {
    type Item = DayCell;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_day as usize > DAYS_PER_ROW {
            return None;
        }
        let day = self.next_day;
        self.next_day += 1;
        Some(self.classify(day))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (DAYS_PER_ROW + 1).saturating_sub(self.next_day as usize);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DayCells<'_, '_> {}

impl FusedIterator for DayCells<'_, '_> {}
