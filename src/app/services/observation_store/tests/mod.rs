//! Test utilities for observation store testing

use crate::app::models::{ObservationField, ObservationKey, ObservationRecord, Station};
use chrono::{TimeZone, Utc};


pub fn station(code: &str, name: &str) -> Station {
    Station {
        code: code.to_string(),
        name: name.to_string(),
        latitude: Some(5.6),
        longitude: Some(-0.17),
        region: "Greater Accra".to_string(),
    }
}

pub fn key(code: &str, day: u32, hour: u32) -> ObservationKey {
    ObservationKey::new(code, Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap())
}

pub fn record(key: ObservationKey, fields: &[(ObservationField, f64)]) -> ObservationRecord {
    let mut record = ObservationRecord::new(key);
    for (field, value) in fields {
        record.set(*field, *value);
    }
    record
}
