//! Date/time to Excel serial number conversion

use chrono::{Datelike, NaiveDateTime, Timelike};

/// Days from 0001-01-01 (day 1) to 1899-12-30, the 1900-system epoch
const EPOCH_1900: i64 = 693_594;
/// Days from 0001-01-01 (day 1) to 1904-01-01
const EPOCH_1904: i64 = 695_056;
/// 1900-03-01; earlier serials are shifted by the phantom 1900-02-29
const MARCH_1900: i64 = 693_655;

/// Convert a naive date/time into a worksheet serial number
///
/// The 1900 system reproduces the phantom 29 February 1900, so serial 1 is
/// 1900-01-01 and serial 61 is 1900-03-01.
pub fn datetime_to_serial(dt: &NaiveDateTime, date_1904: bool) -> f64 {
    let ordinal = dt.date().num_days_from_ce() as i64;
    let days = if date_1904 {
        ordinal - EPOCH_1904
    } else if ordinal < MARCH_1900 {
        ordinal - EPOCH_1900 - 1
    } else {
        ordinal - EPOCH_1900
    };

    let time = dt.time();
    let seconds =
        time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1_000_000_000.0;
    days as f64 + seconds / 86_400.0
}
