//! Admission window: which dates accept new sign-ups, and when
//!
//! Today is always open. Tomorrow opens at the configured evening time
//! (22:00 by default). Anything earlier is over, anything later is too
//! far ahead.

use chrono::{DateTime, Local, NaiveDate};
use washline_api::DenyReason;
use washline_util::WallClock;

/// Decide whether a sign-up for `date` is currently allowed.
///
/// Pure function of the two timestamps and the configured unlock time.
pub fn check_signup_window(
    date: NaiveDate,
    now: DateTime<Local>,
    opens_at: WallClock,
) -> Result<(), DenyReason> {
    let today = now.date_naive();

    match (date - today).num_days() {
        d if d < 0 => Err(DenyReason::Past),
        0 => Ok(()),
        1 => {
            if WallClock::from_naive_time(now.time()) >= opens_at {
                Ok(())
            } else {
                Err(DenyReason::TomorrowLocked)
            }
        }
        _ => Err(DenyReason::TooFarFuture),
    }
}
