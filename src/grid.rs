//! Half-hour interval grid spanning a 48-hour horizon.
//!
//! Interval 0 starts at 00:00 of day one and interval 95 starts at 23:30 of
//! day two. Departures are always placed on day two by adding
//! [`NEXT_DAY_OFFSET`] to their same-day index.

use crate::error::{Result, SimError};

/// Number of intervals in one day.
pub const INTERVALS_PER_DAY: usize = 48;
/// Number of intervals in the simulation horizon.
pub const TOTAL_INTERVALS: usize = 2 * INTERVALS_PER_DAY;
/// Duration of one interval in hours.
pub const INTERVAL_HOURS: f64 = 0.5;
/// Offset applied to departure times so they land on the following day.
pub const NEXT_DAY_OFFSET: usize = INTERVALS_PER_DAY;

/// Maps a wall-clock time to its same-day interval index.
///
/// Accepts `"HH:MM"` or `"HH:MM:SS"`; seconds are ignored.
///
/// # Examples
///
/// ```
/// use fleet_charge_sim::grid::time_to_interval;
///
/// assert_eq!(time_to_interval("18:00").ok(), Some(36));
/// assert_eq!(time_to_interval("06:45:10").ok(), Some(13));
/// assert!(time_to_interval("noon").is_err());
/// ```
///
/// # Errors
///
/// Returns [`SimError::InvalidTimeFormat`] when the string does not split into
/// two or three unsigned integers or a component is out of range.
pub fn time_to_interval(time: &str) -> Result<usize> {
    let invalid = || SimError::InvalidTimeFormat(time.to_string());

    let parts: Vec<&str> = time.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid());
    }

    let mut fields = [0_u32; 3];
    for (slot, part) in fields.iter_mut().zip(&parts) {
        *slot = part.trim().parse::<u32>().map_err(|_| invalid())?;
    }
    let [hour, minute, second] = fields;
    if hour >= 24 || minute >= 60 || second >= 60 {
        return Err(invalid());
    }

    Ok(hour as usize * 2 + minute as usize / 30)
}

/// Maps a departure time to its interval on the following day.
///
/// # Errors
///
/// Same as [`time_to_interval`].
pub fn departure_interval(time: &str) -> Result<usize> {
    Ok(time_to_interval(time)? + NEXT_DAY_OFFSET)
}

/// Coerces a time string into canonical `"HH:MM"`.
///
/// Understands `H:MM`, `HH:MM:SS`, `HH.MM` and 12-hour `h:mm AM/PM` forms.
/// Anything else is returned unchanged so that [`time_to_interval`] rejects it.
pub fn normalize_time(raw: &str) -> String {
    match parse_clock(raw) {
        Some((hour, minute)) => format!("{hour:02}:{minute:02}"),
        None => raw.to_string(),
    }
}

fn parse_clock(raw: &str) -> Option<(u32, u32)> {
    let upper = raw.trim().to_ascii_uppercase();
    let (body, pm) = if let Some(body) = upper.strip_suffix("AM") {
        (body.trim_end(), Some(false))
    } else if let Some(body) = upper.strip_suffix("PM") {
        (body.trim_end(), Some(true))
    } else {
        (upper.as_str(), None)
    };

    let parts: Vec<&str> = body.split([':', '.']).collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    let hour: u32 = parts[0].parse().ok()?;
    let minute: u32 = parts[1].parse().ok()?;
    if let Some(second) = parts.get(2) {
        if second.parse::<u32>().ok()? >= 60 {
            return None;
        }
    }
    if minute >= 60 {
        return None;
    }

    let hour = match pm {
        None => hour,
        Some(_) if hour == 0 || hour > 12 => return None,
        Some(pm) => hour % 12 + if pm { 12 } else { 0 },
    };
    if hour >= 24 {
        return None;
    }
    Some((hour, minute))
}

/// Time-of-day label for an interval start, cycling every 24 hours.
///
/// ```
/// use fleet_charge_sim::grid::time_of_day_label;
///
/// assert_eq!(time_of_day_label(0), "00:00");
/// assert_eq!(time_of_day_label(37), "18:30");
/// assert_eq!(time_of_day_label(85), "18:30");
/// ```
pub fn time_of_day_label(interval: usize) -> String {
    let slot = interval % INTERVALS_PER_DAY;
    format!("{:02}:{:02}", slot / 2, (slot % 2) * 30)
}
