use crate::errors::AppError;
use crate::models::{CalendarEntry, Reminder, Weekday};
use crate::normalize::{DEFAULT_RRULE, is_hhmm};
use chrono::{Datelike, Duration, Local, NaiveDate};

pub fn calendar_preview(reminders: &[Reminder]) -> Vec<CalendarEntry> {
    calendar_preview_from(Local::now().date_naive(), reminders)
}

/// Expands reminders over the seven days starting at `start`.
///
/// `FREQ=WEEKLY` rules with a `BYDAY` list only fire on the listed days;
/// every other rule fires daily.
pub fn calendar_preview_from(start: NaiveDate, reminders: &[Reminder]) -> Vec<CalendarEntry> {
    let mut entries = Vec::new();
    for offset in 0..7 {
        let date = start + Duration::days(offset);
        let dow = Weekday::from_chrono(date.weekday());
        for reminder in reminders {
            if fires_on(&reminder.rrule, dow) {
                entries.push(CalendarEntry {
                    date: date.to_string(),
                    dow,
                    time: reminder.time.clone(),
                    title: reminder.title.clone(),
                });
            }
        }
    }
    entries
}

fn fires_on(rrule: &str, dow: Weekday) -> bool {
    let rule = rrule.to_ascii_uppercase();
    let parts: Vec<&str> = rule.split(';').map(str::trim).collect();
    if !parts.contains(&"FREQ=WEEKLY") {
        return true;
    }
    let Some(byday) = parts.iter().find_map(|part| part.strip_prefix("BYDAY=")) else {
        return true;
    };
    let three_letter = dow.token().to_ascii_uppercase();
    byday
        .split(',')
        .map(str::trim)
        .any(|code| code == dow.rrule_code() || code == three_letter)
}

/// Checks a user-entered reminder before it is stored. Blank recurrence
/// rules become daily.
pub fn validate_reminder(mut reminder: Reminder) -> Result<Reminder, AppError> {
    reminder.title = reminder.title.trim().to_string();
    reminder.time = reminder.time.trim().to_string();
    reminder.rrule = reminder.rrule.trim().to_string();

    if reminder.title.is_empty() {
        return Err(AppError::bad_request("reminder title must not be empty"));
    }
    if !is_hhmm(&reminder.time) {
        return Err(AppError::bad_request("reminder time must be HH:MM"));
    }
    if reminder.rrule.is_empty() {
        reminder.rrule = DEFAULT_RRULE.to_string();
    }
    if !reminder.rrule.starts_with("FREQ=") {
        return Err(AppError::bad_request("rrule must start with FREQ="));
    }
    Ok(reminder)
}
