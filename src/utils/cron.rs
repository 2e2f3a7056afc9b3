//! Cron schedule validation and entry formatting.

/// Inclusive bounds for the five cron fields:
/// minute, hour, day-of-month, month, day-of-week.
const FIELD_BOUNDS: [(u32, u32); 5] = [(0, 59), (0, 23), (1, 31), (1, 12), (0, 7)];

/// Validate a 5-field cron expression.
///
/// Accepts `*`, plain numbers, ranges (`a-b`), lists (`a,b,c`), and step
/// values (`*/n`, `a-b/n`), with per-field numeric bounds.
pub fn validate_cron_schedule(schedule: &str) -> bool {
    let fields: Vec<&str> = schedule.split_whitespace().collect();
    if fields.len() != 5 {
        return false;
    }

    fields
        .iter()
        .zip(FIELD_BOUNDS)
        .all(|(field, (lo, hi))| field_is_valid(field, lo, hi))
}

fn field_is_valid(field: &str, lo: u32, hi: u32) -> bool {
    if field.is_empty() {
        return false;
    }

    field.split(',').all(|part| {
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, Some(step)),
            None => (part, None),
        };

        if let Some(step) = step {
            match step.parse::<u32>() {
                Ok(n) if n > 0 => {}
                _ => return false,
            }
        }

        range_is_valid(range, lo, hi)
    })
}

fn range_is_valid(range: &str, lo: u32, hi: u32) -> bool {
    if range == "*" {
        return true;
    }

    match range.split_once('-') {
        Some((start, end)) => match (start.parse::<u32>(), end.parse::<u32>()) {
            (Ok(a), Ok(b)) => a >= lo && b <= hi && a <= b,
            _ => false,
        },
        None => match range.parse::<u32>() {
            Ok(n) => n >= lo && n <= hi,
            Err(_) => false,
        },
    }
}

/// Format a `/etc/cron.d` entry: schedule, user, then the command.
pub fn format_cron_entry(schedule: &str, user: &str, command: &str) -> String {
    format!("{schedule} {user} {command}")
}
