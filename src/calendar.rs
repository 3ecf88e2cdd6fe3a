/// Availability calculation for the booking calendar
///
/// Everything here is a pure derivation from the fetched appointment
/// snapshots and the current date/time; nothing is cached between renders.
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::state::data::{Appointment, AppointmentStatus};

/// Bookable half-hour slots, identical for every day
pub const SLOTS: [&str; 21] = [
    "09:00", "09:30", "10:00", "10:30", "11:00", "11:30", "12:00", "12:30", "13:00", "13:30",
    "14:00", "14:30", "15:00", "15:30", "16:00", "16:30", "17:00", "17:30", "18:00", "18:30",
    "19:00",
];

/// Column headers of the month grid; the grid is Sunday-first
pub const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Days with at least this many appointments get the "busy" indicator
pub const HIGH_DENSITY_THRESHOLD: usize = 5;

/// Which month the calendar is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl MonthCursor {
    pub fn new(year: i32, month: u32) -> Self {
        MonthCursor { year, month }
    }

    pub fn containing(date: NaiveDate) -> Self {
        MonthCursor::new(date.year(), date.month())
    }

    pub fn previous(self) -> Self {
        if self.month <= 1 {
            MonthCursor::new(self.year - 1, 12)
        } else {
            MonthCursor::new(self.year, self.month - 1)
        }
    }

    pub fn next(self) -> Self {
        if self.month >= 12 {
            MonthCursor::new(self.year + 1, 1)
        } else {
            MonthCursor::new(self.year, self.month + 1)
        }
    }

    /// Date of `day` in this month, `None` if the month has no such day
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn title(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.wrapping_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{} {}", name, self.year)
    }
}

/// Number of days in a month, `None` for an invalid month
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = MonthCursor::new(year, month).next();
    let first_of_next = NaiveDate::from_ymd_opt(next.year, next.month, 1)?;

    Some(first_of_next.signed_duration_since(first).num_days() as u32)
}

/// Lay out a month under Sunday-first weekday columns.
///
/// The grid starts with one `None` per weekday before the 1st, followed by
/// `Some(day)` for every day of the month. An invalid month gives an empty grid.
pub fn month_grid(year: i32, month: u32) -> Vec<Option<u32>> {
    let (Some(first), Some(days)) = (
        NaiveDate::from_ymd_opt(year, month, 1),
        days_in_month(year, month),
    ) else {
        return Vec::new();
    };

    let offset = first.weekday().num_days_from_sunday() as usize;

    std::iter::repeat(None)
        .take(offset)
        .chain((1..=days).map(Some))
        .collect()
}

/// Appointments starting on `date`
pub fn appointments_on_day(date: NaiveDate, appointments: &[Appointment]) -> usize {
    appointments
        .iter()
        .filter(|a| a.start_time.date() == date)
        .count()
}

/// How busy a day looks on the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Density {
    Empty,
    Low,
    High,
}

impl Density {
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => Density::Empty,
            n if n >= HIGH_DENSITY_THRESHOLD => Density::High,
            _ => Density::Low,
        }
    }
}

/// True if `date` is strictly before `today`
pub fn is_day_in_past(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

/// Slots already taken by `employee_id` on `date`.
///
/// Cancelled appointments free their slot.
pub fn occupied_slots(
    date: NaiveDate,
    employee_id: i64,
    appointments: &[Appointment],
) -> BTreeSet<String> {
    appointments
        .iter()
        .filter(|a| a.employee_id == Some(employee_id))
        .filter(|a| a.start_time.date() == date)
        .filter(|a| a.status != AppointmentStatus::Cancelled)
        .map(|a| a.start_time.format("%H:%M").to_string())
        .collect()
}

/// Parse an `HH:MM` slot label
pub fn parse_slot(slot: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(slot, "%H:%M").ok()
}

/// Start timestamp of `slot` on `date`
pub fn slot_start(date: NaiveDate, slot: &str) -> Option<NaiveDateTime> {
    parse_slot(slot).map(|time| date.and_time(time))
}

/// True only when `selected_day` is today and the slot time is at or before now.
///
/// An unparseable label is treated as past so it can never be offered.
pub fn is_slot_in_past(slot: &str, selected_day: NaiveDate, now: NaiveDateTime) -> bool {
    if selected_day != now.date() {
        return false;
    }

    match slot_start(selected_day, slot) {
        Some(start) => start <= now,
        None => true,
    }
}

/// A slot can be offered when it is free and not already over
pub fn is_slot_offerable(
    slot: &str,
    occupied: &BTreeSet<String>,
    selected_day: NaiveDate,
    now: NaiveDateTime,
) -> bool {
    !occupied.contains(slot) && !is_slot_in_past(slot, selected_day, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
        day.and_hms_opt(h, m, 0).unwrap()
    }

    fn appointment(id: i64, employee_id: i64, start: NaiveDateTime) -> Appointment {
        Appointment {
            id,
            client_name: format!("client {}", id),
            service_id: 1,
            employee_id: Some(employee_id),
            start_time: start,
            end_time: start + chrono::Duration::minutes(30),
            status: AppointmentStatus::Scheduled,
        }
    }

    #[test]
    fn test_february_2024_grid() {
        let grid = month_grid(2024, 2);

        assert_eq!(grid.len(), 4 + 29);
        assert!(grid[..4].iter().all(Option::is_none));
        assert_eq!(grid[4], Some(1));
        assert_eq!(grid.last(), Some(&Some(29)));
    }

    #[test]
    fn test_grid_matches_month_for_every_month() {
        for year in [1999, 2023, 2024, 2100] {
            for month in 1..=12 {
                let grid = month_grid(year, month);
                let first = date(year, month, 1);

                let leading = grid.iter().take_while(|c| c.is_none()).count();
                let days: Vec<u32> = grid.iter().flatten().copied().collect();

                assert_eq!(leading, first.weekday().num_days_from_sunday() as usize);
                assert_eq!(days.len() as u32, days_in_month(year, month).unwrap());
                assert_eq!(days, (1..=days.len() as u32).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_invalid_month_grid_is_empty() {
        assert!(month_grid(2024, 13).is_empty());
        assert!(month_grid(2024, 0).is_empty());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 4), Some(30));
    }

    #[test]
    fn test_month_cursor_rollover() {
        let january = MonthCursor::new(2026, 1);
        assert_eq!(january.previous(), MonthCursor::new(2025, 12));
        assert_eq!(MonthCursor::new(2025, 12).next(), january);
        assert_eq!(january.title(), "January 2026");
        assert_eq!(MonthCursor::new(2024, 2).date(30), None);
    }

    #[test]
    fn test_appointments_on_day() {
        let day = date(2026, 1, 20);
        let appointments = vec![
            appointment(1, 3, at(day, 9, 0)),
            appointment(2, 4, at(day, 18, 30)),
            appointment(3, 3, at(date(2026, 1, 21), 9, 0)),
            appointment(4, 3, at(date(2026, 2, 20), 9, 0)),
        ];

        assert_eq!(appointments_on_day(day, &appointments), 2);
        assert_eq!(appointments_on_day(date(2026, 1, 22), &appointments), 0);
    }

    #[test]
    fn test_density() {
        assert_eq!(Density::from_count(0), Density::Empty);
        assert_eq!(Density::from_count(1), Density::Low);
        assert_eq!(Density::from_count(4), Density::Low);
        assert_eq!(Density::from_count(5), Density::High);
    }

    #[test]
    fn test_past_days_are_not_selectable() {
        let today = date(2026, 10, 19);

        assert!(is_day_in_past(date(2026, 10, 18), today));
        assert!(is_day_in_past(date(2025, 12, 31), today));
        assert!(!is_day_in_past(today, today));
        assert!(!is_day_in_past(date(2026, 10, 20), today));
    }

    #[test]
    fn test_occupied_slots_for_employee() {
        let day = date(2026, 1, 20);
        let mut cancelled = appointment(4, 3, at(day, 11, 0));
        cancelled.status = AppointmentStatus::Cancelled;

        let appointments = vec![
            appointment(1, 3, at(day, 10, 0)),
            appointment(2, 3, at(day, 10, 30)),
            appointment(3, 5, at(day, 12, 0)),
            cancelled,
            appointment(5, 3, at(date(2026, 1, 21), 14, 0)),
        ];

        let occupied = occupied_slots(day, 3, &appointments);
        let expected: BTreeSet<String> =
            ["10:00", "10:30"].iter().map(|s| s.to_string()).collect();

        assert_eq!(occupied, expected);
    }

    #[test]
    fn test_occupied_slots_block_exactly_those_labels() {
        let day = date(2026, 1, 20);
        let now = at(date(2026, 1, 1), 12, 0);
        let occupied: BTreeSet<String> =
            ["10:00", "10:30"].iter().map(|s| s.to_string()).collect();

        let offerable: Vec<&str> = SLOTS
            .iter()
            .copied()
            .filter(|slot| is_slot_offerable(slot, &occupied, day, now))
            .collect();

        assert_eq!(offerable.len(), 19);
        assert!(!offerable.contains(&"10:00"));
        assert!(!offerable.contains(&"10:30"));
    }

    #[test]
    fn test_slot_in_past_only_today() {
        let today = date(2026, 10, 19);
        let now = at(today, 14, 0);

        assert!(is_slot_in_past("09:00", today, now));
        assert!(is_slot_in_past("14:00", today, now));
        assert!(!is_slot_in_past("14:30", today, now));

        let tomorrow = date(2026, 10, 20);
        assert!(!is_slot_in_past("09:00", tomorrow, now));
    }

    #[test]
    fn test_today_filters_past_and_occupied() {
        let today = date(2026, 10, 19);
        let now = at(today, 17, 10);
        let occupied: BTreeSet<String> = ["18:00".to_string()].into_iter().collect();

        let offerable: Vec<&str> = SLOTS
            .iter()
            .copied()
            .filter(|slot| is_slot_offerable(slot, &occupied, today, now))
            .collect();

        assert_eq!(offerable, vec!["17:30", "18:30", "19:00"]);
    }

    #[test]
    fn test_slot_start() {
        let day = date(2026, 1, 20);
        assert_eq!(slot_start(day, "09:30"), Some(at(day, 9, 30)));
        assert_eq!(slot_start(day, "nine"), None);
        assert!(is_slot_in_past("nine", day, at(day, 8, 0)));
    }

    #[test]
    fn test_slots_are_half_hours() {
        assert_eq!(SLOTS.len(), 21);
        assert_eq!(SLOTS.first(), Some(&"09:00"));
        assert_eq!(SLOTS.last(), Some(&"19:00"));
        assert!(SLOTS.iter().all(|slot| parse_slot(slot).is_some()));
    }
}
