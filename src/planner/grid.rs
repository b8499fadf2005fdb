use chrono::{Datelike, Days, NaiveDate};

use super::day_key::DayKey;
use super::store::TaskStore;
use super::task::Task;

pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// The (year, month) pair the grid is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    year: i32,
    month: u32,
}

impl Cursor {
    /// `month` is 1-based; out-of-range values are clamped into 1..=12.
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month: month.clamp(1, 12),
        }
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Self::new(self.year, self.month + 1)
        }
    }

    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self::new(self.year - 1, 12)
        } else {
            Self::new(self.year, self.month - 1)
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.day(1)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.day(days_in_month(self.year, self.month))
    }

    /// Day `day` of this month, clamped to the month's length.
    pub fn day(&self, day: u32) -> NaiveDate {
        let day = day.clamp(1, days_in_month(self.year, self.month));
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or(NaiveDate::MIN)
    }

    /// `"March 2024"`
    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

/// One box in the month grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell<'a> {
    pub date: NaiveDate,
    pub key: DayKey,
    pub is_other_month: bool,
    pub is_today: bool,
    pub tasks: &'a [Task],
}

/// Builds complete Sunday-to-Saturday weeks covering the cursor's month,
/// padded with days from the neighbouring months.
pub fn month_grid<'a>(cursor: Cursor, today: NaiveDate, store: &'a TaskStore) -> Vec<DayCell<'a>> {
    let first = cursor.first_day();
    let last = cursor.last_day();

    let lead = u64::from(first.weekday().num_days_from_sunday());
    let trail = u64::from(6 - last.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);
    let end = last.checked_add_days(Days::new(trail)).unwrap_or(last);

    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| {
            let key = DayKey::new(date);
            DayCell {
                date,
                key,
                is_other_month: date.month() != cursor.month() || date.year() != cursor.year(),
                is_today: date == today,
                tasks: store.tasks(key),
            }
        })
        .collect()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(first), Some(next)) => next.signed_duration_since(first).num_days() as u32,
        _ => 31,
    }
}

/// Moves `date` by whole months, clamping the day to the target month's length.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let mut cursor = Cursor::containing(date);
    for _ in 0..months.unsigned_abs() {
        cursor = if months > 0 { cursor.next() } else { cursor.prev() };
    }
    cursor.day(date.day())
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use tempfile::tempdir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("date")
    }

    #[test]
    fn grid_covers_whole_weeks_for_many_months() {
        let temp = tempdir().expect("tempdir");
        let store = TaskStore::load(temp.path().join("tasks.json"));
        let today = date(2024, 3, 15);

        for year in [1999, 2015, 2024, 2025, 2100] {
            for month in 1..=12 {
                let cursor = Cursor::new(year, month);
                let cells = month_grid(cursor, today, &store);

                assert_eq!(cells.len() % 7, 0, "{year}-{month}");
                assert!(cells.len() == 28 || cells.len() == 35 || cells.len() == 42);
                assert_eq!(cells[0].date.weekday(), Weekday::Sun);
                assert_eq!(cells[cells.len() - 1].date.weekday(), Weekday::Sat);

                let first = cells
                    .iter()
                    .find(|c| c.date == cursor.first_day())
                    .expect("first of month present");
                assert!(!first.is_other_month);
                assert!(cells.iter().any(|c| c.date == cursor.last_day()));

                let in_month = cells.iter().filter(|c| !c.is_other_month).count() as u32;
                assert_eq!(in_month, days_in_month(year, month));

                for pair in cells.windows(2) {
                    assert_eq!(pair[0].date.succ_opt(), Some(pair[1].date));
                }
            }
        }
    }

    #[test]
    fn february_2015_fits_in_four_rows() {
        let temp = tempdir().expect("tempdir");
        let store = TaskStore::load(temp.path().join("tasks.json"));
        let cells = month_grid(Cursor::new(2015, 2), date(2015, 2, 1), &store);
        assert_eq!(cells.len(), 28);
        assert!(cells.iter().all(|c| !c.is_other_month));
    }

    #[test]
    fn today_flag_only_inside_displayed_range() {
        let temp = tempdir().expect("tempdir");
        let store = TaskStore::load(temp.path().join("tasks.json"));

        let cells = month_grid(Cursor::new(2024, 3), date(2024, 3, 15), &store);
        assert_eq!(cells.iter().filter(|c| c.is_today).count(), 1);

        // 2024-03-31 is a Sunday, so the March grid pads through April 6.
        let cells = month_grid(Cursor::new(2024, 3), date(2024, 4, 6), &store);
        let today: Vec<_> = cells.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert!(today[0].is_other_month);

        let cells = month_grid(Cursor::new(2024, 3), date(2024, 5, 1), &store);
        assert_eq!(cells.iter().filter(|c| c.is_today).count(), 0);
    }

    #[test]
    fn cells_carry_their_tasks() {
        let temp = tempdir().expect("tempdir");
        let mut store = TaskStore::load(temp.path().join("tasks.json"));
        let day = DayKey::new(date(2024, 3, 1));
        store
            .add_task(
                day,
                Task {
                    name: "Quiz".into(),
                    subject: None,
                    color: "red".into(),
                    description: String::new(),
                    duration: 1.0,
                },
            )
            .expect("add");

        // Shown on the March grid and as a padding day on the February grid.
        for cursor in [Cursor::new(2024, 3), Cursor::new(2024, 2)] {
            let cells = month_grid(cursor, date(2024, 3, 15), &store);
            let cell = cells.iter().find(|c| c.key == day).expect("cell");
            assert_eq!(cell.tasks.len(), 1);
            assert_eq!(cell.key.to_string(), "2024-03-01");
        }
    }

    #[test]
    fn cursor_moves_one_month_and_wraps_years() {
        let c = Cursor::new(2023, 12);
        assert_eq!(c.next(), Cursor::new(2024, 1));
        assert_eq!(Cursor::new(2024, 1).prev(), c);
        assert_eq!(Cursor::new(2024, 3).title(), "March 2024");
    }

    #[test]
    fn month_shift_clamps_day_of_month() {
        assert_eq!(shift_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(shift_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(shift_months(date(2024, 3, 31), -1), date(2024, 2, 29));
        assert_eq!(shift_months(date(2024, 12, 15), 1), date(2025, 1, 15));
        assert_eq!(shift_months(date(2024, 5, 31), 1), date(2024, 6, 30));
    }

    #[test]
    fn month_lengths() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2100, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
        assert_eq!(days_in_month(2024, 4), 30);
    }
}
