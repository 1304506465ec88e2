//! Builds the week-by-week grid for a month of expenses.
//!
//! Everything in this module is pure: the caller fetches the month's
//! transactions and today's date, and gets back a [CalendarMonth] with each
//! day's transactions and totals attached.

use std::{collections::HashMap, fmt::Display, str::FromStr};

use rust_decimal::Decimal;
use time::{Date, Duration, Month, Weekday, util::is_leap_year};

use crate::transaction::Transaction;

/// The number of days shown in each row of the calendar.
pub const DAYS_PER_WEEK: usize = 7;

/// The day of the week shown in the first column of the calendar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WeekStart {
    /// Weeks run Monday to Sunday.
    #[default]
    Monday,
    /// Weeks run Sunday to Saturday.
    Sunday,
}

impl WeekStart {
    /// The number of days between the start of the week and `weekday`.
    fn days_until(self, weekday: Weekday) -> u8 {
        match self {
            WeekStart::Monday => weekday.number_days_from_monday(),
            WeekStart::Sunday => weekday.number_days_from_sunday(),
        }
    }

    /// The short names of the days of the week, starting from this day.
    pub fn day_names(self) -> [&'static str; DAYS_PER_WEEK] {
        match self {
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
        }
    }
}

impl Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekStart::Monday => f.write_str("monday"),
            WeekStart::Sunday => f.write_str("sunday"),
        }
    }
}

impl FromStr for WeekStart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monday" => Ok(WeekStart::Monday),
            "sunday" => Ok(WeekStart::Sunday),
            other => Err(format!(
                "\"{other}\" is not a valid week start, expected \"monday\" or \"sunday\""
            )),
        }
    }
}

/// A calendar month, e.g. March 2024.
///
/// Only months in the years 1 to 9999 (inclusive) can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MonthId {
    first_day: Date,
}

impl MonthId {
    /// The first and last years a [MonthId] can refer to.
    pub const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

    /// Create a month from a year and a month number (1 = January).
    ///
    /// Returns `None` if the year is outside [MonthId::YEARS] or the month is
    /// outside 1 to 12.
    pub fn new(year: i32, month: u8) -> Option<Self> {
        if !Self::YEARS.contains(&year) {
            return None;
        }

        let month = Month::try_from(month).ok()?;

        Date::from_calendar_date(year, month, 1)
            .ok()
            .map(|first_day| Self { first_day })
    }

    /// The month that `date` falls in.
    pub fn containing(date: Date) -> Self {
        let first_day = date.saturating_sub(Duration::days(i64::from(date.day()) - 1));

        Self { first_day }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    /// The month number, 1 = January.
    pub fn month(&self) -> u8 {
        self.first_day.month() as u8
    }

    /// The full English name of the month, e.g. "March".
    pub fn month_name(&self) -> String {
        self.first_day.month().to_string()
    }

    pub fn first_day(&self) -> Date {
        self.first_day
    }

    pub fn last_day(&self) -> Date {
        self.first_day
            .saturating_add(Duration::days(i64::from(self.days_in_month()) - 1))
    }

    pub fn days_in_month(&self) -> u8 {
        match self.first_day.month() {
            Month::February if is_leap_year(self.year()) => 29,
            Month::February => 28,
            Month::April | Month::June | Month::September | Month::November => 30,
            _ => 31,
        }
    }

    /// Whether `date` falls in this month.
    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.year() && date.month() == self.first_day.month()
    }

    /// The month before this one, rolling over to December of the previous year.
    ///
    /// Returns `None` for January of year 1.
    pub fn previous(&self) -> Option<Self> {
        self.first_day
            .previous_day()
            .map(Self::containing)
            .filter(|month| Self::YEARS.contains(&month.year()))
    }

    /// The month after this one, rolling over to January of the next year.
    ///
    /// Returns `None` for December of year 9999.
    pub fn next(&self) -> Option<Self> {
        self.last_day()
            .next_day()
            .map(Self::containing)
            .filter(|month| Self::YEARS.contains(&month.year()))
    }
}

impl Display for MonthId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.first_day.month(), self.year())
    }
}

/// A single cell in the calendar grid.
///
/// Cells before the first or after the last day of the month are padding,
/// which have a `day` of zero and never have transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDay {
    /// The day of the month, or zero for padding.
    pub day: u8,
    /// The transactions dated on this day.
    pub transactions: Vec<Transaction>,
    /// The sum of the amounts of `transactions`.
    pub total: Decimal,
    /// Whether this cell is today's date.
    pub is_today: bool,
}

impl CalendarDay {
    fn padding() -> Self {
        Self {
            day: 0,
            transactions: Vec::new(),
            total: Decimal::ZERO,
            is_today: false,
        }
    }

    pub fn is_padding(&self) -> bool {
        self.day == 0
    }
}

/// A month of transactions laid out as a calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarMonth {
    /// The month being displayed.
    pub month: MonthId,
    /// Which day the weeks start on.
    pub week_start: WeekStart,
    /// The rows of the calendar, each exactly [DAYS_PER_WEEK] days long.
    pub weeks: Vec<Vec<CalendarDay>>,
    /// The sum of every transaction in the month.
    pub total: Decimal,
    /// The month before `month`, if there is one.
    pub previous: Option<MonthId>,
    /// The month after `month`, if there is one.
    pub next: Option<MonthId>,
}

/// Lay out `transactions` in a week-by-week grid for `month`.
///
/// Transactions dated outside of `month` are ignored. Each day's total is the
/// exact sum of its transactions' amounts, and days without transactions have
/// a total of zero.
pub fn build_calendar_month(
    month: MonthId,
    week_start: WeekStart,
    transactions: Vec<Transaction>,
    today: Date,
) -> CalendarMonth {
    let transactions_by_day = group_transactions_by_day(month, transactions);

    let leading_padding = week_start.days_until(month.first_day().weekday());
    let mut cells: Vec<CalendarDay> = (0..leading_padding)
        .map(|_| CalendarDay::padding())
        .collect();

    let mut month_total = Decimal::ZERO;

    for day in 1..=month.days_in_month() {
        let day_transactions = transactions_by_day.get(&day).cloned().unwrap_or_default();
        let total: Decimal = day_transactions
            .iter()
            .map(|transaction| transaction.amount.as_decimal())
            .sum();
        month_total += total;

        cells.push(CalendarDay {
            day,
            transactions: day_transactions,
            total,
            is_today: month.contains(today) && today.day() == day,
        });
    }

    while cells.len() % DAYS_PER_WEEK != 0 {
        cells.push(CalendarDay::padding());
    }

    let weeks = cells
        .chunks(DAYS_PER_WEEK)
        .map(|week| week.to_vec())
        .collect();

    CalendarMonth {
        month,
        week_start,
        weeks,
        total: month_total,
        previous: month.previous(),
        next: month.next(),
    }
}

fn group_transactions_by_day(
    month: MonthId,
    transactions: Vec<Transaction>,
) -> HashMap<u8, Vec<Transaction>> {
    let mut transactions_by_day: HashMap<u8, Vec<Transaction>> = HashMap::new();

    for transaction in transactions {
        if !month.contains(transaction.date) {
            tracing::debug!(
                "Skipping transaction {} dated {} outside of {month}",
                transaction.id,
                transaction.date
            );
            continue;
        }

        transactions_by_day
            .entry(transaction.date.day())
            .or_default()
            .push(transaction);
    }

    transactions_by_day
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::{
        Date, OffsetDateTime,
        macros::{date, datetime},
    };

    use crate::{
        calendar::grid::{CalendarMonth, DAYS_PER_WEEK, MonthId, WeekStart, build_calendar_month},
        transaction::{Category, Transaction},
    };

    fn transaction(id: i64, amount: &str, category: Category, date: Date) -> Transaction {
        Transaction {
            id,
            amount: amount.parse().expect("invalid test amount"),
            category,
            date,
            note: None,
            created_at: datetime!(2024-03-01 12:00 UTC),
        }
    }

    fn march_2024_transactions() -> Vec<Transaction> {
        vec![
            transaction(1, "12.50", Category::Food, date!(2024 - 03 - 05)),
            transaction(2, "7.25", Category::Fuel, date!(2024 - 03 - 05)),
            transaction(3, "20.00", Category::Bills, date!(2024 - 03 - 10)),
        ]
    }

    fn march_2024() -> MonthId {
        MonthId::new(2024, 3).unwrap()
    }

    #[test]
    fn aggregates_transactions_per_day() {
        let calendar = build_calendar_month(
            march_2024(),
            WeekStart::Monday,
            march_2024_transactions(),
            date!(2024 - 03 - 20),
        );

        for day in calendar.weeks.iter().flatten() {
            match day.day {
                5 => {
                    assert_eq!(day.total, Decimal::new(1975, 2));
                    assert_eq!(day.transactions.len(), 2);
                }
                10 => {
                    assert_eq!(day.total, Decimal::new(2000, 2));
                    assert_eq!(day.transactions.len(), 1);
                }
                _ => {
                    assert_eq!(day.total, Decimal::ZERO, "day {}", day.day);
                    assert!(day.transactions.is_empty(), "day {}", day.day);
                }
            }
        }
        assert_eq!(calendar.total, Decimal::new(3975, 2));
    }

    #[test]
    fn month_total_is_sum_of_day_totals() {
        let calendar = build_calendar_month(
            march_2024(),
            WeekStart::Sunday,
            march_2024_transactions(),
            date!(2024 - 03 - 20),
        );

        let sum_of_days: Decimal = calendar.weeks.iter().flatten().map(|day| day.total).sum();

        assert_eq!(calendar.total, sum_of_days);
    }

    #[test]
    fn each_transaction_appears_in_exactly_one_cell() {
        let transactions = march_2024_transactions();

        let calendar = build_calendar_month(
            march_2024(),
            WeekStart::Monday,
            transactions.clone(),
            date!(2024 - 03 - 20),
        );

        for want in &transactions {
            let cells_containing = calendar
                .weeks
                .iter()
                .flatten()
                .filter(|day| day.transactions.contains(want))
                .count();
            assert_eq!(cells_containing, 1, "transaction {}", want.id);
        }
    }

    #[test]
    fn ignores_transactions_outside_month() {
        let transactions = vec![
            transaction(1, "1.00", Category::Food, date!(2024 - 02 - 29)),
            transaction(2, "2.00", Category::Food, date!(2024 - 04 - 01)),
            transaction(3, "3.00", Category::Food, date!(2023 - 03 - 05)),
        ];

        let calendar = build_calendar_month(
            march_2024(),
            WeekStart::Monday,
            transactions,
            date!(2024 - 03 - 20),
        );

        assert_eq!(calendar.total, Decimal::ZERO);
        assert!(
            calendar
                .weeks
                .iter()
                .flatten()
                .all(|day| day.transactions.is_empty())
        );
    }

    #[test]
    fn empty_month_has_zero_total() {
        let calendar =
            build_calendar_month(march_2024(), WeekStart::Monday, vec![], date!(2024 - 03 - 20));

        assert_eq!(calendar.total, Decimal::ZERO);
    }

    #[test]
    fn grid_contains_every_day_exactly_once() {
        let years = [1, 1900, 2000, 2023, 2024, 2100, 9999];

        for year in years {
            for month_number in 1..=12 {
                for week_start in [WeekStart::Monday, WeekStart::Sunday] {
                    let month = MonthId::new(year, month_number).unwrap();
                    let today = OffsetDateTime::now_utc().date();

                    let calendar = build_calendar_month(month, week_start, vec![], today);

                    assert!(
                        calendar
                            .weeks
                            .iter()
                            .all(|week| week.len() == DAYS_PER_WEEK),
                        "{month} has a partial week"
                    );
                    let days: Vec<u8> = calendar
                        .weeks
                        .iter()
                        .flatten()
                        .map(|day| day.day)
                        .filter(|&day| day != 0)
                        .collect();
                    let want_days: Vec<u8> = (1..=month.days_in_month()).collect();
                    assert_eq!(days, want_days, "{month} starting on {week_start}");
                }
            }
        }
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(MonthId::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthId::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthId::new(1900, 2).unwrap().days_in_month(), 28);
        assert_eq!(MonthId::new(2000, 2).unwrap().days_in_month(), 29);
        assert_eq!(MonthId::new(2024, 4).unwrap().days_in_month(), 30);
        assert_eq!(MonthId::new(2024, 12).unwrap().days_in_month(), 31);
    }

    #[test]
    fn first_week_is_padded_to_week_start() {
        // 1 March 2024 is a Friday.
        let monday_calendar =
            build_calendar_month(march_2024(), WeekStart::Monday, vec![], date!(2024 - 03 - 20));
        let sunday_calendar =
            build_calendar_month(march_2024(), WeekStart::Sunday, vec![], date!(2024 - 03 - 20));

        assert_eq!(first_week_days(&monday_calendar), [0, 0, 0, 0, 1, 2, 3]);
        assert_eq!(first_week_days(&sunday_calendar), [0, 0, 0, 0, 0, 1, 2]);
    }

    fn first_week_days(calendar: &CalendarMonth) -> Vec<u8> {
        calendar.weeks[0].iter().map(|day| day.day).collect()
    }

    #[test]
    fn marks_today() {
        let calendar =
            build_calendar_month(march_2024(), WeekStart::Monday, vec![], date!(2024 - 03 - 20));

        let today: Vec<u8> = calendar
            .weeks
            .iter()
            .flatten()
            .filter(|day| day.is_today)
            .map(|day| day.day)
            .collect();
        assert_eq!(today, [20]);
    }

    #[test]
    fn today_in_another_month_is_not_marked() {
        let calendar =
            build_calendar_month(march_2024(), WeekStart::Monday, vec![], date!(2024 - 04 - 20));

        assert!(calendar.weeks.iter().flatten().all(|day| !day.is_today));
    }

    #[test]
    fn previous_and_next_roll_over_years() {
        let january = MonthId::new(2024, 1).unwrap();
        let december = MonthId::new(2024, 12).unwrap();

        assert_eq!(january.previous(), MonthId::new(2023, 12));
        assert_eq!(january.next(), MonthId::new(2024, 2));
        assert_eq!(december.next(), MonthId::new(2025, 1));
        assert_eq!(december.previous(), MonthId::new(2024, 11));
    }

    #[test]
    fn calendar_links_adjacent_months() {
        let calendar = build_calendar_month(
            MonthId::new(2024, 12).unwrap(),
            WeekStart::Monday,
            vec![],
            date!(2024 - 03 - 20),
        );

        assert_eq!(calendar.previous, MonthId::new(2024, 11));
        assert_eq!(calendar.next, MonthId::new(2025, 1));
    }

    #[test]
    fn no_months_outside_supported_years() {
        assert_eq!(MonthId::new(1, 1).unwrap().previous(), None);
        assert_eq!(MonthId::new(9999, 12).unwrap().next(), None);
        assert_eq!(MonthId::new(0, 1), None);
        assert_eq!(MonthId::new(10000, 1), None);
        assert_eq!(MonthId::new(2024, 0), None);
        assert_eq!(MonthId::new(2024, 13), None);
    }

    #[test]
    fn containing_finds_first_day() {
        let month = MonthId::containing(date!(2024 - 02 - 29));

        assert_eq!(month, MonthId::new(2024, 2).unwrap());
        assert_eq!(month.first_day(), date!(2024 - 02 - 01));
        assert_eq!(month.last_day(), date!(2024 - 02 - 29));
    }

    #[test]
    fn parses_week_start() {
        assert_eq!("monday".parse::<WeekStart>(), Ok(WeekStart::Monday));
        assert_eq!("Sunday".parse::<WeekStart>(), Ok(WeekStart::Sunday));
        assert!("friday".parse::<WeekStart>().is_err());
    }
}
