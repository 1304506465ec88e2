//! The month calendar of expenses with daily and monthly totals.

mod grid;
mod page;

pub use grid::{CalendarDay, CalendarMonth, MonthId, WeekStart, build_calendar_month};
pub use page::get_calendar_page;
