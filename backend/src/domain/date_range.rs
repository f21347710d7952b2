//! Observation window for imagery queries.
//!
//! Dates are calendar days in `YYYY-MM-DD` form. The engine filters with an
//! end-exclusive range, so the window is forwarded exactly as supplied.

use chrono::{Days, NaiveDate};

use super::Error;
use super::validation::{ValidationCode, field_error, field_value_error};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validated `[start, end)` date window.
///
/// ## Invariants
/// - `start <= end`;
/// - `start` is no later than `today - latency_days` at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObservationWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl ObservationWindow {
    /// Parse and validate a window against the current day and data latency.
    ///
    /// # Examples
    /// ```
    /// use agriscope_backend::domain::ObservationWindow;
    /// use chrono::NaiveDate;
    ///
    /// let today = NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid date");
    /// let window = ObservationWindow::parse("2025-06-01", "2025-07-31", today, 3)
    ///     .expect("window is valid");
    /// assert_eq!(window.start_str(), "2025-06-01");
    /// ```
    pub fn parse(
        start_date: &str,
        end_date: &str,
        today: NaiveDate,
        latency_days: u32,
    ) -> Result<Self, Error> {
        let Self { start, end } = Self::parse_ordered(start_date, end_date)?;

        let latest_start = today
            .checked_sub_days(Days::new(u64::from(latency_days)))
            .unwrap_or(NaiveDate::MIN);
        if start > latest_start {
            return Err(field_value_error(
                "start_date",
                ValidationCode::TooRecent,
                start_date,
                format!(
                    "start_date is too recent: imagery is available up to {latest_start} \
                     ({latency_days} day processing latency)"
                ),
            ));
        }

        Ok(Self { start, end })
    }

    /// Parse a window checking only format and ordering.
    ///
    /// Used for archives with their own availability rules, such as daily
    /// weather.
    ///
    /// ```
    /// use agriscope_backend::domain::ObservationWindow;
    ///
    /// let window = ObservationWindow::parse_ordered("2025-07-01", "2025-07-31")
    ///     .expect("ordered window");
    /// assert_eq!(window.end_str(), "2025-07-31");
    /// ```
    pub fn parse_ordered(start_date: &str, end_date: &str) -> Result<Self, Error> {
        let start = parse_date("start_date", start_date)?;
        let end = parse_date("end_date", end_date)?;
        if start > end {
            return Err(field_error(
                "start_date",
                ValidationCode::InvalidRange,
                "start_date must not be after end_date",
            ));
        }
        Ok(Self { start, end })
    }

    /// First day of the window.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Exclusive end of the window.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Start date formatted as `YYYY-MM-DD`.
    pub fn start_str(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// End date formatted as `YYYY-MM-DD`.
    pub fn end_str(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        field_value_error(
            field,
            ValidationCode::InvalidDate,
            raw,
            format!("{field} must be an ISO date (YYYY-MM-DD)"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, 1).expect("valid fixture date")
    }

    fn detail_code(error: &Error) -> Option<String> {
        error
            .details()
            .and_then(|details| details.get("code"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_owned)
    }

    #[rstest]
    fn accepts_window_in_the_past(today: NaiveDate) {
        let window = ObservationWindow::parse("2025-06-01", "2025-07-31", today, 3)
            .expect("window should validate");
        assert_eq!(window.start_str(), "2025-06-01");
        assert_eq!(window.end_str(), "2025-07-31");
    }

    #[rstest]
    fn accepts_single_day_and_future_end(today: NaiveDate) {
        assert!(ObservationWindow::parse("2025-07-01", "2025-07-01", today, 3).is_ok());
        assert!(ObservationWindow::parse("2025-07-01", "2026-01-01", today, 3).is_ok());
    }

    #[rstest]
    #[case("2025/06/01", "2025-07-31")]
    #[case("2025-06-01", "31-07-2025")]
    #[case("2025-02-30", "2025-07-31")]
    #[case("", "2025-07-31")]
    fn rejects_malformed_dates(today: NaiveDate, #[case] start: &str, #[case] end: &str) {
        let error = ObservationWindow::parse(start, end, today, 3).expect_err("must fail");
        assert_eq!(detail_code(&error).as_deref(), Some("invalid_date"));
    }

    #[rstest]
    fn rejects_inverted_range(today: NaiveDate) {
        let error =
            ObservationWindow::parse("2025-07-31", "2025-06-01", today, 3).expect_err("must fail");
        assert_eq!(detail_code(&error).as_deref(), Some("invalid_range"));
    }

    #[rstest]
    fn ordered_parse_skips_the_latency_rule() {
        let window = ObservationWindow::parse_ordered("2025-08-01", "2025-08-01")
            .expect("latency is not checked");
        assert_eq!(window.start(), window.end());
        let error = ObservationWindow::parse_ordered("2025-08-02", "2025-08-01")
            .expect_err("order is still checked");
        assert_eq!(detail_code(&error).as_deref(), Some("invalid_range"));
    }

    #[rstest]
    #[case("2025-07-29", true)]
    #[case("2025-07-30", false)]
    #[case("2025-08-01", false)]
    fn enforces_data_latency(today: NaiveDate, #[case] start: &str, #[case] accepted: bool) {
        let result = ObservationWindow::parse(start, "2025-08-15", today, 3);
        match result {
            Ok(_) => assert!(accepted, "{start} should be too recent"),
            Err(error) => {
                assert!(!accepted, "{start} should be accepted");
                assert_eq!(detail_code(&error).as_deref(), Some("too_recent"));
            }
        }
    }
}
