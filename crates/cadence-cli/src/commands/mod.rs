pub mod challenge;
pub mod config;
pub mod habit;
pub mod intent;
pub mod okr;

use chrono::NaiveDate;

/// Parse a `YYYY-MM-DD` argument, defaulting to today.
pub fn parse_date_arg(arg: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match arg {
        Some(raw) => Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?),
        None => Ok(chrono::Local::now().date_naive()),
    }
}
