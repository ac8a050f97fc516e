//! Linked date-picker bounds.
//!
//! A picker limited by another picker's date excludes that date itself:
//! a `maxDate` bound lands one day before it, a `minDate` bound one day
//! after.

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateBound {
    MinDate,
    MaxDate,
}

impl DateBound {
    /// Parses the picker option name (`minDate` / `maxDate`).
    pub fn parse(option: &str) -> Option<Self> {
        match option.trim() {
            "minDate" => Some(Self::MinDate),
            "maxDate" => Some(Self::MaxDate),
            _ => None,
        }
    }
}

/// Bound to apply for `date`, or `None` when there is no date.
pub fn update_date(bound: DateBound, date: Option<NaiveDate>) -> Option<NaiveDate> {
    let date = date?;
    match bound {
        DateBound::MaxDate => date.pred_opt(),
        DateBound::MinDate => date.succ_opt(),
    }
}

/// Parses picker input in `MM/DD/YYYY` or ISO `YYYY-MM-DD` form.
pub fn parse_picker_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, "%m/%d/%Y")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}
