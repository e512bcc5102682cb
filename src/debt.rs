//! Debt model and its one-way `pending -> paid` lifecycle.

use crate::error::{LedgerError, Result};
use crate::money::Money;
use crate::record::RecordId;
use crate::transaction::{optional_text, parse_amount};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebtStatus {
    Pending,
    Paid,
}

/// An obligation to repay `amount` by `deadline`.
///
/// # Invariants
///
/// - `amount` is strictly positive
/// - `paid_at` is set exactly when `status == Paid`
/// - Once paid, a debt never returns to pending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub id: RecordId,

    pub name: String,

    pub amount: Money,

    pub deadline: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub status: DebtStatus,

    pub created_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

impl Debt {
    pub fn is_pending(&self) -> bool {
        self.status == DebtStatus::Pending
    }

    /// A pending debt whose deadline has already passed.
    pub fn is_overdue(&self, reference: DateTime<Utc>) -> bool {
        self.is_pending() && self.deadline < reference
    }

    /// How the debt should be presented at `reference`.
    pub fn standing(&self, reference: DateTime<Utc>) -> DebtStanding {
        if !self.is_pending() {
            DebtStanding::Paid
        } else if self.is_overdue(reference) {
            DebtStanding::Overdue
        } else {
            DebtStanding::Due {
                days_left: days_until(self.deadline, reference),
            }
        }
    }
}

/// Display state of a debt relative to a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebtStanding {
    Paid,
    Overdue,
    Due { days_left: i64 },
}

impl fmt::Display for DebtStanding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebtStanding::Paid => f.write_str("paid"),
            DebtStanding::Overdue => f.write_str("overdue"),
            DebtStanding::Due { days_left: 1 } => f.write_str("1 day left"),
            DebtStanding::Due { days_left } => write!(f, "{} days left", days_left),
        }
    }
}

/// Whole days from `reference` to `deadline`, rounded up.
///
/// Negative once the deadline has passed by at least a full day.
pub fn days_until(deadline: DateTime<Utc>, reference: DateTime<Utc>) -> i64 {
    let millis = (deadline - reference).num_milliseconds();
    let days = millis.div_euclid(MILLIS_PER_DAY);
    if millis.rem_euclid(MILLIS_PER_DAY) == 0 {
        days
    } else {
        days + 1
    }
}

/// Parses a deadline as typed into a date field.
///
/// Accepts a bare `YYYY-MM-DD` date (midnight UTC) or a full RFC 3339
/// timestamp.
pub fn parse_deadline(raw: &str) -> Result<DateTime<Utc>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation("deadline is required"));
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&midnight));
        }
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| LedgerError::validation(format!("deadline '{}' is not a valid date", trimmed)))
}

/// Raw debt input as collected by a form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebtForm {
    pub name: String,
    pub amount: String,
    pub deadline: String,
    pub note: String,
}

impl DebtForm {
    /// Validates the raw input: a non-blank name, a positive amount and a
    /// parseable deadline are all required.
    pub fn parse(&self) -> Result<NewDebt> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(LedgerError::validation("debt name is required"));
        }

        Ok(NewDebt {
            name: name.to_string(),
            amount: parse_amount(&self.amount)?,
            deadline: parse_deadline(&self.deadline)?,
            note: optional_text(&self.note),
        })
    }
}

/// A validated debt that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDebt {
    pub name: String,
    pub amount: Money,
    pub deadline: DateTime<Utc>,
    pub note: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn pending_debt(deadline: DateTime<Utc>) -> Debt {
        Debt {
            id: RecordId::generate(),
            name: "pinjaman".to_string(),
            amount: Money::from_units(100_000),
            deadline,
            note: None,
            status: DebtStatus::Pending,
            created_at: at("2026-10-01T00:00:00Z"),
            paid_at: None,
        }
    }

    #[test]
    fn test_days_until_rounds_up() {
        let now = at("2026-10-16T12:00:00Z");

        assert_eq!(days_until(now + Duration::days(3), now), 3);
        assert_eq!(days_until(now + Duration::hours(1), now), 1);
        assert_eq!(days_until(now, now), 0);
        assert_eq!(days_until(now - Duration::hours(1), now), 0);
        assert_eq!(days_until(now - Duration::hours(36), now), -1);
    }

    #[test]
    fn test_standing() {
        let now = at("2026-10-16T00:00:00Z");

        let due = pending_debt(now + Duration::days(3));
        assert_eq!(due.standing(now), DebtStanding::Due { days_left: 3 });
        assert_eq!(due.standing(now).to_string(), "3 days left");

        let late = pending_debt(now - Duration::days(1));
        assert!(late.is_overdue(now));
        assert_eq!(late.standing(now), DebtStanding::Overdue);

        let mut settled = pending_debt(now - Duration::days(1));
        settled.status = DebtStatus::Paid;
        settled.paid_at = Some(now);
        assert!(!settled.is_overdue(now));
        assert_eq!(settled.standing(now), DebtStanding::Paid);
    }

    #[test]
    fn test_parse_deadline_formats() {
        assert_eq!(parse_deadline("2026-10-19").unwrap(), at("2026-10-19T00:00:00Z"));
        assert_eq!(
            parse_deadline("2026-10-19T10:30:00+07:00").unwrap(),
            at("2026-10-19T03:30:00Z")
        );
        assert!(parse_deadline("").is_err());
        assert!(parse_deadline("next week").is_err());
        assert!(parse_deadline("2026-02-30").is_err());
    }

    #[test]
    fn test_form_requires_every_field() {
        let valid = DebtForm {
            name: " pinjaman ".to_string(),
            amount: "100000".to_string(),
            deadline: "2026-10-19".to_string(),
            note: String::new(),
        };
        let parsed = valid.parse().unwrap();
        assert_eq!(parsed.name, "pinjaman");
        assert_eq!(parsed.note, None);

        let blank_name = DebtForm {
            name: "   ".to_string(),
            ..valid.clone()
        };
        assert!(matches!(blank_name.parse(), Err(LedgerError::Validation(_))));

        let zero_amount = DebtForm {
            amount: "0".to_string(),
            ..valid.clone()
        };
        assert!(matches!(zero_amount.parse(), Err(LedgerError::Validation(_))));

        let no_deadline = DebtForm {
            deadline: String::new(),
            ..valid
        };
        assert!(matches!(no_deadline.parse(), Err(LedgerError::Validation(_))));
    }
}
