//! Installment schedule generator.
//!
//! Two independent monthly streams are laid out from the loan start date:
//! principal amortization and interest payments. Each stream has its own
//! grace period and interval. Interest stops at maturity (the last principal
//! installment), where one interest payment is always due.

use chrono::{Datelike, NaiveDate};
use log::{debug, trace};
use rust_decimal::{Decimal, RoundingStrategy};

use super::dates::{add_months_clamped, format_br_date};
use super::form::FormInstallment;
use super::installment::InstallmentKind;

pub const MAX_INSTALLMENTS: u32 = 600;
/// Upper bound for any grace period or interval, in months
pub const MAX_PERIOD_MONTHS: u32 = 1200;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("at least one principal installment is required")]
    NoInstallments,
    #[error("{0} installments exceeds the maximum of {MAX_INSTALLMENTS}")]
    TooManyInstallments(u32),
    #[error("{stream} interval must be at least one month")]
    ZeroInterval { stream: &'static str },
    #[error("{stream} period of {months} months exceeds {MAX_PERIOD_MONTHS}")]
    PeriodTooLong { stream: &'static str, months: u32 },
    #[error("due day {0} must be between 1 and 31")]
    InvalidDueDay(u32),
    #[error("total principal cannot be negative")]
    NegativePrincipal,
    #[error("schedule runs past the supported date range")]
    DateOutOfRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleParams {
    pub start_date: NaiveDate,
    pub total_principal: Decimal,
    /// Number of principal installments
    pub installments: u32,
    /// Months between principal installments
    pub principal_interval: u32,
    /// Months before the principal stream starts
    pub principal_grace: u32,
    pub interest_interval: u32,
    pub interest_grace: u32,
    /// Day of month payments fall on; clamped to short months. Defaults to the start day.
    pub due_day: Option<u32>,
    /// Rows due on or before this date are marked settled
    pub settled_through: Option<NaiveDate>,
}

impl ScheduleParams {
    /// Monthly principal and interest, no grace
    pub fn monthly(start_date: NaiveDate, total_principal: Decimal, installments: u32) -> Self {
        Self {
            start_date,
            total_principal,
            installments,
            principal_interval: 1,
            principal_grace: 0,
            interest_interval: 1,
            interest_grace: 0,
            due_day: None,
            settled_through: None,
        }
    }

    fn validate(&self) -> Result<(), ScheduleError> {
        if self.installments == 0 {
            return Err(ScheduleError::NoInstallments);
        }
        if self.installments > MAX_INSTALLMENTS {
            return Err(ScheduleError::TooManyInstallments(self.installments));
        }
        if self.principal_interval == 0 {
            return Err(ScheduleError::ZeroInterval { stream: "principal" });
        }
        if self.interest_interval == 0 {
            return Err(ScheduleError::ZeroInterval { stream: "interest" });
        }
        for (stream, months) in [
            ("principal", self.principal_interval),
            ("principal", self.principal_grace),
            ("interest", self.interest_interval),
            ("interest", self.interest_grace),
        ] {
            if months > MAX_PERIOD_MONTHS {
                return Err(ScheduleError::PeriodTooLong { stream, months });
            }
        }
        if let Some(day) = self.due_day {
            if !(1..=31).contains(&day) {
                return Err(ScheduleError::InvalidDueDay(day));
            }
        }
        if self.total_principal < Decimal::ZERO {
            return Err(ScheduleError::NegativePrincipal);
        }
        Ok(())
    }
}

/// A generated schedule row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInstallment {
    pub kind: InstallmentKind,
    pub due_date: NaiveDate,
    pub principal: Decimal,
    pub settled: bool,
}

impl From<&ScheduledInstallment> for FormInstallment {
    fn from(row: &ScheduledInstallment) -> Self {
        FormInstallment {
            kind: row.kind,
            principal: format!("{:.2}", row.principal),
            due_date: format_br_date(row.due_date),
            settled: row.settled,
        }
    }
}

/// Generate the ordered installment schedule.
pub fn generate(params: &ScheduleParams) -> Result<Vec<ScheduledInstallment>, ScheduleError> {
    params.validate()?;

    let day = params.due_day.unwrap_or_else(|| params.start_date.day());
    let count = params.installments;
    let due = |offset: u32| {
        add_months_clamped(params.start_date, offset, day).ok_or(ScheduleError::DateOutOfRange)
    };

    let principal_offsets: Vec<u32> = (0..count)
        .map(|k| params.principal_grace + (k + 1) * params.principal_interval)
        .collect();
    let maturity = principal_offsets[principal_offsets.len() - 1];

    let mut interest_offsets: Vec<u32> = (0..)
        .map(|j: u32| params.interest_grace + (j + 1) * params.interest_interval)
        .take_while(|offset| *offset < maturity)
        .collect();
    interest_offsets.push(maturity);

    let amounts = split_principal(params.total_principal, count);

    let mut rows = Vec::with_capacity(principal_offsets.len() + interest_offsets.len());
    for offset in interest_offsets {
        rows.push(ScheduledInstallment {
            kind: InstallmentKind::Interest,
            due_date: due(offset)?,
            principal: Decimal::ZERO,
            settled: false,
        });
    }
    for (offset, amount) in principal_offsets.into_iter().zip(amounts) {
        rows.push(ScheduledInstallment {
            kind: InstallmentKind::Principal,
            due_date: due(offset)?,
            principal: amount,
            settled: false,
        });
    }

    // interest before principal on the same day
    rows.sort_by(|a, b| {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| b.kind.cmp(&a.kind))
    });

    if let Some(through) = params.settled_through {
        for row in rows.iter_mut().filter(|r| r.due_date <= through) {
            row.settled = true;
        }
    }

    for row in &rows {
        trace!("{} due {} {}", row.kind, row.due_date, row.principal);
    }
    debug!(
        "generated {} rows ({} principal) maturing {}",
        rows.len(),
        count,
        rows.last().map(|r| r.due_date.to_string()).unwrap_or_default()
    );
    Ok(rows)
}

/// Equal shares truncated to cents; the last share takes the remainder, which
/// is therefore never negative.
fn split_principal(total: Decimal, count: u32) -> Vec<Decimal> {
    let n = Decimal::from(count);
    let share = (total / n).round_dp_with_strategy(2, RoundingStrategy::ToZero);
    let mut amounts = vec![share; count as usize];
    let allocated = share * Decimal::from(count - 1);
    if let Some(last) = amounts.last_mut() {
        *last = total - allocated;
    }
    amounts
}
