//! Editable form state: calculation parameters plus the installment list.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::dates::{normalize_br_date, normalize_typed_date};
use super::installment::{CalculationRequest, InstallmentKind};
use super::money::{parse_percent, parse_typed_currency};
use super::validation::{parse_form, ValidationErrors};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FormError {
    #[error("installment {index} does not exist (form has {len})")]
    NoSuchInstallment { index: usize, len: usize },
    #[error("the form must keep at least one installment")]
    LastInstallment,
}

/// Persisted form state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct InstallmentForm {
    /// CDI percentage as a fraction (0.149 = 14.9% of CDI)
    #[schemars(with = "f64")]
    pub cdi_rate: Decimal,
    /// Annual spread as a fraction
    #[schemars(with = "f64")]
    pub annual_spread: Decimal,
    /// Loan start date, dd/mm/yyyy
    pub start_date: String,
    /// Date the balance is evaluated at, dd/mm/yyyy
    pub reference_date: String,
    pub installments: Vec<FormInstallment>,
}

impl Default for InstallmentForm {
    fn default() -> Self {
        Self {
            cdi_rate: dec!(0.149),
            annual_spread: Decimal::ZERO,
            start_date: "01/01/2026".to_string(),
            reference_date: "15/04/2026".to_string(),
            installments: vec![FormInstallment::default()],
        }
    }
}

/// One installment row as edited by the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FormInstallment {
    /// 0 = principal, 1 = interest
    #[serde(default)]
    #[schemars(with = "u8")]
    pub kind: InstallmentKind,
    /// Principal amount as a plain decimal string ("1234.56"), empty when unset
    #[serde(default)]
    pub principal: String,
    /// Due date, dd/mm/yyyy
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub settled: bool,
}

/// Typed edits to an installment row; `None` leaves the field alone
#[derive(Debug, Clone, Default)]
pub struct InstallmentPatch {
    pub due_date: Option<String>,
    pub principal: Option<String>,
    pub settled: Option<bool>,
}

impl InstallmentForm {
    pub fn add_installment(&mut self) -> usize {
        self.installments.push(FormInstallment::default());
        self.installments.len() - 1
    }

    pub fn remove_installment(&mut self, index: usize) -> Result<FormInstallment, FormError> {
        self.check_index(index)?;
        if self.installments.len() == 1 {
            return Err(FormError::LastInstallment);
        }
        Ok(self.installments.remove(index))
    }

    /// Apply typed input to a row. Principal edits are ignored on interest rows.
    pub fn update_installment(
        &mut self,
        index: usize,
        patch: InstallmentPatch,
    ) -> Result<(), FormError> {
        self.check_index(index)?;
        let row = &mut self.installments[index];

        if let Some(due) = patch.due_date {
            row.due_date = mask_date(&due);
        }
        if let Some(principal) = patch.principal {
            if row.kind == InstallmentKind::Interest {
                log::debug!("ignoring principal edit on interest installment {}", index);
            } else {
                row.principal = parse_typed_currency(&principal);
            }
        }
        if let Some(settled) = patch.settled {
            row.settled = settled;
        }
        Ok(())
    }

    /// Change a row's kind; interest rows always carry a zero principal.
    pub fn set_kind(&mut self, index: usize, kind: InstallmentKind) -> Result<(), FormError> {
        self.check_index(index)?;
        let row = &mut self.installments[index];
        row.kind = kind;
        if kind == InstallmentKind::Interest {
            row.principal = "0".to_string();
        }
        Ok(())
    }

    pub fn set_cdi_percent(&mut self, typed: &str) {
        self.cdi_rate = parse_percent(typed);
    }

    pub fn set_spread_percent(&mut self, typed: &str) {
        self.annual_spread = parse_percent(typed);
    }

    pub fn set_start_date(&mut self, typed: &str) {
        self.start_date = mask_date(typed);
    }

    pub fn set_reference_date(&mut self, typed: &str) {
        self.reference_date = mask_date(typed);
    }

    /// Validate and build the request sent to the calculation service.
    pub fn to_request(&self) -> Result<CalculationRequest, ValidationErrors> {
        parse_form(self)
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        if index < self.installments.len() {
            Ok(())
        } else {
            Err(FormError::NoSuchInstallment {
                index,
                len: self.installments.len(),
            })
        }
    }
}

/// Typing mask followed by padding normalization when the date is complete.
fn mask_date(typed: &str) -> String {
    let masked = normalize_typed_date(typed);
    normalize_br_date(&masked).unwrap_or(masked)
}
