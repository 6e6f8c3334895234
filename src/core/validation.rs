//! Client-side validation of the installment form.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use super::dates::parse_br_date;
use super::form::InstallmentForm;
use super::installment::{CalculationRequest, Installment};
use super::money::parse_amount;

pub const FIELD_CDI: &str = "percentualCdi";
pub const FIELD_SPREAD: &str = "spreadAnual";
pub const FIELD_START_DATE: &str = "dataInicial";
pub const FIELD_REFERENCE_DATE: &str = "dataReferencia";
pub const FIELD_INSTALLMENTS: &str = "parcelas";

pub fn due_date_field(index: usize) -> String {
    format!("parcela_{}_vencimento", index)
}

pub fn amount_field(index: usize) -> String {
    format!("parcela_{}_valor", index)
}

/// A single field error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Field errors in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {}: {}", error.field, error.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Check every field of the form, collecting all errors.
pub fn validate(form: &InstallmentForm) -> Result<(), ValidationErrors> {
    parse_form(form).map(|_| ())
}

/// Validate the form and build the calculation request from the values parsed
/// while checking it.
pub fn parse_form(form: &InstallmentForm) -> Result<CalculationRequest, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if form.cdi_rate < Decimal::ZERO {
        errors.push(FIELD_CDI, "Percentual CDI deve ser um número >= 0");
    }
    if form.annual_spread < Decimal::ZERO {
        errors.push(FIELD_SPREAD, "Spread anual deve ser um número >= 0");
    }

    let start_date = check_date(
        &mut errors,
        FIELD_START_DATE,
        &form.start_date,
        "Data inicial é obrigatória",
        "Data inicial deve estar em dd/mm/aaaa",
    );
    let reference_date = check_date(
        &mut errors,
        FIELD_REFERENCE_DATE,
        &form.reference_date,
        "Data de referência é obrigatória",
        "Data de referência deve estar em dd/mm/aaaa",
    );

    if form.installments.is_empty() {
        errors.push(FIELD_INSTALLMENTS, "Adicione pelo menos uma parcela");
    }

    let mut installments = Vec::with_capacity(form.installments.len());
    for (index, row) in form.installments.iter().enumerate() {
        let due_date = check_date(
            &mut errors,
            due_date_field(index),
            &row.due_date,
            "Vencimento é obrigatório",
            "Vencimento deve estar em dd/mm/aaaa",
        );
        let principal = match parse_amount(&row.principal) {
            Some(amount) if amount >= Decimal::ZERO => Some(amount),
            _ => {
                errors.push(amount_field(index), "Valor deve ser um número >= 0");
                None
            }
        };
        if let (Some(due_date), Some(principal)) = (due_date, principal) {
            installments.push(Installment {
                kind: row.kind,
                principal,
                due_date,
                settled: row.settled,
            });
        }
    }

    match (start_date, reference_date) {
        (Some(start_date), Some(reference_date)) if errors.is_empty() => Ok(CalculationRequest {
            cdi_rate: form.cdi_rate,
            annual_spread: form.annual_spread,
            start_date,
            reference_date,
            installments,
        }),
        _ => {
            log::debug!("form has {} validation error(s)", errors.len());
            Err(errors)
        }
    }
}

/// Parsed date, or `None` after recording why it is missing or malformed.
fn check_date(
    errors: &mut ValidationErrors,
    field: impl Into<String>,
    value: &str,
    missing: &str,
    malformed: &str,
) -> Option<NaiveDate> {
    if value.is_empty() {
        errors.push(field, missing);
        return None;
    }
    let parsed = parse_br_date(value);
    if parsed.is_none() {
        errors.push(field, malformed);
    }
    parsed
}
