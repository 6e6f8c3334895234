pub mod dates;
pub mod form;
pub mod installment;
pub mod money;
pub mod results;
pub mod schedule;
pub mod validation;

// Flat public surface for domain types and functions.
pub use form::{FormInstallment, InstallmentForm, InstallmentPatch};
pub use installment::{CalculationRequest, CalculationResponse, InstallmentKind};
pub use results::{ResultRow, ResultsView};
pub use schedule::{generate as generate_schedule, ScheduleParams};
pub use validation::{validate, ValidationErrors};

/// Description of one CSV output column, produced by `#[derive(CsvSchema)]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvColumn {
    pub name: &'static str,
    pub always_present: bool,
    pub description: &'static str,
}
