//! Schedule command - generate installment rows from recurrence parameters

use super::{typed_amount, write_form};
use crate::core::dates::{format_br_date, parse_br_date};
use crate::core::money::{format_brl, parse_amount, parse_percent, parse_typed_currency};
use crate::core::{generate_schedule, FormInstallment, InstallmentForm, ScheduleParams};
use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ScheduleCommand {
    /// Loan start date, dd/mm/yyyy
    #[arg(long)]
    start: String,

    /// Total principal in reais, e.g. 12000 or "R$ 12.000,00" (a bare "12.000" is rejected)
    #[arg(short, long)]
    amount: String,

    /// Number of principal installments
    #[arg(short = 'n', long)]
    count: u32,

    /// Months between principal installments
    #[arg(long, default_value_t = 1)]
    principal_interval: u32,

    /// Months before the first principal period
    #[arg(long, default_value_t = 0)]
    principal_grace: u32,

    /// Months between interest installments
    #[arg(long, default_value_t = 1)]
    interest_interval: u32,

    /// Months before the first interest period
    #[arg(long, default_value_t = 0)]
    interest_grace: u32,

    /// Day of month installments fall due (defaults to the start day)
    #[arg(long)]
    due_day: Option<u32>,

    /// Mark installments due on or before this date (dd/mm/yyyy) as settled
    #[arg(long)]
    settled_through: Option<String>,

    /// Write a form file instead of printing the schedule ("-" for stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// CDI percentage for the written form
    #[arg(long)]
    cdi: Option<String>,

    /// Annual spread percentage for the written form
    #[arg(long)]
    spread: Option<String>,

    /// Reference date for the written form, dd/mm/yyyy
    #[arg(long)]
    reference: Option<String>,
}

#[derive(Tabled)]
struct ScheduleRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Tipo")]
    kind: &'static str,
    #[tabled(rename = "Vencimento")]
    due_date: String,
    #[tabled(rename = "Valor Principal")]
    principal: String,
    #[tabled(rename = "Liquidada")]
    settled: &'static str,
}

impl ScheduleCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let params = self.params()?;
        let schedule = generate_schedule(&params)?;
        log::info!("generated {} installments", schedule.len());

        match &self.output {
            Some(path) => {
                let mut form = InstallmentForm {
                    start_date: format_br_date(params.start_date),
                    installments: schedule.iter().map(FormInstallment::from).collect(),
                    ..InstallmentForm::default()
                };
                if let Some(cdi) = &self.cdi {
                    form.cdi_rate = parse_percent(cdi);
                }
                if let Some(spread) = &self.spread {
                    form.annual_spread = parse_percent(spread);
                }
                if let Some(reference) = &self.reference {
                    form.reference_date = format_br_date(parse_date(reference, "reference")?);
                }
                write_form(&form, path)?;
            }
            None => {
                let rows: Vec<ScheduleRow> = schedule
                    .iter()
                    .enumerate()
                    .map(|(i, row)| ScheduleRow {
                        index: i + 1,
                        kind: row.kind.label(),
                        due_date: format_br_date(row.due_date),
                        principal: format_brl(row.principal),
                        settled: if row.settled { "Sim" } else { "Não" },
                    })
                    .collect();
                let table = Table::new(rows)
                    .with(Style::rounded())
                    .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
                    .to_string();
                println!("{}", table);
            }
        }
        Ok(())
    }

    fn params(&self) -> anyhow::Result<ScheduleParams> {
        let start_date = parse_date(&self.start, "start")?;
        let total_principal = parse_amount(&parse_typed_currency(&typed_amount(&self.amount)?))
            .with_context(|| format!("invalid amount '{}'", self.amount))?;
        let settled_through = self
            .settled_through
            .as_deref()
            .map(|d| parse_date(d, "settled-through"))
            .transpose()?;

        Ok(ScheduleParams {
            principal_interval: self.principal_interval,
            principal_grace: self.principal_grace,
            interest_interval: self.interest_interval,
            interest_grace: self.interest_grace,
            due_day: self.due_day,
            settled_through,
            ..ScheduleParams::monthly(start_date, total_principal, self.count)
        })
    }
}

fn parse_date(input: &str, name: &str) -> anyhow::Result<NaiveDate> {
    parse_br_date(input)
        .with_context(|| format!("invalid {} date '{}', expected dd/mm/yyyy", name, input))
}
