//! Form command - create and edit form files

use super::{read_form, typed_amount, write_form, KindArg};
use crate::core::money::{format_brl, format_percent, parse_amount};
use crate::core::{InstallmentForm, InstallmentKind, InstallmentPatch};
use clap::{Args, Subcommand};
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct FormCommand {
    #[command(subcommand)]
    action: FormAction,
}

#[derive(Subcommand, Debug)]
enum FormAction {
    /// Write a form with default parameters and one empty installment
    Init {
        /// Output file ("-" for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },
    /// Print the form parameters and installments
    Show {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Append an installment
    Add {
        #[arg(short, long)]
        file: PathBuf,
        #[command(flatten)]
        edit: RowEdit,
    },
    /// Remove an installment (1-based index)
    Remove {
        #[arg(short, long)]
        file: PathBuf,
        index: usize,
    },
    /// Edit an installment (1-based index)
    Set {
        #[arg(short, long)]
        file: PathBuf,
        index: usize,
        #[command(flatten)]
        edit: RowEdit,
    },
    /// Edit the calculation parameters
    Params {
        #[arg(short, long)]
        file: PathBuf,
        /// CDI percentage, e.g. 110 or "14,9"
        #[arg(long)]
        cdi: Option<String>,
        /// Annual spread percentage
        #[arg(long)]
        spread: Option<String>,
        /// Start date, dd/mm/yyyy
        #[arg(long)]
        start: Option<String>,
        /// Reference date, dd/mm/yyyy
        #[arg(long)]
        reference: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RowEdit {
    /// Due date, dd/mm/yyyy (digits only also accepted)
    #[arg(short, long)]
    due: Option<String>,
    /// Principal amount in reais, e.g. 1500.00 or "R$ 1.500,00" (a bare "1.500" is rejected)
    #[arg(short, long)]
    amount: Option<String>,
    #[arg(short, long, value_enum)]
    kind: Option<KindArg>,
    /// Mark as settled (true/false)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    settled: Option<bool>,
}

impl RowEdit {
    fn apply(&self, form: &mut InstallmentForm, index: usize) -> anyhow::Result<()> {
        if let Some(kind) = self.kind {
            form.set_kind(index, kind.into())?;
        }
        let principal = self.amount.as_deref().map(typed_amount).transpose()?;
        form.update_installment(
            index,
            InstallmentPatch {
                due_date: self.due.clone(),
                principal,
                settled: self.settled,
            },
        )?;
        Ok(())
    }
}

impl FormCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match &self.action {
            FormAction::Init { output } => {
                write_form(&InstallmentForm::default(), output)?;
                if output.as_os_str() != "-" {
                    println!("Created {}", output.display());
                }
            }
            FormAction::Show { file } => {
                let form = read_form(file)?;
                print_form(&form);
            }
            FormAction::Add { file, edit } => {
                let mut form = read_form(file)?;
                let index = form.add_installment();
                edit.apply(&mut form, index)?;
                write_form(&form, file)?;
                println!("Added installment {}", index + 1);
            }
            FormAction::Remove { file, index } => {
                let mut form = read_form(file)?;
                form.remove_installment(zero_based(*index)?)?;
                write_form(&form, file)?;
                println!("Removed installment {}", index);
            }
            FormAction::Set { file, index, edit } => {
                let mut form = read_form(file)?;
                edit.apply(&mut form, zero_based(*index)?)?;
                write_form(&form, file)?;
            }
            FormAction::Params {
                file,
                cdi,
                spread,
                start,
                reference,
            } => {
                let mut form = read_form(file)?;
                if let Some(cdi) = cdi {
                    form.set_cdi_percent(cdi);
                }
                if let Some(spread) = spread {
                    form.set_spread_percent(spread);
                }
                if let Some(start) = start {
                    form.set_start_date(start);
                }
                if let Some(reference) = reference {
                    form.set_reference_date(reference);
                }
                write_form(&form, file)?;
            }
        }
        Ok(())
    }
}

fn zero_based(index: usize) -> anyhow::Result<usize> {
    index
        .checked_sub(1)
        .ok_or_else(|| anyhow::anyhow!("installment indexes start at 1"))
}

#[derive(Tabled)]
struct FormRow {
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

fn print_form(form: &InstallmentForm) {
    println!("Percentual CDI:  {}%", format_percent(form.cdi_rate));
    println!("Spread anual:    {}%", format_percent(form.annual_spread));
    println!("Data inicial:    {}", form.start_date);
    println!("Data referência: {}", form.reference_date);
    println!();

    let rows: Vec<FormRow> = form
        .installments
        .iter()
        .enumerate()
        .map(|(i, row)| FormRow {
            index: i + 1,
            kind: row.kind.label(),
            due_date: row.due_date.clone(),
            principal: match (row.kind, parse_amount(&row.principal)) {
                (InstallmentKind::Interest, _) => "-".to_string(),
                (_, Some(amount)) => format_brl(amount),
                (_, None) => String::new(),
            },
            settled: if row.settled { "Sim" } else { "Não" },
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..4)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}
