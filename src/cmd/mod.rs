pub mod calculate;
pub mod form;
pub mod schedule;
pub mod schema;
pub mod table;
pub mod validate;

use crate::core::results::{self, KindFilter, SortColumn, SortDirection, ViewOptions};
use crate::core::{CalculationResponse, InstallmentForm, InstallmentKind, ResultRow, ResultsView};
use anyhow::Context;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Read a form file (JSON), or stdin with "-"
pub fn read_form(path: &Path) -> anyhow::Result<InstallmentForm> {
    let form = if path.as_os_str() == "-" {
        serde_json::from_slice(&read_stdin()?)?
    } else {
        let file = File::open(path)
            .with_context(|| format!("failed to open form file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("invalid form file {}", path.display()))?
    };
    Ok(form)
}

/// Write a form file as pretty JSON, or to stdout with "-"
pub fn write_form(form: &InstallmentForm, path: &Path) -> anyhow::Result<()> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        serde_json::to_writer_pretty(&mut out, form)?;
        writeln!(out)?;
        return Ok(());
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create form file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, form)?;
    writeln!(writer)?;
    writer.flush()?;
    log::debug!("wrote {} installments to {}", form.installments.len(), path.display());
    Ok(())
}

/// Read a saved calculation response, or stdin with "-"
pub fn read_response(path: &Path) -> anyhow::Result<CalculationResponse> {
    let response = if path.as_os_str() == "-" {
        serde_json::from_slice(&read_stdin()?)?
    } else {
        let file = File::open(path)
            .with_context(|| format!("failed to open response file {}", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("invalid response file {}", path.display()))?
    };
    Ok(response)
}

fn read_stdin() -> anyhow::Result<Vec<u8>> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }
    Ok(buffer)
}

/// Amount as typed on the command line. pt-BR input ("R$ 1.500,00") goes
/// through the cents mask; plain decimals ("1500", "1500.5") are taken as reais.
///
/// A dot followed by exactly three digits ("1.500") is rejected, since it reads
/// as a pt-BR thousands separator.
pub fn typed_amount(input: &str) -> anyhow::Result<String> {
    if input.contains(',') || input.contains("R$") {
        return Ok(input.to_string());
    }
    let trimmed = input.trim();
    let looks_grouped = match trimmed.split('.').collect::<Vec<_>>().as_slice() {
        [_] => false,
        [_, fraction] => fraction.len() == 3 && fraction.bytes().all(|b| b.is_ascii_digit()),
        _ => true,
    };
    if looks_grouped {
        anyhow::bail!(
            "ambiguous amount '{}': write reais as 1500.00 or \"R$ 1.500,00\"",
            input
        );
    }
    let amount = crate::core::money::parse_amount(input)
        .with_context(|| format!("invalid amount '{}'", input))?;
    if amount < Decimal::ZERO {
        anyhow::bail!("amount must not be negative: {}", input);
    }
    Ok(format!("{:.2}", amount))
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Principal,
    Interest,
}

impl From<KindArg> for InstallmentKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Principal => InstallmentKind::Principal,
            KindArg::Interest => InstallmentKind::Interest,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Kind,
    Settled,
    Due,
    Principal,
    Interest,
}

impl From<SortArg> for SortColumn {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Kind => SortColumn::Kind,
            SortArg::Settled => SortColumn::Settled,
            SortArg::Due => SortColumn::DueDate,
            SortArg::Principal => SortColumn::Principal,
            SortArg::Interest => SortColumn::Interest,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum FilterArg {
    #[default]
    All,
    Principal,
    Interest,
}

impl From<FilterArg> for KindFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => KindFilter::All,
            FilterArg::Principal => KindFilter::Only(InstallmentKind::Principal),
            FilterArg::Interest => KindFilter::Only(InstallmentKind::Interest),
        }
    }
}

/// Sorting, filtering, paging and output format for result rows
#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Column to sort by; results keep service order when omitted
    #[arg(short, long, value_enum)]
    sort: Option<SortArg>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Show only one kind of installment
    #[arg(short, long, value_enum, default_value_t = FilterArg::All)]
    kind: FilterArg,

    /// Page to show (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,

    /// Rows per page (defaults to the configured page size)
    #[arg(long)]
    page_size: Option<usize>,

    /// Output every filtered row as JSON
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output every filtered row as CSV
    #[arg(long)]
    csv: bool,
}

impl ViewArgs {
    pub fn options(&self, default_page_size: usize) -> anyhow::Result<ViewOptions> {
        let page_size = self.page_size.unwrap_or(default_page_size);
        if page_size == 0 {
            anyhow::bail!("page size must be at least 1");
        }
        let direction = if self.desc {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        Ok(ViewOptions {
            sort: self.sort.map(|column| (column.into(), direction)),
            filter: self.kind.into(),
            page: self.page.saturating_sub(1),
            page_size,
        })
    }

    /// Print the response in the selected format.
    pub fn print(&self, response: &CalculationResponse, default_page_size: usize) -> anyhow::Result<()> {
        let options = self.options(default_page_size)?;
        let view = ResultsView::new(&response.installments, &options);
        let rows: Vec<ResultRow> = view.rows.iter().map(|r| ResultRow::from(*r)).collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        } else if self.csv {
            write_csv(&rows, io::stdout())?;
        } else {
            println!("{}", view.render());
            if let Some(links) = view.navigation() {
                println!("{}", links);
            }
        }
        Ok(())
    }
}

fn write_csv<W: Write>(rows: &[ResultRow], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        let header: Vec<&str> = results::csv_columns().iter().map(|c| c.name).collect();
        wtr.write_record(header)?;
    }
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_amounts() {
        assert_eq!(typed_amount("1500").unwrap(), "1500.00");
        assert_eq!(typed_amount("1500.5").unwrap(), "1500.50");
        assert_eq!(typed_amount("R$ 1.500,00").unwrap(), "R$ 1.500,00");
        assert!(typed_amount("abc").is_err());
        assert!(typed_amount("-3").is_err());
    }

    #[test]
    fn thousands_dot_without_comma_is_rejected() {
        assert!(typed_amount("1.500").is_err());
        assert!(typed_amount("1.234.567").is_err());
        assert_eq!(typed_amount("1.50").unwrap(), "1.50");
        assert_eq!(typed_amount("1.5").unwrap(), "1.50");
        assert_eq!(typed_amount("1.500,00").unwrap(), "1.500,00");
    }

    #[test]
    fn csv_output_keeps_header_when_empty() {
        let mut buf = Vec::new();
        write_csv(&[], &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "tipo,liquidada,vencimento,valor_principal,valor_juros\n"
        );
    }

    #[test]
    fn csv_output_uses_display_cells() {
        let rows = vec![ResultRow {
            kind: "Juros".to_string(),
            settled: "Não".to_string(),
            due_date: "01/02/2026".to_string(),
            principal: "-".to_string(),
            interest: "R$ 12,50".to_string(),
        }];
        let mut buf = Vec::new();
        write_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("tipo,liquidada,vencimento,valor_principal,valor_juros\n"));
        assert!(text.contains("Juros,Não,01/02/2026,-,\"R$ 12,50\""));
    }
}
