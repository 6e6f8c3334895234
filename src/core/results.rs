//! Results grid: sorting, filtering by kind and pagination over the
//! installments returned by the calculation service.

use cdic_derive::CsvSchema;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use super::dates::format_br_date;
use super::installment::{InstallmentKind, InstallmentResult};
use super::money::format_brl;
use super::CsvColumn;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const EMPTY_MESSAGE: &str = "Nenhum resultado encontrado.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Kind,
    Settled,
    DueDate,
    Principal,
    Interest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Only(InstallmentKind),
}

impl KindFilter {
    fn matches(self, kind: InstallmentKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Only(wanted) => wanted == kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    pub sort: Option<(SortColumn, SortDirection)>,
    pub filter: KindFilter,
    /// Zero-based page index
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            sort: None,
            filter: KindFilter::All,
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Filtered and sorted rows plus the slice for the requested page
#[derive(Debug, Clone)]
pub struct ResultsView<'a> {
    /// Every row passing the filter, in display order
    pub rows: Vec<&'a InstallmentResult>,
    pub page_index: usize,
    pub page_size: usize,
}

impl<'a> ResultsView<'a> {
    pub fn new(results: &'a [InstallmentResult], options: &ViewOptions) -> Self {
        let mut rows: Vec<_> = results
            .iter()
            .filter(|r| options.filter.matches(r.kind))
            .collect();

        if let Some((column, direction)) = options.sort {
            rows.sort_by(|a, b| {
                let ordering = compare(a, b, column);
                match direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        let page_size = options.page_size.max(1);
        let mut view = Self {
            rows,
            page_index: 0,
            page_size,
        };
        view.page_index = options.page.min(view.page_count().saturating_sub(1));
        if view.page_index != options.page {
            log::debug!(
                "page {} out of range, showing page {}",
                options.page + 1,
                view.page_index + 1
            );
        }
        view
    }

    /// Number of pages, at least one even when empty
    pub fn page_count(&self) -> usize {
        self.rows.len().div_ceil(self.page_size).max(1)
    }

    pub fn page_rows(&self) -> &[&'a InstallmentResult] {
        let start = (self.page_index * self.page_size).min(self.rows.len());
        let end = (start + self.page_size).min(self.rows.len());
        &self.rows[start..end]
    }

    pub fn can_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn can_next(&self) -> bool {
        self.page_index + 1 < self.page_count()
    }

    pub fn total_principal(&self) -> Decimal {
        self.rows.iter().map(|r| r.principal).sum()
    }

    pub fn total_interest(&self) -> Decimal {
        self.rows.iter().map(|r| r.interest).sum()
    }

    /// Page flags for the neighbouring pages, `None` when there is only one page
    pub fn navigation(&self) -> Option<String> {
        let mut links = Vec::new();
        if self.can_previous() {
            links.push(format!("« anterior: --page {}", self.page_index));
        }
        if self.can_next() {
            links.push(format!("próxima: --page {} »", self.page_index + 2));
        }
        (!links.is_empty()).then(|| links.join(" | "))
    }

    pub fn footer(&self) -> String {
        format!("Página {} de {}", self.page_index + 1, self.page_count())
    }

    /// Render the current page as a table followed by totals and the page footer.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.rows.is_empty() {
            out.push_str(EMPTY_MESSAGE);
        } else {
            let rows: Vec<ResultRow> = self.page_rows().iter().map(|r| ResultRow::from(*r)).collect();
            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Columns::new(3..)).with(Alignment::right()))
                .to_string();
            out.push_str(&table);
            out.push('\n');
            out.push_str(&format!(
                "Total principal: {} | Total juros: {}",
                format_brl(self.total_principal()),
                format_brl(self.total_interest())
            ));
        }
        out.push('\n');
        out.push_str(&self.footer());
        out
    }
}

fn compare(a: &InstallmentResult, b: &InstallmentResult, column: SortColumn) -> Ordering {
    match column {
        SortColumn::Kind => a.kind.cmp(&b.kind),
        SortColumn::Settled => a.settled.cmp(&b.settled),
        SortColumn::DueDate => a.due_date.cmp(&b.due_date),
        SortColumn::Principal => a.principal.cmp(&b.principal),
        SortColumn::Interest => a.interest.cmp(&b.interest),
    }
}

/// Display row, shared by the table and CSV output
#[derive(Debug, Clone, PartialEq, Eq, Tabled, Serialize, CsvSchema)]
pub struct ResultRow {
    /// Principal or Juros
    #[tabled(rename = "Tipo")]
    #[serde(rename = "tipo")]
    pub kind: String,

    /// Sim when the installment is settled
    #[tabled(rename = "Liquidada")]
    #[serde(rename = "liquidada")]
    pub settled: String,

    /// Due date, dd/mm/yyyy
    #[tabled(rename = "Vencimento")]
    #[serde(rename = "vencimento")]
    pub due_date: String,

    /// Principal in BRL, "-" on interest rows
    #[tabled(rename = "Valor Principal")]
    #[serde(rename = "valor_principal")]
    pub principal: String,

    /// Interest in BRL, "-" on principal rows
    #[tabled(rename = "Valor Juros")]
    #[serde(rename = "valor_juros")]
    pub interest: String,
}

impl From<&InstallmentResult> for ResultRow {
    fn from(result: &InstallmentResult) -> Self {
        let dash = || "-".to_string();
        ResultRow {
            kind: result.kind.label().to_string(),
            settled: if result.settled { "Sim" } else { "Não" }.to_string(),
            due_date: format_br_date(result.due_date),
            principal: match result.kind {
                InstallmentKind::Interest => dash(),
                InstallmentKind::Principal => format_brl(result.principal),
            },
            interest: match result.kind {
                InstallmentKind::Principal => dash(),
                InstallmentKind::Interest => format_brl(result.interest),
            },
        }
    }
}

/// Columns written by the CSV output
pub fn csv_columns() -> &'static [CsvColumn] {
    ResultRow::csv_columns()
}
