//! Schema command - describe the form file and the CSV result columns

use crate::core::results::csv_columns;
use crate::core::InstallmentForm;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for form files
    JsonSchema,
    /// CSV header row of `calculate --csv`
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(InstallmentForm);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => {
                let names: Vec<&str> = csv_columns().iter().map(|c| c.name).collect();
                println!("{}", names.join(","));
            }
            SchemaFormat::CsvFields => {
                println!("CSV Output Format");
                println!("=================");
                println!();
                for column in csv_columns() {
                    let presence = if column.always_present { "always" } else { "optional" };
                    println!("{:16} ({:8})  {}", column.name, presence, column.description);
                }
                println!();
                println!("Amounts are formatted as BRL; the other stream's amount shows \"-\".");
            }
        }
        Ok(())
    }
}
