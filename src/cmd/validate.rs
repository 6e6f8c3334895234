//! Validate command - check a form file before sending it to the service

use super::read_form;
use crate::core::validate;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Form file (JSON), or "-" for stdin
    #[arg(short, long)]
    file: PathBuf,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    valid: bool,
    error_count: usize,
    errors: &'a crate::core::ValidationErrors,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let form = read_form(&self.file)?;
        let errors = match validate(&form) {
            Ok(()) => Default::default(),
            Err(errors) => errors,
        };

        if self.json {
            let output = ValidationOutput {
                valid: errors.is_empty(),
                error_count: errors.len(),
                errors: &errors,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else if errors.is_empty() {
            println!("\u{2713} Form is valid ({} installments).", form.installments.len());
        } else {
            println!("\u{26A0} {} error(s) found:", errors.len());
            println!();
            for (i, error) in errors.iter().enumerate() {
                println!("  {}. [{}] {}", i + 1, error.field, error.message);
            }
        }

        // Exit with code 1 if the form has errors
        if !errors.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }
}
