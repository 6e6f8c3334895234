//! Calculate command - send a form to the calculation service and show the results

use super::{read_form, ViewArgs};
use crate::api::{CalculationBackend, HttpBackend};
use crate::config::Config;
use crate::core::CalculationResponse;
use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// Form file (JSON), or "-" for stdin
    #[arg(short, long)]
    file: PathBuf,

    /// Calculation service base URL (overrides config and environment)
    #[arg(long)]
    api_url: Option<String>,

    /// Also write the raw service response to this file
    #[arg(long)]
    save_response: Option<PathBuf>,

    #[command(flatten)]
    view: ViewArgs,
}

impl CalculateCommand {
    pub fn exec(&self, config: &Config) -> anyhow::Result<()> {
        let mut api = config.api.clone();
        if let Some(url) = &self.api_url {
            api.base_url = url.clone();
        }
        api.base_url()?;
        let backend = HttpBackend::new(&api)?;
        log::debug!("calculation endpoint {}", backend.endpoint());
        self.run(&backend, config.view.page_size)
    }

    fn run<B: CalculationBackend>(&self, backend: &B, page_size: usize) -> anyhow::Result<()> {
        let form = read_form(&self.file)?;
        let request = form.to_request()?;
        let response = backend.calculate(&request)?;

        if let Some(path) = &self.save_response {
            save_response(&response, path)?;
        }
        self.view.print(&response, page_size)
    }
}

fn save_response(response: &CalculationResponse, path: &Path) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create response file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, response)?;
    writer.flush()?;
    log::info!("saved response to {}", path.display());
    Ok(())
}
