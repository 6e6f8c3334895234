//! Table command - render a saved calculation response

use super::{read_response, ViewArgs};
use crate::config::Config;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct TableCommand {
    /// Response file saved with `calculate --save-response`, or "-" for stdin
    #[arg(short, long)]
    response: PathBuf,

    #[command(flatten)]
    view: ViewArgs,
}

impl TableCommand {
    pub fn exec(&self, config: &Config) -> anyhow::Result<()> {
        let response = read_response(&self.response)?;
        self.view.print(&response, config.view.page_size)
    }
}
