//! `pubmed mesh`: MeSH descriptor lookup.

use super::literature_client;
use crate::output::{format_mesh, print_json};
use clap::Args;
use pubmed_core::{config::AppConfig, AppResult};
use pubmed_engine::cancel::cancellable;
use tokio_util::sync::CancellationToken;

/// Look up a MeSH descriptor
#[derive(Args, Debug)]
pub struct MeshCommand {
    /// Term to look up, e.g. "Fragile X Syndrome"
    pub term: String,
}

impl MeshCommand {
    pub async fn execute(
        &self,
        config: &AppConfig,
        cancel: &CancellationToken,
        json: bool,
    ) -> AppResult<()> {
        tracing::info!(term = %self.term, "Executing mesh command");

        let literature = literature_client(config)?;
        let record = cancellable(cancel, "mesh", literature.mesh_lookup(&self.term)).await?;

        if json {
            print_json(&record)
        } else {
            print!("{}", format_mesh(&record));
            Ok(())
        }
    }
}
