//! `pubmed links`: citing, cited and similar articles for one PMID.

use super::literature_client;
use crate::output::{format_links, print_json};
use clap::{Args, ValueEnum};
use pubmed_core::{config::AppConfig, AppResult};
use pubmed_engine::cancel::cancellable;
use pubmed_eutils::LinkKind;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkArg {
    CitedBy,
    References,
    Related,
}

impl From<LinkArg> for LinkKind {
    fn from(arg: LinkArg) -> Self {
        match arg {
            LinkArg::CitedBy => LinkKind::CitedBy,
            LinkArg::References => LinkKind::References,
            LinkArg::Related => LinkKind::Related,
        }
    }
}

/// Follow citation links from one article
#[derive(Args, Debug)]
pub struct LinksCommand {
    /// Source PMID
    pub pmid: String,

    /// Link set to follow
    #[arg(short, long, value_enum, default_value = "cited-by")]
    pub kind: LinkArg,

    /// Show at most this many links
    #[arg(long)]
    pub limit: Option<usize>,
}

impl LinksCommand {
    pub async fn execute(
        &self,
        config: &AppConfig,
        cancel: &CancellationToken,
        json: bool,
    ) -> AppResult<()> {
        let kind = LinkKind::from(self.kind);
        tracing::info!(pmid = %self.pmid, %kind, "Executing links command");

        let literature = literature_client(config)?;
        let mut result = cancellable(cancel, "link", literature.elink(kind, &self.pmid)).await?;
        if let Some(limit) = self.limit {
            result.links.truncate(limit);
        }

        if json {
            print_json(&result)
        } else {
            print!("{}", format_links(&result));
            Ok(())
        }
    }
}
