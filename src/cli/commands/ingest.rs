//! One-shot ingestion from the command line.

use std::sync::Arc;

use crate::clients::TicketmasterClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{IngestOutcome, IngestService, Pass, Reconciler};

pub async fn cmd_ingest(config: &Config, pass: Pass) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let client = TicketmasterClient::new(config.ticketmaster.clone())?;
    let service = IngestService::new(
        Arc::new(client),
        Reconciler::new(store, config.ticketmaster.default_thumbnail.clone()),
        config.ticketmaster.clone(),
    );

    println!("Importing {pass} from Ticketmaster...");

    match service.run(pass).await {
        IngestOutcome::Ok(summary) => {
            println!("✓ {summary}");
            Ok(())
        }
        failed => anyhow::bail!("{}", failed.message()),
    }
}
