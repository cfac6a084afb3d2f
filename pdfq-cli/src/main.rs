use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use pdfq_cli::repl::{self, print_reply};
use pdfq_cli::{Cli, Command, Reply, Session, init_logging};
use pdfq_rag::RagPipeline;
use pdfq_rag::gemini::GeminiEmbeddingProvider;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the key may come from the environment or --api-key.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let embedder = GeminiEmbeddingProvider::new(cli.gemini_config());
    let pipeline = RagPipeline::builder()
        .config(cli.rag_config()?)
        .embedding_provider(Arc::new(embedder))
        .build()?;
    let mut session = Session::new(pipeline);

    if let Some(path) = cli.pdf.clone() {
        let reply = session.handle(Command::Load(path)).await;
        let failed = matches!(reply, Reply::Failure(_));
        print_reply(&reply);
        if failed && cli.query.is_some() {
            bail!("could not load the PDF");
        }
    }

    if let Some(query) = cli.query {
        let reply = session.handle(Command::Query(query)).await;
        print_reply(&reply);
        if matches!(reply, Reply::Failure(_)) {
            bail!("query failed");
        }
        return Ok(());
    }

    repl::run(&mut session).await
}
