//! # pdfq-cli
//!
//! Terminal front end for [`pdfq_rag`]: load a PDF, then type questions and
//! get back the most relevant passage.
//!
//! ```text
//! $ pdfq manual.pdf
//! PDF uploaded successfully! Indexed 42 chunks from 12 pages of 'manual.pdf'.
//! pdfq> how do I reset the device?
//! Top result (page 7, distance 0.4312):
//! Hold the power button for ten seconds...
//! ```

pub mod cli;
pub mod render;
pub mod repl;

pub use cli::Cli;
pub use repl::{Command, Reply, Session};

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. An unparsable filter falls back to `warn`.
pub fn init_logging(filter: &str) {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
