//! PDF text extraction using the `pdf-extract` crate.

use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Once;

use tracing::{debug, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

/// Extracts text from PDF bytes, one [`Document`] per page.
///
/// Page documents are identified as `{source_name}_p{page}` (pages are
/// 1-based) and carry `source` and `page` metadata, which every chunk cut
/// from them inherits. Pages whose text is only whitespace are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract the pages of an in-memory PDF.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ExtractionError`] if the bytes are not a readable
    /// PDF. The underlying parser is known to panic on some malformed files;
    /// such panics are reported as extraction errors as well.
    pub fn extract(&self, bytes: &[u8], source_name: &str) -> Result<Vec<Document>> {
        let extraction_error = |message: String| RagError::ExtractionError {
            source_name: source_name.to_string(),
            message,
        };

        if bytes.is_empty() {
            return Err(extraction_error("file is empty".to_string()));
        }

        let pages = catch_parser_panic(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
            .map_err(|payload| {
                extraction_error(format!(
                    "PDF parser failed on malformed input: {}",
                    panic_message(payload.as_ref())
                ))
            })?
            .map_err(|e| extraction_error(e.to_string()))?;

        let page_count = pages.len();
        let documents: Vec<Document> = pages
            .into_iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(i, text)| {
                let page = i + 1;
                let metadata = HashMap::from([
                    ("source".to_string(), source_name.to_string()),
                    ("page".to_string(), page.to_string()),
                ]);
                Document {
                    id: format!("{source_name}_p{page}"),
                    text,
                    metadata,
                    source_uri: None,
                }
            })
            .collect();

        if documents.is_empty() {
            warn!(source = source_name, page_count, "PDF contains no extractable text");
        } else {
            debug!(source = source_name, page_count, text_pages = documents.len(), "extracted PDF");
        }

        Ok(documents)
    }

    /// Read a PDF from disk and extract its pages.
    ///
    /// The file name (without directories) is used as the source name and the
    /// full path is recorded as each document's `source_uri`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] if the file cannot be read, otherwise as
    /// [`extract`](PdfExtractor::extract).
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Vec<Document>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let mut documents = self.extract(&bytes, &source_name_for(path))?;
        let uri = path.display().to_string();
        for document in &mut documents {
            document.source_uri = Some(uri.clone());
        }
        Ok(documents)
    }
}

thread_local! {
    static QUIET_PANICS: Cell<bool> = const { Cell::new(false) };
}

/// Run `f`, turning a panic into `Err` without the panic hook printing it.
///
/// The hook installed here defers to the previous one except on a thread
/// that is inside this function.
fn catch_parser_panic<T>(f: impl FnOnce() -> T) -> std::thread::Result<T> {
    static INSTALL_HOOK: Once = Once::new();
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if !QUIET_PANICS.with(Cell::get) {
                previous(info);
            }
        }));
    });

    QUIET_PANICS.with(|quiet| quiet.set(true));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    QUIET_PANICS.with(|quiet| quiet.set(false));
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

/// The file name of `path`, or the whole path if it has none.
pub(crate) fn source_name_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
