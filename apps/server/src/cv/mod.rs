//! CV document store: load-once text extraction with backend fallback.
//!
//! The store is constructed once at startup and shared through `AppState`.
//! Text is extracted at most once per process lifetime; every later call
//! reuses the cached document, whatever path it carries.

pub mod discovery;
pub mod extract;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::errors::AppError;
use extract::PdfTextExtractor;

/// The loaded CV: extracted text plus bookkeeping about its source.
#[derive(Debug, Clone)]
pub struct CvDocument {
    pub text: String,
    pub metadata: CvMetadata,
}

#[derive(Debug, Clone)]
pub struct CvMetadata {
    pub file_path: PathBuf,
    pub file_name: String,
    pub content_length: usize,
    pub loaded_at: DateTime<Utc>,
}

/// Process-wide CV store.
///
/// A failed load leaves the cell empty, so a corrected path on a later call
/// still works. Concurrent first calls extract at most once.
pub struct CvStore {
    cell: OnceCell<Arc<CvDocument>>,
    extractors: Vec<Box<dyn PdfTextExtractor>>,
    docs_dir: Option<PathBuf>,
}

impl CvStore {
    pub fn new(extractors: Vec<Box<dyn PdfTextExtractor>>, docs_dir: Option<PathBuf>) -> Self {
        Self {
            cell: OnceCell::new(),
            extractors,
            docs_dir,
        }
    }

    /// Store with the production extraction backends.
    pub fn with_default_backends(docs_dir: Option<PathBuf>) -> Self {
        Self::new(extract::extraction_chain(), docs_dir)
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// The cached document, if any.
    pub fn loaded(&self) -> Option<Arc<CvDocument>> {
        self.cell.get().cloned()
    }

    /// Returns the cached document, loading it first if necessary.
    ///
    /// Resolution order: cached text (any supplied path is ignored, with a
    /// warning when it differs from the loaded one), then the supplied path,
    /// then docs-dir discovery. With none of those, the caller simply has
    /// not provided a document yet.
    pub async fn ensure_loaded(
        &self,
        path_hint: Option<&str>,
    ) -> Result<Arc<CvDocument>, AppError> {
        if let Some(document) = self.cell.get() {
            if let Some(hint) = path_hint {
                if Path::new(hint) != document.metadata.file_path {
                    warn!(
                        "CV already loaded from {}; ignoring cv_path {hint}",
                        document.metadata.file_path.display()
                    );
                }
            }
            return Ok(document.clone());
        }

        let path: PathBuf = match path_hint {
            Some(hint) if !hint.trim().is_empty() => PathBuf::from(hint),
            _ => match self.docs_dir.as_deref().and_then(discovery::find_cv_in_dir) {
                Some(found) => found,
                None => return Err(AppError::CvNotLoaded),
            },
        };

        let document = self
            .cell
            .get_or_try_init(|| async { self.load(&path) })
            .await?;
        Ok(document.clone())
    }

    /// Extraction without cache interaction. Callers go through
    /// [`CvStore::ensure_loaded`].
    fn load(&self, path: &Path) -> Result<Arc<CvDocument>, AppError> {
        if !path.exists() {
            return Err(AppError::CvNotFound(path.display().to_string()));
        }

        let mut failures: Vec<String> = Vec::new();
        for backend in &self.extractors {
            match backend.extract(path) {
                Ok(text) => {
                    let metadata = CvMetadata {
                        file_path: path.to_path_buf(),
                        file_name: path
                            .file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                            .unwrap_or_default(),
                        content_length: text.chars().count(),
                        loaded_at: Utc::now(),
                    };
                    info!(
                        "CV loaded via {}: {} ({} chars)",
                        backend.name(),
                        metadata.file_path.display(),
                        metadata.content_length
                    );
                    return Ok(Arc::new(CvDocument { text, metadata }));
                }
                Err(error) => {
                    warn!("{} failed on {}: {error:#}", backend.name(), path.display());
                    failures.push(format!("{}: {error:#}", backend.name()));
                }
            }
        }

        Err(AppError::CvUnreadable(failures.join("; ")))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Extractor returning fixed text, counting invocations.
    struct CountingExtractor {
        text: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl PdfTextExtractor for CountingExtractor {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn extract(&self, _path: &Path) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.text.to_string())
        }
    }

    /// Extractor that always fails, counting invocations.
    struct FailingExtractor {
        calls: Arc<AtomicUsize>,
    }

    impl PdfTextExtractor for FailingExtractor {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract(&self, _path: &Path) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            anyhow::bail!("synthetic extraction failure")
        }
    }

    fn touch_pdf(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, b"%PDF-1.5 stub").unwrap();
        path
    }

    fn counting_store(text: &'static str) -> (CvStore, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let store = CvStore::new(
            vec![Box::new(CountingExtractor {
                text,
                calls: calls.clone(),
            })],
            None,
        );
        (store, calls)
    }

    #[tokio::test]
    async fn test_load_extracts_once_then_reuses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_pdf(&dir, "cv.pdf");
        let (store, calls) = counting_store("Name: Alice");

        let first = store
            .ensure_loaded(Some(path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(first.text, "Name: Alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = store.ensure_loaded(None).await.unwrap();
        assert_eq!(second.text, "Name: Alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_differing_path_after_load_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_pdf(&dir, "cv.pdf");
        let (store, calls) = counting_store("original text");

        store
            .ensure_loaded(Some(path.to_str().unwrap()))
            .await
            .unwrap();

        let reloaded = store
            .ensure_loaded(Some("/some/other/file.pdf"))
            .await
            .unwrap();
        assert_eq!(reloaded.text, "original text");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_path_no_cache_is_usage_error() {
        let (store, calls) = counting_store("unused");

        let error = store.ensure_loaded(None).await.unwrap_err();
        assert!(matches!(error, AppError::CvNotLoaded));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (store, calls) = counting_store("unused");

        let error = store
            .ensure_loaded(Some("/nonexistent/cv.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::CvNotFound(_)));
        assert!(error.to_string().contains("/nonexistent/cv.pdf"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_runs_secondary_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_pdf(&dir, "cv.pdf");

        let primary_calls = Arc::new(AtomicUsize::new(0));
        let secondary_calls = Arc::new(AtomicUsize::new(0));
        let store = CvStore::new(
            vec![
                Box::new(FailingExtractor {
                    calls: primary_calls.clone(),
                }),
                Box::new(CountingExtractor {
                    text: "recovered",
                    calls: secondary_calls.clone(),
                }),
            ],
            None,
        );

        let document = store
            .ensure_loaded(Some(path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(document.text, "recovered");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_backends_failing_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_pdf(&dir, "cv.pdf");

        let calls = Arc::new(AtomicUsize::new(0));
        let store = CvStore::new(
            vec![
                Box::new(FailingExtractor {
                    calls: calls.clone(),
                }),
                Box::new(FailingExtractor {
                    calls: calls.clone(),
                }),
            ],
            None,
        );

        let error = store
            .ensure_loaded(Some(path.to_str().unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::CvUnreadable(_)));
        assert!(error.to_string().contains("synthetic extraction failure"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!store.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_load_accepts_corrected_path() {
        let dir = tempfile::tempdir().unwrap();
        let good_path = touch_pdf(&dir, "cv.pdf");
        let (store, calls) = counting_store("Name: Alice");

        let error = store
            .ensure_loaded(Some("/nonexistent/cv.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(error, AppError::CvNotFound(_)));
        assert!(!store.is_loaded());

        let document = store
            .ensure_loaded(Some(good_path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(document.text, "Name: Alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_calls_extract_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_pdf(&dir, "cv.pdf");
        let (store, calls) = counting_store("Name: Alice");
        let hint = path.to_str().unwrap();

        let (a, b) = tokio::join!(store.ensure_loaded(Some(hint)), store.ensure_loaded(Some(hint)));
        assert_eq!(a.unwrap().text, "Name: Alice");
        assert_eq!(b.unwrap().text, "Name: Alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_discovery_prefers_well_known_names() {
        let dir = tempfile::tempdir().unwrap();
        touch_pdf(&dir, "zz.pdf");
        touch_pdf(&dir, "resume.pdf");

        let calls = Arc::new(AtomicUsize::new(0));
        let store = CvStore::new(
            vec![Box::new(CountingExtractor {
                text: "discovered",
                calls: calls.clone(),
            })],
            Some(dir.path().to_path_buf()),
        );

        let document = store.ensure_loaded(None).await.unwrap();
        assert_eq!(document.text, "discovered");
        assert_eq!(document.metadata.file_name, "resume.pdf");
    }

    #[tokio::test]
    async fn test_metadata_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_pdf(&dir, "cv.pdf");
        let (store, _calls) = counting_store("Name: Alice");

        let document = store
            .ensure_loaded(Some(path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(document.metadata.file_name, "cv.pdf");
        assert_eq!(document.metadata.file_path, path);
        assert_eq!(document.metadata.content_length, "Name: Alice".chars().count());
    }

    #[tokio::test]
    async fn test_empty_extraction_is_success_not_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = touch_pdf(&dir, "scanned.pdf");

        let primary_calls = Arc::new(AtomicUsize::new(0));
        let secondary_calls = Arc::new(AtomicUsize::new(0));
        let store = CvStore::new(
            vec![
                Box::new(CountingExtractor {
                    text: "",
                    calls: primary_calls.clone(),
                }),
                Box::new(CountingExtractor {
                    text: "never reached",
                    calls: secondary_calls.clone(),
                }),
            ],
            None,
        );

        let document = store
            .ensure_loaded(Some(path.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(document.text, "");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }
}
