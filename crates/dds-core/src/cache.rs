//! Parsed-model cache and the active document session.
//!
//! The parser is pure; this module decides *when* it runs. [`ModelCache`] keeps the latest
//! model per document and version so commands and outline requests share one parse, and
//! [`DocumentSession`] couples the active document with the reparse [`Debouncer`].

use crate::debounce::Debouncer;
use crate::document::DdsDocument;
use crate::edit::{EditError, EditSet};
use crate::model::{DdsFile, ScreenSize};
use crate::parser::parse_document;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Host-provided document identity (normally a URI or path).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap a URI or path.
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The underlying URI.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    version: u64,
    stale: bool,
    model: Arc<DdsFile>,
}

/// Latest parsed model per document.
#[derive(Debug, Clone, Default)]
pub struct ModelCache {
    entries: HashMap<DocumentId, CacheEntry>,
    default_screen: ScreenSize,
}

impl ModelCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty cache that assumes `screen` for files without `DSPSIZ`.
    pub fn with_default_screen(screen: ScreenSize) -> Self {
        Self {
            entries: HashMap::new(),
            default_screen: screen,
        }
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The model for exactly `version`, unless it was invalidated.
    pub fn get(&self, id: &DocumentId, version: u64) -> Option<Arc<DdsFile>> {
        self.entries
            .get(id)
            .filter(|entry| entry.version == version && !entry.stale)
            .map(|entry| Arc::clone(&entry.model))
    }

    /// The most recent model and its version, even if stale.
    pub fn latest(&self, id: &DocumentId) -> Option<(u64, Arc<DdsFile>)> {
        self.entries
            .get(id)
            .map(|entry| (entry.version, Arc::clone(&entry.model)))
    }

    /// Parse `document` with the cache's defaults, without storing the result.
    pub fn parse(&self, document: &DdsDocument) -> DdsFile {
        let mut file = parse_document(document);
        if file.dspsiz().is_none() {
            file.screen = self.default_screen;
        }
        file
    }

    /// Return the cached model for `version`, parsing and storing it on a miss.
    pub fn get_or_parse(
        &mut self,
        id: &DocumentId,
        version: u64,
        document: &DdsDocument,
    ) -> Arc<DdsFile> {
        if let Some(model) = self.get(id, version) {
            return model;
        }
        tracing::debug!(document = %id, version, "parsing DDS model");
        let file = self.parse(document);
        self.insert(id.clone(), version, file)
    }

    /// Store a model for `version`, replacing any previous entry.
    pub fn insert(&mut self, id: DocumentId, version: u64, model: DdsFile) -> Arc<DdsFile> {
        let model = Arc::new(model);
        self.entries.insert(
            id,
            CacheEntry {
                version,
                stale: false,
                model: Arc::clone(&model),
            },
        );
        model
    }

    /// Mark a document's model stale; [`ModelCache::latest`] still returns it.
    pub fn invalidate(&mut self, id: &DocumentId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.stale = true;
        }
    }

    /// Forget a document, e.g. when it is closed.
    pub fn remove(&mut self, id: &DocumentId) -> Option<Arc<DdsFile>> {
        self.entries.remove(id).map(|entry| entry.model)
    }
}

/// The single active document: its text snapshot, version and reparse debouncer.
#[derive(Debug, Clone)]
pub struct DocumentSession {
    id: DocumentId,
    version: u64,
    document: DdsDocument,
    debouncer: Debouncer,
}

impl DocumentSession {
    /// Open a session on `text`.
    pub fn new(id: DocumentId, text: &str, delay: Duration) -> Self {
        Self {
            id,
            version: 0,
            document: DdsDocument::new(text),
            debouncer: Debouncer::new(delay),
        }
    }

    /// Document identity.
    pub fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Version, incremented on every change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Current text snapshot.
    pub fn document(&self) -> &DdsDocument {
        &self.document
    }

    /// Returns `true` while a reparse is scheduled.
    pub fn is_reparse_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// The host changed the text at `now`; schedule a reparse.
    pub fn replace_text(&mut self, text: &str, cache: &mut ModelCache, now: Instant) {
        self.document = DdsDocument::new(text);
        self.changed(cache, now);
    }

    /// Apply core edits to the snapshot at `now`; schedule a reparse.
    pub fn apply(
        &mut self,
        edits: &EditSet,
        cache: &mut ModelCache,
        now: Instant,
    ) -> Result<(), EditError> {
        self.document = self.document.apply(edits)?;
        self.changed(cache, now);
        Ok(())
    }

    fn changed(&mut self, cache: &mut ModelCache, now: Instant) {
        self.version = self.version.saturating_add(1);
        cache.invalidate(&self.id);
        self.debouncer.touch(now);
    }

    /// Reparse once the debounce delay has elapsed; returns the new model when it ran.
    pub fn poll(&mut self, cache: &mut ModelCache, now: Instant) -> Option<Arc<DdsFile>> {
        self.debouncer
            .poll(now)
            .then(|| cache.get_or_parse(&self.id, self.version, &self.document))
    }

    /// The model for the current version, parsing immediately if needed.
    ///
    /// Commands call this so they never act on a model older than the text.
    pub fn model(&mut self, cache: &mut ModelCache) -> Arc<DdsFile> {
        self.debouncer.cancel();
        cache.get_or_parse(&self.id, self.version, &self.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE: &str = "     A          R ONE";
    const TWO: &str = "     A          R ONE\n     A          R TWO";

    #[test]
    fn test_cache_hits_same_version() {
        let mut cache = ModelCache::new();
        let id = DocumentId::from("file:///a.dspf");
        let doc = DdsDocument::new(ONE);
        let first = cache.get_or_parse(&id, 1, &doc);
        let second = cache.get_or_parse(&id, 1, &doc);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.get(&id, 2).is_none());
    }

    #[test]
    fn test_invalidate_keeps_latest() {
        let mut cache = ModelCache::new();
        let id = DocumentId::from("a");
        cache.get_or_parse(&id, 1, &DdsDocument::new(ONE));
        cache.invalidate(&id);
        assert!(cache.get(&id, 1).is_none());
        assert_eq!(cache.latest(&id).map(|(v, _)| v), Some(1));
        assert!(cache.remove(&id).is_some());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_default_screen_applies_without_dspsiz() {
        let cache = ModelCache::with_default_screen(ScreenSize::WIDE);
        assert_eq!(cache.parse(&DdsDocument::new(ONE)).screen, ScreenSize::WIDE);
    }

    #[test]
    fn test_session_debounces_reparse() {
        let start = Instant::now();
        let mut cache = ModelCache::new();
        let mut session = DocumentSession::new("a".into(), ONE, Duration::from_millis(50));
        assert_eq!(session.model(&mut cache).records.len(), 1);

        session.replace_text(TWO, &mut cache, start);
        assert_eq!(session.version(), 1);
        assert!(session.poll(&mut cache, start + Duration::from_millis(10)).is_none());
        let model = session
            .poll(&mut cache, start + Duration::from_millis(50))
            .unwrap();
        assert_eq!(model.records.len(), 2);
        assert!(!session.is_reparse_pending());
    }
}
