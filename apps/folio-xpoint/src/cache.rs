//! Index cache and background indexing
//!
//! Keeps the latest [`PositionIndex`] per book in memory and builds new ones
//! off the async executor. A cached index is replaced wholesale when its book
//! changes; it is never patched.
//!
//! Every build takes a generation number when it starts. When builds of the
//! same book overlap, the one started last wins, whatever order they finish in.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::epub::{ContentSource, EpubSource};
use crate::error::{IndexError, Result};
use crate::index::{Indexer, PositionIndex};
use crate::resolver::Resolver;

/// Thread-safe index cache keyed by book id
#[derive(Clone)]
pub struct PositionIndexCache {
    indexes: Arc<RwLock<HashMap<String, CachedIndex>>>,
    generations: Arc<AtomicU64>,
}

struct CachedIndex {
    generation: u64,
    index: Arc<PositionIndex>,
}

impl Default for PositionIndexCache {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionIndexCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self {
            indexes: Arc::new(RwLock::new(HashMap::new())),
            generations: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Reserve a generation for a build that is about to start
    pub fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub async fn get(&self, book_id: &str) -> Option<Arc<PositionIndex>> {
        let indexes = self.indexes.read().await;
        indexes.get(book_id).map(|cached| cached.index.clone())
    }

    /// Store an index, replacing any previous one for the same book
    pub async fn insert(&self, index: Arc<PositionIndex>) {
        let generation = self.next_generation();
        let mut indexes = self.indexes.write().await;
        indexes.insert(
            index.book_id().to_string(),
            CachedIndex { generation, index },
        );
    }

    /// Store the result of the build that reserved `generation`
    ///
    /// Returns the index callers should use. An index from a superseded build
    /// is handed back uncached; an index whose digest matches the cached one
    /// yields the cached one.
    pub async fn store(&self, generation: u64, index: PositionIndex) -> Arc<PositionIndex> {
        let mut indexes = self.indexes.write().await;

        if let Some(cached) = indexes.get_mut(index.book_id()) {
            if cached.generation > generation {
                tracing::debug!(
                    "Book {}: build {} superseded by build {}, not caching",
                    index.book_id(),
                    generation,
                    cached.generation
                );
                return Arc::new(index);
            }
            if cached.index.digest() == index.digest() {
                tracing::debug!(
                    "Book {} unchanged (digest {}), keeping cached index",
                    index.book_id(),
                    index.digest()
                );
                cached.generation = generation;
                return cached.index.clone();
            }
        }

        let index = Arc::new(index);
        indexes.insert(
            index.book_id().to_string(),
            CachedIndex {
                generation,
                index: index.clone(),
            },
        );
        index
    }

    pub async fn contains(&self, book_id: &str) -> bool {
        let indexes = self.indexes.read().await;
        indexes.contains_key(book_id)
    }

    pub async fn remove(&self, book_id: &str) -> Option<Arc<PositionIndex>> {
        let mut indexes = self.indexes.write().await;
        indexes.remove(book_id).map(|cached| cached.index)
    }

    pub async fn clear(&self) {
        let mut indexes = self.indexes.write().await;
        indexes.clear();
    }

    pub async fn len(&self) -> usize {
        let indexes = self.indexes.read().await;
        indexes.len()
    }

    pub async fn is_empty(&self) -> bool {
        let indexes = self.indexes.read().await;
        indexes.is_empty()
    }
}

/// Builds indexes in the background and serves resolvers over them
#[derive(Clone)]
pub struct IndexingService {
    config: Arc<Config>,
    cache: PositionIndexCache,
}

impl IndexingService {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            cache: PositionIndexCache::new(),
        }
    }

    pub fn cache(&self) -> &PositionIndexCache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn indexer(&self) -> Indexer {
        Indexer::new(self.config.indexing.limits()).parallel(self.config.indexing.parallel)
    }

    /// Index content from any source and cache the result
    pub async fn index_source<S>(&self, book_id: &str, source: S) -> Result<Arc<PositionIndex>>
    where
        S: ContentSource + Send + 'static,
    {
        let indexer = self.indexer();
        let id = book_id.to_string();
        self.run_build(book_id, move || indexer.build(&id, &source))
            .await
    }

    /// Open an EPUB file, index it and cache the result
    pub async fn index_epub_path(
        &self,
        book_id: &str,
        path: impl Into<PathBuf>,
    ) -> Result<Arc<PositionIndex>> {
        let indexer = self.indexer();
        let id = book_id.to_string();
        let path = path.into();
        self.run_build(book_id, move || {
            let source = EpubSource::from_path(&path).map_err(|source| IndexError::Content {
                book_id: id.clone(),
                source,
            })?;
            indexer.build(&id, &source)
        })
        .await
    }

    /// Start indexing an EPUB without waiting for it, e.g. right after upload
    pub fn spawn_index_epub(
        &self,
        book_id: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> JoinHandle<Result<Arc<PositionIndex>>> {
        let service = self.clone();
        let book_id = book_id.into();
        let path = path.into();
        tokio::spawn(async move {
            let result = service.index_epub_path(&book_id, path).await;
            if let Err(e) = &result {
                tracing::error!("Background indexing failed: {}", e);
            }
            result
        })
    }

    /// Resolver over the cached index of a book, if it has been indexed
    pub async fn resolver(&self, book_id: &str) -> Option<Resolver> {
        let index = self.cache.get(book_id).await?;
        Some(Resolver::new(index).with_policy(self.config.resolver.omitted_fragment))
    }

    async fn run_build<F>(&self, book_id: &str, build: F) -> Result<Arc<PositionIndex>>
    where
        F: FnOnce() -> Result<PositionIndex> + Send + 'static,
    {
        let generation = self.cache.next_generation();
        let timeout = self.config.indexing.timeout();
        let task = tokio::task::spawn_blocking(build);

        let index = match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_error)) => {
                return Err(IndexError::Task {
                    book_id: book_id.to_string(),
                    message: join_error.to_string(),
                })
            }
            Err(_) => {
                tracing::warn!("Indexing book {} timed out after {:?}", book_id, timeout);
                return Err(IndexError::DeadlineExceeded {
                    book_id: book_id.to_string(),
                    timeout,
                });
            }
        };

        Ok(self.cache.store(generation, index).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::MemorySource;
    use crate::position::Position;

    fn book() -> MemorySource {
        MemorySource::new()
            .with_unit("ch1", "<html><body><h1/><p/><p/></body></html>")
            .with_unit("ch2", "<html><body><h2/><blockquote/><p/></body></html>")
    }

    #[tokio::test]
    async fn test_cache_operations() {
        let cache = PositionIndexCache::new();
        assert!(cache.is_empty().await);

        let index = Arc::new(Indexer::default().build("b1", &book()).unwrap());
        cache.insert(index.clone()).await;

        assert!(cache.contains("b1").await);
        assert_eq!(cache.len().await, 1);
        assert!(Arc::ptr_eq(&cache.get("b1").await.unwrap(), &index));

        cache.remove("b1").await;
        assert!(!cache.contains("b1").await);

        cache.insert(index).await;
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_index_and_resolve() {
        let service = IndexingService::new(Config::default());
        assert!(service.resolver("b1").await.is_none());

        service.index_source("b1", book()).await.unwrap();
        let resolver = service.resolver("b1").await.unwrap();

        assert_eq!(
            resolver
                .resolve("/body/DocFragment[2]/body/blockquote")
                .position(),
            Some(Position::new(5, 0))
        );
    }

    #[tokio::test]
    async fn test_unchanged_book_keeps_cached_index() {
        let service = IndexingService::new(Config::default());
        let first = service.index_source("b1", book()).await.unwrap();
        let second = service.index_source("b1", book()).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_changed_book_replaces_index() {
        let service = IndexingService::new(Config::default());
        let first = service.index_source("b1", book()).await.unwrap();

        let revised = book().with_unit("ch3", "<html><body><p/></body></html>");
        let second = service.index_source("b1", revised).await.unwrap();

        assert_ne!(first.digest(), second.digest());
        assert_eq!(service.cache().get("b1").await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_failed_build_keeps_previous_index() {
        let service = IndexingService::new(Config::default());
        service.index_source("b1", book()).await.unwrap();

        let broken = book().with_unit("ch3", "<html><body><p>");
        let err = service.index_source("b1", broken).await.unwrap_err();
        assert_eq!(err.book_id(), "b1");

        assert_eq!(service.cache().get("b1").await.unwrap().len(), 6);
    }

    /// Blocks in `spine()` until released, so a test can order build completion
    struct GatedSource {
        inner: MemorySource,
        started: tokio::sync::mpsc::UnboundedSender<()>,
        gate: std::sync::mpsc::Receiver<()>,
    }

    impl ContentSource for GatedSource {
        fn spine(&self) -> std::result::Result<Vec<String>, crate::epub::ContentError> {
            let _ = self.started.send(());
            let _ = self.gate.recv();
            self.inner.spine()
        }

        fn read_unit(&self, id: &str) -> std::result::Result<Vec<u8>, crate::epub::ContentError> {
            self.inner.read_unit(id)
        }
    }

    #[tokio::test]
    async fn test_later_build_wins_when_earlier_finishes_last() {
        let service = IndexingService::new(Config::default());

        let (started_tx, mut started_rx) = tokio::sync::mpsc::unbounded_channel();
        let (release, gate) = std::sync::mpsc::channel();
        let stale = GatedSource {
            inner: book(),
            started: started_tx,
            gate,
        };

        let earlier = {
            let service = service.clone();
            tokio::spawn(async move { service.index_source("b1", stale).await })
        };
        started_rx.recv().await.unwrap();

        let revised = book().with_unit("ch3", "<html><body><p/></body></html>");
        let later = service.index_source("b1", revised).await.unwrap();
        assert_eq!(later.len(), 7);

        release.send(()).unwrap();
        let superseded = earlier.await.unwrap().unwrap();
        assert_eq!(superseded.len(), 6);

        let cached = service.cache().get("b1").await.unwrap();
        assert!(Arc::ptr_eq(&cached, &later));
    }

    #[tokio::test]
    async fn test_store_ignores_older_generation() {
        let cache = PositionIndexCache::new();
        let old = cache.next_generation();
        let new = cache.next_generation();

        let revised = book().with_unit("ch3", "<html><body><p/></body></html>");
        cache
            .store(new, Indexer::default().build("b1", &revised).unwrap())
            .await;
        cache
            .store(old, Indexer::default().build("b1", &book()).unwrap())
            .await;

        assert_eq!(cache.get("b1").await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn test_missing_epub_file() {
        let service = IndexingService::new(Config::default());
        let err = service
            .index_epub_path("ghost", "/definitely/not/here.epub")
            .await
            .unwrap_err();

        assert!(matches!(err, IndexError::Content { .. }));
        assert!(!service.cache().contains("ghost").await);
    }
}
