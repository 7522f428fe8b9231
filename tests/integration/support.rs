use md_publish::concurrency::{RemoteGate, RetryPolicy};
use md_publish::remote::{GatedRemote, MemoryStore};
use md_publish::store::JsonCacheStore;
use md_publish::sync::{ResolvedTarget, SyncEngine};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const ROOT_PAGE: &str = "root-page";

/// Source tree on disk, a cache directory and an in-memory remote.
pub struct Workspace {
    pub dir: TempDir,
    pub store: Arc<MemoryStore>,
    pub cache: Arc<JsonCacheStore>,
}

impl Workspace {
    /// Handbook layout: a root README, two guides in `docs/` and a note.
    pub fn handbook() -> Self {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("handbook");
        std::fs::create_dir_all(src.join("docs")).unwrap();
        write(&src, "README.md", "# Handbook\n\nIntro paragraph.");
        write(&src, "docs/guide.md", "# Guide\n\nStep one.\n\n- a\n- b");
        write(&src, "docs/faq.md", "No heading here.");
        write(&src, "notes.md", "# Notes\n\n```rust\nfn main() {}\n```");
        let cache = Arc::new(JsonCacheStore::new(dir.path().join("cache")));
        Self {
            dir,
            store: Arc::new(MemoryStore::new(ROOT_PAGE)),
            cache,
        }
    }

    pub fn src(&self) -> std::path::PathBuf {
        self.dir.path().join("handbook")
    }

    pub fn write(&self, relative: &str, content: &str) {
        write(&self.src(), relative, content);
    }

    pub fn target(&self) -> ResolvedTarget {
        ResolvedTarget {
            name: "handbook".to_string(),
            src_root: self.src(),
            parent_page_id: ROOT_PAGE.to_string(),
        }
    }

    pub fn remote(&self) -> GatedRemote {
        GatedRemote::new(self.store.clone(), fast_gate())
    }

    pub fn engine(&self) -> SyncEngine {
        SyncEngine::new(Some(self.remote()), self.cache.clone())
    }
}

/// Gate with millisecond backoff so retry tests stay fast.
pub fn fast_gate() -> RemoteGate {
    RemoteGate::new(2, RetryPolicy::new(5, Duration::from_millis(1)))
}

fn write(src: &Path, relative: &str, content: &str) {
    let path = src.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}
