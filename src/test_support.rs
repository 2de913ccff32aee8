//! Scripted host doubles for unit tests.

use std::collections::{HashMap, HashSet};
use std::os::fd::OwnedFd;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{BridgeError, BridgeResult};
use crate::fs_abstraction::{ChildCursor, RootPicker, StorageProvider};
use crate::grant::GrantCompletion;
use crate::types::{AccessMode, ChildEntry, StorageHandle};

/// In-memory document tree keyed by handle.
#[derive(Default)]
pub struct MockProvider {
    dirs: HashMap<String, Vec<ChildEntry>>,
    files: HashSet<String>,
    /// Directory handles whose cursor fails after yielding this many rows.
    broken_cursors: HashMap<String, usize>,
    failing_queries: HashSet<String>,
    legacy_root: Option<String>,
    fail_persist: bool,
    persisted: Mutex<Vec<String>>,
    open_cursors: Arc<AtomicUsize>,
    queries: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a directory and its children. File children become openable.
    pub fn with_dir(mut self, handle: &str, children: Vec<ChildEntry>) -> Self {
        for child in &children {
            if !child.is_directory {
                self.files.insert(child.handle.as_str().to_string());
            }
        }
        self.dirs.insert(handle.to_string(), children);
        self
    }

    pub fn with_broken_cursor(mut self, handle: &str, fail_after: usize) -> Self {
        self.broken_cursors.insert(handle.to_string(), fail_after);
        self
    }

    pub fn with_failing_query(mut self, handle: &str) -> Self {
        self.failing_queries.insert(handle.to_string());
        self
    }

    pub fn with_legacy_root(mut self, root: &str) -> Self {
        self.legacy_root = Some(root.to_string());
        self
    }

    pub fn fail_persist(mut self) -> Self {
        self.fail_persist = true;
        self
    }

    pub fn persisted(&self) -> Vec<String> {
        self.persisted.lock().unwrap().clone()
    }

    /// Cursors handed out and not yet dropped.
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

struct MockCursor {
    rows: std::vec::IntoIter<ChildEntry>,
    fail_after: Option<usize>,
    yielded: usize,
    open: Arc<AtomicUsize>,
}

impl Iterator for MockCursor {
    type Item = BridgeResult<ChildEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fail_after == Some(self.yielded) {
            self.fail_after = None;
            return Some(Err(BridgeError::Provider("malformed cursor row".to_string())));
        }
        self.yielded += 1;
        self.rows.next().map(Ok)
    }
}

impl Drop for MockCursor {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl StorageProvider for MockProvider {
    fn query_children(&self, handle: &StorageHandle) -> BridgeResult<Box<dyn ChildCursor>> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.failing_queries.contains(handle.as_str()) {
            return Err(BridgeError::Provider("permission revoked".to_string()));
        }
        let rows = self
            .dirs
            .get(handle.as_str())
            .cloned()
            .ok_or_else(|| BridgeError::Provider(format!("not a directory: {}", handle)))?;

        self.open_cursors.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockCursor {
            rows: rows.into_iter(),
            fail_after: self.broken_cursors.get(handle.as_str()).copied(),
            yielded: 0,
            open: self.open_cursors.clone(),
        }))
    }

    fn open_descriptor(&self, handle: &StorageHandle, _mode: AccessMode) -> BridgeResult<OwnedFd> {
        if !self.files.contains(handle.as_str()) {
            return Err(BridgeError::Provider(format!("document not found: {}", handle)));
        }
        let file = tempfile::tempfile()?;
        Ok(OwnedFd::from(file))
    }

    fn persist_grant(&self, handle: &StorageHandle) -> BridgeResult<()> {
        self.persisted.lock().unwrap().push(handle.as_str().to_string());
        if self.fail_persist {
            return Err(BridgeError::Provider("persist refused".to_string()));
        }
        Ok(())
    }

    fn legacy_root(&self) -> Option<String> {
        self.legacy_root.clone()
    }
}

/// Picker that parks its completions until the test answers.
#[derive(Default)]
pub struct MockPicker {
    launches: AtomicUsize,
    waiting: Mutex<Vec<GrantCompletion>>,
}

impl MockPicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn grant(&self, handle: &str) {
        let completion = self.waiting.lock().unwrap().pop().expect("picker not launched");
        completion.grant(StorageHandle::new(handle));
    }

    pub fn deny(&self) {
        let completion = self.waiting.lock().unwrap().pop().expect("picker not launched");
        completion.deny();
    }
}

impl RootPicker for MockPicker {
    fn launch(&self, completion: GrantCompletion) {
        self.launches.fetch_add(1, Ordering::SeqCst);
        self.waiting.lock().unwrap().push(completion);
    }
}
