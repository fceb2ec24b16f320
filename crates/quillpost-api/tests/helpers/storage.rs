//! In-memory storage that counts every call.

use async_trait::async_trait;
use bytes::Bytes;
use quillpost_storage::{ImageStorage, StorageBackend, StorageError, StorageResult, StoredImage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub struct CountingStorage {
    objects: Mutex<HashMap<String, Bytes>>,
    inserted: Mutex<Vec<String>>,
    get_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    /// Inserts whose name contains this fragment fail
    fail_inserts_containing: Mutex<Option<String>>,
    /// Reads fail with a backend error instead of answering
    broken_reads: AtomicBool,
    panic_on_get: AtomicBool,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, name: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(name.to_string(), Bytes::copy_from_slice(data));
    }

    pub fn object(&self, name: &str) -> Option<Bytes> {
        self.objects.lock().unwrap().get(name).cloned()
    }

    pub fn inserted_names(&self) -> Vec<String> {
        self.inserted.lock().unwrap().clone()
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn fail_inserts_containing(&self, fragment: &str) {
        *self.fail_inserts_containing.lock().unwrap() = Some(fragment.to_string());
    }

    pub fn break_reads(&self) {
        self.broken_reads.store(true, Ordering::SeqCst);
    }

    pub fn panic_on_get(&self) {
        self.panic_on_get.store(true, Ordering::SeqCst);
    }
}

fn content_type(name: &str) -> String {
    match name.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
    .to_string()
}

#[async_trait]
impl ImageStorage for CountingStorage {
    async fn get(&self, file_name: &str) -> StorageResult<StoredImage> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);

        if self.panic_on_get.load(Ordering::SeqCst) {
            panic!("storage exploded");
        }
        if self.broken_reads.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError("connection reset".to_string()));
        }

        self.object(file_name)
            .map(|data| StoredImage {
                data,
                content_type: content_type(file_name),
            })
            .ok_or_else(|| StorageError::NotFound(file_name.to_string()))
    }

    async fn insert(&self, file_name: &str, data: Bytes) -> StorageResult<String> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inserted.lock().unwrap().push(file_name.to_string());

        let failing = self.fail_inserts_containing.lock().unwrap().clone();
        if let Some(fragment) = failing {
            if file_name.contains(&fragment) {
                return Err(StorageError::UploadFailed("simulated failure".to_string()));
            }
        }

        self.objects
            .lock()
            .unwrap()
            .insert(file_name.to_string(), data);
        Ok(format!("memory://{}", file_name))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
