//! # OCR Instance Manager Module
//!
//! This module provides thread-safe management of Tesseract instances.
//! Initializing Tesseract loads the language models from disk, so one
//! instance is kept per language/tessdata combination and reused for every
//! strategy of every image.

use leptess::LepTess;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Thread-safe OCR instance manager for reusing Tesseract instances
///
/// Instances are created on first request for a configuration and persist
/// until the manager is dropped. Each instance sits behind its own mutex,
/// so concurrent strategies against the same instance are serialized.
pub struct OcrInstanceManager {
    instances: Mutex<HashMap<String, Arc<Mutex<LepTess>>>>,
}

impl OcrInstanceManager {
    /// Create an empty instance manager
    ///
    /// # Examples
    ///
    /// ```rust
    /// use screenshot_analyzer::instance_manager::OcrInstanceManager;
    ///
    /// let manager = OcrInstanceManager::new();
    /// assert_eq!(manager.instance_count(), 0);
    /// ```
    pub fn new() -> Self {
        Self {
            instances: Mutex::new(HashMap::new()),
        }
    }

    /// Get or create an OCR instance for the given languages and tessdata directory
    ///
    /// # Errors
    ///
    /// Returns error if Tesseract cannot be initialized, e.g. the language
    /// models are missing from the tessdata directory.
    pub fn get_instance(
        &self,
        languages: &str,
        tessdata_path: Option<&Path>,
    ) -> anyhow::Result<Arc<Mutex<LepTess>>> {
        let key = Self::instance_key(languages, tessdata_path);

        if let Some(instance) = self.instances.lock().get(&key) {
            return Ok(Arc::clone(instance));
        }

        info!(
            languages = %languages,
            tessdata_path = ?tessdata_path,
            "Creating new OCR instance"
        );

        let data_path = match tessdata_path {
            Some(path) => Some(path.to_str().ok_or_else(|| {
                anyhow::anyhow!("tessdata path is not valid UTF-8: {}", path.display())
            })?),
            None => None,
        };

        let tess = LepTess::new(data_path, languages)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Tesseract OCR instance: {}", e))?;

        let instance = Arc::new(Mutex::new(tess));
        // A racing caller may have inserted first; keep whichever landed
        let stored = self
            .instances
            .lock()
            .entry(key)
            .or_insert_with(|| Arc::clone(&instance))
            .clone();

        Ok(stored)
    }

    /// Drop the cached instance for a configuration so the next request builds a new one.
    ///
    /// Callers still holding the old instance keep it alive until they finish.
    /// Returns whether an instance was cached.
    pub fn remove_instance(&self, languages: &str, tessdata_path: Option<&Path>) -> bool {
        let key = Self::instance_key(languages, tessdata_path);
        let removed = self.instances.lock().remove(&key).is_some();
        if removed {
            info!(instance_key = %key, "Removed OCR instance");
        }
        removed
    }

    /// Get the number of cached instances
    pub fn instance_count(&self) -> usize {
        self.instances.lock().len()
    }

    fn instance_key(languages: &str, tessdata_path: Option<&Path>) -> String {
        match tessdata_path {
            Some(path) => format!("{}:{}", languages, path.display()),
            None => format!("{}:default", languages),
        }
    }
}

impl Default for OcrInstanceManager {
    fn default() -> Self {
        Self::new()
    }
}
