use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::foundation::error::{DrapeError, DrapeResult};
use crate::store::{ArtifactStore, check_name};

/// One artifact held by [`MemoryArtifactStore`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredArtifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-process store addressed as `mem://<name>`. Useful for tests and previews.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    objects: Mutex<BTreeMap<String, StoredArtifact>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<StoredArtifact> {
        self.lock().get(name).cloned()
    }

    /// Stored names in lexical order.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, StoredArtifact>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn store(
        &self,
        bytes: Vec<u8>,
        suggested_name: &str,
        content_type: &str,
    ) -> DrapeResult<String> {
        check_name(suggested_name)?;
        let mut objects = self.lock();
        if objects.contains_key(suggested_name) {
            return Err(DrapeError::storage(format!(
                "artifact '{suggested_name}' already exists"
            )));
        }
        objects.insert(
            suggested_name.to_string(),
            StoredArtifact {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("mem://{suggested_name}"))
    }
}
