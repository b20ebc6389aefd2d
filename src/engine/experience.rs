//! Experience store: learned bias from finished games.
//!
//! Every position of a finished game adds +1 (White won) or -1 (Black won) to
//! the offset of its canonical id. The search adds the offset to the value of
//! the root's children, so positions that preceded losses are avoided.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::core::Player;
use crate::error::Result;

const BUCKET_BITS: u32 = 8;
const N_BUCKETS: usize = 1 << BUCKET_BITS;
const BUCKET_MASK: u64 = (N_BUCKETS as u64) - 1;

/// Store shared by all engines of an application session
pub type SharedExperience = Arc<RwLock<ExperienceStore>>;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub id: u64,
    pub offset: f32,
}

/// Sparse map from canonical position id to cumulative game outcome
#[derive(Clone, Debug)]
pub struct ExperienceStore {
    buckets: Vec<Vec<ExperienceEntry>>,
    len: usize,
}

/// On-disk form of the store
#[derive(Debug, Serialize, Deserialize)]
pub struct ExperienceSnapshot {
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<ExperienceEntry>,
}

impl ExperienceStore {
    pub fn new() -> Self {
        ExperienceStore {
            buckets: vec![Vec::new(); N_BUCKETS],
            len: 0,
        }
    }

    pub fn shared() -> SharedExperience {
        Arc::new(RwLock::new(ExperienceStore::new()))
    }

    #[inline]
    fn bucket(id: u64) -> usize {
        (id & BUCKET_MASK) as usize
    }

    /// Record that the game passing through `id` was won by `winner`
    pub fn add_board(&mut self, id: u64, winner: Player) {
        let delta = winner.sign();
        let bucket = &mut self.buckets[Self::bucket(id)];
        match bucket.iter_mut().find(|e| e.id == id) {
            Some(entry) => entry.offset += delta,
            None => {
                bucket.push(ExperienceEntry { id, offset: delta });
                self.len += 1;
            }
        }
    }

    /// Offset of `id` seen from `perspective`; 0 for unknown positions
    pub fn offset(&self, id: u64, perspective: Player) -> f32 {
        self.buckets[Self::bucket(id)]
            .iter()
            .find(|e| e.id == id)
            .map_or(0.0, |e| e.offset * perspective.sign())
    }

    pub fn reset(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.len = 0;
    }

    /// Number of distinct positions stored
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn snapshot(&self) -> ExperienceSnapshot {
        ExperienceSnapshot {
            saved_at: Utc::now(),
            entries: self.buckets.iter().flatten().copied().collect(),
        }
    }

    pub fn from_snapshot(snapshot: &ExperienceSnapshot) -> Self {
        let mut store = ExperienceStore::new();
        for entry in &snapshot.entries {
            let bucket = &mut store.buckets[Self::bucket(entry.id)];
            match bucket.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => existing.offset += entry.offset,
                None => {
                    bucket.push(*entry);
                    store.len += 1;
                }
            }
        }
        store
    }

    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, json)?;
        log::info!("saved {} experience entries to {}", self.len, path.display());
        Ok(())
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let snapshot: ExperienceSnapshot = serde_json::from_str(&text)?;
        let store = Self::from_snapshot(&snapshot);
        log::info!(
            "loaded {} experience entries saved at {}",
            store.len,
            snapshot.saved_at.to_rfc3339()
        );
        Ok(store)
    }
}

impl Default for ExperienceStore {
    fn default() -> Self {
        Self::new()
    }
}
