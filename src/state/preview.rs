/// Card thumbnails keyed by record id
///
/// Each entry remembers a fingerprint of the `image` field it was loaded
/// from, so a refresh only requests thumbnails that are new or changed.
/// Loads are tagged; a result for a record that left the page or whose
/// image changed in the meantime is dropped.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use iced::widget::image;
use tracing::{debug, warn};

use super::data::Draw;
use crate::media::MediaError;

/// One thumbnail to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequest {
    pub id: String,
    pub token: u64,
    pub image: String,
}

#[derive(Debug)]
enum Slot {
    Loading(u64),
    Ready(image::Handle),
    Failed,
}

#[derive(Debug)]
struct Entry {
    fingerprint: u64,
    slot: Slot,
}

#[derive(Debug, Default)]
pub struct Previews {
    next_token: u64,
    entries: HashMap<String, Entry>,
}

impl Previews {
    /// Align the cache with the records on screen.
    /// Returns the thumbnails that still need loading.
    pub fn sync(&mut self, draws: &[Draw]) -> Vec<PreviewRequest> {
        let mut requests = Vec::new();
        let mut entries = HashMap::with_capacity(draws.len());

        for draw in draws {
            if draw.image.trim().is_empty() {
                continue;
            }

            let fingerprint = fingerprint(&draw.image);
            match self.entries.remove(&draw.id) {
                Some(entry) if entry.fingerprint == fingerprint => {
                    entries.insert(draw.id.clone(), entry);
                }
                _ => {
                    self.next_token += 1;
                    let token = self.next_token;
                    entries.insert(
                        draw.id.clone(),
                        Entry {
                            fingerprint,
                            slot: Slot::Loading(token),
                        },
                    );
                    requests.push(PreviewRequest {
                        id: draw.id.clone(),
                        token,
                        image: draw.image.clone(),
                    });
                }
            }
        }

        self.entries = entries;
        requests
    }

    /// Store the result of load `token`, unless it was superseded
    pub fn finish(&mut self, id: &str, token: u64, result: Result<image::Handle, MediaError>) {
        let Some(entry) = self.entries.get_mut(id) else {
            debug!(id, "preview for a record no longer shown, dropping");
            return;
        };
        if !matches!(entry.slot, Slot::Loading(current) if current == token) {
            debug!(id, token, "stale preview, dropping");
            return;
        }

        entry.slot = match result {
            Ok(handle) => Slot::Ready(handle),
            Err(err) => {
                warn!(id, error = %err, "failed to load preview");
                Slot::Failed
            }
        };
    }

    pub fn get(&self, id: &str) -> Option<&image::Handle> {
        match self.entries.get(id).map(|entry| &entry.slot) {
            Some(Slot::Ready(handle)) => Some(handle),
            _ => None,
        }
    }

    pub fn remove(&mut self, id: &str) {
        self.entries.remove(id);
    }
}

fn fingerprint(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}
