use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Remote tracks received by peers, keyed by track id.
///
/// Shared between the peer factory (which fills it from `on_track`) and the
/// playback sink (which takes tracks out of it when asked to play them).
#[derive(Clone, Default)]
pub struct TrackRegistry {
    tracks: Arc<Mutex<HashMap<String, Arc<TrackRemote>>>>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, id: String, track: Arc<TrackRemote>) {
        self.tracks.lock().insert(id, track);
    }

    pub(crate) fn get(&self, id: &str) -> Option<Arc<TrackRemote>> {
        self.tracks.lock().get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tracks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.lock().is_empty()
    }
}
