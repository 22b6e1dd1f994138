use crate::common::RemoteTrack;
use crate::error::ApiError;

/// Destination for received media, the counterpart of a page's video element.
pub trait MediaSink: Send + Sync {
    /// Binds a newly arrived remote track to the sink.
    fn attach(&self, track: &RemoteTrack) -> Result<(), ApiError>;

    /// Starts consuming a previously attached track.
    ///
    /// # Returns
    /// - `Err(ApiError::TrackNotFound)` if `track_id` was never attached.
    fn play(&self, track_id: &str) -> Result<(), ApiError>;
}

/// Destination for user-facing status text, the counterpart of a page's
/// message element.
pub trait StatusSink: Send + Sync {
    /// Replaces the current text.
    fn set_text(&self, text: &str);

    /// Appends to the current text.
    fn append_text(&self, text: &str);

    /// The text currently shown.
    fn text(&self) -> String;
}
