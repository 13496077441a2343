//! Host media-center interface
//!
//! The addon never draws anything itself. Everything user facing goes through
//! the [`Host`] trait: directory listings, playback resolution, the on-screen
//! keyboard, notifications and player state.

use crate::listing::Listing;
use crate::playback::PlaybackRequest;

/// The media-center runtime the addon runs inside
pub trait Host {
    /// Renders a virtual directory
    fn show_listing(&mut self, listing: Listing);

    /// Hands a stream to the player
    ///
    /// Returns whether the host accepted the stream.
    fn resolve_playback(&mut self, request: PlaybackRequest) -> bool;

    /// Asks the user for text, `None` when the input was dismissed
    fn read_text(&mut self, heading: &str) -> Option<String>;

    /// Shows an error to the user
    fn notify_error(&mut self, heading: &str, message: &str);

    /// Whether the player has started playing
    fn is_playing(&self) -> bool;

    /// Whether the host asked the addon to stop
    fn abort_requested(&self) -> bool;

    /// Shows or hides subtitles of the running stream
    fn set_subtitles_visible(&mut self, visible: bool);
}
