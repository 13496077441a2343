//! Playback requests
//!
//! Turns a resolved stream URL into the request handed to the host player,
//! carrying bandwidth limits, adaptive streaming hints and subtitle settings.

use crate::settings::Settings;
use serde::Serialize;

/// Key system used for protected streams
pub const WIDEVINE: &str = "com.widevine.alpha";

/// Streaming manifest formats the adaptive player understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestType {
    Mpd,
    Hls,
}

impl ManifestType {
    /// Detects the manifest format from the stream URL
    pub fn detect(url: &str) -> Option<Self> {
        if url.contains(".mpd") {
            Some(ManifestType::Mpd)
        } else if url.contains(".m3u8") {
            Some(ManifestType::Hls)
        } else {
            None
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ManifestType::Mpd => "application/dash+xml",
            ManifestType::Hls => "application/vnd.apple.mpegurl",
        }
    }
}

/// License details for a protected stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrmHint {
    pub license_type: &'static str,
    pub license_key: String,
}

/// Hints for the adaptive streaming player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdaptiveHint {
    pub manifest_type: Option<ManifestType>,
    pub drm: Option<DrmHint>,
}

/// Everything the host needs to start playback
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackRequest {
    /// Resolved stream URL including the header fragment
    pub url: String,
    /// Bandwidth cap in bit/s
    pub max_bandwidth_bps: Option<u64>,
    /// Present when the adaptive player should handle the stream
    pub adaptive: Option<AdaptiveHint>,
    /// External subtitle tracks
    pub subtitles: Vec<String>,
    /// Whether subtitles are shown once playback starts
    pub show_subtitles: bool,
}

impl PlaybackRequest {
    /// Builds a request for a plain stream URL
    pub fn new(url: String, settings: &Settings) -> Self {
        Self::with_details(url, None, None, settings)
    }

    /// Builds a request for a stream with optional subtitles and license key
    ///
    /// The adaptive player is only requested for manifest URLs when the user
    /// allows it. A license key is only passed on when DRM playback is
    /// enabled.
    pub fn with_details(
        url: String,
        subtitle_url: Option<String>,
        license_key: Option<String>,
        settings: &Settings,
    ) -> Self {
        let manifest_type = ManifestType::detect(&url);

        let adaptive = if settings.use_inputstream_adaptive && manifest_type.is_some() {
            let drm = license_key
                .filter(|_| settings.can_play_drm())
                .map(|license_key| DrmHint {
                    license_type: WIDEVINE,
                    license_key,
                });
            Some(AdaptiveHint { manifest_type, drm })
        } else {
            None
        };

        let subtitles = if settings.show_subtitles {
            subtitle_url.into_iter().collect()
        } else {
            Vec::new()
        };

        Self {
            url,
            max_bandwidth_bps: settings.max_bandwidth_kbps().map(|kbps| kbps * 1000),
            adaptive,
            subtitles,
            show_subtitles: settings.show_subtitles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_detection() {
        assert_eq!(
            ManifestType::detect("https://cdn/x/manifest.mpd?token=1"),
            Some(ManifestType::Mpd)
        );
        assert_eq!(
            ManifestType::detect("https://cdn/x/index.m3u8"),
            Some(ManifestType::Hls)
        );
        assert_eq!(ManifestType::detect("https://cdn/video.mp4"), None);
        assert_eq!(
            ManifestType::Hls.mime_type(),
            "application/vnd.apple.mpegurl"
        );
    }

    #[test]
    fn test_plain_stream() {
        let settings = Settings {
            max_bandwidth: 5000,
            ..Settings::default()
        };
        let request = PlaybackRequest::new("https://cdn/video.mp4".to_string(), &settings);

        assert_eq!(request.max_bandwidth_bps, Some(5_000_000));
        assert_eq!(request.adaptive, None);
        assert!(request.subtitles.is_empty());
        assert!(request.show_subtitles);
    }

    #[test]
    fn test_adaptive_stream_with_drm() {
        let request = PlaybackRequest::with_details(
            "https://cdn/manifest.mpd".to_string(),
            Some("https://cdn/subs.vtt".to_string()),
            Some("https://license".to_string()),
            &Settings::default(),
        );

        let adaptive = request.adaptive.unwrap();
        assert_eq!(adaptive.manifest_type, Some(ManifestType::Mpd));
        assert_eq!(
            adaptive.drm,
            Some(DrmHint {
                license_type: WIDEVINE,
                license_key: "https://license".to_string(),
            })
        );
        assert_eq!(request.subtitles, vec!["https://cdn/subs.vtt".to_string()]);
    }

    #[test]
    fn test_drm_disabled_drops_license() {
        let settings = Settings {
            use_drm: false,
            show_subtitles: false,
            ..Settings::default()
        };
        let request = PlaybackRequest::with_details(
            "https://cdn/manifest.mpd".to_string(),
            Some("https://cdn/subs.vtt".to_string()),
            Some("https://license".to_string()),
            &settings,
        );

        assert_eq!(request.adaptive.unwrap().drm, None);
        assert!(request.subtitles.is_empty());
        assert!(!request.show_subtitles);
    }
}
