//! Console host
//!
//! Implements the host interface on a terminal: listings are printed to
//! stdout, the search keyboard is a prompt, and playback prints the resolved
//! stream URL instead of starting a player.

use dialoguer::Input;
use gabtv::{Host, Listing, PlaybackRequest};

/// Output format for listings and playback requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human readable text
    Text,
    /// One JSON document per listing or playback request
    Json,
}

pub struct ConsoleHost {
    format: OutputFormat,
}

impl ConsoleHost {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn print_json<T: serde::Serialize>(value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error: failed to serialize output: {}", e),
        }
    }
}

impl Host for ConsoleHost {
    fn show_listing(&mut self, listing: Listing) {
        if self.format == OutputFormat::Json {
            Self::print_json(&listing);
            return;
        }

        if !listing.category_label.is_empty() {
            println!("=== {} ===\n", listing.category_label);
        }

        if listing.items.is_empty() {
            println!("Nothing to show.");
            return;
        }

        for (index, item) in listing.items.iter().enumerate() {
            let marker = if item.is_playable { "▶" } else { "📁" };
            println!("[{}] {} {}", index + 1, marker, item.label);
            println!("    -> {}", item.navigation_target);
            if let Some(description) = &item.description {
                for line in description.lines() {
                    println!("    {}", line);
                }
            }
            if let Some(thumb) = &item.artwork.thumb {
                println!("    art: {}", thumb.display());
            }
        }
    }

    fn resolve_playback(&mut self, request: PlaybackRequest) -> bool {
        match self.format {
            OutputFormat::Json => Self::print_json(&request),
            OutputFormat::Text => {
                println!("Stream URL:\n{}", request.url);
                if let Some(bps) = request.max_bandwidth_bps {
                    println!("Bandwidth cap: {} bit/s", bps);
                }
            }
        }
        true
    }

    fn read_text(&mut self, heading: &str) -> Option<String> {
        Input::<String>::new()
            .with_prompt(heading)
            .allow_empty(true)
            .interact_text()
            .ok()
    }

    fn notify_error(&mut self, heading: &str, message: &str) {
        eprintln!("{}: {}", heading, message);
    }

    fn is_playing(&self) -> bool {
        true
    }

    fn abort_requested(&self) -> bool {
        false
    }

    fn set_subtitles_visible(&mut self, _visible: bool) {}
}
