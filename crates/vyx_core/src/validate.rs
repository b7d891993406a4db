use std::sync::LazyLock;

use regex::Regex;

// Anchored at the start only: anything after the 11-character id is accepted.
static VIDEO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://)?(www\.)?(youtube\.com/watch\?v=|youtu\.be/)[A-Za-z0-9_-]{11}")
        .expect("video url pattern compiles")
});

/// Returns true when `input` starts with a short-video-hosting URL carrying an
/// 11-character video id, either `youtube.com/watch?v=<id>` or `youtu.be/<id>`.
///
/// Scheme and `www.` are optional. Pure and total.
pub fn is_valid_video_url(input: &str) -> bool {
    VIDEO_URL.is_match(input)
}
