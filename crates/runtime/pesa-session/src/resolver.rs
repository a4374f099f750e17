//! Video-source resolver.
//!
//! Extracts the canonical 11-character embeddable identifier from the common
//! share/embed/watch URL shapes. Anything else is an invalid source and must
//! never start a timer.

use std::sync::OnceLock;

use regex::Regex;

static SOURCE_RE: OnceLock<Regex> = OnceLock::new();

fn source_re() -> &'static Regex {
    SOURCE_RE.get_or_init(|| {
        // Recognized shapes: youtu.be/<id>, v/<id>, u/<w>/<id>, embed/<id>,
        // watch?v=<id>, &v=<id>.
        Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
            .expect("source pattern is valid")
    })
}

/// The embeddable id, or `None` when the URL does not yield exactly 11
/// characters.
pub fn resolve_embed_id(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    let caps = source_re().captures(url)?;
    let id = caps.get(2)?.as_str();
    if id.chars().count() == 11 {
        Some(id.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_short_link() {
        assert_eq!(
            resolve_embed_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn resolves_watch_and_embed_shapes() {
        assert_eq!(
            resolve_embed_id("https://www.youtube.com/watch?v=9bZkp7q19f0").as_deref(),
            Some("9bZkp7q19f0")
        );
        assert_eq!(
            resolve_embed_id("https://www.youtube.com/embed/kJQP7kiw5Fk").as_deref(),
            Some("kJQP7kiw5Fk")
        );
        assert_eq!(
            resolve_embed_id("https://www.youtube.com/watch?feature=share&v=kXYiU_JCYtU").as_deref(),
            Some("kXYiU_JCYtU")
        );
    }

    #[test]
    fn strips_trailing_params() {
        assert_eq!(
            resolve_embed_id("https://youtu.be/dQw4w9WgXcQ?t=43").as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn rejects_non_video_urls() {
        assert_eq!(resolve_embed_id("https://example.com/not-a-video"), None);
        assert_eq!(resolve_embed_id(""), None);
        // Right shape, wrong id length.
        assert_eq!(resolve_embed_id("https://youtu.be/short"), None);
    }
}
