//! YouTube video identifier parsing and validation.

use regex::Regex;

/// A valid YouTube video id is exactly 11 characters of `[A-Za-z0-9_-]`.
pub fn is_valid_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Extract a video id from user input.
///
/// Accepts the common URL shapes (`watch?v=`, `youtu.be/`, `embed/`, `v/`,
/// `e/`, `u/<user>/`, `shorts/`) as well as a bare 11-character id, and
/// returns `None` for anything unparseable.
pub fn get_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(re) = Regex::new(r"(?:youtu\.be/|/v/|/e/|/u/\w+/|embed/|v=)([^#&?/\s]*)") {
        if let Some(caps) = re.captures(input) {
            let id = &caps[1];
            if is_valid_video_id(id) {
                return Some(id.to_string());
            }
        }
    }

    if let Ok(re) = Regex::new(r"youtube\.com/shorts/([^#&?/\s]*)") {
        if let Some(caps) = re.captures(input) {
            let id = &caps[1];
            if is_valid_video_id(id) {
                return Some(id.to_string());
            }
        }
    }

    if is_valid_video_id(input) {
        return Some(input.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_video_ids() {
        assert!(is_valid_video_id("dQw4w9WgXcQ"));
        assert!(is_valid_video_id("___________"));
        assert!(is_valid_video_id("a1b2c3d4-_e"));
    }

    #[test]
    fn test_invalid_video_ids() {
        assert!(!is_valid_video_id(""));
        assert!(!is_valid_video_id("short"));
        assert!(!is_valid_video_id("waytoolongid"));
        assert!(!is_valid_video_id("has space!!"));
        assert!(!is_valid_video_id("dQw4w9WgXc?"));
    }

    #[test]
    fn test_extract_from_watch_url() {
        assert_eq!(
            get_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            get_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_from_short_url() {
        assert_eq!(
            get_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            get_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_from_shorts_url() {
        assert_eq!(
            get_video_id("https://www.youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_from_embed_url() {
        assert_eq!(
            get_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_bare_id_passthrough() {
        assert_eq!(get_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));
    }

    #[test]
    fn test_unparseable_input() {
        assert_eq!(get_video_id(""), None);
        assert_eq!(get_video_id("not a url"), None);
        assert_eq!(get_video_id("https://example.com/watch?v=short"), None);
        assert_eq!(get_video_id("https://youtu.be/"), None);
    }
}
