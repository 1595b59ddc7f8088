use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Hosts that TikTok video links live on.
const TIKTOK_HOSTS: [&str; 3] = ["tiktok.com", "www.tiktok.com", "vm.tiktok.com"];

/// Check if `input` is a link to a TikTok video, and parse it if so.
///
/// Accepted are full video links like
/// `https://www.tiktok.com/@someone/video/1234567890` and short links like
/// `https://vm.tiktok.com/t/ZMabcdef`. Anything after the video part
/// (like a `?is_from_webapp=1` query) is left alone.
#[must_use]
pub fn parse_tiktok_url(input: &str) -> Option<Url> {
    static VIDEO_PATH: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^/(@[\w.]+/video/\d+|t/\w+)").expect("Regex will always be valid")
    });

    let url = Url::parse(input.trim()).ok()?;

    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?.to_ascii_lowercase();
    if !TIKTOK_HOSTS.contains(&host.as_str()) {
        return None;
    }

    // Userinfo or a custom port are nothing a real video link would have.
    if !url.username().is_empty() || url.password().is_some() || url.port().is_some() {
        return None;
    }

    if !VIDEO_PATH.is_match(url.path()) {
        return None;
    }

    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_links() {
        for link in [
            "https://www.tiktok.com/@username/video/1234567890",
            "http://tiktok.com/@user.name_2/video/7300000000000000000",
            "https://vm.tiktok.com/t/ZMabc123/",
            "https://www.tiktok.com/@username/video/1234567890?is_from_webapp=1",
            "  https://WWW.TikTok.com/@username/video/1  ",
        ] {
            assert!(parse_tiktok_url(link).is_some(), "{link}");
        }
    }

    #[test]
    fn not_video_links() {
        for link in [
            "",
            "tiktok",
            "www.tiktok.com/@username/video/1234567890",
            "ftp://www.tiktok.com/@username/video/1234567890",
            "https://www.tiktok.com/",
            "https://www.tiktok.com/@username",
            "https://www.tiktok.com/@username/video/abc",
            "https://notiktok.com/@username/video/1234567890",
            "https://tiktok.com.evil.example/@username/video/1234567890",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://me@www.tiktok.com/@username/video/1234567890",
        ] {
            assert!(parse_tiktok_url(link).is_none(), "{link}");
        }
    }
}
