//! Synthesized placeholder for images that are neither cached nor
//! reachable. A blank broken image is worse UX than an explicit
//! placeholder, so image failures get a small vector graphic instead.

use bytes::Bytes;

use crate::resolve::{Resolved, ResponseSource};

/// Placeholder edge length in pixels, matching the app's largest icon.
const SIZE: u32 = 192;

/// Solid background color of the placeholder.
const BACKGROUND: &str = "#3b82f6";

/// Build the placeholder response: a minimal SVG with a solid background
/// and a centered label glyph. Marked non-cacheable so a recovered network
/// replaces it on the next request.
pub fn placeholder_image(label: &str) -> Resolved {
    let label = escape_xml(label);
    let center = SIZE / 2;
    let baseline = center + 14;
    let svg = format!(
        r#"<svg width="{SIZE}" height="{SIZE}" xmlns="http://www.w3.org/2000/svg">
  <rect width="{SIZE}" height="{SIZE}" fill="{BACKGROUND}"/>
  <text x="{center}" y="{baseline}" font-family="Arial, sans-serif" font-size="48"
        fill="white" text-anchor="middle" font-weight="bold">{label}</text>
</svg>
"#
    );

    Resolved {
        status: 200,
        headers: vec![
            ("content-type".to_string(), "image/svg+xml".to_string()),
            ("cache-control".to_string(), "no-cache".to_string()),
        ],
        body: Bytes::from(svg),
        source: ResponseSource::Fallback,
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
