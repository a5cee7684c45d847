//! Delivery URL transformer
//!
//! Rewrites an image host delivery URL such as
//! `https://res.example.com/demo/image/upload/v1712/campus/photo.jpg` so that
//! it carries a transformation directive segment in front of the version
//! segment, e.g. `.../upload/w_400,h_auto,c_scale/v1712/campus/photo.jpg`.
//! No network I/O happens here.

/// Default crop mode, applied whenever a size is requested
pub const DEFAULT_CROP: &str = "scale";
/// Sentinel meaning "let the host decide" for quality and format
pub const AUTO: &str = "auto";

/// Transformation options for a display URL.
///
/// Every field defaults independently; only options that differ from their
/// default end up in the directive segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub crop: String,
    pub quality: String,
    pub format: String,
    pub effect: Option<String>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            crop: DEFAULT_CROP.to_string(),
            quality: AUTO.to_string(),
            format: AUTO.to_string(),
            effect: None,
        }
    }
}

impl TransformOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set both width and height
    pub fn dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Crop mode, e.g. "scale", "fill", "fit"
    pub fn crop(mut self, crop: &str) -> Self {
        self.crop = crop.to_string();
        self
    }

    /// Quality: "auto" or a number such as "80"
    pub fn quality(mut self, quality: &str) -> Self {
        self.quality = quality.to_string();
        self
    }

    /// Output format: "auto", "jpg", "png", "webp", ...
    pub fn format(mut self, format: &str) -> Self {
        self.format = format.to_string();
        self
    }

    /// Named effect, e.g. "grayscale"
    pub fn effect(mut self, effect: &str) -> Self {
        self.effect = Some(effect.to_string());
        self
    }

    /// Directive parts in host order; empty when nothing differs from defaults.
    pub fn directive_parts(&self) -> Vec<String> {
        let mut parts = Vec::new();

        if self.width.is_some() || self.height.is_some() {
            let width = self
                .width
                .map(|w| w.to_string())
                .unwrap_or_else(|| AUTO.to_string());
            let height = self
                .height
                .map(|h| h.to_string())
                .unwrap_or_else(|| AUTO.to_string());
            parts.push(format!("w_{},h_{},c_{}", width, height, self.crop));
        }

        if self.quality != AUTO {
            parts.push(format!("q_{}", self.quality));
        }

        if self.format != AUTO {
            parts.push(format!("f_{}", self.format));
        }

        if let Some(ref effect) = self.effect {
            parts.push(format!("e_{}", effect));
        }

        parts
    }
}

/// A version segment is `v` followed by one or more ASCII digits.
fn is_version_segment(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .map(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .unwrap_or(false)
}

/// Insert the directive segment for `options` in front of the version segment.
///
/// URLs without a version segment are returned unchanged.
pub fn transform_url(url: &str, options: &TransformOptions) -> String {
    let segments: Vec<&str> = url.split('/').collect();

    let version_index = match segments.iter().position(|s| is_version_segment(s)) {
        Some(index) => index,
        None => {
            tracing::debug!(url = %url, "No version segment in delivery URL, leaving it unchanged");
            return url.to_string();
        }
    };

    let prefix = segments[..version_index].join("/");
    let version = segments[version_index];
    let rest = segments[version_index + 1..].join("/");

    let parts = options.directive_parts();
    let directive = if parts.is_empty() {
        String::new()
    } else {
        format!("{}/", parts.join(","))
    };

    format!("{}/{}{}/{}", prefix, directive, version, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_directive() {
        let options = TransformOptions::new().dimensions(100, 100).crop("scale");
        assert_eq!(
            transform_url("https://host/x/v123/publicid.jpg", &options),
            "https://host/x/w_100,h_100,c_scale/v123/publicid.jpg"
        );
    }

    #[test]
    fn test_no_version_segment_is_noop() {
        let options = TransformOptions::new().width(300);
        let url = "https://host/x/publicid.jpg";
        assert_eq!(transform_url(url, &options), url);
    }

    #[test]
    fn test_defaults_insert_no_directive() {
        let url = "https://host/demo/image/upload/v1712/campus/photo.jpg";
        assert_eq!(transform_url(url, &TransformOptions::default()), url);
    }

    #[test]
    fn test_width_only_uses_auto_height() {
        let options = TransformOptions::new().width(400);
        assert_eq!(
            transform_url("https://host/upload/v9/a.jpg", &options),
            "https://host/upload/w_400,h_auto,c_scale/v9/a.jpg"
        );
    }

    #[test]
    fn test_all_options_in_order() {
        let options = TransformOptions::new()
            .dimensions(800, 600)
            .crop("fill")
            .quality("80")
            .format("webp")
            .effect("grayscale");
        assert_eq!(
            transform_url("https://host/upload/v1/folder/a.jpg", &options),
            "https://host/upload/w_800,h_600,c_fill,q_80,f_webp,e_grayscale/v1/folder/a.jpg"
        );
    }

    #[test]
    fn test_nested_public_id_is_preserved() {
        let options = TransformOptions::new().quality("60");
        assert_eq!(
            transform_url("https://host/upload/v42/campus/markers/a.png", &options),
            "https://host/upload/q_60/v42/campus/markers/a.png"
        );
    }

    #[test]
    fn test_version_segment_requires_digits() {
        assert!(is_version_segment("v123"));
        assert!(!is_version_segment("v"));
        assert!(!is_version_segment("video.example.com"));
        assert!(!is_version_segment("v1_1"));

        // Hosts starting with "v" are not mistaken for the version.
        let options = TransformOptions::new().width(10);
        assert_eq!(
            transform_url("https://videos.host/upload/v5/a.jpg", &options),
            "https://videos.host/upload/w_10,h_auto,c_scale/v5/a.jpg"
        );
    }

    #[test]
    fn test_malformed_input_degrades_to_unchanged() {
        let options = TransformOptions::new().width(10);
        assert_eq!(transform_url("", &options), "");
        assert_eq!(transform_url("not a url", &options), "not a url");
    }
}
