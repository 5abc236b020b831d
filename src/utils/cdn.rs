// src/utils/cdn.rs

//! Media CDN URL templating.
//!
//! The CDN is never called; image variants are requested purely by encoding
//! transformations into the delivery URL:
//!
//! ```text
//! https://res.cloudinary.com/{cloud}/image/upload[/w_300,h_200,q_auto,f_webp,c_fill]/{public_id}
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

const DELIVERY_HOST: &str = "https://res.cloudinary.com";

/// Quality setting for a transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Auto,
    Value(u8),
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Auto => f.write_str("auto"),
            Quality::Value(v) => write!(f, "{v}"),
        }
    }
}

impl FromStr for Quality {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Quality::Auto);
        }
        match s.parse::<u8>() {
            Ok(v) if (1..=100).contains(&v) => Ok(Quality::Value(v)),
            _ => Err(AppError::validation(format!(
                "quality must be 'auto' or 1-100, got '{s}'"
            ))),
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Auto,
    Webp,
    Jpg,
    Png,
}

impl ImageFormat {
    fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Auto => "auto",
            ImageFormat::Webp => "webp",
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ImageFormat::Auto),
            "webp" => Ok(ImageFormat::Webp),
            "jpg" | "jpeg" => Ok(ImageFormat::Jpg),
            "png" => Ok(ImageFormat::Png),
            _ => Err(AppError::validation(format!("unknown image format '{s}'"))),
        }
    }
}

/// Crop mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crop {
    Fill,
    Scale,
    Fit,
    Pad,
}

impl Crop {
    fn as_str(&self) -> &'static str {
        match self {
            Crop::Fill => "fill",
            Crop::Scale => "scale",
            Crop::Fit => "fit",
            Crop::Pad => "pad",
        }
    }
}

impl FromStr for Crop {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fill" => Ok(Crop::Fill),
            "scale" => Ok(Crop::Scale),
            "fit" => Ok(Crop::Fit),
            "pad" => Ok(Crop::Pad),
            _ => Err(AppError::validation(format!("unknown crop mode '{s}'"))),
        }
    }
}

/// Image transformation parameters. Unset fields are omitted from the URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Transform {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<Quality>,
    pub format: Option<ImageFormat>,
    pub crop: Option<Crop>,
}

impl Transform {
    pub fn width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn quality(mut self, quality: Quality) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    pub fn crop(mut self, crop: Crop) -> Self {
        self.crop = Some(crop);
        self
    }

    /// Comma-joined transformation segment, empty when nothing is set.
    fn segment(&self) -> String {
        let mut parts = Vec::new();
        if let Some(w) = self.width {
            parts.push(format!("w_{w}"));
        }
        if let Some(h) = self.height {
            parts.push(format!("h_{h}"));
        }
        if let Some(q) = self.quality {
            parts.push(format!("q_{q}"));
        }
        if let Some(f) = self.format {
            parts.push(format!("f_{}", f.as_str()));
        }
        if let Some(c) = self.crop {
            parts.push(format!("c_{}", c.as_str()));
        }
        parts.join(",")
    }
}

/// Builds delivery URLs for one CDN account.
#[derive(Debug, Clone)]
pub struct CdnUrlBuilder {
    cloud_name: String,
}

impl CdnUrlBuilder {
    pub fn new(cloud_name: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
        }
    }

    /// Base delivery URL for uploaded images.
    pub fn base_url(&self) -> String {
        format!("{DELIVERY_HOST}/{}/image/upload", self.cloud_name)
    }

    /// Delivery URL for `public_id` with the given transformations.
    pub fn url(&self, public_id: &str, transform: &Transform) -> String {
        let public_id = public_id.trim_start_matches('/');
        let segment = transform.segment();
        if segment.is_empty() {
            format!("{}/{public_id}", self.base_url())
        } else {
            format!("{}/{segment}/{public_id}", self.base_url())
        }
    }

    /// Whether `url` is served by this CDN.
    pub fn is_cdn_url(url: &str) -> bool {
        super::url::get_domain(url)
            .map(|d| d == "cloudinary.com" || d.ends_with(".cloudinary.com"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_without_transformations() {
        let cdn = CdnUrlBuilder::new("demo");
        assert_eq!(
            cdn.url("sample.jpg", &Transform::default()),
            "https://res.cloudinary.com/demo/image/upload/sample.jpg"
        );
    }

    #[test]
    fn url_with_all_transformations_in_order() {
        let cdn = CdnUrlBuilder::new("demo");
        let t = Transform::default()
            .crop(Crop::Fill)
            .format(ImageFormat::Webp)
            .quality(Quality::Auto)
            .height(200)
            .width(300);
        assert_eq!(
            cdn.url("blog/cover.jpg", &t),
            "https://res.cloudinary.com/demo/image/upload/w_300,h_200,q_auto,f_webp,c_fill/blog/cover.jpg"
        );
    }

    #[test]
    fn numeric_quality() {
        let cdn = CdnUrlBuilder::new("acme");
        let t = Transform::default().quality(Quality::Value(80));
        assert_eq!(
            cdn.url("/x.png", &t),
            "https://res.cloudinary.com/acme/image/upload/q_80/x.png"
        );
    }

    #[test]
    fn detects_cdn_urls() {
        assert!(CdnUrlBuilder::is_cdn_url(
            "https://res.cloudinary.com/demo/image/upload/x.png"
        ));
        assert!(!CdnUrlBuilder::is_cdn_url("https://notcloudinary.com/x.png"));
        assert!(!CdnUrlBuilder::is_cdn_url("/uploads/x.png"));
    }

    #[test]
    fn parse_options() {
        assert_eq!("auto".parse::<Quality>().unwrap(), Quality::Auto);
        assert_eq!("75".parse::<Quality>().unwrap(), Quality::Value(75));
        assert!("0".parse::<Quality>().is_err());
        assert!("best".parse::<Quality>().is_err());
        assert_eq!("JPEG".parse::<ImageFormat>().unwrap(), ImageFormat::Jpg);
        assert_eq!("fit".parse::<Crop>().unwrap(), Crop::Fit);
        assert!("stretch".parse::<Crop>().is_err());
    }
}
