//! Runtime configuration
//!
//! All settings come from environment variables with local-development
//! defaults. The image provider credential is never defaulted.

use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8050;
pub const DEFAULT_HEATMAP_YEAR: i64 = 2022;
pub const DEFAULT_SPECIES: &str = "Lesser Snow Goose";
pub const DEFAULT_GEOJSON_URL: &str =
    "https://raw.githubusercontent.com/PublicaMundi/MappingAPI/master/data/geojson/us-states.json";
pub const DEFAULT_IMAGE_API_URL: &str = "https://api.openai.com/v1/images/generations";
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";
pub const DEFAULT_FALLBACK_IMAGE: &str = "/assets/image-unavailable.svg";
pub const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 30;

/// Parameters the view selectors read
#[derive(Debug, Clone)]
pub struct ViewSettings {
    /// Year shown by the geo-scatter heatmap
    pub heatmap_year: i64,
    /// Region-boundary GeoJSON for the choropleth
    pub geojson_url: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            heatmap_year: DEFAULT_HEATMAP_YEAR,
            geojson_url: DEFAULT_GEOJSON_URL.to_string(),
        }
    }
}

/// Image provider settings
#[derive(Clone)]
pub struct ImageSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    pub size: String,
    pub quality: String,
    pub fallback_url: String,
    pub cache_ttl: Duration,
    /// Upper bound on one provider call, fallback after that
    pub timeout: Duration,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_IMAGE_API_URL.to_string(),
            model: DEFAULT_IMAGE_MODEL.to_string(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            fallback_url: DEFAULT_FALLBACK_IMAGE.to_string(),
            cache_ttl: Duration::from_secs(1800),
            timeout: Duration::from_secs(DEFAULT_IMAGE_TIMEOUT_SECS),
        }
    }
}

// Keeps the key out of logs
impl std::fmt::Debug for ImageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("size", &self.size)
            .field("quality", &self.quality)
            .field("fallback_url", &self.fallback_url)
            .field("cache_ttl", &self.cache_ttl)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub yearly_csv: String,
    pub heatmap_csv: String,
    pub host: IpAddr,
    pub port: u16,
    pub default_species: String,
    pub assets_dir: PathBuf,
    pub views: ViewSettings,
    pub image: ImageSettings,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment in production)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let image_defaults = ImageSettings::default();

        Ok(Self {
            data_dir: PathBuf::from(get("DATA_DIR", "data")),
            yearly_csv: get("YEARLY_CSV", "countbyyear.csv"),
            heatmap_csv: get("HEATMAP_CSV", "heatmap.csv"),
            host: parse_var(&lookup, "HOST", IpAddr::from([0, 0, 0, 0]))?,
            port: parse_var(&lookup, "PORT", DEFAULT_PORT)?,
            default_species: get("DEFAULT_SPECIES", DEFAULT_SPECIES),
            assets_dir: PathBuf::from(get("ASSETS_DIR", "assets")),
            views: ViewSettings {
                heatmap_year: parse_var(&lookup, "HEATMAP_YEAR", DEFAULT_HEATMAP_YEAR)?,
                geojson_url: get("GEOJSON_URL", DEFAULT_GEOJSON_URL),
            },
            image: ImageSettings {
                api_key: lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()),
                endpoint: get("IMAGE_API_URL", DEFAULT_IMAGE_API_URL),
                model: get("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
                fallback_url: get("IMAGE_FALLBACK_URL", DEFAULT_FALLBACK_IMAGE),
                cache_ttl: Duration::from_secs(parse_var(&lookup, "IMAGE_CACHE_TTL_SECS", 1800u64)?),
                timeout: Duration::from_secs(parse_var(
                    &lookup,
                    "IMAGE_TIMEOUT_SECS",
                    DEFAULT_IMAGE_TIMEOUT_SECS,
                )?),
                ..image_defaults
            },
        })
    }

    pub fn yearly_path(&self) -> PathBuf {
        self.data_dir.join(&self.yearly_csv)
    }

    pub fn heatmap_path(&self) -> PathBuf {
        self.data_dir.join(&self.heatmap_csv)
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
