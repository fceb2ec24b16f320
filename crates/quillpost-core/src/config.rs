//! Configuration module
//!
//! Settings are read once from the environment into an immutable
//! [`BlogSettings`] snapshot. Handlers receive the snapshot through their
//! state and never write to it.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const IMAGE_CACHE_SLIDING_EXPIRATION_MINUTES: u64 = 60;
const IMAGE_CACHE_MAX_ENTRIES: u64 = 1024;
const MAX_FILE_SIZE_MB: usize = 10;
const CAPTCHA_WIDTH: u32 = 100;
const CAPTCHA_HEIGHT: u32 = 36;
const WATERMARK_FONT_SIZE: u32 = 20;
const WATERMARK_SKIP_PIXEL_THRESHOLD: u64 = 40_000;
const POST_LIST_PAGE_SIZE: u32 = 10;
const HOT_TAG_AMOUNT: u32 = 10;

/// HTTP server and deployment settings
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Bearer key that guards the upload endpoint
    pub admin_api_key: String,
    pub http_concurrency_limit: usize,
    /// Root for the static fallback assets (placeholder avatar, not-found image)
    pub static_root: PathBuf,
}

/// Which storage provider backs the image store
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub local_path: PathBuf,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ImageSettings {
    pub cache_sliding_expiration_minutes: u64,
    pub cache_max_entries: u64,
    pub max_file_size_bytes: usize,
    pub font_path: Option<PathBuf>,
    pub captcha_width: u32,
    pub captcha_height: u32,
}

#[derive(Clone, Debug)]
pub struct WatermarkSettings {
    pub enabled: bool,
    pub text: String,
    pub font_size: u32,
    /// Also store the unwatermarked upload under an "origin" name
    pub keep_origin: bool,
    /// Images with fewer pixels than this are stored without a watermark
    pub skip_pixel_threshold: u64,
}

#[derive(Clone, Debug)]
pub struct CdnSettings {
    pub enabled: bool,
    pub endpoint: String,
}

/// Blog content settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentSettings {
    pub enable_comments: bool,
    pub enable_word_filter: bool,
    pub use_friendly_not_found_image: bool,
    pub post_list_page_size: u32,
    pub hot_tag_amount: u32,
    pub disharmony_words: String,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            enable_comments: true,
            enable_word_filter: false,
            use_friendly_not_found_image: true,
            post_list_page_size: POST_LIST_PAGE_SIZE,
            hot_tag_amount: HOT_TAG_AMOUNT,
            disharmony_words: String::new(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct GeneralSettings {
    /// Base64 encoded blogger avatar; the static placeholder is served when absent
    pub avatar_base64: Option<String>,
}

/// Process-wide settings snapshot.
#[derive(Clone, Debug)]
pub struct BlogSettings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub image: ImageSettings,
    pub watermark: WatermarkSettings,
    pub cdn: CdnSettings,
    pub content: ContentSettings,
    pub general: GeneralSettings,
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BlogSettings {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server = ServerSettings {
            port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            admin_api_key: env::var("ADMIN_API_KEY")
                .map_err(|_| anyhow::anyhow!("ADMIN_API_KEY must be set for image uploads"))?,
            http_concurrency_limit: env_or("HTTP_CONCURRENCY_LIMIT", HTTP_CONCURRENCY_LIMIT)
                .max(1),
            static_root: PathBuf::from(
                env_opt("STATIC_ROOT").unwrap_or_else(|| "wwwroot".to_string()),
            ),
        };

        let backend = match env_opt("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Local,
        };
        let storage = StorageSettings {
            backend,
            local_path: PathBuf::from(
                env_opt("LOCAL_STORAGE_PATH").unwrap_or_else(|| "data/images".to_string()),
            ),
            s3_bucket: env_opt("S3_BUCKET"),
            s3_region: env_opt("S3_REGION").or_else(|| env_opt("AWS_REGION")),
            s3_endpoint: env_opt("S3_ENDPOINT"),
        };

        let image = ImageSettings {
            cache_sliding_expiration_minutes: env_or(
                "IMAGE_CACHE_SLIDING_EXPIRATION_MINUTES",
                IMAGE_CACHE_SLIDING_EXPIRATION_MINUTES,
            ),
            cache_max_entries: env_or("IMAGE_CACHE_MAX_ENTRIES", IMAGE_CACHE_MAX_ENTRIES),
            max_file_size_bytes: env_or("MAX_FILE_SIZE_MB", MAX_FILE_SIZE_MB) * 1024 * 1024,
            font_path: env_opt("FONT_PATH").map(PathBuf::from),
            captcha_width: env_or("CAPTCHA_WIDTH", CAPTCHA_WIDTH),
            captcha_height: env_or("CAPTCHA_HEIGHT", CAPTCHA_HEIGHT),
        };

        let watermark = WatermarkSettings {
            enabled: env_flag("WATERMARK_ENABLED", false),
            text: env_opt("WATERMARK_TEXT").unwrap_or_else(|| "quillpost".to_string()),
            font_size: env_or("WATERMARK_FONT_SIZE", WATERMARK_FONT_SIZE),
            keep_origin: env_flag("WATERMARK_KEEP_ORIGIN", false),
            skip_pixel_threshold: env_or(
                "WATERMARK_SKIP_PIXEL_THRESHOLD",
                WATERMARK_SKIP_PIXEL_THRESHOLD,
            ),
        };

        let cdn = CdnSettings {
            enabled: env_flag("CDN_ENABLED", false),
            endpoint: env_opt("CDN_ENDPOINT").unwrap_or_default(),
        };

        let defaults = ContentSettings::default();
        let content = ContentSettings {
            enable_comments: env_flag("ENABLE_COMMENTS", defaults.enable_comments),
            enable_word_filter: env_flag("ENABLE_WORD_FILTER", defaults.enable_word_filter),
            use_friendly_not_found_image: env_flag(
                "USE_FRIENDLY_NOT_FOUND_IMAGE",
                defaults.use_friendly_not_found_image,
            ),
            post_list_page_size: env_or("POST_LIST_PAGE_SIZE", defaults.post_list_page_size),
            hot_tag_amount: env_or("HOT_TAG_AMOUNT", defaults.hot_tag_amount),
            disharmony_words: env::var("DISHARMONY_WORDS").unwrap_or(defaults.disharmony_words),
        };

        let general = GeneralSettings {
            avatar_base64: env_opt("AVATAR_BASE64"),
        };

        let settings = BlogSettings {
            server,
            storage,
            image,
            watermark,
            cdn,
            content,
            general,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.server.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Reject combinations that would only fail later at request time.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.admin_api_key.trim().is_empty() {
            return Err(anyhow::anyhow!("ADMIN_API_KEY cannot be empty"));
        }

        if self.is_production() && self.server.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.cdn.enabled && self.cdn.endpoint.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "CDN_ENDPOINT must be set when CDN_ENABLED is true"
            ));
        }

        if self.watermark.enabled {
            if self.image.font_path.is_none() {
                return Err(anyhow::anyhow!(
                    "FONT_PATH must be set when WATERMARK_ENABLED is true"
                ));
            }
            if self.watermark.font_size == 0 {
                return Err(anyhow::anyhow!("WATERMARK_FONT_SIZE must be positive"));
            }
        }

        if self.storage.backend == StorageBackend::S3
            && (self.storage.s3_bucket.is_none() || self.storage.s3_region.is_none())
        {
            return Err(anyhow::anyhow!(
                "S3_BUCKET and S3_REGION (or AWS_REGION) are required for the s3 backend"
            ));
        }

        if self.content.post_list_page_size == 0 || self.content.hot_tag_amount == 0 {
            return Err(anyhow::anyhow!(
                "POST_LIST_PAGE_SIZE and HOT_TAG_AMOUNT must be positive"
            ));
        }

        if self.image.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be positive"));
        }

        Ok(())
    }
}

impl Default for BlogSettings {
    /// Development defaults; the admin key is a placeholder that callers override.
    fn default() -> Self {
        Self {
            server: ServerSettings {
                port: SERVER_PORT,
                environment: "development".to_string(),
                cors_origins: vec!["*".to_string()],
                admin_api_key: "change-me".to_string(),
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
                static_root: PathBuf::from("wwwroot"),
            },
            storage: StorageSettings {
                backend: StorageBackend::Local,
                local_path: PathBuf::from("data/images"),
                s3_bucket: None,
                s3_region: None,
                s3_endpoint: None,
            },
            image: ImageSettings {
                cache_sliding_expiration_minutes: IMAGE_CACHE_SLIDING_EXPIRATION_MINUTES,
                cache_max_entries: IMAGE_CACHE_MAX_ENTRIES,
                max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
                font_path: None,
                captcha_width: CAPTCHA_WIDTH,
                captcha_height: CAPTCHA_HEIGHT,
            },
            watermark: WatermarkSettings {
                enabled: false,
                text: "quillpost".to_string(),
                font_size: WATERMARK_FONT_SIZE,
                keep_origin: false,
                skip_pixel_threshold: WATERMARK_SKIP_PIXEL_THRESHOLD,
            },
            cdn: CdnSettings {
                enabled: false,
                endpoint: String::new(),
            },
            content: ContentSettings::default(),
            general: GeneralSettings::default(),
        }
    }
}
