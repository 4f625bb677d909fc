//! Configuration management for Glossa Server

use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub upload: UploadConfig,
    pub notion: NotionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploaded PDFs are stored
    pub dir: String,
    /// Maximum upload size in megabytes
    pub max_size_mb: usize,
}

impl UploadConfig {
    pub fn max_size_bytes(&self) -> usize {
        self.max_size_mb * 1024 * 1024
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotionConfig {
    pub api_key: String,
    /// Page that annotation blocks are appended to
    pub page_id: String,
    pub api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            upload: UploadConfig {
                dir: "uploads".to_string(),
                max_size_mb: 50,
            },
            notion: NotionConfig {
                api_key: String::new(),
                page_id: String::new(),
                api_url: "https://api.notion.com".to_string(),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .unwrap_or(5000),
            },
            upload: UploadConfig {
                dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
                max_size_mb: env::var("UPLOAD_MAX_SIZE_MB")
                    .unwrap_or_else(|_| "50".to_string())
                    .parse()
                    .unwrap_or(50),
            },
            notion: NotionConfig {
                api_key: env::var("NOTION_API_KEY")?,
                page_id: env::var("NOTION_PAGE_ID")?,
                api_url: env::var("NOTION_API_URL")
                    .unwrap_or_else(|_| "https://api.notion.com".to_string()),
            },
        })
    }
}
