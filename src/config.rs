//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，环境变量可覆盖后端地址和 Token

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

use crate::models::ITEMS_PER_PAGE;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
    /// 对外访问地址，列表导航 URL 以此为根
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

/// 后端 REST 接口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// 后端根地址，接口路径 api/aktiens、api/symbols 相对于此地址
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 转发给后端的 Bearer Token（为空则不携带）
    #[serde(default)]
    pub api_token: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 分页配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PagingConfig {
    /// 每页条数
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub paging: PagingConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 9000 }
fn default_public_url() -> String { "http://localhost:9000/".to_string() }
fn default_base_url() -> String { "http://localhost:8080/".to_string() }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_items_per_page() -> u32 { ITEMS_PER_PAGE }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
            public_url: default_public_url(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_token: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值；最后应用环境变量覆盖
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env(|key| env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }

    /// 环境变量覆盖：BACKEND_URL、BACKEND_TOKEN
    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(url) = lookup("BACKEND_URL").filter(|v| !v.trim().is_empty()) {
            log::info!("使用环境变量中的后端地址: {}", url);
            self.backend.base_url = url;
        }
        if let Some(token) = lookup("BACKEND_TOKEN") {
            self.backend.api_token = token;
        }
        if self.paging.items_per_page == 0 {
            log::warn!("每页条数不能为 0，改用默认值 {}", ITEMS_PER_PAGE);
            self.paging.items_per_page = ITEMS_PER_PAGE;
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"backend":{"base_url":"http://aktien:8080/"}}"#).unwrap();
        assert_eq!(config.backend.base_url, "http://aktien:8080/");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.paging.items_per_page, 20);
        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.paging.items_per_page = 0;
        config.apply_env(|key| match key {
            "BACKEND_URL" => Some("http://other:8081/".to_string()),
            "BACKEND_TOKEN" => Some("jwt".to_string()),
            _ => None,
        });
        assert_eq!(config.backend.base_url, "http://other:8081/");
        assert_eq!(config.backend.api_token, "jwt");
        assert_eq!(config.paging.items_per_page, 20);
    }
}
