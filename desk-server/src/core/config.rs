/// 服务配置 - 前台服务的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | HOTEL_API_URL | http://localhost:8080 | 远程酒店 API 地址 |
/// | HOTEL_API_TOKEN | (空) | 远程 API 访问令牌 |
/// | REQUEST_TIMEOUT_MS | 30000 | 远程调用超时(毫秒) |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_DIR | (空) | 日志文件目录，未设置时仅输出到控制台 |
///
/// 注意：税率、押金等酒店业务参数不在这里 —— 它们来自远程设置接口
/// (`SettingsProvider`)，每次结算时读取。
///
/// # 示例
///
/// ```ignore
/// HOTEL_API_URL=https://pms.example.com HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 远程酒店 API 地址
    pub hotel_api_url: String,
    /// 远程 API 访问令牌
    pub hotel_api_token: Option<String>,
    /// 远程调用超时 (毫秒)
    pub request_timeout_ms: u64,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 日志文件目录
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            hotel_api_url: std::env::var("HOTEL_API_URL")
                .unwrap_or_else(|_| "http://localhost:8080".into()),
            hotel_api_token: std::env::var("HOTEL_API_TOKEN").ok().filter(|t| !t.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
