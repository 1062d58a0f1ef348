use std::sync::Arc;

use crate::core::Config;
use crate::providers::Providers;

/// 应用状态 - 持有配置与数据源的共享引用
///
/// AppState 是 HTTP 层的核心数据结构。使用 Arc 实现浅拷贝，
/// 每个请求处理器拿到的都是同一份配置和同一组 provider。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Arc<Config> | 配置项 (不可变) |
/// | providers | Providers | 远程酒店 API 的抽象句柄 |
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub providers: Providers,
}

impl AppState {
    pub fn new(config: Config, providers: Providers) -> Self {
        Self {
            config: Arc::new(config),
            providers,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
