//! Desk Server - 酒店前台结算服务
//!
//! # 架构概述
//!
//! 本模块是前台服务的主入口，提供以下核心功能：
//!
//! - **结算** (`billing`): 房费计算、付款台账、押金、退房状态机
//! - **夜审** (`night_audit`): 日终批量过账与报表
//! - **数据源** (`providers`): 远程酒店 API 的抽象与实现
//! - **HTTP API** (`api`): 管理后台使用的 RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! desk-server/src/
//! ├── core/          # 配置、状态
//! ├── utils/         # 错误、日志
//! ├── billing/       # 房费、台账、押金、退房流程
//! ├── night_audit/   # 夜审过账
//! ├── providers/     # 远程 API 抽象 (HTTP / 内存)
//! └── api/           # HTTP 路由和处理器
//! ```

pub mod api;
pub mod billing;
pub mod core;
pub mod night_audit;
pub mod providers;
pub mod utils;

// Re-export 公共类型
pub use billing::{CheckoutFlow, CheckoutState, DepositManager, PaymentLedger};
pub use crate::core::{AppState, Config};
pub use night_audit::NightAuditPoster;
pub use providers::{MemoryProviders, Providers};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
