//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::CreateMode;
use crate::domain::pomodoro::SettingsPatch;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Session DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub group: String,
    pub controller: String,
    /// 未提供的字段使用服务默认值
    #[serde(default)]
    pub settings: SettingsPatch,
    #[serde(default)]
    pub mode: CreateMode,
}

/// pause / resume / skip / stop 共用
#[derive(Debug, Deserialize)]
pub struct ControlSessionRequest {
    pub group: String,
    pub actor: String,
}

#[derive(Debug, Deserialize)]
pub struct EditSettingsRequest {
    pub group: String,
    pub actor: String,
    pub settings: SettingsPatch,
}

#[derive(Debug, Deserialize)]
pub struct PresenceRequest {
    pub group: String,
    pub participant: String,
}

#[derive(Debug, Deserialize)]
pub struct GetSessionRequest {
    pub group: String,
}
