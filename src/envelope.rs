//! RPC 响应信封：`{ success, data | message }`

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// RPC 处理函数的返回类型
pub type RpcResult<T> = Result<Json<Envelope<T>>, AppError>;

/// 包装成功结果
pub fn ok<T: Serialize>(data: T) -> RpcResult<T> {
    Ok(Json(Envelope::success(data)))
}
