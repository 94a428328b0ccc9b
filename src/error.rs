//! 统一错误类型
//!
//! 业务层的"调用成功但被拒绝"与真正的故障区分开：
//! - `Rejected` / `Validation` 返回 HTTP 200，信封中 `success: false`
//! - 认证、权限、请求体错误返回对应的 4xx
//! - 数据库、配置、IO、导出等内部错误统一返回 500，详细信息只写日志

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use thiserror::Error;

use crate::envelope::Envelope;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn rejected(message: impl Into<String>) -> Self {
        AppError::Rejected(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Rejected(_) | AppError::Validation(_) => StatusCode::OK,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Io(_)
            | AppError::Export(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的消息（内部错误不暴露细节）
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            log::error!("请求处理失败: {}", self);
        } else if status != StatusCode::OK {
            log::debug!("请求被拒绝 ({}): {}", status, self);
        }

        (status, Json(Envelope::<()>::failure(self.public_message()))).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl From<printpdf::Error> for AppError {
    fn from(err: printpdf::Error) -> Self {
        AppError::Export(err.to_string())
    }
}

impl From<qrcode::types::QrError> for AppError {
    fn from(err: qrcode::types::QrError) -> Self {
        AppError::Export(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reported_failures_keep_http_ok() {
        assert_eq!(AppError::rejected("nope").status_code(), StatusCode::OK);
        assert_eq!(AppError::validation("bad").status_code(), StatusCode::OK);
        assert_eq!(AppError::Unauthorized.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = AppError::Database(DbErr::Custom("secret table".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");

        let err = AppError::rejected("License expired");
        assert_eq!(err.public_message(), "License expired");
    }
}
