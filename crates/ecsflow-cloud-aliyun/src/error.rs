//! Alibaba Cloud provider error types

use ecsflow_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AliyunError {
    #[error("aliyun CLI not found. Please install: brew install aliyun-cli")]
    CliNotFound,

    #[error("aliyun authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("aliyun command failed: {0}")]
    CommandFailed(String),

    #[error("Instance not found: {0}")]
    InstanceNotFound(String),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AliyunError>;

impl From<AliyunError> for CloudError {
    fn from(err: AliyunError) -> Self {
        match err {
            AliyunError::AuthenticationFailed(msg) => CloudError::AuthenticationFailed(msg),
            AliyunError::InstanceNotFound(id) => CloudError::ResourceNotFound(id),
            AliyunError::JsonError(e) => CloudError::InvalidResponse(e.to_string()),
            AliyunError::CliNotFound => {
                CloudError::CommandFailed(AliyunError::CliNotFound.to_string())
            }
            AliyunError::CommandFailed(msg) => CloudError::ApiError(msg),
            AliyunError::IoError(e) => CloudError::Io(e),
        }
    }
}
