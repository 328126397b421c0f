use std::fmt;

/// 聚合器的统一错误类型
#[derive(Debug)]
pub enum ArchiveError {
    /// 上游 API 相关错误
    Api(ApiError),
    /// 快照存储错误
    Store(StoreError),
    /// 配置错误
    Config(ConfigError),
    /// IO 错误
    Io(std::io::Error),
    /// 其他错误
    Other(String),
}

/// 上游 API 相关错误
#[derive(Debug)]
pub enum ApiError {
    /// 网络请求失败
    NetworkError(String),
    /// API 返回错误状态码
    StatusError { status: u16, message: String },
    /// 响应格式无效
    InvalidResponse(String),
}

/// 快照存储错误
#[derive(Debug)]
pub enum StoreError {
    /// 序列化/反序列化错误
    SerializationError(String),
    /// 文件读写失败
    IoError(String),
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 缺少必需的配置项
    MissingField(String),
    /// 配置值无效
    InvalidValue { field: String, message: String },
}

// 实现 Display trait
impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::Api(e) => write!(f, "API Error: {}", e),
            ArchiveError::Store(e) => write!(f, "Store Error: {}", e),
            ArchiveError::Config(e) => write!(f, "Config Error: {}", e),
            ArchiveError::Io(e) => write!(f, "IO Error: {}", e),
            ArchiveError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ApiError::StatusError { status, message } => {
                write!(f, "API error (status {}): {}", status, message)
            }
            ApiError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            StoreError::IoError(msg) => write!(f, "Store IO error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingField(field) => write!(f, "Missing config field: {}", field),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value for '{}': {}", field, message)
            }
        }
    }
}

// 实现 std::error::Error trait
impl std::error::Error for ArchiveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ArchiveError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl std::error::Error for ApiError {}
impl std::error::Error for StoreError {}
impl std::error::Error for ConfigError {}

// From 转换实现
impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        ArchiveError::Io(err)
    }
}

impl From<reqwest::Error> for ArchiveError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ArchiveError::Api(ApiError::NetworkError("Request timeout".to_string()))
        } else if err.is_connect() {
            ArchiveError::Api(ApiError::NetworkError(format!(
                "Connection failed: {}",
                err
            )))
        } else {
            ArchiveError::Api(ApiError::NetworkError(err.to_string()))
        }
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        ArchiveError::Store(StoreError::SerializationError(err.to_string()))
    }
}

impl From<ApiError> for ArchiveError {
    fn from(err: ApiError) -> Self {
        ArchiveError::Api(err)
    }
}

impl From<StoreError> for ArchiveError {
    fn from(err: StoreError) -> Self {
        ArchiveError::Store(err)
    }
}

impl From<ConfigError> for ArchiveError {
    fn from(err: ConfigError) -> Self {
        ArchiveError::Config(err)
    }
}

// 便捷的 Result 类型别名
pub type Result<T> = std::result::Result<T, ArchiveError>;
