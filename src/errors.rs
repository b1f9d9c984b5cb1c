use std::fmt;

#[derive(Debug, Clone)]
pub enum BlogPulseError {
    Config(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    /// 唯一约束冲突（并发首次访问同一 path 时出现）
    Conflict(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
}

impl BlogPulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            BlogPulseError::Config(_) => "E001",
            BlogPulseError::DatabaseConfig(_) => "E002",
            BlogPulseError::DatabaseConnection(_) => "E003",
            BlogPulseError::DatabaseOperation(_) => "E004",
            BlogPulseError::Conflict(_) => "E005",
            BlogPulseError::FileOperation(_) => "E006",
            BlogPulseError::Validation(_) => "E007",
            BlogPulseError::NotFound(_) => "E008",
            BlogPulseError::Serialization(_) => "E009",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            BlogPulseError::Config(_) => "Configuration Error",
            BlogPulseError::DatabaseConfig(_) => "Database Configuration Error",
            BlogPulseError::DatabaseConnection(_) => "Database Connection Error",
            BlogPulseError::DatabaseOperation(_) => "Database Operation Error",
            BlogPulseError::Conflict(_) => "Unique Constraint Conflict",
            BlogPulseError::FileOperation(_) => "File Operation Error",
            BlogPulseError::Validation(_) => "Validation Error",
            BlogPulseError::NotFound(_) => "Resource Not Found",
            BlogPulseError::Serialization(_) => "Serialization Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            BlogPulseError::Config(msg)
            | BlogPulseError::DatabaseConfig(msg)
            | BlogPulseError::DatabaseConnection(msg)
            | BlogPulseError::DatabaseOperation(msg)
            | BlogPulseError::Conflict(msg)
            | BlogPulseError::FileOperation(msg)
            | BlogPulseError::Validation(msg)
            | BlogPulseError::NotFound(msg)
            | BlogPulseError::Serialization(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 Server 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出（用于 CLI 模式）
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, BlogPulseError::Conflict(_))
    }
}

impl fmt::Display for BlogPulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for BlogPulseError {}

// 便捷的构造函数
impl BlogPulseError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::Config(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::DatabaseOperation(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::Conflict(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        BlogPulseError::Serialization(msg.into())
    }
}

impl From<sea_orm::DbErr> for BlogPulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        // 唯一约束冲突单独归类，上层据此走 increment 回退路径
        if let Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) = err.sql_err() {
            return BlogPulseError::Conflict(msg);
        }
        BlogPulseError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for BlogPulseError {
    fn from(err: std::io::Error) -> Self {
        BlogPulseError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for BlogPulseError {
    fn from(err: serde_json::Error) -> Self {
        BlogPulseError::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for BlogPulseError {
    fn from(err: toml::ser::Error) -> Self {
        BlogPulseError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for BlogPulseError {
    fn from(err: config::ConfigError) -> Self {
        BlogPulseError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BlogPulseError>;
