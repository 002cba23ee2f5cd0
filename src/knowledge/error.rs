// ==========================================
// 轮作优化引擎 - 知识库错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 知识库加载错误类型
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .csv）")]
    UnsupportedFormat(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("缺少字段 (行 {row}): {field}")]
    MissingField { row: usize, field: String },

    #[error("字段值错误 (行 {row}, 字段 {field}): {message}")]
    FieldValueError {
        row: usize,
        field: String,
        message: String,
    },

    #[error("知识库为空: {0}")]
    Empty(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for KnowledgeBaseError {
    fn from(err: csv::Error) -> Self {
        KnowledgeBaseError::CsvParseError(err.to_string())
    }
}
