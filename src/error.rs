//! Определения ошибок.

use thiserror::Error;

use crate::expr::Expression;

/// Основной тип `Result` для библиотеки.
pub type ViskellResult<T> = Result<T, ViskellError>;

/// Категория ошибки унификации.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeErrorKind {
    /// Переменная типа была бы привязана к типу, содержащему её саму.
    RecursiveType,
    /// Два конструктора с разными именами.
    MismatchedConstructor,
    /// Ограниченная переменная встречает недопустимый тип.
    ConstraintViolation,
    /// Ни одно правило унификации не подходит.
    ShapeMismatch,
}

/// Ошибка типизации: сообщение и выражение, в контексте которого она
/// возникла.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct HaskellTypeError {
    kind: TypeErrorKind,
    message: String,
    context: Expression,
}

impl HaskellTypeError {
    pub fn new(kind: TypeErrorKind, message: impl Into<String>, context: Expression) -> Self {
        Self {
            kind,
            message: message.into(),
            context,
        }
    }

    pub fn kind(&self) -> TypeErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Выражение, переданное внешним вызовом `unify`.
    pub fn context(&self) -> &Expression {
        &self.context
    }
}

/// Перечисление всех возможных ошибок.
#[derive(Error, Debug)]
pub enum ViskellError {
    #[error("Type error: {0}")]
    Type(#[from] HaskellTypeError),

    #[error("Unknown identifier: {0}")]
    UnknownIdentifier(String),

    #[error("Unknown type class: {0}")]
    UnknownClass(String),

    #[error("Invalid signature for {0}: {1}")]
    InvalidSignature(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViskellError {
    /// Ошибка типизации, если это она. Всё остальное редактор показывает
    /// как неизвестную ошибку.
    pub fn as_type_error(&self) -> Option<&HaskellTypeError> {
        match self {
            ViskellError::Type(err) => Some(err),
            _ => None,
        }
    }
}
