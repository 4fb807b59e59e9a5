//! # Viskell Types
//!
//! Ядро проверки типов визуального редактора функциональных программ.
//!
//! ## Основные модули
//!
//! - [`types`] - Типы, переменные типа и ограничения
//! - [`type_checker`] - Унификация и вычисление типа выражения
//! - [`expr`] - Дерево выражений, которое строит редактор
//! - [`catalog`] - Классы типов и сигнатуры функций
//! - [`locate`] - Локализация ошибки до входа блока
//!
//! ## Пример использования
//!
//! ```rust
//! use viskell_types::{locate, Expression, Type, TypeChecker};
//!
//! let mut checker = TypeChecker::new();
//! let expr = Expression::apply_all(
//!     Expression::ident("+"),
//!     [
//!         Expression::value(Type::con("Int"), "1"),
//!         Expression::value(Type::con("Bool"), "True"),
//!     ],
//! );
//!
//! let err = checker.check(&expr).unwrap_err();
//! let site = locate(err.as_type_error().unwrap());
//! assert_eq!(site.input(), Some(1));
//! ```

// === Основные модули ===
pub mod catalog;
pub mod error;
pub mod expr;
pub mod locate;
pub mod type_checker;
pub mod types;

mod stack;

// === Re-exports для удобства ===
pub use catalog::{Catalog, Signature, TypeTemplate};
pub use error::{HaskellTypeError, TypeErrorKind, ViskellError, ViskellResult};
pub use expr::Expression;
pub use locate::{locate, locate_in, ErrorSite};
pub use type_checker::{infer_type, unify, TypeChecker};
pub use types::{ConstraintSet, Type, TypeClass, TypeCon, TypeVar, TypeVarTable};
