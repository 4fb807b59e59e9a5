//! Дерево выражений, которое редактор строит из визуального графа.
//!
//! Ядро использует его для вычисления типа и как контекст в ошибках.

use std::fmt;

use crate::types::Type;

/// Выражение упрощённого Haskell.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Литерал с типом, заданным редактором.
    Value { ty: Type, text: String },
    /// Ссылка на функцию каталога.
    Ident(String),
    /// Применение функции к аргументу.
    Apply(Box<Expression>, Box<Expression>),
    /// Неподключённый вход.
    Hole,
}

impl Expression {
    pub fn value(ty: Type, text: impl Into<String>) -> Self {
        Expression::Value {
            ty,
            text: text.into(),
        }
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Ident(name.into())
    }

    pub fn apply(function: Expression, argument: Expression) -> Self {
        Expression::Apply(Box::new(function), Box::new(argument))
    }

    /// Последовательно применить `function` к каждому аргументу.
    pub fn apply_all(function: Expression, arguments: impl IntoIterator<Item = Expression>) -> Self {
        arguments.into_iter().fold(function, Expression::apply)
    }

    pub fn hole() -> Self {
        Expression::Hole
    }

    pub fn is_apply(&self) -> bool {
        matches!(self, Expression::Apply(..))
    }

    /// Функциональная часть применения.
    pub fn function(&self) -> Option<&Expression> {
        match self {
            Expression::Apply(function, _) => Some(function.as_ref()),
            _ => None,
        }
    }

    /// Аргумент применения.
    pub fn argument(&self) -> Option<&Expression> {
        match self {
            Expression::Apply(_, argument) => Some(argument.as_ref()),
            _ => None,
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, in_argument: bool) -> fmt::Result {
        match self {
            Expression::Value { text, .. } => f.write_str(text),
            Expression::Ident(name) => {
                if name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
                    f.write_str(name)
                } else {
                    write!(f, "({})", name)
                }
            }
            Expression::Apply(function, argument) => {
                if in_argument {
                    f.write_str("(")?;
                }
                function.fmt_prec(f, false)?;
                f.write_str(" ")?;
                argument.fmt_prec(f, true)?;
                if in_argument {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Expression::Hole => f.write_str("_"),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_all_builds_left_spine() {
        let expr = Expression::apply_all(
            Expression::ident("f"),
            [Expression::ident("x"), Expression::ident("y")],
        );
        let inner = expr.function().unwrap();
        assert_eq!(expr.argument(), Some(&Expression::ident("y")));
        assert_eq!(inner.function(), Some(&Expression::ident("f")));
        assert_eq!(inner.argument(), Some(&Expression::ident("x")));
    }

    #[test]
    fn test_display() {
        let expr = Expression::apply_all(
            Expression::ident("+"),
            [
                Expression::value(Type::con("Int"), "1"),
                Expression::apply(Expression::ident("negate"), Expression::hole()),
            ],
        );
        assert_eq!(expr.to_string(), "(+) 1 (negate _)");
    }
}
