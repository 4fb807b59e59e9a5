//! Локализация ошибки типизации до позиции аргумента.
//!
//! Редактор подсвечивает вход блока, а не поддерево. Поэтому контекст
//! ошибки сворачивается в индекс: сколько применений пройдено по
//! функциональной части, прежде чем встретилось не-применение.

use crate::error::HaskellTypeError;
use crate::expr::Expression;

/// Место ошибки: индекс аргумента и голова цепочки применений.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorSite<'a> {
    /// `-1`, если контекст не является применением.
    pub index: i32,
    /// Выражение, которому принадлежит подсвечиваемый вход.
    pub function: &'a Expression,
}

impl ErrorSite<'_> {
    /// Номер входа, если контекст был применением.
    pub fn input(&self) -> Option<usize> {
        usize::try_from(self.index).ok()
    }
}

/// Найти вход, к которому относится ошибка.
pub fn locate(error: &HaskellTypeError) -> ErrorSite<'_> {
    locate_in(error.context())
}

/// Спуститься по функциональной части применений.
pub fn locate_in(expr: &Expression) -> ErrorSite<'_> {
    let mut index = -1;
    let mut current = expr;
    while let Expression::Apply(function, _) = current {
        current = function.as_ref();
        index += 1;
    }
    ErrorSite {
        index,
        function: current,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TypeErrorKind;

    #[test]
    fn test_locate_non_apply() {
        let expr = Expression::ident("f");
        let site = locate_in(&expr);
        assert_eq!(site.index, -1);
        assert_eq!(site.input(), None);
        assert_eq!(site.function, &expr);
    }

    #[test]
    fn test_locate_two_applications() {
        let f = Expression::ident("f");
        let expr = Expression::apply_all(f.clone(), [Expression::ident("x"), Expression::ident("y")]);
        let error = HaskellTypeError::new(TypeErrorKind::MismatchedConstructor, "Int ⊥ Bool", expr);

        let site = locate(&error);
        assert_eq!(site.index, 1);
        assert_eq!(site.input(), Some(1));
        assert_eq!(site.function, &f);
    }

    #[test]
    fn test_locate_ignores_argument_subtree() {
        let inner = Expression::apply(Expression::ident("g"), Expression::ident("z"));
        let expr = Expression::apply(Expression::ident("f"), inner);
        let site = locate_in(&expr);
        assert_eq!(site.index, 0);
        assert_eq!(site.function, &Expression::ident("f"));
    }
}
