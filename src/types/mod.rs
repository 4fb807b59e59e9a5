//! Система типов упрощённого Haskell.
//!
//! Грамматика типов замкнута: переменная, конструктор, функция и
//! применение типа. Переменные живут в [`TypeVarTable`], поэтому все
//! запросы, зависящие от привязок, принимают таблицу аргументом.

mod constraints;
mod var;

pub use constraints::{ConstraintSet, TypeClass};
pub use var::{TypeVar, TypeVarTable, VarId};

use std::fmt;

use crate::stack::guarded;

/// Имя конструктора списка.
pub const LIST_CON: &str = "[]";

/// Нульарный именованный конструктор типа (`Int`, `Bool`, `[]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeCon {
    name: String,
}

impl TypeCon {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for TypeCon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Тип.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Переменная типа
    Var(TypeVar),
    /// Конструктор типа
    Con(TypeCon),
    /// Функция: аргумент и результат
    Fun(Box<Type>, Box<Type>),
    /// Применение типа: функция типа и аргумент
    App(Box<Type>, Box<Type>),
}

impl Type {
    pub fn con(name: impl Into<String>) -> Self {
        Type::Con(TypeCon::new(name))
    }

    pub fn var(var: &TypeVar) -> Self {
        Type::Var(var.clone())
    }

    pub fn fun(argument: Type, result: Type) -> Self {
        Type::Fun(Box::new(argument), Box::new(result))
    }

    pub fn app(type_fun: Type, type_arg: Type) -> Self {
        Type::App(Box::new(type_fun), Box::new(type_arg))
    }

    /// Тип списка `[elem]`.
    pub fn list(elem: Type) -> Self {
        Type::app(Type::con(LIST_CON), elem)
    }

    pub fn is_var(&self) -> bool {
        matches!(self, Type::Var(_))
    }

    /// Любой вариант, кроме переменной.
    pub fn is_concrete(&self) -> bool {
        !self.is_var()
    }

    /// Структурное равенство с учётом слияния переменных.
    ///
    /// Переменные равны только если разделяют ячейку; привязки не
    /// раскрываются.
    pub fn equals(&self, other: &Type, vars: &mut TypeVarTable) -> bool {
        guarded(|| match (self, other) {
            (Type::Var(a), Type::Var(b)) => vars.same(a, b),
            (Type::Con(a), Type::Con(b)) => a == b,
            (Type::Fun(a1, r1), Type::Fun(a2, r2)) | (Type::App(a1, r1), Type::App(a2, r2)) => {
                a1.equals(a2, vars) && r1.equals(r2, vars)
            }
            _ => false,
        })
    }

    /// Достижима ли ячейка `var` из этого типа по структуре и привязкам.
    pub fn contains_occurrence_of(&self, var: &TypeVar, vars: &mut TypeVarTable) -> bool {
        guarded(|| match self {
            Type::Var(other) => {
                vars.same(var, other)
                    || vars
                        .instantiated_type(other)
                        .is_some_and(|instance| instance.contains_occurrence_of(var, vars))
            }
            Type::Con(_) => false,
            Type::Fun(a, b) | Type::App(a, b) => {
                a.contains_occurrence_of(var, vars) || b.contains_occurrence_of(var, vars)
            }
        })
    }

    // Приоритеты: 0 верхний уровень, 1 слева от стрелки, 2 аргумент применения.
    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, prec: u8) -> fmt::Result {
        guarded(|| match self {
            Type::Var(var) => write!(f, "{}", var),
            Type::Con(con) => write!(f, "{}", con),
            Type::Fun(arg, res) => {
                if prec > 0 {
                    f.write_str("(")?;
                }
                arg.fmt_prec(f, 1)?;
                f.write_str(" -> ")?;
                res.fmt_prec(f, 0)?;
                if prec > 0 {
                    f.write_str(")")?;
                }
                Ok(())
            }
            Type::App(fun, arg) => {
                if matches!(fun.as_ref(), Type::Con(con) if con.name() == LIST_CON) {
                    f.write_str("[")?;
                    arg.fmt_prec(f, 0)?;
                    return f.write_str("]");
                }
                if prec > 1 {
                    f.write_str("(")?;
                }
                fun.fmt_prec(f, 1)?;
                f.write_str(" ")?;
                arg.fmt_prec(f, 2)?;
                if prec > 1 {
                    f.write_str(")")?;
                }
                Ok(())
            }
        })
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_prec(f, 0)
    }
}
