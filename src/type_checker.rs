//! Модуль `type_checker`
//!
//! Проверка типов для упрощённого Haskell.
//!
//! Реализует:
//! - Унификацию с изменяемыми переменными типа и occurs check
//! - Проверку ограничений классов типов
//! - Вычисление типа дерева выражений
//!
//! Унификация не откатывает привязки: если сравнение аргументов функций
//! прошло, а сравнение результатов упало, аргументы остаются привязанными.

use log::{debug, info};

use crate::catalog::Catalog;
use crate::error::{HaskellTypeError, TypeErrorKind, ViskellResult};
use crate::expr::Expression;
use crate::stack::guarded;
use crate::types::{Type, TypeVar, TypeVarTable};

// === Унификация ===

/// Унификация двух типов в контексте выражения.
///
/// При успехе переменные типа в `vars` привязываются или сливаются так,
/// что `a` и `b` становятся равны. Ошибка всегда несёт исходный `context`.
pub fn unify(
    vars: &mut TypeVarTable,
    context: &Expression,
    a: &Type,
    b: &Type,
) -> Result<(), HaskellTypeError> {
    // Предотвращаем stack overflow на глубоко вложенных типах
    guarded(|| unify_types(vars, context, a, b))
}

fn unify_types(
    vars: &mut TypeVarTable,
    context: &Expression,
    a: &Type,
    b: &Type,
) -> Result<(), HaskellTypeError> {
    info!(
        "Unifying types {} and {} for context {}",
        vars.render(a),
        vars.render(b),
        context
    );

    // Одинаковые типы унифицируются тривиально
    if a.equals(b, vars) {
        return Ok(());
    }

    match (a, b) {
        (Type::Var(va), _) => unify_var(vars, context, va, b),

        // Int и α: то же, что α и Int
        (_, Type::Var(_)) => unify(vars, context, b, a),

        // Равные конструкторы отсеяны выше
        (Type::Con(_), Type::Con(_)) => {
            info!(
                "Mismatching TypeCon {} and {} for context {}",
                a, b, context
            );
            Err(HaskellTypeError::new(
                TypeErrorKind::MismatchedConstructor,
                format!("{} ⊥ {}", a, b),
                context.clone(),
            ))
        }

        // Функции: сначала аргументы, затем результаты
        (Type::Fun(arg_a, res_a), Type::Fun(arg_b, res_b)) => {
            unify(vars, context, arg_a, arg_b)?;
            unify(vars, context, res_a, res_b)
        }

        // Применения типов: сначала функции типа, затем аргументы
        (Type::App(fun_a, arg_a), Type::App(fun_b, arg_b)) => {
            unify(vars, context, fun_a, fun_b)?;
            unify(vars, context, arg_a, arg_b)
        }

        _ => {
            info!(
                "Given up to unify types {} and {} for context {}",
                vars.render(a),
                vars.render(b),
                context
            );
            Err(HaskellTypeError::new(
                TypeErrorKind::ShapeMismatch,
                format!("{} ⊥ {}", vars.render(a), vars.render(b)),
                context.clone(),
            ))
        }
    }
}

/// Унификация переменной типа `va` с произвольным типом `b`.
fn unify_var(
    vars: &mut TypeVarTable,
    context: &Expression,
    va: &TypeVar,
    b: &Type,
) -> Result<(), HaskellTypeError> {
    if occurs_check(vars, va, b) {
        info!(
            "Recursion in types {} and {} for context {}",
            va,
            vars.render(b),
            context
        );
        return Err(HaskellTypeError::new(
            TypeErrorKind::RecursiveType,
            format!("{} ∈ {}", va, vars.render(b)),
            context.clone(),
        ));
    }

    // Уже привязанная переменная: унифицируем её конкретизацию
    if let Some(instance) = vars.instantiated_type(va) {
        return unify(vars, context, &instance, b);
    }

    match b {
        Type::Var(vb) => match vars.instantiated_type(vb) {
            Some(instance) => unify(vars, context, &Type::var(va), &instance),
            None => {
                debug!("Sharing type variable {} with {}", vb, va);
                vars.unify_with(vb, va);
                Ok(())
            }
        },
        _ => {
            satisfy_constraints(vars, context, va, b)?;
            debug!("Instantiating {} with {}", va, vars.render(b));
            vars.set_concrete_instance(va, b.clone());
            Ok(())
        }
    }
}

/// Проверка вхождения переменной в тип (occurs check).
/// Предотвращает бесконечные типы вроде a = [a].
fn occurs_check(vars: &mut TypeVarTable, var: &TypeVar, ty: &Type) -> bool {
    ty.contains_occurrence_of(var, vars)
}

/// Проверка, что конкретный тип удовлетворяет ограничениям переменной.
///
/// Ограничения проверяются только для конструкторов; прочие типы
/// допустимы лишь для переменной без ограничений.
fn satisfy_constraints(
    vars: &mut TypeVarTable,
    context: &Expression,
    var: &TypeVar,
    ty: &Type,
) -> Result<(), HaskellTypeError> {
    let constraints = vars.constraints(var);
    let satisfied = match ty {
        Type::Con(con) => constraints.all_constraints_match(con),
        _ => !constraints.has_constraints(),
    };

    if satisfied {
        return Ok(());
    }

    info!(
        "Unable to unify types {} with constraints {} for context {}",
        vars.render(ty),
        constraints,
        context
    );
    Err(HaskellTypeError::new(
        TypeErrorKind::ConstraintViolation,
        format!("{} ∉ constraints of {}", vars.render(ty), constraints),
        context.clone(),
    ))
}

// === Type Checker ===

/// Type Checker: таблица переменных типа и каталог функций.
///
/// Один экземпляр живёт столько же, сколько граф программы в редакторе;
/// повторные проверки переиспользуют уже созданные переменные.
#[derive(Debug, Clone)]
pub struct TypeChecker {
    vars: TypeVarTable,
    catalog: Catalog,
}

impl TypeChecker {
    /// Type Checker со встроенным каталогом.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::prelude())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            vars: TypeVarTable::new(),
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn vars_mut(&mut self) -> &mut TypeVarTable {
        &mut self.vars
    }

    /// Свежая переменная без ограничений.
    pub fn fresh_var(&mut self, name: impl Into<String>) -> TypeVar {
        self.vars.fresh(name)
    }

    /// Свежая переменная с ограничениями из каталога.
    pub fn fresh_constrained(
        &mut self,
        name: impl Into<String>,
        classes: &[&str],
    ) -> ViskellResult<TypeVar> {
        let constraints = self.catalog.constraint_set(classes)?;
        Ok(self.vars.fresh_constrained(name, constraints))
    }

    /// Безымянная переменная для промежуточных результатов.
    fn fresh_type_var(&mut self) -> Type {
        let name = format!("t{}", self.vars.len());
        Type::Var(self.vars.fresh(name))
    }

    pub fn unify(
        &mut self,
        context: &Expression,
        a: &Type,
        b: &Type,
    ) -> Result<(), HaskellTypeError> {
        unify(&mut self.vars, context, a, b)
    }

    /// Вычислить тип выражения.
    ///
    /// Возвращённый тип может содержать привязанные переменные; для вывода
    /// используйте [`TypeChecker::resolve`] или [`TypeChecker::check`].
    pub fn find_type(&mut self, expr: &Expression) -> ViskellResult<Type> {
        guarded(|| self.infer_expr(expr))
    }

    fn infer_expr(&mut self, expr: &Expression) -> ViskellResult<Type> {
        match expr {
            Expression::Value { ty, .. } => Ok(ty.clone()),
            Expression::Ident(name) => self.catalog.instantiate(name, &mut self.vars),
            Expression::Hole => Ok(self.fresh_type_var()),
            Expression::Apply(function, argument) => {
                let function_type = self.find_type(function)?;
                let argument_type = self.find_type(argument)?;
                let result = self.fresh_type_var();
                let expected = Type::fun(argument_type, result.clone());
                unify(&mut self.vars, expr, &function_type, &expected)?;
                Ok(result)
            }
        }
    }

    /// Вычислить тип выражения и подставить все привязки.
    pub fn check(&mut self, expr: &Expression) -> ViskellResult<Type> {
        let ty = self.find_type(expr)?;
        Ok(self.resolve(&ty))
    }

    pub fn resolve(&mut self, ty: &Type) -> Type {
        self.vars.resolve(ty)
    }

    /// Вывод типа; разные переменные с одним именем различаются суффиксом.
    pub fn render(&mut self, ty: &Type) -> String {
        self.vars.render(ty)
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}

// === Публичный API ===

/// Вычислить тип выражения со встроенным каталогом.
pub fn infer_type(expr: &Expression) -> ViskellResult<Type> {
    TypeChecker::new().check(expr)
}

// === Тесты ===
