//! Переменные типа и таблица их ячеек.
//!
//! Каждая [`TypeVar`] является лёгким дескриптором (имя + ключ) ячейки в
//! [`TypeVarTable`]. Слияние ячеек ведёт `ena`: у каждого класса слитых
//! переменных один корень, который хранит конкретизацию и ограничения.
//! Переменные, слитые через [`TypeVarTable::unify_with`], видят одни и те
//! же последующие привязки.

use std::collections::{HashMap, HashSet};
use std::fmt;

use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};

use super::{ConstraintSet, Type};
use crate::stack::guarded;

/// Ключ ячейки в [`TypeVarTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u32);

impl VarId {
    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Переменная типа: имя для вывода и ссылка на ячейку.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeVar {
    name: String,
    id: VarId,
}

impl TypeVar {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> VarId {
        self.id
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Состояние корня: конкретизация и ограничения.
#[derive(Debug, Clone, Default)]
pub struct VarState {
    instance: Option<Type>,
    constraints: ConstraintSet,
}

// === ena ===

impl UnifyKey for VarId {
    type Value = VarState;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        VarId(u)
    }

    fn tag() -> &'static str {
        "VarId"
    }
}

impl UnifyValue for VarState {
    type Error = NoError;

    /// Ограничения объединяются; конкретизация берётся у того корня, где
    /// она есть. Две конкретизации сразу отсекаются до слияния.
    fn unify_values(a: &Self, b: &Self) -> Result<Self, NoError> {
        let mut constraints = a.constraints.clone();
        constraints.union(&b.constraints);
        Ok(VarState {
            instance: a.instance.clone().or_else(|| b.instance.clone()),
            constraints,
        })
    }
}

/// Таблица ячеек переменных типа.
///
/// Дескрипторы [`TypeVar`] действительны только для таблицы, которая их
/// создала. Запросы принимают `&mut self`: поиск корня сжимает пути.
#[derive(Debug, Clone, Default)]
pub struct TypeVarTable {
    table: InPlaceUnificationTable<VarId>,
    names: Vec<String>,
}

impl TypeVarTable {
    /// Создать пустую таблицу.
    pub fn new() -> Self {
        Self::default()
    }

    /// Количество созданных переменных (включая слитые).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Создать свежую переменную без ограничений.
    pub fn fresh(&mut self, name: impl Into<String>) -> TypeVar {
        self.fresh_constrained(name, ConstraintSet::new())
    }

    /// Создать свежую переменную с набором ограничений.
    pub fn fresh_constrained(
        &mut self,
        name: impl Into<String>,
        constraints: ConstraintSet,
    ) -> TypeVar {
        let name = name.into();
        let id = self.table.new_key(VarState {
            instance: None,
            constraints,
        });
        self.names.push(name.clone());
        TypeVar { name, id }
    }

    /// Разделяют ли две переменные одну ячейку.
    pub fn same(&mut self, a: &TypeVar, b: &TypeVar) -> bool {
        self.table.unioned(a.id, b.id)
    }

    /// Канонический дескриптор: переменная, владеющая корнем.
    pub fn canonical(&mut self, var: &TypeVar) -> TypeVar {
        let id = self.table.find(var.id);
        TypeVar {
            name: self.names[id.slot()].clone(),
            id,
        }
    }

    /// Привязана ли переменная к конкретному типу.
    pub fn has_concrete_instance(&mut self, var: &TypeVar) -> bool {
        self.table.probe_value(var.id).instance.is_some()
    }

    /// Конкретизация переменной.
    pub fn instantiated_type(&mut self, var: &TypeVar) -> Option<Type> {
        self.table.probe_value(var.id).instance
    }

    /// Ограничения переменной.
    pub fn constraints(&mut self, var: &TypeVar) -> ConstraintSet {
        self.table.probe_value(var.id).constraints
    }

    /// Однократно привязать переменную к конкретному типу.
    ///
    /// # Panics
    ///
    /// Если переменная уже привязана или `ty` сам является переменной.
    pub fn set_concrete_instance(&mut self, var: &TypeVar, ty: Type) {
        assert!(
            ty.is_concrete(),
            "type variable {var} can only be instantiated by a concrete type, got {ty}"
        );
        assert!(
            !self.has_concrete_instance(var),
            "type variable {var} is already instantiated"
        );
        self.table.union_value(
            var.id,
            VarState {
                instance: Some(ty),
                constraints: ConstraintSet::new(),
            },
        );
    }

    /// Слить `var` с `target`: после этого обе переменные разделяют корень,
    /// а ограничения объединяются.
    ///
    /// # Panics
    ///
    /// Если одна из переменных уже привязана.
    pub fn unify_with(&mut self, var: &TypeVar, target: &TypeVar) {
        if self.same(var, target) {
            return;
        }
        assert!(
            !self.has_concrete_instance(var),
            "cannot merge instantiated type variable {var}"
        );
        assert!(
            !self.has_concrete_instance(target),
            "cannot merge into instantiated type variable {target}"
        );
        self.table.union(var.id, target.id);
    }

    /// Подставить все привязанные переменные, транзитивно.
    ///
    /// Непривязанные переменные заменяются каноническим дескриптором, так
    /// что слитые переменные выводятся одинаково.
    pub fn resolve(&mut self, ty: &Type) -> Type {
        guarded(|| match ty {
            Type::Var(var) => match self.instantiated_type(var) {
                Some(instance) => self.resolve(&instance),
                None => Type::Var(self.canonical(var)),
            },
            Type::Con(_) => ty.clone(),
            Type::Fun(arg, res) => Type::fun(self.resolve(arg), self.resolve(res)),
            Type::App(fun, arg) => Type::app(self.resolve(fun), self.resolve(arg)),
        })
    }

    /// Текстовое представление типа после подстановки.
    ///
    /// Разные корни с одинаковым именем получают суффикс: `b`, `b1`.
    pub fn render(&mut self, ty: &Type) -> String {
        let mut resolved = self.resolve(ty);
        DisplayNames::default().rename(&mut resolved);
        resolved.to_string()
    }
}

/// Имена для вывода, по одному на корень.
#[derive(Default)]
struct DisplayNames {
    assigned: HashMap<VarId, String>,
    taken: HashSet<String>,
}

impl DisplayNames {
    fn rename(&mut self, ty: &mut Type) {
        guarded(|| match ty {
            Type::Var(var) => var.name = self.name_for(var),
            Type::Con(_) => {}
            Type::Fun(a, b) | Type::App(a, b) => {
                self.rename(a);
                self.rename(b);
            }
        })
    }

    fn name_for(&mut self, var: &TypeVar) -> String {
        if let Some(name) = self.assigned.get(&var.id) {
            return name.clone();
        }
        let mut name = var.name.clone();
        let mut suffix = 1;
        while self.taken.contains(&name) {
            name = format!("{}{}", var.name, suffix);
            suffix += 1;
        }
        self.taken.insert(name.clone());
        self.assigned.insert(var.id, name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TypeClass, TypeCon};

    #[test]
    fn test_fresh_vars_are_distinct() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        let b = vars.fresh("a");
        assert!(!vars.same(&a, &b));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn test_set_concrete_instance() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        assert!(!vars.has_concrete_instance(&a));

        vars.set_concrete_instance(&a, Type::con("Int"));
        assert!(vars.has_concrete_instance(&a));
        assert_eq!(vars.instantiated_type(&a), Some(Type::con("Int")));
    }

    #[test]
    #[should_panic(expected = "already instantiated")]
    fn test_set_concrete_instance_twice_panics() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        vars.set_concrete_instance(&a, Type::con("Int"));
        vars.set_concrete_instance(&a, Type::con("Bool"));
    }

    #[test]
    #[should_panic(expected = "concrete type")]
    fn test_set_concrete_instance_rejects_var() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        let b = vars.fresh("b");
        vars.set_concrete_instance(&a, Type::Var(b));
    }

    #[test]
    #[should_panic(expected = "cannot merge")]
    fn test_unify_with_instantiated_panics() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        let b = vars.fresh("b");
        vars.set_concrete_instance(&a, Type::con("Int"));
        vars.unify_with(&a, &b);
    }

    #[test]
    fn test_unify_with_shares_binding() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        let b = vars.fresh("b");
        vars.unify_with(&b, &a);
        assert!(vars.same(&a, &b));

        vars.set_concrete_instance(&b, Type::con("Char"));
        assert_eq!(vars.instantiated_type(&a), Some(Type::con("Char")));
    }

    #[test]
    fn test_unify_with_chain() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        let b = vars.fresh("b");
        let c = vars.fresh("c");
        vars.unify_with(&a, &b);
        vars.unify_with(&b, &c);

        assert!(vars.same(&a, &c));
        assert_eq!(vars.canonical(&a), vars.canonical(&c));
        vars.set_concrete_instance(&a, Type::con("Int"));
        assert_eq!(vars.instantiated_type(&c), Some(Type::con("Int")));
    }

    #[test]
    fn test_unify_with_unions_constraints() {
        let mut vars = TypeVarTable::new();
        let num = TypeClass::new("Num", ["Int", "Float"]);
        let ord = TypeClass::new("Ord", ["Int", "Char"]);
        let a = vars.fresh_constrained("a", ConstraintSet::single(num));
        let b = vars.fresh_constrained("b", ConstraintSet::single(ord));
        vars.unify_with(&b, &a);

        let merged = vars.constraints(&b);
        assert_eq!(merged.len(), 2);
        assert!(merged.all_constraints_match(&TypeCon::new("Int")));
        assert!(!merged.all_constraints_match(&TypeCon::new("Float")));
        assert_eq!(vars.constraints(&a), merged);
    }

    #[test]
    fn test_resolve_follows_instances() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        let b = vars.fresh("b");
        vars.set_concrete_instance(&a, Type::list(Type::Var(b.clone())));
        vars.set_concrete_instance(&b, Type::con("Int"));

        let ty = Type::fun(Type::Var(a), Type::Var(b));
        assert_eq!(vars.render(&ty), "[Int] -> Int");
    }

    #[test]
    fn test_resolve_uses_canonical_name() {
        let mut vars = TypeVarTable::new();
        let a = vars.fresh("a");
        let b = vars.fresh("b");
        vars.unify_with(&b, &a);
        assert_eq!(vars.render(&Type::fun(Type::Var(a), Type::Var(b))), "a -> a");
    }

    #[test]
    fn test_render_distinguishes_same_named_roots() {
        let mut vars = TypeVarTable::new();
        let first = vars.fresh("b");
        let second = vars.fresh("b");
        let third = vars.fresh("b");
        let ty = Type::fun(
            Type::var(&first),
            Type::fun(Type::var(&second), Type::fun(Type::var(&third), Type::var(&first))),
        );
        assert_eq!(vars.render(&ty), "b -> b1 -> b2 -> b");
    }

    #[test]
    fn test_render_suffix_avoids_existing_name() {
        let mut vars = TypeVarTable::new();
        let b1 = vars.fresh("b1");
        let b = vars.fresh("b");
        let other_b = vars.fresh("b");
        let ty = Type::fun(Type::var(&b1), Type::fun(Type::var(&b), Type::var(&other_b)));
        assert_eq!(vars.render(&ty), "b1 -> b -> b2");
    }
}
