//! Классы типов и наборы ограничений на переменных типа.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::TypeCon;

/// Класс типов: имя и таблица допустимых конструкторов.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeClass {
    name: String,
    instances: BTreeSet<String>,
}

impl TypeClass {
    /// Создать класс с заданными экземплярами.
    pub fn new<I, S>(name: impl Into<String>, instances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            instances: instances.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instances(&self) -> impl Iterator<Item = &str> {
        self.instances.iter().map(String::as_str)
    }

    /// Является ли конструктор экземпляром класса.
    pub fn admits(&self, con: &TypeCon) -> bool {
        self.instances.contains(con.name())
    }
}

impl fmt::Display for TypeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Набор ограничений переменной типа. Классы уникальны по имени.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    classes: BTreeMap<String, TypeClass>,
}

impl ConstraintSet {
    /// Пустой набор.
    pub fn new() -> Self {
        Self::default()
    }

    /// Набор из одного класса.
    pub fn single(class: TypeClass) -> Self {
        let mut set = Self::new();
        set.insert(class);
        set
    }

    pub fn insert(&mut self, class: TypeClass) {
        self.classes.insert(class.name.clone(), class);
    }

    /// Добавить все классы из `other`.
    pub fn union(&mut self, other: &ConstraintSet) {
        for class in other.classes.values() {
            self.insert(class.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Есть ли в наборе хотя бы одно ограничение.
    pub fn has_constraints(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TypeClass> {
        self.classes.values()
    }

    /// Удовлетворяет ли конструктор всем ограничениям набора.
    pub fn all_constraints_match(&self, con: &TypeCon) -> bool {
        self.classes.values().all(|class| class.admits(con))
    }
}

impl FromIterator<TypeClass> for ConstraintSet {
    fn from_iter<T: IntoIterator<Item = TypeClass>>(iter: T) -> Self {
        let mut set = Self::new();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.classes.keys().map(String::as_str).collect();
        match names.as_slice() {
            [single] => f.write_str(single),
            _ => write!(f, "({})", names.join(", ")),
        }
    }
}
