//! Каталог: таблица классов типов и сигнатуры функций.
//!
//! Каталог служит конфигурацией ядра. Встроенный вариант даёт
//! [`Catalog::prelude`], внешний загружается из JSON:
//!
//! ```json
//! {
//!   "classes": { "Num": ["Int", "Float"] },
//!   "functions": {
//!     "negate": {
//!       "constraints": { "a": ["Num"] },
//!       "type": { "fun": [{ "var": "a" }, { "var": "a" }] }
//!     }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ViskellError, ViskellResult};
use crate::types::{ConstraintSet, Type, TypeClass, TypeVar, TypeVarTable, LIST_CON};

/// Шаблон типа в сигнатуре: переменные задаются именами и получают свежие
/// ячейки при каждой конкретизации.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTemplate {
    Var(String),
    Con(String),
    Fun(Box<TypeTemplate>, Box<TypeTemplate>),
    App(Box<TypeTemplate>, Box<TypeTemplate>),
}

impl TypeTemplate {
    pub fn var(name: impl Into<String>) -> Self {
        TypeTemplate::Var(name.into())
    }

    pub fn con(name: impl Into<String>) -> Self {
        TypeTemplate::Con(name.into())
    }

    pub fn fun(argument: TypeTemplate, result: TypeTemplate) -> Self {
        TypeTemplate::Fun(Box::new(argument), Box::new(result))
    }

    pub fn app(type_fun: TypeTemplate, type_arg: TypeTemplate) -> Self {
        TypeTemplate::App(Box::new(type_fun), Box::new(type_arg))
    }

    pub fn list(elem: TypeTemplate) -> Self {
        TypeTemplate::app(TypeTemplate::con(LIST_CON), elem)
    }

    /// Имена переменных в порядке первого появления.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            TypeTemplate::Var(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            TypeTemplate::Con(_) => {}
            TypeTemplate::Fun(a, b) | TypeTemplate::App(a, b) => {
                a.collect_variables(names);
                b.collect_variables(names);
            }
        }
    }

    fn instantiate(&self, fresh: &HashMap<&str, TypeVar>) -> Type {
        match self {
            // Все переменные шаблона собраны в `fresh` заранее.
            TypeTemplate::Var(name) => Type::Var(fresh[name.as_str()].clone()),
            TypeTemplate::Con(name) => Type::con(name.clone()),
            TypeTemplate::Fun(a, b) => Type::fun(a.instantiate(fresh), b.instantiate(fresh)),
            TypeTemplate::App(a, b) => Type::app(a.instantiate(fresh), b.instantiate(fresh)),
        }
    }
}

/// Сигнатура функции: ограничения на переменные и шаблон типа.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub constraints: BTreeMap<String, Vec<String>>,
    #[serde(rename = "type")]
    pub ty: TypeTemplate,
}

impl Signature {
    pub fn new(ty: TypeTemplate) -> Self {
        Self {
            constraints: BTreeMap::new(),
            ty,
        }
    }

    /// Добавить ограничение `class var`.
    pub fn with_constraint(mut self, var: impl Into<String>, class: impl Into<String>) -> Self {
        self.constraints.entry(var.into()).or_default().push(class.into());
        self
    }
}

/// Каталог классов типов и функций.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    classes: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    functions: BTreeMap<String, Signature>,
}

impl Catalog {
    /// Создать пустой каталог.
    pub fn new() -> Self {
        Self::default()
    }

    /// Встроенный каталог с базовыми классами и функциями.
    pub fn prelude() -> Self {
        use TypeTemplate as T;

        let a = || T::var("a");
        let b = || T::var("b");
        let string = || T::list(T::con("Char"));

        let mut catalog = Self::new();
        catalog.add_class("Eq", ["Int", "Integer", "Float", "Double", "Bool", "Char"]);
        catalog.add_class("Ord", ["Int", "Integer", "Float", "Double", "Bool", "Char"]);
        catalog.add_class("Show", ["Int", "Integer", "Float", "Double", "Bool", "Char"]);
        catalog.add_class("Num", ["Int", "Integer", "Float", "Double"]);
        catalog.add_class("Integral", ["Int", "Integer"]);
        catalog.add_class("Fractional", ["Float", "Double"]);

        catalog.add_function("id", Signature::new(T::fun(a(), a())));
        catalog.add_function("const", Signature::new(T::fun(a(), T::fun(b(), a()))));
        catalog.add_function("not", Signature::new(T::fun(T::con("Bool"), T::con("Bool"))));
        catalog.add_function(
            "+",
            Signature::new(T::fun(a(), T::fun(a(), a()))).with_constraint("a", "Num"),
        );
        catalog.add_function(
            "==",
            Signature::new(T::fun(a(), T::fun(a(), T::con("Bool")))).with_constraint("a", "Eq"),
        );
        catalog.add_function(
            "<",
            Signature::new(T::fun(a(), T::fun(a(), T::con("Bool")))).with_constraint("a", "Ord"),
        );
        catalog.add_function(
            "negate",
            Signature::new(T::fun(a(), a())).with_constraint("a", "Num"),
        );
        catalog.add_function("length", Signature::new(T::fun(T::list(a()), T::con("Int"))));
        catalog.add_function(
            "map",
            Signature::new(T::fun(
                T::fun(a(), b()),
                T::fun(T::list(a()), T::list(b())),
            )),
        );
        catalog.add_function("head", Signature::new(T::fun(T::list(a()), a())));
        catalog.add_function(
            "show",
            Signature::new(T::fun(a(), string())).with_constraint("a", "Show"),
        );
        catalog.add_function(
            "fromIntegral",
            Signature::new(T::fun(a(), b()))
                .with_constraint("a", "Integral")
                .with_constraint("b", "Num"),
        );
        catalog
    }

    /// Разобрать и проверить каталог из JSON.
    pub fn from_json_str(json: &str) -> ViskellResult<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Загрузить каталог из файла.
    pub fn load(path: impl AsRef<Path>) -> ViskellResult<Self> {
        let path = path.as_ref();
        debug!("Loading type catalog from {}", path.display());
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json(&self) -> ViskellResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Добавить (или расширить) класс типов.
    pub fn add_class<I, S>(&mut self, name: impl Into<String>, instances: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.classes
            .entry(name.into())
            .or_default()
            .extend(instances.into_iter().map(Into::into));
    }

    pub fn add_function(&mut self, name: impl Into<String>, signature: Signature) {
        self.functions.insert(name.into(), signature);
    }

    pub fn class(&self, name: &str) -> Option<TypeClass> {
        self.classes
            .get(name)
            .map(|instances| TypeClass::new(name, instances.iter().cloned()))
    }

    pub fn signature(&self, name: &str) -> Option<&Signature> {
        self.functions.get(name)
    }

    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    /// Построить набор ограничений из имён классов.
    pub fn constraint_set<S: AsRef<str>>(&self, names: &[S]) -> ViskellResult<ConstraintSet> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.class(name)
                    .ok_or_else(|| ViskellError::UnknownClass(name.to_string()))
            })
            .collect()
    }

    /// Проверить, что сигнатуры ссылаются только на известные классы и
    /// ограничивают только свои переменные.
    pub fn validate(&self) -> ViskellResult<()> {
        for (name, signature) in &self.functions {
            let variables = signature.ty.variables();
            for (var, classes) in &signature.constraints {
                if !variables.contains(&var.as_str()) {
                    return Err(ViskellError::InvalidSignature(
                        name.clone(),
                        format!("constrained variable {} does not occur in the type", var),
                    ));
                }
                if let Some(unknown) = classes.iter().find(|c| !self.classes.contains_key(*c)) {
                    return Err(ViskellError::UnknownClass(unknown.clone()));
                }
            }
        }
        Ok(())
    }

    /// Конкретизировать сигнатуру функции свежими переменными.
    pub fn instantiate(&self, name: &str, vars: &mut TypeVarTable) -> ViskellResult<Type> {
        let signature = self
            .signature(name)
            .ok_or_else(|| ViskellError::UnknownIdentifier(name.to_string()))?;

        let mut fresh = HashMap::new();
        for var in signature.ty.variables() {
            let constraints = match signature.constraints.get(var) {
                Some(classes) => self.constraint_set(classes)?,
                None => ConstraintSet::new(),
            };
            fresh.insert(var, vars.fresh_constrained(var, constraints));
        }
        Ok(signature.ty.instantiate(&fresh))
    }
}
