//! Type representation
#![allow(
    clippy::min_ident_chars,
    reason = "Ty is the conventional name in type system implementations"
)]

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    /// `unit`
    Unit,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `bool`
    Bool,
    /// `string`
    String,
    /// `any`, compatible with every type
    Any,
}

impl Primitive {
    /// Primitive named `name` in source
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "unit" => Self::Unit,
            "int" => Self::Int,
            "float" => Self::Float,
            "bool" => Self::Bool,
            "string" => Self::String,
            "any" => Self::Any,
            _ => return None,
        })
    }

    /// Source name
    pub fn name(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Any => "any",
        }
    }
}

/// Function signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnType {
    /// Parameter types, in order
    pub params: Vec<Type>,
    /// Return type
    pub ret: Box<Type>,
}

impl FnType {
    /// Signature from parameters and return type
    pub fn new(params: Vec<Type>, ret: Type) -> Self {
        Self {
            params,
            ret: Box::new(ret),
        }
    }
}

/// Set of function signatures sharing one name, at most one per parameter list
#[derive(Debug, Clone, Default, Eq, Serialize, Deserialize)]
pub struct OverloadSet {
    members: Vec<FnType>,
}

impl OverloadSet {
    /// Overload set holding `members`, merged left to right
    pub fn new(members: impl IntoIterator<Item = FnType>) -> Self {
        let mut set = Self::default();
        for member in members {
            set.insert(member);
        }
        set
    }

    /// Add a signature. A member with the same parameter list is replaced.
    pub fn insert(&mut self, signature: FnType) {
        match self
            .members
            .iter_mut()
            .find(|member| member.params == signature.params)
        {
            Some(member) => *member = signature,
            None => self.members.push(signature),
        }
    }

    /// Union with another set
    pub fn extend(&mut self, other: Self) {
        for member in other.members {
            self.insert(member);
        }
    }

    /// Signatures in insertion order
    pub fn members(&self) -> &[FnType] {
        &self.members
    }

    /// Number of signatures
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set has no signatures
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl PartialEq for OverloadSet {
    fn eq(&self, other: &Self) -> bool {
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .all(|member| other.members.contains(member))
    }
}

/// Reference to an algebraic type, optionally narrowed to one case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantType {
    /// Defining module
    pub module: String,
    /// Defining package
    pub package: String,
    /// Type name
    pub name: String,
    /// Declared generic parameter names
    pub type_params: Vec<String>,
    /// Bindings for `type_params`, positionally
    pub type_args: Vec<Type>,
    /// Selected case
    pub case: Option<String>,
}

impl VariantType {
    /// Generic variant whose arguments are still its own parameters
    pub fn generic(
        module: impl Into<String>,
        package: impl Into<String>,
        name: impl Into<String>,
        type_params: Vec<String>,
    ) -> Self {
        let type_args = type_params
            .iter()
            .map(|param| Type::TypeParameter(param.clone()))
            .collect();
        Self {
            module: module.into(),
            package: package.into(),
            name: name.into(),
            type_params,
            type_args,
            case: None,
        }
    }

    /// Whether both refer to the same definition
    pub fn same_definition(&self, other: &Self) -> bool {
        self.module == other.module && self.package == other.package && self.name == other.name
    }

    /// The same type with `case` selected
    #[must_use]
    pub fn with_case(&self, case: impl Into<String>) -> Self {
        Self {
            case: Some(case.into()),
            ..self.clone()
        }
    }

    /// Map from generic parameter name to its binding
    pub fn bindings(&self) -> FxHashMap<String, Type> {
        self.type_params
            .iter()
            .cloned()
            .zip(self.type_args.iter().cloned())
            .collect()
    }
}

/// A type in the type system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// Built-in scalar
    Primitive(Primitive),
    /// Single function signature
    Function(FnType),
    /// Several signatures under one name
    Overloaded(OverloadSet),
    /// Generic parameter, compared by name
    TypeParameter(String),
    /// Algebraic data type
    Variant(VariantType),
    /// `array[T]`
    Array(Box<Type>),
}

impl Type {
    /// `unit`
    pub const UNIT: Self = Self::Primitive(Primitive::Unit);
    /// `int`
    pub const INT: Self = Self::Primitive(Primitive::Int);
    /// `float`
    pub const FLOAT: Self = Self::Primitive(Primitive::Float);
    /// `bool`
    pub const BOOL: Self = Self::Primitive(Primitive::Bool);
    /// `string`
    pub const STRING: Self = Self::Primitive(Primitive::String);
    /// `any`
    pub const ANY: Self = Self::Primitive(Primitive::Any);

    /// Function type from parameters and return type
    pub fn function(params: Vec<Type>, ret: Type) -> Self {
        Self::Function(FnType::new(params, ret))
    }

    /// Array of `element`
    pub fn array(element: Type) -> Self {
        Self::Array(Box::new(element))
    }

    /// Whether this is `any`
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Any))
    }

    /// Whether this is `unit`
    pub fn is_unit(&self) -> bool {
        matches!(self, Self::Primitive(Primitive::Unit))
    }

    /// Function or overload set
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Function(_) | Self::Overloaded(_))
    }

    /// Single signature, if this is one
    pub fn as_function(&self) -> Option<&FnType> {
        match self {
            Self::Function(signature) => Some(signature),
            _ => None,
        }
    }

    /// Variant reference, if this is one
    pub fn as_variant(&self) -> Option<&VariantType> {
        match self {
            Self::Variant(variant) => Some(variant),
            _ => None,
        }
    }

    /// Whether any unbound type parameter appears inside
    pub fn has_type_params(&self) -> bool {
        match self {
            Self::Primitive(_) => false,
            Self::TypeParameter(_) => true,
            Self::Function(signature) => {
                signature.params.iter().any(Self::has_type_params)
                    || signature.ret.has_type_params()
            }
            Self::Overloaded(set) => set.members().iter().any(|member| {
                member.params.iter().any(Self::has_type_params) || member.ret.has_type_params()
            }),
            Self::Variant(variant) => variant.type_args.iter().any(Self::has_type_params),
            Self::Array(element) => element.has_type_params(),
        }
    }

    /// Whether type parameter `name` appears inside
    pub fn mentions(&self, name: &str) -> bool {
        match self {
            Self::Primitive(_) => false,
            Self::TypeParameter(param) => param == name,
            Self::Function(signature) => {
                signature.params.iter().any(|param| param.mentions(name))
                    || signature.ret.mentions(name)
            }
            Self::Overloaded(set) => set.members().iter().any(|member| {
                member.params.iter().any(|param| param.mentions(name)) || member.ret.mentions(name)
            }),
            Self::Variant(variant) => variant.type_args.iter().any(|arg| arg.mentions(name)),
            Self::Array(element) => element.mentions(name),
        }
    }

    /// Replace every type parameter not named in `in_scope` with `any`
    #[must_use]
    pub fn erase_type_params(&self, in_scope: &[String]) -> Type {
        if !self.has_type_params() {
            return self.clone();
        }
        let erase_fn = |signature: &FnType| {
            FnType::new(
                signature
                    .params
                    .iter()
                    .map(|param| param.erase_type_params(in_scope))
                    .collect(),
                signature.ret.erase_type_params(in_scope),
            )
        };
        match self {
            Self::Primitive(_) => self.clone(),
            Self::TypeParameter(name) if in_scope.contains(name) => self.clone(),
            Self::TypeParameter(_) => Self::ANY,
            Self::Function(signature) => Self::Function(erase_fn(signature)),
            Self::Overloaded(set) => Self::Overloaded(OverloadSet::new(set.members().iter().map(erase_fn))),
            Self::Variant(variant) => Self::Variant(VariantType {
                type_args: variant
                    .type_args
                    .iter()
                    .map(|arg| arg.erase_type_params(in_scope))
                    .collect(),
                ..variant.clone()
            }),
            Self::Array(element) => Self::array(element.erase_type_params(in_scope)),
        }
    }

    /// Replace bound type parameters
    #[must_use]
    pub fn substitute(&self, bindings: &FxHashMap<String, Type>) -> Type {
        if bindings.is_empty() {
            return self.clone();
        }
        match self {
            Self::Primitive(_) => self.clone(),
            Self::TypeParameter(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Function(signature) => Self::Function(substitute_fn(signature, bindings)),
            Self::Overloaded(set) => Self::Overloaded(OverloadSet::new(
                set.members()
                    .iter()
                    .map(|member| substitute_fn(member, bindings)),
            )),
            Self::Variant(variant) => Self::Variant(VariantType {
                type_args: variant
                    .type_args
                    .iter()
                    .map(|arg| arg.substitute(bindings))
                    .collect(),
                ..variant.clone()
            }),
            Self::Array(element) => Self::array(element.substitute(bindings)),
        }
    }
}

fn substitute_fn(signature: &FnType, bindings: &FxHashMap<String, Type>) -> FnType {
    FnType::new(
        signature
            .params
            .iter()
            .map(|param| param.substitute(bindings))
            .collect(),
        signature.ret.substitute(bindings),
    )
}

impl From<Primitive> for Type {
    fn from(primitive: Primitive) -> Self {
        Self::Primitive(primitive)
    }
}

fn write_list(formatter: &mut fmt::Formatter<'_>, types: &[Type]) -> fmt::Result {
    for (idx, ty) in types.iter().enumerate() {
        if idx > 0 {
            write!(formatter, ", ")?;
        }
        write!(formatter, "{ty}")?;
    }
    Ok(())
}

impl fmt::Display for FnType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "(")?;
        write_list(formatter, &self.params)?;
        write!(formatter, ") -> {}", self.ret)
    }
}

impl fmt::Display for VariantType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.name)?;
        if !self.type_args.is_empty() {
            write!(formatter, "[")?;
            write_list(formatter, &self.type_args)?;
            write!(formatter, "]")?;
        }
        if let Some(case) = &self.case {
            write!(formatter, ".{case}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => formatter.write_str(primitive.name()),
            Self::Function(signature) => write!(formatter, "{signature}"),
            Self::Overloaded(set) => {
                for (idx, member) in set.members().iter().enumerate() {
                    if idx > 0 {
                        write!(formatter, " & ")?;
                    }
                    write!(formatter, "{member}")?;
                }
                Ok(())
            }
            Self::TypeParameter(name) => formatter.write_str(name),
            Self::Variant(variant) => write!(formatter, "{variant}"),
            Self::Array(element) => write!(formatter, "array[{element}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overload_set_equality_ignores_order() {
        let first = FnType::new(vec![Type::INT], Type::UNIT);
        let second = FnType::new(vec![Type::STRING], Type::UNIT);
        assert_eq!(
            OverloadSet::new([first.clone(), second.clone()]),
            OverloadSet::new([second, first])
        );
    }

    #[test]
    fn test_overload_insert_replaces_same_params() {
        let mut set = OverloadSet::new([FnType::new(vec![Type::INT], Type::UNIT)]);
        set.insert(FnType::new(vec![Type::INT], Type::STRING));
        assert_eq!(set.len(), 1);
        assert_eq!(*set.members()[0].ret, Type::STRING);
    }

    #[test]
    fn test_erase_keeps_generics_in_scope() {
        let ty = Type::function(
            vec![Type::TypeParameter("T".to_string())],
            Type::array(Type::TypeParameter("U".to_string())),
        );
        let erased = ty.erase_type_params(&["T".to_string()]);
        assert_eq!(erased.to_string(), "(T) -> array[any]");
        assert_eq!(ty.erase_type_params(&[]).to_string(), "(any) -> array[any]");
    }

    #[test]
    fn test_substitute_and_display() {
        let option = VariantType::generic("std", "option", "Option", vec!["T".to_string()]);
        let ctor = Type::function(
            vec![Type::TypeParameter("T".to_string())],
            Type::Variant(option.with_case("Just")),
        );
        assert_eq!(ctor.to_string(), "(T) -> Option[T].Just");
        assert!(ctor.has_type_params());

        let mut bindings = FxHashMap::default();
        bindings.insert("T".to_string(), Type::array(Type::INT));
        let concrete = ctor.substitute(&bindings);
        assert_eq!(concrete.to_string(), "(array[int]) -> Option[array[int]].Just");
        assert!(!concrete.has_type_params());
    }
}
