//! Variant type definitions owned by a package

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tn_ty::{Type, VariantType};

/// Field of a variant case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field name
    pub name: String,
    /// Field type, may mention the definition's type parameters
    pub ty: Type,
    /// Readable outside the defining package
    pub public: bool,
}

/// One case of a variant type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantCase {
    /// Case name, also the constructor name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<Field>,
    /// Constructor visible outside the defining package
    pub public: bool,
}

impl VariantCase {
    /// Field named `name`
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }
}

/// An algebraic sum type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDefinition {
    /// Defining module
    pub module: String,
    /// Defining package
    pub package: String,
    /// Type name
    pub name: String,
    /// Generic parameter names
    pub type_params: Vec<String>,
    /// Type visible outside the defining package
    pub public: bool,
    /// Cases in declaration order
    pub cases: Vec<VariantCase>,
}

impl VariantDefinition {
    /// The definition as a type, generic parameters unbound
    pub fn ty(&self) -> VariantType {
        VariantType::generic(
            self.module.clone(),
            self.package.clone(),
            self.name.clone(),
            self.type_params.clone(),
        )
    }

    /// Case named `name`
    pub fn case(&self, name: &str) -> Option<&VariantCase> {
        self.cases.iter().find(|case| case.name == name)
    }

    /// Type of the constructor for `case`: field types in, owning type out
    pub fn constructor_type(&self, case: &VariantCase) -> Type {
        Type::function(
            case.fields.iter().map(|field| field.ty.clone()).collect(),
            Type::Variant(self.ty()),
        )
    }

    /// Type of `field` on a value of `ty`.
    ///
    /// With a case selected the field must exist on that case. Without one
    /// it must exist with the same type on every case.
    pub fn field_type(&self, ty: &VariantType, field: &str) -> Option<Type> {
        let declared = match &ty.case {
            Some(case) => self.case(case)?.field(field)?.ty.clone(),
            None => {
                let mut cases = self.cases.iter();
                let first = cases.next()?.field(field)?.ty.clone();
                if !cases.all(|case| case.field(field).is_some_and(|found| found.ty == first)) {
                    return None;
                }
                first
            }
        };
        Some(declared.substitute(&ty.bindings()))
    }
}

/// Variant types declared in one package, keyed by type name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeRegistry {
    variants: IndexMap<String, VariantDefinition>,
}

impl TypeRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing an earlier one with the same name
    pub fn define(&mut self, definition: VariantDefinition) -> &VariantDefinition {
        let name = definition.name.clone();
        match self.variants.entry(name) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.insert(definition);
                entry.into_mut()
            }
            indexmap::map::Entry::Vacant(entry) => entry.insert(definition),
        }
    }

    /// Definition named `name`
    pub fn get(&self, name: &str) -> Option<&VariantDefinition> {
        self.variants.get(name)
    }

    /// Definition declaring a case named `case`
    pub fn find_case(&self, case: &str) -> Option<(&VariantDefinition, &VariantCase)> {
        self.variants
            .values()
            .find_map(|definition| definition.case(case).map(|found| (definition, found)))
    }

    /// Definitions in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &VariantDefinition> {
        self.variants.values()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether no type is defined
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape() -> VariantDefinition {
        VariantDefinition {
            module: "geo".to_string(),
            package: "shapes".to_string(),
            name: "Shape".to_string(),
            type_params: vec!["T".to_string()],
            public: true,
            cases: vec![
                VariantCase {
                    name: "Circle".to_string(),
                    fields: vec![
                        Field {
                            name: "tag".to_string(),
                            ty: Type::TypeParameter("T".to_string()),
                            public: true,
                        },
                        Field {
                            name: "radius".to_string(),
                            ty: Type::FLOAT,
                            public: true,
                        },
                    ],
                    public: true,
                },
                VariantCase {
                    name: "Square".to_string(),
                    fields: vec![Field {
                        name: "tag".to_string(),
                        ty: Type::TypeParameter("T".to_string()),
                        public: true,
                    }],
                    public: true,
                },
            ],
        }
    }

    #[test]
    fn test_constructor_type() {
        let definition = shape();
        let ctor = definition.constructor_type(&definition.cases[0]);
        assert_eq!(ctor.to_string(), "(T, float) -> Shape[T]");
    }

    #[test]
    fn test_field_types() {
        let definition = shape();
        let mut ty = definition.ty();
        ty.type_args = vec![Type::STRING];

        assert_eq!(definition.field_type(&ty, "tag"), Some(Type::STRING));
        assert_eq!(definition.field_type(&ty, "radius"), None);
        assert_eq!(
            definition.field_type(&ty.with_case("Circle"), "radius"),
            Some(Type::FLOAT)
        );
    }

    #[test]
    fn test_find_case() {
        let mut registry = TypeRegistry::new();
        registry.define(shape());
        let (definition, case) = registry.find_case("Square").unwrap();
        assert_eq!(definition.name, "Shape");
        assert_eq!(case.fields.len(), 1);
    }
}
