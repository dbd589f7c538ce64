//! High-level Intermediate Representation (HIR)
//!
//! The HIR is the name-resolved, type-checked form of one compilation unit.
//! Every variable access records what it resolved to and the scope it was
//! made from, so later passes never look names up again.

use la_arena::{Arena, ArenaMap, Idx};
use tn_resolve::{ScopeId, ScopeTree, VariantDefinition};
use tn_span::Span;
use tn_ty::Type;

pub use tn_syntax::{BinaryOp, Literal, UnaryOp};

/// HIR expression ID
pub type ExprId = Idx<Expr>;

/// What a name resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Package-level symbol, addressed by its qualified identity
    Package {
        /// Declaring module
        module: String,
        /// Declaring package
        package: String,
        /// Symbol name
        name: String,
    },
    /// Symbol declared in a nested scope of this compilation
    Scoped {
        /// Declaring scope
        scope: ScopeId,
        /// Symbol name
        name: String,
    },
}

impl Target {
    /// Name of the symbol
    pub fn name(&self) -> &str {
        match self {
            Self::Package { name, .. } | Self::Scoped { name, .. } => name,
        }
    }
}

/// A resolved read or write of a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableAccess {
    /// Resolution of the name
    pub target: Target,
    /// Scope the access is made from
    pub scope: ScopeId,
    /// Source location
    pub span: Span,
}

/// Piece of an interpolated string
#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationPart {
    /// Literal text
    Text(String),
    /// Embedded expression
    Expr(ExprId),
}

/// Function or lambda parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Resolved type
    pub ty: Type,
}

/// Flags shared by package-level declarations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageItem {
    /// Declaring module
    pub module: String,
    /// Declaring package
    pub package: String,
    /// Declared name
    pub name: String,
    /// `pub`
    pub public: bool,
    /// `var`
    pub mutable: bool,
}

/// HIR expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal value
    Literal {
        /// Value
        value: Literal,
        /// Source location
        span: Span,
    },
    /// Interpolated string
    Interpolation {
        /// Parts, concatenated in order
        parts: Vec<InterpolationPart>,
        /// Source location
        span: Span,
    },
    /// Variable read
    Variable(VariableAccess),
    /// Package-level function, from `fn` or a function-typed `val`/`var`
    DefinePackageFunction {
        /// Qualified identity and flags
        item: PackageItem,
        /// Function value
        value: ExprId,
        /// Source location
        span: Span,
    },
    /// Package-level non-function value
    DefinePackageVariable {
        /// Qualified identity and flags
        item: PackageItem,
        /// Initializer
        value: ExprId,
        /// Source location
        span: Span,
    },
    /// Declaration in a nested scope
    DefineLocalVariable {
        /// Declaring scope
        scope: ScopeId,
        /// Declared name
        name: String,
        /// `var`
        mutable: bool,
        /// Initializer
        value: ExprId,
        /// Source location
        span: Span,
    },
    /// `name = value`
    Assignment {
        /// Written variable
        target: VariableAccess,
        /// New value
        value: ExprId,
        /// Source location
        span: Span,
    },
    /// `receiver[index] = value`
    IndexAssignment {
        /// Indexed array
        receiver: ExprId,
        /// Index
        index: ExprId,
        /// New value
        value: ExprId,
        /// Source location
        span: Span,
    },
    /// Function or lambda
    Function {
        /// Scope holding the parameters
        scope: ScopeId,
        /// Parameters
        params: Vec<Param>,
        /// Declared or inferred return type
        ret: Type,
        /// Body block
        body: ExprId,
        /// Source location
        span: Span,
    },
    /// Block expression
    Block {
        /// Scope of the block
        scope: ScopeId,
        /// Statements, the last one gives the value
        body: Vec<ExprId>,
        /// Source location
        span: Span,
    },
    /// Call, with the receiver already prepended for method calls
    Call {
        /// Callee expression
        callee: ExprId,
        /// Arguments
        args: Vec<ExprId>,
        /// Source location
        span: Span,
    },
    /// Field read on a variant value
    FieldAccess {
        /// Receiver
        receiver: ExprId,
        /// Field name
        field: String,
        /// Source location
        span: Span,
    },
    /// `receiver[index]`
    Index {
        /// Indexed value
        receiver: ExprId,
        /// Index
        index: ExprId,
        /// Source location
        span: Span,
    },
    /// Binary operation
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: ExprId,
        /// Right operand
        right: ExprId,
        /// Source location
        span: Span,
    },
    /// Unary operation
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: ExprId,
        /// Source location
        span: Span,
    },
    /// If expression
    If {
        /// Condition
        condition: ExprId,
        /// Then branch
        then_branch: ExprId,
        /// Else branch
        else_branch: Option<ExprId>,
        /// Source location
        span: Span,
    },
    /// While loop
    While {
        /// Condition
        condition: ExprId,
        /// Loop body
        body: ExprId,
        /// Source location
        span: Span,
    },
    /// Return from the enclosing function
    Return {
        /// Returned value
        value: Option<ExprId>,
        /// Source location
        span: Span,
    },
    /// `value is Case`
    Is {
        /// Tested value
        value: ExprId,
        /// Case name
        case: String,
        /// Source location
        span: Span,
    },
    /// Array literal
    Array {
        /// Elements
        elements: Vec<ExprId>,
        /// Source location
        span: Span,
    },
    /// `data` definition
    DefineVariantType {
        /// Registered definition
        definition: VariantDefinition,
        /// Source location
        span: Span,
    },
    /// Expression that failed to check, typed `any`
    Error {
        /// Source location
        span: Span,
    },
}

impl Expr {
    /// Source location
    pub fn span(&self) -> Span {
        match self {
            Self::Variable(access) => access.span,
            Self::Literal { span, .. }
            | Self::Interpolation { span, .. }
            | Self::DefinePackageFunction { span, .. }
            | Self::DefinePackageVariable { span, .. }
            | Self::DefineLocalVariable { span, .. }
            | Self::Assignment { span, .. }
            | Self::IndexAssignment { span, .. }
            | Self::Function { span, .. }
            | Self::Block { span, .. }
            | Self::Call { span, .. }
            | Self::FieldAccess { span, .. }
            | Self::Index { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::If { span, .. }
            | Self::While { span, .. }
            | Self::Return { span, .. }
            | Self::Is { span, .. }
            | Self::Array { span, .. }
            | Self::DefineVariantType { span, .. }
            | Self::Error { span } => *span,
        }
    }
}

/// A converted compilation unit
#[derive(Debug, Clone)]
pub struct Program {
    /// Module of the unit
    pub module: String,
    /// Package of the unit
    pub package: String,
    /// Top-level expressions, in sorted declaration order
    pub items: Vec<ExprId>,
    /// Nested scopes created during conversion
    pub scopes: ScopeTree,
    exprs: Arena<Expr>,
    types: ArenaMap<ExprId, Type>,
}

impl Program {
    /// Create an empty program for `module/package`
    pub fn new(module: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            package: package.into(),
            items: Vec::new(),
            scopes: ScopeTree::new(),
            exprs: Arena::new(),
            types: ArenaMap::default(),
        }
    }

    /// Allocate an expression with its type
    pub fn alloc(&mut self, expr: Expr, ty: Type) -> ExprId {
        let id = self.exprs.alloc(expr);
        self.types.insert(id, ty);
        id
    }

    /// Expression behind `id`
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id]
    }

    /// Type of an expression
    pub fn ty(&self, id: ExprId) -> &Type {
        static ANY: Type = Type::ANY;
        self.types.get(id).unwrap_or(&ANY)
    }

    /// Source location of an expression
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id].span()
    }

    /// Every variable access, reads and writes, in allocation order
    pub fn variable_accesses(&self) -> impl Iterator<Item = &VariableAccess> {
        self.exprs.iter().filter_map(|(_, expr)| match expr {
            Expr::Variable(access) | Expr::Assignment { target: access, .. } => Some(access),
            _ => None,
        })
    }
}
