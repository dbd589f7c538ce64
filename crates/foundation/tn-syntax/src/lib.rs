//! Parse tree for Tern source units
//!
//! This is the boundary between the parser and the semantic core. The parser
//! produces a [`SourceUnit`]; the declaration sorter and the HIR converter only
//! ever read it. Every node carries the [`Span`] it was parsed from.

use serde::{Deserialize, Serialize};
use std::fmt;
use tn_span::Span;

/// A parsed compilation unit
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    /// `package module/package` line, if present
    pub package: Option<PackageDecl>,
    /// Import declarations, in source order
    pub imports: Vec<ImportDecl>,
    /// Top-level nodes, in source order
    pub items: Vec<Node>,
}

/// `package module/package`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDecl {
    /// Module name
    pub module: String,
    /// Package name
    pub package: String,
    /// Source location
    pub span: Span,
}

/// `import module/package as alias { name as local, other }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Source module
    pub module: String,
    /// Source package
    pub package: String,
    /// Whole-package alias
    pub alias: Option<String>,
    /// Individually imported names
    pub entries: Vec<ImportEntry>,
    /// Source location
    pub span: Span,
}

/// One name in an import list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Name in the source package
    pub name: String,
    /// Local name, when renamed
    pub alias: Option<String>,
    /// Source location
    pub span: Span,
}

impl ImportEntry {
    /// Name the entry is visible under in the importing unit
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Syntactic type reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    /// `int`, `Option`, `T`
    Named {
        /// Referenced name
        name: String,
        /// Source location
        span: Span,
    },
    /// `(int, bool) -> string`
    Function {
        /// Parameter types
        params: Vec<TypeRef>,
        /// Return type
        ret: Box<TypeRef>,
        /// Source location
        span: Span,
    },
    /// `array[int]`, `Option[T]`
    Constructor {
        /// Parameterized base
        base: Box<TypeRef>,
        /// Type arguments
        args: Vec<TypeRef>,
        /// Source location
        span: Span,
    },
    /// `Option.Just`
    Case {
        /// Owning variant type
        base: Box<TypeRef>,
        /// Selected case name
        case: String,
        /// Source location
        span: Span,
    },
}

impl TypeRef {
    /// Source location
    pub fn span(&self) -> Span {
        match self {
            Self::Named { span, .. }
            | Self::Function { span, .. }
            | Self::Constructor { span, .. }
            | Self::Case { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named { name, .. } => write!(formatter, "{name}"),
            Self::Function { params, ret, .. } => {
                write!(formatter, "(")?;
                for (idx, param) in params.iter().enumerate() {
                    if idx > 0 {
                        write!(formatter, ", ")?;
                    }
                    write!(formatter, "{param}")?;
                }
                write!(formatter, ") -> {ret}")
            }
            Self::Constructor { base, args, .. } => {
                write!(formatter, "{base}[")?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        write!(formatter, ", ")?;
                    }
                    write!(formatter, "{arg}")?;
                }
                write!(formatter, "]")
            }
            Self::Case { base, case, .. } => write!(formatter, "{base}.{case}"),
        }
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// `true` / `false`
    Bool(bool),
    /// String literal without interpolation
    String(String),
    /// `unit`
    Unit,
}

/// Piece of an interpolated string
#[derive(Debug, Clone, PartialEq)]
pub enum InterpolationPart {
    /// Literal text
    Text(String),
    /// `$name` or `${expr}`
    Expr(Node),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl BinaryOp {
    /// Whether the operator is `+ - * / %`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Rem
        )
    }

    /// Whether the operator compares two values
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Whether the operator is `&&` or `||`
    pub fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
        };
        formatter.write_str(text)
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Negate,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not => formatter.write_str("!"),
            Self::Negate => formatter.write_str("-"),
        }
    }
}

/// Function or lambda parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub ty: TypeRef,
    /// Source location
    pub span: Span,
}

/// `val` / `var` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct NameDeclaration {
    /// Declared name
    pub name: String,
    /// `pub` modifier
    pub public: bool,
    /// `var` rather than `val`
    pub mutable: bool,
    /// Optional type annotation
    pub ty: Option<TypeRef>,
    /// Initializer
    pub value: Box<Node>,
    /// Source location
    pub span: Span,
}

/// `fn name[T](params): ret { body }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDeclaration {
    /// Function name
    pub name: String,
    /// `pub` modifier
    pub public: bool,
    /// Generic parameter names
    pub type_params: Vec<String>,
    /// Parameters
    pub params: Vec<Param>,
    /// Declared return type, `unit` when absent
    pub return_type: Option<TypeRef>,
    /// Body statements
    pub body: Vec<Node>,
    /// Source location
    pub span: Span,
}

/// `data Name[T] = Case(field: T) | Other`
#[derive(Debug, Clone, PartialEq)]
pub struct VariantTypeDefinition {
    /// Type name
    pub name: String,
    /// `pub` modifier
    pub public: bool,
    /// Generic parameter names
    pub type_params: Vec<String>,
    /// Cases, in declaration order
    pub cases: Vec<CaseDefinition>,
    /// Source location
    pub span: Span,
}

/// One alternative of a variant type
#[derive(Debug, Clone, PartialEq)]
pub struct CaseDefinition {
    /// Case (and constructor) name
    pub name: String,
    /// `pub` modifier
    pub public: bool,
    /// Fields
    pub fields: Vec<FieldDefinition>,
    /// Source location
    pub span: Span,
}

/// Field of a variant case
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// `pub` modifier
    pub public: bool,
    /// Field type
    pub ty: TypeRef,
    /// Source location
    pub span: Span,
}

/// Parse tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Literal atom
    Literal {
        /// Value
        value: Literal,
        /// Source location
        span: Span,
    },
    /// Interpolated string
    Interpolation {
        /// Text and expression parts
        parts: Vec<InterpolationPart>,
        /// Source location
        span: Span,
    },
    /// Identifier
    Name {
        /// Identifier text
        name: String,
        /// Source location
        span: Span,
    },
    /// `module/package.name`
    QualifiedName {
        /// Module of the package
        module: String,
        /// Package holding the name
        package: String,
        /// Name in that package
        name: String,
        /// Location of the name
        name_span: Span,
        /// Source location
        span: Span,
    },
    /// `val` / `var`
    NameDeclaration(NameDeclaration),
    /// `fn`
    FunctionDeclaration(FunctionDeclaration),
    /// `data`
    VariantTypeDefinition(VariantTypeDefinition),
    /// `fn(params): ret { body }`
    Lambda {
        /// Parameters
        params: Vec<Param>,
        /// Declared return type
        return_type: Option<TypeRef>,
        /// Body statements
        body: Vec<Node>,
        /// Source location
        span: Span,
    },
    /// `{ ... }`
    Block {
        /// Statements
        body: Vec<Node>,
        /// Source location
        span: Span,
    },
    /// `callee(args)`
    Call {
        /// Called expression
        callee: Box<Node>,
        /// Arguments
        args: Vec<Node>,
        /// Source location
        span: Span,
    },
    /// `receiver.member`
    Member {
        /// Receiver expression
        receiver: Box<Node>,
        /// Member name
        member: String,
        /// Location of the member name
        member_span: Span,
        /// Source location
        span: Span,
    },
    /// `receiver[index]`
    Index {
        /// Indexed expression
        receiver: Box<Node>,
        /// Index expression
        index: Box<Node>,
        /// Source location
        span: Span,
    },
    /// `name = value`
    Assignment {
        /// Assigned name
        name: String,
        /// Location of the name
        name_span: Span,
        /// New value
        value: Box<Node>,
        /// Source location
        span: Span,
    },
    /// `receiver[index] = value`
    IndexAssignment {
        /// Indexed expression
        receiver: Box<Node>,
        /// Index expression
        index: Box<Node>,
        /// New value
        value: Box<Node>,
        /// Source location
        span: Span,
    },
    /// `left op right`
    Binary {
        /// Operator
        op: BinaryOp,
        /// Left operand
        left: Box<Node>,
        /// Right operand
        right: Box<Node>,
        /// Source location
        span: Span,
    },
    /// `op operand`
    Unary {
        /// Operator
        op: UnaryOp,
        /// Operand
        operand: Box<Node>,
        /// Source location
        span: Span,
    },
    /// `if (condition) { } else { }`
    If {
        /// Condition
        condition: Box<Node>,
        /// Then branch
        then_branch: Box<Node>,
        /// Else branch
        else_branch: Option<Box<Node>>,
        /// Source location
        span: Span,
    },
    /// `while (condition) { }`
    While {
        /// Condition
        condition: Box<Node>,
        /// Loop body
        body: Box<Node>,
        /// Source location
        span: Span,
    },
    /// `return value`
    Return {
        /// Returned value
        value: Option<Box<Node>>,
        /// Source location
        span: Span,
    },
    /// `value is Case`
    Is {
        /// Tested value
        value: Box<Node>,
        /// Case name
        case: String,
        /// Source location
        span: Span,
    },
    /// `[a, b, c]`
    Array {
        /// Elements
        elements: Vec<Node>,
        /// Source location
        span: Span,
    },
}

impl Node {
    /// Source location
    pub fn span(&self) -> Span {
        match self {
            Self::NameDeclaration(decl) => decl.span,
            Self::FunctionDeclaration(decl) => decl.span,
            Self::VariantTypeDefinition(def) => def.span,
            Self::Literal { span, .. }
            | Self::Interpolation { span, .. }
            | Self::Name { span, .. }
            | Self::QualifiedName { span, .. }
            | Self::Lambda { span, .. }
            | Self::Block { span, .. }
            | Self::Call { span, .. }
            | Self::Member { span, .. }
            | Self::Index { span, .. }
            | Self::Assignment { span, .. }
            | Self::IndexAssignment { span, .. }
            | Self::Binary { span, .. }
            | Self::Unary { span, .. }
            | Self::If { span, .. }
            | Self::While { span, .. }
            | Self::Return { span, .. }
            | Self::Is { span, .. }
            | Self::Array { span, .. } => *span,
        }
    }

    /// Short description used in logs and tests
    pub fn describe(&self) -> String {
        match self {
            Self::NameDeclaration(decl) => {
                let keyword = if decl.mutable { "var" } else { "val" };
                format!("{keyword} {}", decl.name)
            }
            Self::FunctionDeclaration(decl) => format!("fn {}", decl.name),
            Self::VariantTypeDefinition(def) => format!("data {}", def.name),
            Self::Assignment { name, .. } => format!("{name} ="),
            Self::Name { name, .. } => name.clone(),
            Self::QualifiedName {
                module,
                package,
                name,
                ..
            } => format!("{module}/{package}.{name}"),
            Self::Literal { .. } => "literal".to_string(),
            Self::Interpolation { .. } => "interpolation".to_string(),
            Self::Lambda { .. } => "lambda".to_string(),
            Self::Block { .. } => "block".to_string(),
            Self::Call { .. } => "call".to_string(),
            Self::Member { member, .. } => format!(".{member}"),
            Self::Index { .. } => "index".to_string(),
            Self::IndexAssignment { .. } => "index assignment".to_string(),
            Self::Binary { op, .. } => format!("binary {op}"),
            Self::Unary { op, .. } => format!("unary {op}"),
            Self::If { .. } => "if".to_string(),
            Self::While { .. } => "while".to_string(),
            Self::Return { .. } => "return".to_string(),
            Self::Is { case, .. } => format!("is {case}"),
            Self::Array { .. } => "array".to_string(),
        }
    }
}
