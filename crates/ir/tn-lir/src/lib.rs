//! Low-level Intermediate Representation (LIR)
//!
//! LIR is the form handed to a backend. Unlike HIR it has no scopes and no
//! name lookups left: every variable read or write names its storage class
//! directly, so a backend can lay out frames and closures without knowing
//! the source language's scoping rules.

#![allow(missing_docs, reason = "node fields are documented on their HIR counterparts")]

mod print;

use serde::{Deserialize, Serialize};
use tn_span::Span;
use tn_ty::Type;

pub use tn_syntax::{BinaryOp, UnaryOp};

/// Where a variable lives at run time
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Storage {
    /// Declared in the current function's frame
    Local { name: String },
    /// Declared in an enclosing function, `depth` function boundaries out
    OuterScope { name: String, depth: usize },
    /// Positional parameter of the current function
    FunctionArgument { index: usize },
    /// Package-level symbol
    Package {
        module: String,
        package: String,
        name: String,
    },
}

/// Constant value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Unit,
}

/// Shape of one variant case, enough to build its constructor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseShape {
    pub name: String,
    /// Field names in constructor argument order
    pub fields: Vec<String>,
}

/// A lowered node with its source location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    /// Node of `kind` at `span`
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// LIR node kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Constant
    Value(Value),
    /// String built from parts, text parts are string values
    Interpolation { parts: Vec<Node> },
    /// Variable read
    Read { storage: Storage },
    /// Variable write
    Write { storage: Storage, value: Box<Node> },
    /// Package-level function with its parameter types, for overload dispatch
    DefinePackageFunction {
        module: String,
        package: String,
        name: String,
        public: bool,
        mutable: bool,
        params: Vec<Type>,
        function: Box<Node>,
    },
    /// Package-level variable
    DefinePackageVariable {
        module: String,
        package: String,
        name: String,
        public: bool,
        mutable: bool,
        value: Box<Node>,
    },
    /// Variable in the current frame
    DeclareLocal {
        name: String,
        mutable: bool,
        value: Box<Node>,
    },
    /// Function value; parameters are read through `FunctionArgument`
    Function { params: Vec<String>, body: Box<Node> },
    /// Statement sequence, the last one gives the value
    Block { body: Vec<Node> },
    /// Call
    Call { callee: Box<Node>, args: Vec<Node> },
    /// Field read on a variant value
    Field { receiver: Box<Node>, field: String },
    /// Element read
    Index { receiver: Box<Node>, index: Box<Node> },
    /// Element write
    WriteIndex {
        receiver: Box<Node>,
        index: Box<Node>,
        value: Box<Node>,
    },
    /// Binary operation
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Node> },
    /// Conditional
    If {
        condition: Box<Node>,
        then_branch: Box<Node>,
        else_branch: Option<Box<Node>>,
    },
    /// Loop
    While { condition: Box<Node>, body: Box<Node> },
    /// Return from the current function
    Return { value: Option<Box<Node>> },
    /// Case test
    Is { value: Box<Node>, case: String },
    /// Array construction
    Array { elements: Vec<Node> },
    /// Variant type with its case constructors
    DefineVariantType {
        module: String,
        package: String,
        name: String,
        cases: Vec<CaseShape>,
    },
}

/// A lowered compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub module: String,
    pub package: String,
    /// Top-level nodes in execution order
    pub items: Vec<Node>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use expect_test::expect;

    fn node(kind: NodeKind) -> Node {
        Node::new(kind, Span::default())
    }

    fn boxed(kind: NodeKind) -> Box<Node> {
        Box::new(node(kind))
    }

    #[test]
    fn test_print_program() {
        let program = Program {
            module: "user".to_string(),
            package: "default".to_string(),
            items: vec![
                node(NodeKind::DefinePackageFunction {
                    module: "user".to_string(),
                    package: "default".to_string(),
                    name: "add".to_string(),
                    public: true,
                    mutable: false,
                    params: vec![Type::INT, Type::INT],
                    function: boxed(NodeKind::Function {
                        params: vec!["a".to_string(), "b".to_string()],
                        body: boxed(NodeKind::Block {
                            body: vec![node(NodeKind::Binary {
                                op: BinaryOp::Add,
                                left: boxed(NodeKind::Read {
                                    storage: Storage::FunctionArgument { index: 0 },
                                }),
                                right: boxed(NodeKind::Read {
                                    storage: Storage::FunctionArgument { index: 1 },
                                }),
                            })],
                        }),
                    }),
                }),
                node(NodeKind::DefineVariantType {
                    module: "user".to_string(),
                    package: "default".to_string(),
                    name: "Pair".to_string(),
                    cases: vec![CaseShape {
                        name: "Both".to_string(),
                        fields: vec!["left".to_string(), "right".to_string()],
                    }],
                }),
                node(NodeKind::Call {
                    callee: boxed(NodeKind::Read {
                        storage: Storage::Package {
                            module: "std".to_string(),
                            package: "lang".to_string(),
                            name: "println".to_string(),
                        },
                    }),
                    args: vec![node(NodeKind::Value(Value::String("hi\n".to_string())))],
                }),
            ],
        };

        expect![[r#"
            program user/default
              define fn user/default.add(int, int) pub
                function(a, b)
                  block
                    binary +
                      read arg 0
                      read arg 1
              define data user/default.Pair
                case Both(left, right)
              call
                read package std/lang.println
                string "hi\n"
        "#]]
        .assert_eq(&program.to_string());
    }

    #[test]
    fn test_serde_shape() {
        let storage = Storage::OuterScope {
            name: "x".to_string(),
            depth: 2,
        };
        expect![[r#"{"OuterScope":{"name":"x","depth":2}}"#]]
            .assert_eq(&serde_json::to_string(&storage).unwrap());
    }
}
