//! Indented text form of LIR, one node per line

use crate::{Node, NodeKind, Program, Storage, Value};
use std::fmt::{self, Write};

impl fmt::Display for Storage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { name } => write!(formatter, "local {name}"),
            Self::OuterScope { name, depth } => write!(formatter, "outer {name} depth {depth}"),
            Self::FunctionArgument { index } => write!(formatter, "arg {index}"),
            Self::Package {
                module,
                package,
                name,
            } => write!(formatter, "package {module}/{package}.{name}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(formatter, "int {value}"),
            Self::Float(value) => write!(formatter, "float {value}"),
            Self::Bool(value) => write!(formatter, "bool {value}"),
            Self::String(value) => write!(formatter, "string {value:?}"),
            Self::Unit => formatter.write_str("unit"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(formatter, "program {}/{}", self.module, self.package)?;
        for item in &self.items {
            write_node(formatter, item, 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Node {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node(formatter, self, 0)
    }
}

fn flags(public: bool, mutable: bool) -> String {
    let mut text = String::new();
    if public {
        text.push_str(" pub");
    }
    if mutable {
        text.push_str(" mut");
    }
    text
}

fn write_node(out: &mut impl Write, node: &Node, depth: usize) -> fmt::Result {
    let indent = "  ".repeat(depth);
    let child = depth + 1;
    match &node.kind {
        NodeKind::Value(value) => writeln!(out, "{indent}{value}"),
        NodeKind::Interpolation { parts } => {
            writeln!(out, "{indent}interpolate")?;
            write_all(out, parts, child)
        }
        NodeKind::Read { storage } => writeln!(out, "{indent}read {storage}"),
        NodeKind::Write { storage, value } => {
            writeln!(out, "{indent}write {storage}")?;
            write_node(out, value, child)
        }
        NodeKind::DefinePackageFunction {
            module,
            package,
            name,
            public,
            mutable,
            params,
            function,
        } => {
            let params = params
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                out,
                "{indent}define fn {module}/{package}.{name}({params}){}",
                flags(*public, *mutable)
            )?;
            write_node(out, function, child)
        }
        NodeKind::DefinePackageVariable {
            module,
            package,
            name,
            public,
            mutable,
            value,
        } => {
            let keyword = if *mutable { "var" } else { "val" };
            writeln!(
                out,
                "{indent}define {keyword} {module}/{package}.{name}{}",
                flags(*public, false)
            )?;
            write_node(out, value, child)
        }
        NodeKind::DeclareLocal {
            name,
            mutable,
            value,
        } => {
            let keyword = if *mutable { "var" } else { "val" };
            writeln!(out, "{indent}local {keyword} {name}")?;
            write_node(out, value, child)
        }
        NodeKind::Function { params, body } => {
            writeln!(out, "{indent}function({})", params.join(", "))?;
            write_node(out, body, child)
        }
        NodeKind::Block { body } => {
            writeln!(out, "{indent}block")?;
            write_all(out, body, child)
        }
        NodeKind::Call { callee, args } => {
            writeln!(out, "{indent}call")?;
            write_node(out, callee, child)?;
            write_all(out, args, child)
        }
        NodeKind::Field { receiver, field } => {
            writeln!(out, "{indent}field {field}")?;
            write_node(out, receiver, child)
        }
        NodeKind::Index { receiver, index } => {
            writeln!(out, "{indent}index")?;
            write_node(out, receiver, child)?;
            write_node(out, index, child)
        }
        NodeKind::WriteIndex {
            receiver,
            index,
            value,
        } => {
            writeln!(out, "{indent}write index")?;
            write_node(out, receiver, child)?;
            write_node(out, index, child)?;
            write_node(out, value, child)
        }
        NodeKind::Binary { op, left, right } => {
            writeln!(out, "{indent}binary {op}")?;
            write_node(out, left, child)?;
            write_node(out, right, child)
        }
        NodeKind::Unary { op, operand } => {
            writeln!(out, "{indent}unary {op}")?;
            write_node(out, operand, child)
        }
        NodeKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            writeln!(out, "{indent}if")?;
            write_node(out, condition, child)?;
            write_node(out, then_branch, child)?;
            if let Some(else_branch) = else_branch {
                write_node(out, else_branch, child)?;
            }
            Ok(())
        }
        NodeKind::While { condition, body } => {
            writeln!(out, "{indent}while")?;
            write_node(out, condition, child)?;
            write_node(out, body, child)
        }
        NodeKind::Return { value } => {
            writeln!(out, "{indent}return")?;
            match value {
                Some(value) => write_node(out, value, child),
                None => Ok(()),
            }
        }
        NodeKind::Is { value, case } => {
            writeln!(out, "{indent}is {case}")?;
            write_node(out, value, child)
        }
        NodeKind::Array { elements } => {
            writeln!(out, "{indent}array")?;
            write_all(out, elements, child)
        }
        NodeKind::DefineVariantType {
            module,
            package,
            name,
            cases,
        } => {
            writeln!(out, "{indent}define data {module}/{package}.{name}")?;
            let case_indent = "  ".repeat(child);
            for case in cases {
                writeln!(out, "{case_indent}case {}({})", case.name, case.fields.join(", "))?;
            }
            Ok(())
        }
    }
}

fn write_all(out: &mut impl Write, nodes: &[Node], depth: usize) -> fmt::Result {
    for node in nodes {
        write_node(out, node, depth)?;
    }
    Ok(())
}
