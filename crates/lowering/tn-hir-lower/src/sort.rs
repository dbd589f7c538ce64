//! Top-level declaration ordering
//!
//! Package-level code may use a name before the line that declares it. The
//! sorter reorders top-level nodes so every declaration comes before its first
//! use, keeping all other nodes in their original relative order.

use rustc_hash::{FxHashMap, FxHashSet};
use tn_span::Span;
use tn_syntax::{InterpolationPart, Node, Param};

/// Name read or written by a top-level node
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    name: String,
    /// Evaluated when the node itself runs, not deferred inside a function
    eager: bool,
}

/// Cycle of top-level values that need each other's values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    /// Declared names along the cycle
    pub names: Vec<String>,
    /// Location of the node that closes the cycle
    pub span: Span,
}

/// Result of sorting a package's top-level nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOutcome {
    /// Indices into the input, in emission order
    pub order: Vec<usize>,
    /// Eager cycles found while sorting
    pub cycles: Vec<Cycle>,
}

/// Names a top-level node declares
pub fn declared_names(node: &Node) -> Vec<String> {
    match node {
        Node::FunctionDeclaration(decl) => vec![decl.name.clone()],
        Node::NameDeclaration(decl) => vec![decl.name.clone()],
        Node::VariantTypeDefinition(def) => def.cases.iter().map(|case| case.name.clone()).collect(),
        _ => Vec::new(),
    }
}

/// Order `items` so declarations precede the nodes that use them
pub fn sort_declarations(items: &[Node]) -> SortOutcome {
    let mut producers: FxHashMap<String, usize> = FxHashMap::default();
    for (idx, item) in items.iter().enumerate() {
        for name in declared_names(item) {
            producers.entry(name).or_insert(idx);
        }
    }

    let references = items.iter().map(collect_references).collect();
    let is_function = items
        .iter()
        .map(|item| matches!(item, Node::FunctionDeclaration(_)))
        .collect();

    let mut sorter = Sorter {
        items,
        producers,
        references,
        is_function,
        state: vec![VisitState::Unvisited; items.len()],
        path: Vec::new(),
        edge_eager: Vec::new(),
        order: Vec::with_capacity(items.len()),
        cycles: Vec::new(),
    };
    for idx in 0..items.len() {
        if sorter.state[idx] == VisitState::Unvisited {
            sorter.visit(idx);
        }
    }

    tracing::debug!(
        items = items.len(),
        cycles = sorter.cycles.len(),
        "sorted top-level declarations"
    );
    SortOutcome {
        order: sorter.order,
        cycles: sorter.cycles,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    InProgress,
    Done,
}

struct Sorter<'a> {
    items: &'a [Node],
    producers: FxHashMap<String, usize>,
    references: Vec<Vec<Reference>>,
    is_function: Vec<bool>,
    state: Vec<VisitState>,
    /// Nodes currently being visited
    path: Vec<usize>,
    /// Eagerness of the edge from `path[i]` to `path[i + 1]`
    edge_eager: Vec<bool>,
    order: Vec<usize>,
    cycles: Vec<Cycle>,
}

impl Sorter<'_> {
    fn visit(&mut self, node: usize) {
        self.state[node] = VisitState::InProgress;
        self.path.push(node);

        for reference_idx in 0..self.references[node].len() {
            let reference = &self.references[node][reference_idx];
            let Some(&producer) = self.producers.get(&reference.name) else {
                continue;
            };
            if producer == node {
                continue;
            }
            let eager = reference.eager && !self.is_function[producer];

            match self.state[producer] {
                VisitState::Unvisited => {
                    self.edge_eager.push(eager);
                    self.visit(producer);
                    self.edge_eager.pop();
                }
                VisitState::InProgress => self.record_cycle(producer, eager),
                VisitState::Done => {}
            }
        }

        self.path.pop();
        self.state[node] = VisitState::Done;
        self.order.push(node);
    }

    fn record_cycle(&mut self, producer: usize, closing_edge_eager: bool) {
        let Some(start) = self.path.iter().position(|idx| *idx == producer) else {
            return;
        };
        if !closing_edge_eager || !self.edge_eager[start..].iter().all(|eager| *eager) {
            return;
        }
        let names = self.path[start..]
            .iter()
            .flat_map(|idx| declared_names(&self.items[*idx]))
            .collect();
        self.cycles.push(Cycle {
            names,
            span: self.items[producer].span(),
        });
    }
}

/// Free names a top-level node reads or writes
fn collect_references(node: &Node) -> Vec<Reference> {
    let mut collector = Collector::default();
    match node {
        // The declared name itself is not a reference
        Node::FunctionDeclaration(decl) => {
            collector.function(&decl.params, &decl.body);
        }
        Node::NameDeclaration(decl) => collector.node(&decl.value),
        Node::VariantTypeDefinition(_) => {}
        other => collector.node(other),
    }
    collector.references
}

#[derive(Default)]
struct Collector {
    /// Locally bound names, innermost last
    bound: Vec<FxHashSet<String>>,
    /// Number of enclosing function bodies
    function_depth: usize,
    references: Vec<Reference>,
}

impl Collector {
    fn reference(&mut self, name: &str) {
        if self.bound.iter().any(|scope| scope.contains(name)) {
            return;
        }
        self.references.push(Reference {
            name: name.to_string(),
            eager: self.function_depth == 0,
        });
    }

    fn bind(&mut self, name: &str) {
        if let Some(scope) = self.bound.last_mut() {
            scope.insert(name.to_string());
        }
    }

    fn function(&mut self, params: &[Param], body: &[Node]) {
        self.function_depth += 1;
        self.bound
            .push(params.iter().map(|param| param.name.clone()).collect());
        self.statements(body);
        self.bound.pop();
        self.function_depth -= 1;
    }

    fn statements(&mut self, body: &[Node]) {
        self.bound.push(FxHashSet::default());
        for statement in body {
            match statement {
                Node::NameDeclaration(decl) => {
                    self.node(&decl.value);
                    self.bind(&decl.name);
                }
                Node::FunctionDeclaration(decl) => {
                    self.bind(&decl.name);
                    self.function(&decl.params, &decl.body);
                }
                Node::VariantTypeDefinition(def) => {
                    for case in &def.cases {
                        self.bind(&case.name);
                    }
                }
                other => self.node(other),
            }
        }
        self.bound.pop();
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Literal { .. } | Node::QualifiedName { .. } | Node::VariantTypeDefinition(_) => {}
            Node::Interpolation { parts, .. } => {
                for part in parts {
                    if let InterpolationPart::Expr(expr) = part {
                        self.node(expr);
                    }
                }
            }
            Node::Name { name, .. } => self.reference(name),
            Node::NameDeclaration(decl) => self.node(&decl.value),
            Node::FunctionDeclaration(decl) => self.function(&decl.params, &decl.body),
            Node::Lambda { params, body, .. } => self.function(params, body),
            Node::Block { body, .. } => self.statements(body),
            Node::Call { callee, args, .. } => {
                if let Node::Member {
                    receiver, member, ..
                } = callee.as_ref()
                {
                    self.node(receiver);
                    self.reference(member);
                } else {
                    self.node(callee);
                }
                for arg in args {
                    self.node(arg);
                }
            }
            Node::Member { receiver, .. } => self.node(receiver),
            Node::Index {
                receiver, index, ..
            } => {
                self.node(receiver);
                self.node(index);
            }
            Node::Assignment { name, value, .. } => {
                self.reference(name);
                self.node(value);
            }
            Node::IndexAssignment {
                receiver,
                index,
                value,
                ..
            } => {
                self.node(receiver);
                self.node(index);
                self.node(value);
            }
            Node::Binary { left, right, .. } => {
                self.node(left);
                self.node(right);
            }
            Node::Unary { operand, .. } => self.node(operand),
            Node::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.node(condition);
                self.node(then_branch);
                if let Some(else_branch) = else_branch {
                    self.node(else_branch);
                }
            }
            Node::While {
                condition, body, ..
            } => {
                self.node(condition);
                self.node(body);
            }
            Node::Return { value, .. } => {
                if let Some(value) = value {
                    self.node(value);
                }
            }
            Node::Is { value, .. } => self.node(value),
            Node::Array { elements, .. } => {
                for element in elements {
                    self.node(element);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(source: &str) -> Vec<String> {
        let result = tn_parser::parse(source);
        assert!(result.errors.is_empty(), "{:?}", result.errors);
        let outcome = sort_declarations(&result.unit.items);
        assert!(outcome.cycles.is_empty(), "{:?}", outcome.cycles);
        outcome
            .order
            .iter()
            .map(|idx| result.unit.items[*idx].describe())
            .collect()
    }

    #[test]
    fn test_value_used_before_declaration() {
        assert_eq!(sorted("val a = b\nval b = 10"), vec!["val b", "val a"]);
    }

    #[test]
    fn test_function_used_before_declaration() {
        assert_eq!(
            sorted("fn foo() { bar() }\nfn bar() { }"),
            vec!["fn bar", "fn foo"]
        );
    }

    #[test]
    fn test_assignments_are_not_declarations() {
        assert_eq!(
            sorted("a = b\nvar b = 10\nb = 5"),
            vec!["var b", "a =", "b ="]
        );
    }

    #[test]
    fn test_unrelated_nodes_keep_order() {
        assert_eq!(
            sorted("println(1)\nval x = 2\nprintln(3)\nval y = x"),
            vec!["call", "val x", "call", "val y"]
        );
    }

    #[test]
    fn test_local_binders_shadow() {
        assert_eq!(
            sorted("fn f(b: int) { val c = b\n c }\nval b = 1\nval c = f(2)"),
            vec!["fn f", "val b", "val c"]
        );
    }

    #[test]
    fn test_case_constructor_is_a_declaration() {
        assert_eq!(
            sorted("val x = Just(1)\ndata Option[T] = Just(value: T) | Nothing"),
            vec!["data Option", "val x"]
        );
    }

    #[test]
    fn test_eager_cycle_is_reported() {
        let result = tn_parser::parse("val a = b\nval b = a");
        let outcome = sort_declarations(&result.unit.items);
        assert_eq!(outcome.order.len(), 2);
        assert_eq!(outcome.cycles.len(), 1);
        assert_eq!(outcome.cycles[0].names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_cycle_through_function_is_legal() {
        let result = tn_parser::parse("val a = fn() { b }\nval b = a");
        let outcome = sort_declarations(&result.unit.items);
        assert!(outcome.cycles.is_empty());
        let result = tn_parser::parse("fn f() { g() }\nfn g() { f() }");
        assert!(sort_declarations(&result.unit.items).cycles.is_empty());
    }
}
