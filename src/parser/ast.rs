//! Arena-allocated syntax tree.
//!
//! Nodes are addressed by [`NodeId`] and carry their source line, a parent link (filled by
//! [`SyntaxTree::link_parents`] once parsing finishes) and whether the plugin that built them
//! declared the form assignable.

use std::fmt;
use std::rc::Rc;

use chrono::NaiveDate;

use crate::runner::eval::context::EvalContext;
use crate::runner::eval::types::ValueResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "||" => BinaryOperator::Or,
            "&&" => BinaryOperator::And,
            "==" => BinaryOperator::Eq,
            "!=" => BinaryOperator::NotEq,
            "<" => BinaryOperator::Lt,
            "<=" => BinaryOperator::LtEq,
            ">" => BinaryOperator::Gt,
            ">=" => BinaryOperator::GtEq,
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Sub,
            "*" => BinaryOperator::Mul,
            "/" => BinaryOperator::Div,
            "%" => BinaryOperator::Rem,
            _ => return None,
        })
    }

    /// Left binding power used by the expression driver. Higher binds tighter.
    pub fn binding_power(self) -> u8 {
        match self {
            BinaryOperator::Or => 2,
            BinaryOperator::And => 3,
            BinaryOperator::Eq | BinaryOperator::NotEq => 4,
            BinaryOperator::Lt | BinaryOperator::LtEq | BinaryOperator::Gt | BinaryOperator::GtEq => 5,
            BinaryOperator::Add | BinaryOperator::Sub => 6,
            BinaryOperator::Mul | BinaryOperator::Div | BinaryOperator::Rem => 7,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Or => "||",
            BinaryOperator::And => "&&",
            BinaryOperator::Eq => "==",
            BinaryOperator::NotEq => "!=",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOperator {
    Set,
    Add,
    Sub,
    Mul,
    Div,
}

impl AssignOperator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => AssignOperator::Set,
            "+=" => AssignOperator::Add,
            "-=" => AssignOperator::Sub,
            "*=" => AssignOperator::Mul,
            "/=" => AssignOperator::Div,
            _ => return None,
        })
    }

    /// The arithmetic a compound assignment applies before storing.
    pub fn binary(self) -> Option<BinaryOperator> {
        match self {
            AssignOperator::Set => None,
            AssignOperator::Add => Some(BinaryOperator::Add),
            AssignOperator::Sub => Some(BinaryOperator::Sub),
            AssignOperator::Mul => Some(BinaryOperator::Mul),
            AssignOperator::Div => Some(BinaryOperator::Div),
        }
    }
}

/// One `name [= init]` entry of a declaration statement.
#[derive(Debug, Clone)]
pub struct Binding {
    pub name: String,
    pub init: Option<NodeId>,
    pub line: usize,
}

/// Shared by declarations and literals. `names` is empty for a literal; a declaration may
/// carry aliases (`function hours, hour(n) {...}`).
#[derive(Debug)]
pub struct FunctionDef {
    pub names: Vec<String>,
    pub params: Vec<String>,
    pub body: NodeId,
    /// The node that `return` statements inside the body target.
    pub node: NodeId,
}

impl FunctionDef {
    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|s| s.as_str())
            .unwrap_or("<anonymous>")
    }
}

/// Evaluation hook for nodes contributed by extension plugins.
pub trait CustomEval {
    fn name(&self) -> &str;

    fn evaluate(
        &self,
        tree: &Rc<SyntaxTree>,
        children: &[NodeId],
        ctx: &mut EvalContext,
    ) -> ValueResult;
}

#[derive(Clone)]
pub struct CustomNode {
    pub op: Rc<dyn CustomEval>,
    pub children: Vec<NodeId>,
}

impl fmt::Debug for CustomNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomNode")
            .field("op", &self.op.name())
            .field("children", &self.children)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Placeholder for a node whose id was reserved before its children were parsed.
    Pending,
    Empty,
    Block {
        body: Vec<NodeId>,
        /// Function declarations hoisted on block entry.
        functions: Vec<NodeId>,
        /// Whether evaluating the block pushes its own runtime scope.
        scoped: bool,
    },
    ExpressionStatement(NodeId),
    Literal(Literal),
    Identifier(String),
    Array(Vec<NodeId>),
    Map(Vec<(String, NodeId)>),
    Unary {
        operator: UnaryOperator,
        operand: NodeId,
    },
    Binary {
        operator: BinaryOperator,
        left: NodeId,
        right: NodeId,
    },
    Member {
        object: NodeId,
        name: String,
        optional: bool,
    },
    Index {
        object: NodeId,
        index: NodeId,
    },
    Call {
        callee: NodeId,
        args: Vec<NodeId>,
    },
    Assign {
        target: NodeId,
        operator: AssignOperator,
        value: NodeId,
    },
    Declaration(Vec<Binding>),
    If {
        test: NodeId,
        consequent: NodeId,
        alternate: Option<NodeId>,
    },
    While {
        test: NodeId,
        body: NodeId,
    },
    For {
        init: Option<NodeId>,
        test: Option<NodeId>,
        update: Option<NodeId>,
        body: NodeId,
    },
    ForEach {
        variable: String,
        iterable: NodeId,
        body: NodeId,
    },
    Break {
        target: NodeId,
    },
    Continue {
        target: NodeId,
    },
    Return {
        value: Option<NodeId>,
        function: NodeId,
    },
    Try {
        body: NodeId,
        catch_var: String,
        handler: NodeId,
    },
    Throw(NodeId),
    Function(Rc<FunctionDef>),
    FunctionLiteral(Rc<FunctionDef>),
    Custom(CustomNode),
}

impl NodeKind {
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Pending
            | NodeKind::Empty
            | NodeKind::Literal(_)
            | NodeKind::Identifier(_)
            | NodeKind::Break { .. }
            | NodeKind::Continue { .. } => vec![],
            NodeKind::Block { body, .. } => body.clone(),
            NodeKind::ExpressionStatement(e) | NodeKind::Throw(e) => vec![*e],
            NodeKind::Array(items) => items.clone(),
            NodeKind::Map(entries) => entries.iter().map(|(_, v)| *v).collect(),
            NodeKind::Unary { operand, .. } => vec![*operand],
            NodeKind::Binary { left, right, .. } => vec![*left, *right],
            NodeKind::Member { object, .. } => vec![*object],
            NodeKind::Index { object, index } => vec![*object, *index],
            NodeKind::Call { callee, args } => {
                let mut c = vec![*callee];
                c.extend(args.iter().copied());
                c
            }
            NodeKind::Assign { target, value, .. } => vec![*target, *value],
            NodeKind::Declaration(bindings) => bindings.iter().filter_map(|b| b.init).collect(),
            NodeKind::If {
                test,
                consequent,
                alternate,
            } => {
                let mut c = vec![*test, *consequent];
                c.extend(alternate.iter().copied());
                c
            }
            NodeKind::While { test, body } => vec![*test, *body],
            NodeKind::For {
                init,
                test,
                update,
                body,
            } => init
                .iter()
                .chain(test.iter())
                .chain(update.iter())
                .copied()
                .chain(std::iter::once(*body))
                .collect(),
            NodeKind::ForEach { iterable, body, .. } => vec![*iterable, *body],
            NodeKind::Return { value, .. } => value.iter().copied().collect(),
            NodeKind::Try { body, handler, .. } => vec![*body, *handler],
            NodeKind::Function(def) | NodeKind::FunctionLiteral(def) => vec![def.body],
            NodeKind::Custom(custom) => custom.children.clone(),
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            NodeKind::While { .. } | NodeKind::For { .. } | NodeKind::ForEach { .. }
        )
    }

    pub fn is_function(&self) -> bool {
        matches!(self, NodeKind::Function(_) | NodeKind::FunctionLiteral(_))
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub line: usize,
    pub parent: Option<NodeId>,
    pub assignable: bool,
}

#[derive(Debug, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    source_name: String,
}

impl SyntaxTree {
    pub fn new(source_name: impl Into<String>) -> Self {
        SyntaxTree {
            nodes: vec![],
            root: None,
            source_name: source_name.into(),
        }
    }

    pub fn add(&mut self, kind: NodeKind, line: usize) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            line,
            parent: None,
            assignable: false,
        });
        id
    }

    pub fn reserve(&mut self, line: usize) -> NodeId {
        self.add(NodeKind::Pending, line)
    }

    pub fn replace(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.index()].kind = kind;
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Fill every node's parent link from the children lists.
    pub fn link_parents(&mut self) {
        for i in 0..self.nodes.len() {
            let parent = NodeId(i as u32);
            for child in self.nodes[i].kind.children() {
                self.nodes[child.index()].parent = Some(parent);
            }
        }
    }

    /// Nearest ancestor of `id` matching `pred`.
    pub fn enclosing(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        let mut current = self.node(id).parent;
        while let Some(p) = current {
            if pred(&self.node(p).kind) {
                return Some(p);
            }
            current = self.node(p).parent;
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (NodeId(i as u32), n))
    }
}
