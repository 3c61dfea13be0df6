//! Structural parsing of ECMAScript sources.
//!
//! The tree-sitter concrete tree is lowered into [`Node`], a tagged syntax
//! tree holding only the shapes the extraction walkers care about. Everything
//! else becomes [`Node::Other`] with its lowered children, so generic
//! traversal still reaches nested functions and calls.
//!
//! tree-sitter recovers from malformed input; a tree containing any ERROR or
//! MISSING node is rejected here so callers see a strict parse.

use std::borrow::Cow;
use std::iter;

use thiserror::Error;

use super::facts::{ValueType, VariableKind};
use super::language::Language;
use super::sanitize::strip_typescript;

/// Why a structural parse produced no tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no structural parser for {0} sources")]
    Unsupported(Language),
    #[error("structural parsing is not compiled in")]
    Unavailable,
    #[error("failed to load grammar: {0}")]
    Grammar(String),
    #[error("parser produced no tree")]
    NoTree,
    #[error("syntax error at line {line}")]
    Syntax { line: usize },
    #[error("syntax nested too deeply at line {line}")]
    TooDeep { line: usize },
}

/// Deepest syntax nesting lowered into a [`Node`] tree. Lowering and every
/// walker over the result recurse once per level.
pub const MAX_DEPTH: usize = 200;

/// Line range of a node (1-indexed, inclusive).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
}

#[cfg(feature = "tree-sitter")]
impl Span {
    /// Create a span from a tree-sitter node.
    pub fn from_node(node: tree_sitter::Node) -> Self {
        Self {
            start_line: node.start_position().row + 1, // tree-sitter is 0-indexed
            end_line: node.end_position().row + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// `function name() {}`
    Declaration,
    /// `function () {}` in expression position, including method values.
    Expression,
    /// `() => {}`
    Arrow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionNode {
    pub kind: FunctionKind,
    pub name: Option<String>,
    pub params: Vec<Node>,
    pub body: Box<Node>,
    /// Arrow function with a concise (non-block) body.
    pub expression_body: bool,
    pub span: Span,
}

impl FunctionNode {
    fn children(&self) -> Vec<&Node> {
        self.params.iter().chain(iter::once(self.body.as_ref())).collect()
    }
}

/// A method inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodNode {
    /// `None` for computed or literal keys.
    pub name: Option<String>,
    pub value: FunctionNode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub id: Node,
    pub init: Option<Node>,
    pub span: Span,
}

impl Declarator {
    /// The declared name; destructuring declarators have none.
    pub fn name(&self) -> Option<&str> {
        match &self.id {
            Node::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub kind: VariableKind,
    pub declarators: Vec<Declarator>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Number,
    BigInt,
    Boolean,
    Null,
    RegExp,
}

impl LiteralKind {
    /// Primitive type name of the literal's runtime value.
    pub fn value_type(&self) -> ValueType {
        match self {
            LiteralKind::String => ValueType::String,
            LiteralKind::Number => ValueType::Number,
            LiteralKind::BigInt => ValueType::BigInt,
            LiteralKind::Boolean => ValueType::Boolean,
            LiteralKind::Null | LiteralKind::RegExp => ValueType::Object,
        }
    }
}

/// Lowered syntax node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Function(Box<FunctionNode>),
    Method(Box<MethodNode>),
    Variable(VariableDeclaration),
    Call {
        callee: Box<Node>,
        arguments: Vec<Node>,
        span: Span,
    },
    New {
        children: Vec<Node>,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    /// `object.property` or `object[computed]`.
    Member {
        object: Box<Node>,
        /// Static property name (identifier, string or number key).
        property: Option<String>,
        computed: Option<Box<Node>>,
        span: Span,
    },
    Literal {
        kind: LiteralKind,
        span: Span,
    },
    ArrayLiteral {
        elements: Vec<Node>,
        span: Span,
    },
    ObjectLiteral {
        properties: Vec<Node>,
        span: Span,
    },
    Return {
        argument: Option<Box<Node>>,
        span: Span,
    },
    Block {
        body: Vec<Node>,
        span: Span,
    },
    Rest {
        argument: Option<Box<Node>>,
        span: Span,
    },
    Default {
        left: Box<Node>,
        right: Box<Node>,
        span: Span,
    },
    ObjectPattern {
        elements: Vec<Node>,
        span: Span,
    },
    ArrayPattern {
        elements: Vec<Node>,
        span: Span,
    },
    Other {
        kind: &'static str,
        children: Vec<Node>,
        span: Span,
    },
}

impl Node {
    /// Direct children, in source order.
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Function(f) => f.children(),
            Node::Method(m) => m.value.children(),
            Node::Variable(decl) => decl
                .declarators
                .iter()
                .flat_map(|d| iter::once(&d.id).chain(d.init.as_ref()))
                .collect(),
            Node::Call {
                callee, arguments, ..
            } => iter::once(callee.as_ref()).chain(arguments.iter()).collect(),
            Node::Member {
                object, computed, ..
            } => iter::once(object.as_ref()).chain(computed.as_deref()).collect(),
            Node::Return { argument, .. } | Node::Rest { argument, .. } => {
                argument.as_deref().into_iter().collect()
            }
            Node::Default { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Node::New { children, .. }
            | Node::Block { body: children, .. }
            | Node::ArrayLiteral {
                elements: children, ..
            }
            | Node::ObjectLiteral {
                properties: children,
                ..
            }
            | Node::ObjectPattern {
                elements: children, ..
            }
            | Node::ArrayPattern {
                elements: children, ..
            }
            | Node::Other { children, .. } => children.iter().collect(),
            Node::Identifier { .. } | Node::Literal { .. } => Vec::new(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Node::Function(f) => f.span,
            Node::Method(m) => m.span,
            Node::Variable(decl) => decl.span,
            Node::Call { span, .. }
            | Node::New { span, .. }
            | Node::Identifier { span, .. }
            | Node::Member { span, .. }
            | Node::Literal { span, .. }
            | Node::ArrayLiteral { span, .. }
            | Node::ObjectLiteral { span, .. }
            | Node::Return { span, .. }
            | Node::Block { span, .. }
            | Node::Rest { span, .. }
            | Node::Default { span, .. }
            | Node::ObjectPattern { span, .. }
            | Node::ArrayPattern { span, .. }
            | Node::Other { span, .. } => *span,
        }
    }

    fn empty(span: Span) -> Self {
        Node::Other {
            kind: "empty",
            children: Vec::new(),
            span,
        }
    }
}

/// A successfully parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub root: Node,
}

/// Parse an ECMAScript-family source into a lowered tree.
///
/// Typed sources are sanitized first. Line numbers in the tree refer to the
/// original content.
pub fn parse(content: &str, language: Language) -> Result<Program, ParseError> {
    if !language.is_ecmascript() {
        return Err(ParseError::Unsupported(language));
    }
    let text: Cow<str> = if language.needs_sanitizing() {
        Cow::Owned(strip_typescript(content))
    } else {
        Cow::Borrowed(content)
    };
    parse_ecmascript(&text)
}

#[cfg(not(feature = "tree-sitter"))]
fn parse_ecmascript(_text: &str) -> Result<Program, ParseError> {
    Err(ParseError::Unavailable)
}

#[cfg(feature = "tree-sitter")]
fn parse_ecmascript(text: &str) -> Result<Program, ParseError> {
    let language: tree_sitter::Language = tree_sitter_javascript::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::Grammar(e.to_string()))?;
    let tree = parser.parse(text, None).ok_or(ParseError::NoTree)?;

    let root = tree.root_node();
    if let Some(line) = first_line_too_deep(root) {
        return Err(ParseError::TooDeep { line });
    }
    if root.has_error() {
        let line = first_error_line(root).unwrap_or(1);
        return Err(ParseError::Syntax { line });
    }

    let lowerer = Lowerer {
        source: text.as_bytes(),
    };
    Ok(Program {
        root: lowerer.lower(root),
    })
}

/// Line of the first node nested below [`MAX_DEPTH`], found without
/// recursion.
#[cfg(feature = "tree-sitter")]
fn first_line_too_deep(root: tree_sitter::Node) -> Option<usize> {
    let mut cursor = root.walk();
    let mut depth = 0;
    loop {
        if depth > MAX_DEPTH {
            return Some(cursor.node().start_position().row + 1);
        }
        if cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                return None;
            }
            depth -= 1;
        }
    }
}

#[cfg(feature = "tree-sitter")]
fn first_error_line(node: tree_sitter::Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error_line)
}

#[cfg(feature = "tree-sitter")]
struct Lowerer<'a> {
    source: &'a [u8],
}

#[cfg(feature = "tree-sitter")]
impl<'a> Lowerer<'a> {
    fn text(&self, node: tree_sitter::Node) -> String {
        node.utf8_text(self.source).unwrap_or("").to_string()
    }

    /// Named children, without comments.
    fn named_children<'t>(&self, node: tree_sitter::Node<'t>) -> Vec<tree_sitter::Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| !child.is_extra())
            .collect()
    }

    fn lower_all(&self, node: tree_sitter::Node) -> Vec<Node> {
        self.named_children(node)
            .into_iter()
            .map(|child| self.lower(child))
            .collect()
    }

    fn lower_field(&self, node: tree_sitter::Node, field: &str) -> Box<Node> {
        match node.child_by_field_name(field) {
            Some(child) => Box::new(self.lower(child)),
            None => Box::new(Node::empty(Span::from_node(node))),
        }
    }

    fn lower(&self, node: tree_sitter::Node) -> Node {
        let span = Span::from_node(node);
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                Node::Function(Box::new(self.lower_function(node, FunctionKind::Declaration)))
            }
            "function_expression" | "function" | "generator_function" => {
                Node::Function(Box::new(self.lower_function(node, FunctionKind::Expression)))
            }
            "arrow_function" => {
                Node::Function(Box::new(self.lower_function(node, FunctionKind::Arrow)))
            }
            "class_body" => Node::Other {
                kind: "class_body",
                children: self
                    .named_children(node)
                    .into_iter()
                    .map(|member| {
                        if member.kind() == "method_definition" {
                            self.lower_method(member)
                        } else {
                            self.lower(member)
                        }
                    })
                    .collect(),
                span,
            },
            // Object literal methods are anonymous function values.
            "method_definition" => {
                let mut function = self.lower_function(node, FunctionKind::Expression);
                function.name = None;
                Node::Function(Box::new(function))
            }
            "lexical_declaration" | "variable_declaration" => {
                Node::Variable(self.lower_declaration(node))
            }
            "for_in_statement" => self.lower_for_in(node),
            "call_expression" => {
                let arguments = match node.child_by_field_name("arguments") {
                    Some(args) if args.kind() == "arguments" => self.lower_all(args),
                    // tagged template
                    Some(args) => vec![self.lower(args)],
                    None => Vec::new(),
                };
                Node::Call {
                    callee: self.lower_field(node, "function"),
                    arguments,
                    span,
                }
            }
            "new_expression" => Node::New {
                children: self.lower_all(node),
                span,
            },
            "identifier" | "undefined" => Node::Identifier {
                name: self.text(node),
                span,
            },
            "member_expression" => {
                let property = node
                    .child_by_field_name("property")
                    .filter(|p| p.kind() == "property_identifier")
                    .map(|p| self.text(p));
                Node::Member {
                    object: self.lower_field(node, "object"),
                    property,
                    computed: None,
                    span,
                }
            }
            "subscript_expression" => {
                let index = node.child_by_field_name("index");
                let property = index.and_then(|i| match i.kind() {
                    "string" => Some(unquote(&self.text(i))),
                    "number" => Some(self.text(i)),
                    _ => None,
                });
                Node::Member {
                    object: self.lower_field(node, "object"),
                    property,
                    computed: index.map(|i| Box::new(self.lower(i))),
                    span,
                }
            }
            "string" => Node::Literal {
                kind: LiteralKind::String,
                span,
            },
            "number" => {
                let kind = if self.text(node).ends_with('n') {
                    LiteralKind::BigInt
                } else {
                    LiteralKind::Number
                };
                Node::Literal { kind, span }
            }
            "true" | "false" => Node::Literal {
                kind: LiteralKind::Boolean,
                span,
            },
            "null" => Node::Literal {
                kind: LiteralKind::Null,
                span,
            },
            "regex" => Node::Literal {
                kind: LiteralKind::RegExp,
                span,
            },
            "array" => Node::ArrayLiteral {
                elements: self.lower_all(node),
                span,
            },
            "object" => Node::ObjectLiteral {
                properties: self.lower_all(node),
                span,
            },
            "return_statement" => Node::Return {
                argument: self
                    .named_children(node)
                    .into_iter()
                    .next()
                    .map(|arg| Box::new(self.lower(arg))),
                span,
            },
            "statement_block" => Node::Block {
                body: self.lower_all(node),
                span,
            },
            "rest_pattern" => Node::Rest {
                argument: self
                    .named_children(node)
                    .into_iter()
                    .next()
                    .map(|arg| Box::new(self.lower(arg))),
                span,
            },
            "assignment_pattern" => Node::Default {
                left: self.lower_field(node, "left"),
                right: self.lower_field(node, "right"),
                span,
            },
            "object_pattern" => Node::ObjectPattern {
                elements: self.lower_all(node),
                span,
            },
            "array_pattern" => Node::ArrayPattern {
                elements: self.lower_all(node),
                span,
            },
            "parenthesized_expression" => {
                let mut inner = self.named_children(node);
                if inner.len() == 1 {
                    self.lower(inner.remove(0))
                } else {
                    Node::Other {
                        kind: "parenthesized_expression",
                        children: inner.into_iter().map(|c| self.lower(c)).collect(),
                        span,
                    }
                }
            }
            kind => Node::Other {
                kind,
                children: self.lower_all(node),
                span,
            },
        }
    }

    fn lower_function(&self, node: tree_sitter::Node, kind: FunctionKind) -> FunctionNode {
        let params = if let Some(list) = node.child_by_field_name("parameters") {
            self.lower_all(list)
        } else if let Some(single) = node.child_by_field_name("parameter") {
            vec![self.lower(single)]
        } else {
            Vec::new()
        };

        let (body, expression_body) = match node.child_by_field_name("body") {
            Some(body) => (
                Box::new(self.lower(body)),
                kind == FunctionKind::Arrow && body.kind() != "statement_block",
            ),
            None => (Box::new(Node::empty(Span::from_node(node))), false),
        };

        FunctionNode {
            kind,
            name: node.child_by_field_name("name").map(|n| self.text(n)),
            params,
            body,
            expression_body,
            span: Span::from_node(node),
        }
    }

    fn lower_method(&self, node: tree_sitter::Node) -> Node {
        let name = node.child_by_field_name("name").and_then(|key| match key.kind() {
            "property_identifier" => Some(self.text(key)),
            "private_property_identifier" => Some(self.text(key).trim_start_matches('#').to_string()),
            _ => None,
        });
        let mut value = self.lower_function(node, FunctionKind::Expression);
        value.name = None;
        Node::Method(Box::new(MethodNode {
            name,
            value,
            span: Span::from_node(node),
        }))
    }

    fn lower_declaration(&self, node: tree_sitter::Node) -> VariableDeclaration {
        let kind = if node.kind() == "variable_declaration" {
            VariableKind::Var
        } else {
            node.child_by_field_name("kind")
                .or_else(|| node.child(0))
                .map(|k| VariableKind::parse(&self.text(k)))
                .unwrap_or(VariableKind::Unknown)
        };

        let declarators = self
            .named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "variable_declarator")
            .map(|decl| Declarator {
                id: *self.lower_field(decl, "name"),
                init: decl.child_by_field_name("value").map(|v| self.lower(v)),
                span: Span::from_node(decl),
            })
            .collect();

        VariableDeclaration {
            kind,
            declarators,
            span: Span::from_node(node),
        }
    }

    /// `for (const x of xs)` declares `x` without a declaration node.
    fn lower_for_in(&self, node: tree_sitter::Node) -> Node {
        let mut children = Vec::new();

        if let Some(left) = node.child_by_field_name("left") {
            match node.child_by_field_name("kind") {
                Some(keyword) => {
                    let span = Span::from_node(left);
                    children.push(Node::Variable(VariableDeclaration {
                        kind: VariableKind::parse(&self.text(keyword)),
                        declarators: vec![Declarator {
                            id: self.lower(left),
                            init: None,
                            span,
                        }],
                        span,
                    }));
                }
                None => children.push(self.lower(left)),
            }
        }
        for field in ["right", "body"] {
            if let Some(child) = node.child_by_field_name(field) {
                children.push(self.lower(child));
            }
        }

        Node::Other {
            kind: "for_in_statement",
            children,
            span: Span::from_node(node),
        }
    }
}

#[cfg(feature = "tree-sitter")]
fn unquote(text: &str) -> String {
    text.trim_matches(|c| c == '"' || c == '\'').to_string()
}
