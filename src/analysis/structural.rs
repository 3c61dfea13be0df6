//! Definition extraction from a lowered syntax tree.

use super::facts::{
    code_slice, FunctionDef, FunctionType, Provenance, ReturnType, ValueType, VariableDef,
};
use super::syntax::{FunctionKind, FunctionNode, Node, Program};

/// Collect function, arrow and method definitions.
pub fn functions(program: &Program, content: &str, file: &str) -> Vec<FunctionDef> {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut walker = FunctionWalker {
        lines: &lines,
        file,
        defs: Vec::new(),
    };
    walker.visit(&program.root, 0);
    walker.defs
}

/// Collect variable declarations.
pub fn variables(program: &Program, file: &str) -> Vec<VariableDef> {
    let mut vars = Vec::new();
    visit_variables(&program.root, 0, file, &mut vars);
    vars
}

struct FunctionWalker<'a> {
    lines: &'a [&'a str],
    file: &'a str,
    defs: Vec<FunctionDef>,
}

impl<'a> FunctionWalker<'a> {
    fn visit(&mut self, node: &Node, scope: usize) {
        match node {
            Node::Function(f) => {
                if f.kind == FunctionKind::Declaration {
                    if let Some(name) = &f.name {
                        let span = f.span;
                        self.push(
                            name,
                            f,
                            FunctionType::Function,
                            (span.start_line, span.end_line),
                            scope == 0,
                        );
                    }
                }
                for child in node.children() {
                    self.visit(child, scope + 1);
                }
            }
            Node::Method(m) => {
                if let Some(name) = &m.name {
                    self.push(
                        name,
                        &m.value,
                        FunctionType::Method,
                        (m.span.start_line, m.span.end_line),
                        false,
                    );
                    if let Some(def) = self.defs.last_mut() {
                        def.is_class_method = Some(true);
                    }
                }
                // the method value is a function expression
                for child in node.children() {
                    self.visit(child, scope + 1);
                }
            }
            Node::Variable(decl) => {
                for declarator in &decl.declarators {
                    let (Some(name), Some(Node::Function(f))) = (declarator.name(), &declarator.init)
                    else {
                        continue;
                    };
                    let kind = match f.kind {
                        FunctionKind::Arrow => FunctionType::Arrow,
                        FunctionKind::Expression => FunctionType::Function,
                        FunctionKind::Declaration => continue,
                    };
                    let lines = (declarator.span.start_line, declarator.span.end_line);
                    self.push(name, f, kind, lines, scope == 0);
                }
                for child in node.children() {
                    self.visit(child, scope);
                }
            }
            _ => {
                for child in node.children() {
                    self.visit(child, scope);
                }
            }
        }
    }

    fn push(
        &mut self,
        name: &str,
        function: &FunctionNode,
        kind: FunctionType,
        (start_line, end_line): (usize, usize),
        is_top_level: bool,
    ) {
        let returns_value = returns_value(function);
        self.defs.push(FunctionDef {
            name: name.to_string(),
            file: self.file.to_string(),
            line: start_line,
            code: code_slice(self.lines, start_line, Some(end_line)),
            kind,
            is_top_level,
            is_class_method: None,
            params: function.params.iter().map(|p| render_param(Some(p))).collect(),
            returns_value,
            return_type: ReturnType::from(returns_value),
            total_calls: None,
            call_sites: None,
            source: Provenance::Structural,
        });
    }
}

fn visit_variables(node: &Node, scope: usize, file: &str, out: &mut Vec<VariableDef>) {
    if let Node::Variable(decl) = node {
        for declarator in &decl.declarators {
            if let Some(name) = declarator.name() {
                out.push(VariableDef {
                    name: name.to_string(),
                    file: file.to_string(),
                    line: declarator.span.start_line,
                    kind: decl.kind,
                    value_type: declarator.init.as_ref().and_then(infer_value_type),
                    is_top_level: scope == 0,
                    total_usages: None,
                    usage_lines: None,
                    source: Provenance::Structural,
                });
            }
        }
    }

    let child_scope = match node {
        Node::Function(_) | Node::Method(_) => scope + 1,
        _ => scope,
    };
    for child in node.children() {
        visit_variables(child, child_scope, file, out);
    }
}

/// Render a parameter node as a short descriptor.
pub fn render_param(param: Option<&Node>) -> String {
    match param {
        None => "unknown".to_string(),
        Some(Node::Identifier { name, .. }) => name.clone(),
        Some(Node::Default { left, .. }) => format!("{}=?", render_param(Some(left))),
        Some(Node::Rest { argument, .. }) => format!("...{}", render_param(argument.as_deref())),
        Some(Node::ObjectPattern { .. }) => "{...}".to_string(),
        Some(Node::ArrayPattern { .. }) => "[...]".to_string(),
        Some(_) => "param".to_string(),
    }
}

/// Whether a function yields a value.
///
/// Concise arrow bodies always do. Otherwise any `return <expr>` in the body
/// counts, including returns inside nested function literals.
pub fn returns_value(function: &FunctionNode) -> bool {
    function.expression_body || has_value_return(&function.body)
}

fn has_value_return(node: &Node) -> bool {
    match node {
        Node::Return {
            argument: Some(_), ..
        } => true,
        _ => node.children().into_iter().any(has_value_return),
    }
}

/// One-level-deep type tag for a variable initializer.
pub fn infer_value_type(init: &Node) -> Option<ValueType> {
    match init {
        Node::Literal { kind, .. } => Some(kind.value_type()),
        Node::ArrayLiteral { .. } => Some(ValueType::Array),
        Node::ObjectLiteral { .. } => Some(ValueType::Object),
        Node::Function(f) if f.kind != FunctionKind::Declaration => Some(ValueType::Function),
        Node::Call { .. } => Some(ValueType::Call),
        Node::New { .. } => Some(ValueType::Instance),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::syntax::Span;

    fn ident(name: &str) -> Node {
        Node::Identifier {
            name: name.to_string(),
            span: Span::default(),
        }
    }

    #[test]
    fn test_render_param_shapes() {
        let span = Span::default();
        assert_eq!(render_param(Some(&ident("a"))), "a");
        assert_eq!(
            render_param(Some(&Node::Default {
                left: Box::new(ident("b")),
                right: Box::new(Node::Literal {
                    kind: crate::analysis::syntax::LiteralKind::Number,
                    span
                }),
                span,
            })),
            "b=?"
        );
        assert_eq!(
            render_param(Some(&Node::Rest {
                argument: Some(Box::new(ident("rest"))),
                span
            })),
            "...rest"
        );
        assert_eq!(
            render_param(Some(&Node::ObjectPattern {
                elements: vec![],
                span
            })),
            "{...}"
        );
        assert_eq!(
            render_param(Some(&Node::ArrayPattern {
                elements: vec![],
                span
            })),
            "[...]"
        );
        assert_eq!(
            render_param(Some(&Node::Rest {
                argument: None,
                span
            })),
            "...unknown"
        );
        assert_eq!(
            render_param(Some(&Node::Other {
                kind: "x",
                children: vec![],
                span
            })),
            "param"
        );
        assert_eq!(render_param(None), "unknown");
    }

    #[cfg(feature = "tree-sitter")]
    mod parsed {
        use super::super::*;
        use crate::analysis::language::Language;
        use crate::analysis::syntax::parse;

        fn extract(src: &str) -> Vec<FunctionDef> {
            let program = parse(src, Language::JavaScript).expect("should parse");
            functions(&program, src, "f.js")
        }

        #[test]
        fn test_nested_definitions_are_not_top_level() {
            let src = "function outer() {\n  const inner = () => 1;\n  return inner();\n}";
            let defs = extract(src);
            assert_eq!(defs.len(), 2);
            assert_eq!(defs[0].name, "outer");
            assert!(defs[0].is_top_level);
            assert_eq!(defs[1].name, "inner");
            assert_eq!(defs[1].kind, FunctionType::Arrow);
            assert!(!defs[1].is_top_level);
            assert_eq!(defs[1].line, 2);
        }

        #[test]
        fn test_code_spans_definition_lines() {
            let src = "const a = 1;\nfunction f(x) {\n  x++;\n}\nconst b = 2;";
            let defs = extract(src);
            assert_eq!(defs.len(), 1);
            assert_eq!(defs[0].code, "function f(x) {\n  x++;\n}");
            assert!(!defs[0].returns_value);
            assert_eq!(defs[0].return_type, ReturnType::Void);
        }

        #[test]
        fn test_class_methods() {
            let src = "class Store {\n  read(key) {\n    return this.map[key];\n  }\n  clear() {}\n}";
            let defs = extract(src);
            assert_eq!(defs.len(), 2);
            assert!(defs.iter().all(|d| d.kind == FunctionType::Method));
            assert!(defs.iter().all(|d| d.is_class_method == Some(true) && !d.is_top_level));
            assert!(defs[0].returns_value);
            assert!(!defs[1].returns_value);
        }

        #[test]
        fn test_object_literal_methods_are_skipped() {
            let src = "const api = {\n  fetch() { return 1; }\n};";
            let defs = extract(src);
            assert!(defs.is_empty(), "got {:?}", defs);
        }

        #[test]
        fn test_params_rendering_from_source() {
            let src = "function f(a, b = 2, {c}, [d], ...rest) {}";
            let defs = extract(src);
            assert_eq!(defs[0].params, vec!["a", "b=?", "{...}", "[...]", "...rest"]);
        }

        #[test]
        fn test_nested_return_counts_for_outer_function() {
            // Returns inside nested function literals leak into the outer
            // function's returnsValue.
            let src = "function outer() {\n  items.forEach(function (x) { return x; });\n}";
            let defs = extract(src);
            assert_eq!(defs[0].name, "outer");
            assert!(defs[0].returns_value);
        }

        #[test]
        fn test_bare_return_is_void() {
            let defs = extract("function f() { if (x) return; }");
            assert!(!defs[0].returns_value);
        }

        #[test]
        fn test_variables_with_value_types() {
            let src = r#"const s = "x";
let n = 42;
var arr = [1, 2];
const obj = {};
const fn1 = () => 1;
const c = compute();
const inst = new Map();
const nothing = null;
let later;
function scoped() { let inner = true; }
for (const item of arr) {}
const { a, b } = obj;"#;
            let program = parse(src, Language::JavaScript).expect("should parse");
            let vars = variables(&program, "v.js");
            let find = |name: &str| vars.iter().find(|v| v.name == name).unwrap();

            assert_eq!(find("s").value_type, Some(ValueType::String));
            assert_eq!(find("n").value_type, Some(ValueType::Number));
            assert_eq!(find("n").kind, crate::analysis::facts::VariableKind::Let);
            assert_eq!(find("arr").value_type, Some(ValueType::Array));
            assert_eq!(find("arr").kind, crate::analysis::facts::VariableKind::Var);
            assert_eq!(find("obj").value_type, Some(ValueType::Object));
            assert_eq!(find("fn1").value_type, Some(ValueType::Function));
            assert_eq!(find("c").value_type, Some(ValueType::Call));
            assert_eq!(find("inst").value_type, Some(ValueType::Instance));
            assert_eq!(find("nothing").value_type, Some(ValueType::Object));
            assert_eq!(find("later").value_type, None);
            assert!(!find("inner").is_top_level);
            assert_eq!(find("inner").value_type, Some(ValueType::Boolean));
            assert_eq!(find("item").line, 11);
            // destructuring declarators have no single name
            assert!(vars.iter().all(|v| v.name != "a"));
        }
    }
}
