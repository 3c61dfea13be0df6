//! Call-graph resolution among a file's own definitions.

use std::collections::BTreeSet;

use regex::Regex;

use super::extract::{strict_parse, StrictParse};
use super::facts::{CallEdge, CallMap, FunctionDef};
use super::language::Language;
use super::syntax::{FunctionKind, Node, Program};

/// Find calls to any of `known_defs` in `content`.
///
/// ECMAScript sources are resolved on the syntax tree, with the innermost
/// enclosing named function recorded as the caller. Everything else, and
/// sources that fail to parse, is scanned line by line without callers.
pub fn find_calls(content: &str, filename: &str, known_defs: &[FunctionDef]) -> CallMap {
    let language = Language::from_filename(filename);
    let parsed = strict_parse(content, language);
    calls_from(&parsed, content, known_defs)
}

/// Call resolution over an already attempted parse.
pub fn calls_from(parsed: &StrictParse, content: &str, known_defs: &[FunctionDef]) -> CallMap {
    let known: BTreeSet<&str> = known_defs.iter().map(|d| d.name.as_str()).collect();
    if known.is_empty() {
        return CallMap::new();
    }
    match parsed {
        Ok(program) => structural_calls(program, &known),
        Err(_) => pattern_calls(content, &known),
    }
}

/// Fill `total_calls`/`call_sites` of every definition from `calls`.
///
/// Definitions nobody calls get zero and an empty list.
pub fn apply_calls(defs: &mut [FunctionDef], calls: &CallMap) {
    for def in defs.iter_mut() {
        let edge = calls.get(&def.name);
        def.total_calls = Some(edge.map_or(0, |e| e.total_calls));
        def.call_sites = Some(edge.map(|e| e.call_sites.clone()).unwrap_or_default());
    }
}

fn structural_calls(program: &Program, known: &BTreeSet<&str>) -> CallMap {
    let mut calls = CallMap::new();
    visit(&program.root, None, known, &mut calls);
    calls
}

fn visit(node: &Node, caller: Option<&str>, known: &BTreeSet<&str>, calls: &mut CallMap) {
    match node {
        Node::Function(f) if f.kind == FunctionKind::Declaration => {
            let inner = f.name.as_deref().or(caller);
            for child in node.children() {
                visit(child, inner, known, calls);
            }
        }
        Node::Variable(decl) => {
            for declarator in &decl.declarators {
                visit(&declarator.id, caller, known, calls);
                let Some(init) = &declarator.init else {
                    continue;
                };
                let inner = match init {
                    Node::Function(_) => declarator.name().or(caller),
                    _ => caller,
                };
                visit(init, inner, known, calls);
            }
        }
        Node::Call { callee, span, .. } => {
            if let Some(name) = callee_name(callee).filter(|n| known.contains(n)) {
                calls
                    .entry(name.to_string())
                    .or_default()
                    .record(span.start_line, caller.map(str::to_string));
            }
            for child in node.children() {
                visit(child, caller, known, calls);
            }
        }
        _ => {
            for child in node.children() {
                visit(child, caller, known, calls);
            }
        }
    }
}

/// `name(...)`, `obj.name(...)` and `obj["name"](...)`.
fn callee_name(callee: &Node) -> Option<&str> {
    match callee {
        Node::Identifier { name, .. } => Some(name),
        Node::Member {
            property: Some(property),
            ..
        } => Some(property),
        _ => None,
    }
}

fn pattern_calls(content: &str, known: &BTreeSet<&str>) -> CallMap {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut calls = CallMap::new();

    for &name in known {
        let Some(scanner) = CallScanner::new(name) else {
            continue;
        };
        let mut edge = CallEdge::default();
        for (idx, line) in lines.iter().enumerate() {
            if scanner.is_definition(line) {
                continue;
            }
            for _ in scanner.call.find_iter(line) {
                edge.record(idx + 1, None);
            }
        }
        if edge.total_calls > 0 {
            calls.insert(name.to_string(), edge);
        }
    }

    calls
}

struct CallScanner {
    call: Regex,
    definition: Regex,
    assignment: Regex,
}

impl CallScanner {
    fn new(name: &str) -> Option<Self> {
        let bounded = word_bounded(name);
        let escaped = regex::escape(name);
        Some(Self {
            call: Regex::new(&format!(r"{}\s*\(", bounded)).ok()?,
            definition: Regex::new(&format!(
                r"\b(?:function|def|fn|func)\s+(?:\([^)]*\)\s*)?{}\s*\(",
                escaped
            ))
            .ok()?,
            assignment: Regex::new(&format!(r"\b(?:const|let|var)\s+{}\s*=", escaped)).ok()?,
        })
    }

    fn is_definition(&self, line: &str) -> bool {
        self.definition.is_match(line) || self.assignment.is_match(line)
    }
}

/// Escape `name` and anchor it on word boundaries where its edges are word
/// characters. `$` and other non-word edges take no boundary.
pub(crate) fn word_bounded(name: &str) -> String {
    let is_word = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let mut pattern = String::new();
    if is_word(name.chars().next()) {
        pattern.push_str(r"\b");
    }
    pattern.push_str(&regex::escape(name));
    if is_word(name.chars().last()) {
        pattern.push_str(r"\b");
    }
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::extract::extract;
    use crate::analysis::facts::{FunctionType, Provenance, ReturnType};

    fn def(name: &str) -> FunctionDef {
        FunctionDef {
            name: name.to_string(),
            file: "m.js".to_string(),
            line: 1,
            code: format!("function {}() {{}}", name),
            kind: FunctionType::Function,
            is_top_level: true,
            is_class_method: None,
            params: Vec::new(),
            returns_value: false,
            return_type: ReturnType::Void,
            total_calls: None,
            call_sites: None,
            source: Provenance::Pattern,
        }
    }

    #[test]
    fn test_word_bounded() {
        assert_eq!(word_bounded("run"), r"\brun\b");
        assert_eq!(word_bounded("$el"), r"\$el\b");
        assert_eq!(word_bounded("a$"), r"\ba\$");
    }

    #[test]
    fn test_pattern_calls_skip_own_definition() {
        let src = "def helper():\n    pass\n\ndef main():\n    helper()\n    x = helper() + helper()\n";
        let calls = find_calls(src, "m.py", &[def("helper"), def("main")]);
        let edge = &calls["helper"];
        assert_eq!(edge.total_calls, 3);
        let lines: Vec<usize> = edge.call_sites.iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![5, 6, 6]);
        assert!(edge.call_sites.iter().all(|s| s.caller.is_none()));
        assert!(!calls.contains_key("main"));
    }

    #[test]
    fn test_pattern_calls_go_receiver_definition() {
        let src = "func (s *S) Run() {\n}\n\nfunc main() {\n\ts.Run()\n}\n";
        let calls = find_calls(src, "main.go", &[def("Run")]);
        assert_eq!(calls["Run"].total_calls, 1);
        assert_eq!(calls["Run"].call_sites[0].line, 5);
    }

    #[test]
    fn test_word_boundary_excludes_longer_names() {
        let src = "fn run() {}\nfn main() { rerun(); run_all(); run(); }\n";
        let calls = find_calls(src, "main.rs", &[def("run")]);
        assert_eq!(calls["run"].total_calls, 1);
    }

    #[test]
    fn test_no_known_defs() {
        assert!(find_calls("helper();", "a.js", &[]).is_empty());
    }

    #[test]
    fn test_apply_calls_fills_every_definition() {
        let mut defs = vec![def("helper"), def("unused")];
        let mut calls = CallMap::new();
        calls
            .entry("helper".to_string())
            .or_default()
            .record(3, Some("main".to_string()));
        apply_calls(&mut defs, &calls);
        assert_eq!(defs[0].total_calls, Some(1));
        assert_eq!(defs[0].call_sites.as_ref().unwrap()[0].line, 3);
        assert_eq!(defs[1].total_calls, Some(0));
        assert_eq!(defs[1].call_sites, Some(Vec::new()));
    }

    #[test]
    fn test_apply_is_stable_on_repeat() {
        let src = "def a():\n    b()\ndef b():\n    pass\n";
        let mut defs = extract(src, "x.py");
        let calls = find_calls(src, "x.py", &defs);
        apply_calls(&mut defs, &calls);
        let once = defs.clone();
        apply_calls(&mut defs, &calls);
        assert_eq!(defs, once);
    }

    #[cfg(feature = "tree-sitter")]
    mod parsed {
        use super::*;

        #[test]
        fn test_calls_carry_enclosing_caller() {
            let src = "function main(){ helper(); helper(); }";
            let calls = find_calls(src, "m.js", &[def("helper")]);
            let edge = &calls["helper"];
            assert_eq!(edge.total_calls, 2);
            assert!(edge
                .call_sites
                .iter()
                .all(|s| s.caller.as_deref() == Some("main")));
        }

        #[test]
        fn test_member_and_subscript_callees() {
            let src = "const run = () => {\n  api.save(1);\n  api[\"save\"](2);\n};\nsave();\n";
            let calls = find_calls(src, "m.js", &[def("save")]);
            let edge = &calls["save"];
            assert_eq!(edge.total_calls, 3);
            let sites: Vec<(usize, Option<&str>)> = edge
                .call_sites
                .iter()
                .map(|s| (s.line, s.caller.as_deref()))
                .collect();
            assert_eq!(sites, vec![(2, Some("run")), (3, Some("run")), (5, None)]);
        }

        #[test]
        fn test_anonymous_callbacks_keep_outer_caller() {
            let src = "function main() {\n  items.forEach(function (x) { helper(x); });\n}";
            let calls = find_calls(src, "m.js", &[def("helper")]);
            assert_eq!(calls["helper"].call_sites[0].caller.as_deref(), Some("main"));
        }

        #[test]
        fn test_unknown_callees_are_ignored() {
            let src = "function main() { console.log(1); other(); }";
            let calls = find_calls(src, "m.js", &[def("helper"), def("main")]);
            assert!(calls.is_empty());
        }

        #[test]
        fn test_broken_source_falls_back_to_line_scan() {
            let src = "function main() {\n  helper();\n  if (x {\n";
            let calls = find_calls(src, "m.js", &[def("helper")]);
            assert_eq!(calls["helper"].total_calls, 1);
            assert_eq!(calls["helper"].call_sites[0].caller, None);
        }
    }
}
