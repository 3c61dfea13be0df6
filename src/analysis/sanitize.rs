//! Type-annotation erasure for typed ECMAScript.
//!
//! This is an ordered list of text substitutions, not a parser. It can
//! mis-strip multi-line interfaces, nested generics or template-literal types;
//! those cases show up as a structural parse failure and are recovered by the
//! pattern fallback.
//!
//! Every removal keeps the newlines of the removed text, so a line number in
//! the sanitized output is a line number in the original file.

use regex::{Captures, Regex};

lazy_static::lazy_static! {
    /// `: Type` followed by `= , ) } ] ;`
    static ref ANNOTATION_RE: Regex =
        Regex::new(r"(?P<body>:\s*[A-Za-z_$][\w$<>,\s|&\[\]]*)(?P<tail>\s*[=,)}\];])").unwrap();
    /// `as Type` followed by `, ) } ] ;`
    static ref CAST_RE: Regex =
        Regex::new(r"(?P<body>\bas\s+[A-Za-z_$][\w$<>,\s|&\[\]]*)(?P<tail>\s*[,)}\];])").unwrap();
    /// `<T, U>` directly before a call's `(`
    static ref GENERIC_CALL_RE: Regex =
        Regex::new(r"(?P<body><[A-Za-z_$][\w$<>,\s|&\[\]]*>)(?P<tail>\s*\()").unwrap();
    static ref IMPORT_TYPE_RE: Regex = Regex::new(r"(?m)^import\s+type\s+.*").unwrap();
    static ref EXPORT_TYPE_RE: Regex = Regex::new(r"(?m)^export\s+type\s+.*").unwrap();
    static ref EXPORT_INTERFACE_RE: Regex = Regex::new(r"(?m)^export\s+interface\s+.*").unwrap();
    static ref INTERFACE_RE: Regex =
        Regex::new(r"\binterface\s+[A-Za-z_$][\w$]*\s*\{[^}]*\}").unwrap();
    static ref TYPE_ALIAS_RE: Regex =
        Regex::new(r"\btype\s+[A-Za-z_$][\w$]*\s*=\s*[^;]+;").unwrap();
}

/// Erase type syntax so a plain ECMAScript parser can consume the text.
pub fn strip_typescript(content: &str) -> String {
    let text = strip_with_tail(&ANNOTATION_RE, content);
    let text = strip_with_tail(&CAST_RE, &text);
    let text = strip_with_tail(&GENERIC_CALL_RE, &text);
    let text = strip(&IMPORT_TYPE_RE, &text);
    let text = strip(&EXPORT_TYPE_RE, &text);
    let text = strip(&EXPORT_INTERFACE_RE, &text);
    let text = strip(&INTERFACE_RE, &text);
    strip(&TYPE_ALIAS_RE, &text)
}

/// Remove every match, keeping only its newlines.
fn strip(re: &Regex, text: &str) -> String {
    re.replace_all(text, |caps: &Captures| newlines_of(&caps[0]))
        .into_owned()
}

/// Remove the `body` group of every match and keep the `tail` group, which
/// stands in for a lookahead.
fn strip_with_tail(re: &Regex, text: &str) -> String {
    re.replace_all(text, |caps: &Captures| {
        let mut out = newlines_of(&caps["body"]);
        out.push_str(&caps["tail"]);
        out
    })
    .into_owned()
}

fn newlines_of(text: &str) -> String {
    text.chars().filter(|&c| c == '\n').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_parameter_annotations() {
        let out = strip_typescript("const add = (a: number, b: number) => a + b;");
        assert_eq!(out, "const add = (a, b) => a + b;");
    }

    #[test]
    fn test_strips_variable_annotation_and_cast() {
        // the annotation pattern is greedy over whitespace
        assert_eq!(strip_typescript("let n: number = 1;"), "let n= 1;");
        assert_eq!(strip_typescript("foo(x as Bar);"), "foo(x );");
    }

    #[test]
    fn test_strips_generic_call_arguments() {
        assert_eq!(
            strip_typescript("const s = useState<string>('');"),
            "const s = useState('');"
        );
    }

    #[test]
    fn test_strips_type_statements() {
        let src = "import type { A } from './a';\nexport type B = string;\nconst x = 1;";
        let out = strip_typescript(src);
        assert_eq!(out, "\n\nconst x = 1;");
    }

    #[test]
    fn test_strips_exported_interface_line() {
        let src = "export interface Opts { verbose: boolean }\nconst y = 2;";
        assert_eq!(strip_typescript(src), "\nconst y = 2;");
    }

    #[test]
    fn test_multiline_interface_keeps_line_count() {
        let src = "interface Props {\n  name: string;\n  age: number;\n}\nfunction f() {}\n";
        let out = strip_typescript(src);
        assert_eq!(out.lines().count(), src.lines().count());
        assert!(!out.contains("interface"));
        assert_eq!(out.lines().nth(4), Some("function f() {}"));
    }

    #[test]
    fn test_type_alias_removed() {
        let out = strip_typescript("type Id = string | number;\nconst id = 1;");
        assert_eq!(out, "\nconst id = 1;");
    }

    #[test]
    fn test_plain_javascript_untouched() {
        let src = "function add(a, b) { return a + b; }";
        assert_eq!(strip_typescript(src), src);
    }
}
