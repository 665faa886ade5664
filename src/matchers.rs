//! Per-language line patterns for structural extraction.
//!
//! Each supported extension maps to a [`Patterns`] set. The scan is purely
//! syntactic: a line either matches a category's pattern or it does not.
//! Extensions without an entry produce no matches.

use lazy_static::lazy_static;
use regex::Regex;

/// Lines matched in each category, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
}

/// Line patterns for one language.
#[derive(Debug)]
pub struct Patterns {
    imports: Option<Regex>,
    functions: Option<Regex>,
    classes: Option<Regex>,
    /// Opening and closing lines of a grouped import block, e.g. Go's `import ( ... )`
    import_block: Option<(Regex, Regex)>,
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("matcher regex should compile")
}

impl Patterns {
    fn new(
        imports: Option<&str>,
        functions: Option<&str>,
        classes: Option<&str>,
    ) -> Self {
        Self {
            imports: imports.map(compile),
            functions: functions.map(compile),
            classes: classes.map(compile),
            import_block: None,
        }
    }

    fn with_import_block(mut self, open: &str, close: &str) -> Self {
        self.import_block = Some((compile(open), compile(close)));
        self
    }

    /// Scan `content` line by line, keeping at most `limit` lines per category.
    pub fn scan(&self, content: &str, limit: usize) -> Matches {
        let mut matches = Matches::default();
        let mut in_import_block = false;

        for line in content.lines() {
            if matches.imports.len() >= limit
                && matches.functions.len() >= limit
                && matches.classes.len() >= limit
            {
                break;
            }

            let trimmed = line.trim();

            if let Some((open, close)) = &self.import_block {
                if in_import_block {
                    if close.is_match(line) {
                        in_import_block = false;
                    } else if !trimmed.is_empty() && !trimmed.starts_with("//") {
                        push_limited(&mut matches.imports, trimmed, limit);
                    }
                    continue;
                }
                if open.is_match(line) {
                    in_import_block = true;
                    continue;
                }
            }

            if is_match(&self.imports, line) {
                push_limited(&mut matches.imports, trimmed, limit);
            }
            // A type declaration with a parameter list (Java records) is not a function
            if is_match(&self.classes, line) {
                push_limited(&mut matches.classes, trimmed, limit);
            } else if is_match(&self.functions, line) {
                push_limited(&mut matches.functions, trimmed, limit);
            }
        }

        matches
    }
}

fn is_match(pattern: &Option<Regex>, line: &str) -> bool {
    pattern.as_ref().is_some_and(|re| re.is_match(line))
}

fn push_limited(lines: &mut Vec<String>, line: &str, limit: usize) {
    if lines.len() < limit {
        lines.push(line.to_string());
    }
}

lazy_static! {
    static ref PYTHON: Patterns = Patterns::new(
        Some(r"^(?:import\s+\S|from\s+\S+\s+import\s)"),
        Some(r"^\s*(?:async\s+)?def\s+\w+\s*\(.*\).*:"),
        Some(r"^\s*class\s+\w+.*:"),
    );
    static ref JAVASCRIPT: Patterns = Patterns::new(
        Some(r"^\s*(?:import[\s{*'\x22]|export\s.*\sfrom\s|(?:const|let|var)\s.*=\s*require\()"),
        Some(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\*?\s*\w*\s*(?:<[^>]*>)?\s*\("),
        Some(r"^\s*(?:export\s+)?(?:default\s+)?(?:declare\s+)?(?:abstract\s+)?(?:class|interface|enum)\s+\w+"),
    );
    static ref JAVA: Patterns = Patterns::new(
        Some(r"^\s*import\s+(?:static\s+)?[\w.]+(?:\.\*)?\s*;"),
        Some(r"^\s*(?:(?:public|protected|private|static|final|abstract|synchronized|native|default)\s+)+(?:<[^>]*>\s*)?(?:[\w<>\[\],.?]+\s+)?\w+\s*\("),
        Some(r"^\s*(?:(?:public|protected|private|static|final|abstract|sealed)\s+)*(?:class|interface|enum|record|@interface)\s+\w+"),
    );
    static ref GO: Patterns = Patterns::new(
        Some(r#"^import\s*(?:\(.*"[^"]+".*\)|(?:[\w.]+\s+)?"[^"]+")"#),
        Some(r"^func\s+(?:\([^)]*\)\s*)?\w+\s*(?:\[[^\]]*\])?\s*\("),
        Some(r"^type\s+\w+(?:\[[^\]]*\])?\s+(?:struct|interface)\b"),
    )
    .with_import_block(r"^import\s*\(\s*$", r"^\s*\)");
    static ref RUBY: Patterns = Patterns::new(
        Some(r#"^\s*(?:require|require_relative|load)\s*\(?\s*['"]"#),
        Some(r"^\s*def\s+(?:self\.)?[\w?!=\[\]]+"),
        Some(r"^\s*(?:class|module)\s+[A-Z]\w*"),
    );
    static ref RUST: Patterns = Patterns::new(
        Some(r"^\s*(?:pub(?:\([^)]*\))?\s+)?use\s+\S"),
        Some(r#"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:const\s+)?(?:async\s+)?(?:unsafe\s+)?(?:extern\s+"[^"]*"\s+)?fn\s+\w+"#),
        Some(r"^\s*(?:pub(?:\([^)]*\))?\s+)?(?:struct|enum|trait|union)\s+\w+"),
    );
    static ref CSS: Patterns = Patterns::new(Some(r"^\s*@import\s"), None, None);
    static ref HTML: Patterns = Patterns::new(
        Some(r"(?i)<(?:script\b[^>]*\bsrc|link\b[^>]*\bhref)\s*="),
        None,
        None,
    );
}

/// Patterns for a file extension, or `None` when the extension is unknown.
pub fn for_extension(extension: &str) -> Option<&'static Patterns> {
    let patterns: &'static Patterns = match extension.to_ascii_lowercase().as_str() {
        "py" | "pyi" => &*PYTHON,
        "js" | "jsx" | "mjs" | "cjs" | "ts" | "tsx" | "mts" | "cts" => &*JAVASCRIPT,
        "java" => &*JAVA,
        "go" => &*GO,
        "rb" => &*RUBY,
        "rs" => &*RUST,
        "css" => &*CSS,
        "html" | "htm" => &*HTML,
        _ => return None,
    };
    Some(patterns)
}
