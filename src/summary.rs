//! FileSummary struct - the structural synopsis of one source file.

use crate::matchers;
use crate::repository::extension_of;
use std::fmt;

/// Maximum number of lines kept per category
pub const MAX_ENTRIES: usize = 5;

/// Import lines, function signatures and type declarations found in a file.
///
/// Each list holds at most [`MAX_ENTRIES`] lines in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSummary {
    /// Repository-relative path of the summarized file
    pub path: String,
    pub imports: Vec<String>,
    pub functions: Vec<String>,
    pub classes: Vec<String>,
}

impl FileSummary {
    /// Extract a summary using the patterns registered for the path's extension.
    pub fn extract(path: &str, content: &str) -> Self {
        let matches = extension_of(path)
            .and_then(matchers::for_extension)
            .map(|patterns| patterns.scan(content, MAX_ENTRIES))
            .unwrap_or_default();

        Self {
            path: path.to_string(),
            imports: matches.imports,
            functions: matches.functions,
            classes: matches.classes,
        }
    }

    /// Check if the summary found anything besides the path
    pub fn is_empty(&self) -> bool {
        self.imports.is_empty() && self.functions.is_empty() && self.classes.is_empty()
    }
}

impl fmt::Display for FileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.path)?;

        let blocks = [
            ("Imports", &self.imports),
            ("Functions", &self.functions),
            ("Classes", &self.classes),
        ];
        for (heading, lines) in blocks {
            if !lines.is_empty() {
                writeln!(f, "{}:", heading)?;
                writeln!(f, "{}", lines.join("\n"))?;
            }
        }

        Ok(())
    }
}

/// Summarize one file into its rendered text form.
pub fn summarize(path: &str, content: &str) -> String {
    FileSummary::extract(path, content).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_blocks_in_fixed_order() {
        let content = "class Store:\n    def get(self, key):\nimport os\n";
        let summary = summarize("app/store.py", content);

        assert_eq!(
            summary,
            "File: app/store.py\nImports:\nimport os\nFunctions:\ndef get(self, key):\nClasses:\nclass Store:\n"
        );
    }

    #[test]
    fn keeps_first_five_functions_in_order() {
        let content: String = (1..=7).map(|i| format!("def step_{}(ctx):\n    pass\n", i)).collect();
        let summary = FileSummary::extract("pipeline.py", &content);

        assert_eq!(
            summary.functions,
            vec![
                "def step_1(ctx):",
                "def step_2(ctx):",
                "def step_3(ctx):",
                "def step_4(ctx):",
                "def step_5(ctx):",
            ]
        );
        let rendered = summary.to_string();
        assert!(rendered.contains("def step_5(ctx):"));
        assert!(!rendered.contains("def step_6(ctx):"));
    }

    #[test]
    fn empty_categories_have_no_heading() {
        let summary = summarize("util.py", "def helper(x):\n    return x\n");

        assert_eq!(summary, "File: util.py\nFunctions:\ndef helper(x):\n");
        assert!(!summary.contains("Imports:"));
        assert!(!summary.contains("Classes:"));
    }

    #[test]
    fn unknown_extension_yields_bare_header() {
        let summary = FileSummary::extract("notes.txt", "def looks_like_python():\n");
        assert!(summary.is_empty());
        assert_eq!(summary.to_string(), "File: notes.txt\n");
    }

    #[test]
    fn binary_content_is_harmless() {
        let garbage = String::from_utf8_lossy(&[0u8, 159, 146, 150, 10, 255, 0]).into_owned();
        assert_eq!(summarize("blob.py", &garbage), "File: blob.py\n");
    }
}
