//! Parallel lint runs over many files
//!
//! Each file goes through read, tokenize, parse and check on one worker.
//! Files are independent, so the run is spread over a rayon pool whose
//! workers have the stack deeply nested files need.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::checker::{CheckResult, Checker, PIPELINE_STACK_SIZE};
use crate::language::Language;
use crate::violation::{IO_ERROR, Severity, Violation};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFile {
    pub path: PathBuf,
    pub language: Language,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, language: Language) -> Self {
        Self {
            path: path.into(),
            language,
        }
    }
}

/// Shared flag checked between files. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    /// Results of the files that ran, in input order.
    pub results: Vec<CheckResult>,
    /// Files never started because the run was cancelled.
    pub skipped: usize,
}

impl RunOutcome {
    pub fn cancelled(&self) -> bool {
        self.skipped > 0
    }

    pub fn passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }
}

pub struct LintRunner {
    checker: Checker,
}

impl LintRunner {
    pub fn new(checker: Checker) -> Self {
        Self { checker }
    }

    pub fn checker(&self) -> &Checker {
        &self.checker
    }

    pub fn run(&self, files: &[SourceFile], cancel: &CancellationToken) -> RunOutcome {
        let pool = rayon::ThreadPoolBuilder::new()
            .thread_name(|index| format!("guidelint-worker-{index}"))
            .stack_size(PIPELINE_STACK_SIZE)
            .build();

        let results = match pool {
            Ok(pool) => pool.install(|| self.run_all(files, cancel, Checker::check_source_in_place)),
            Err(error) => {
                warn!("could not start worker pool: {}", error);
                self.run_all(files, cancel, Checker::check_source)
            }
        };

        let skipped = files.len() - results.len();
        debug!(files = files.len(), skipped, "lint run finished");
        RunOutcome { results, skipped }
    }

    fn run_all(
        &self,
        files: &[SourceFile],
        cancel: &CancellationToken,
        check: fn(&Checker, &str, &str, Language) -> CheckResult,
    ) -> Vec<CheckResult> {
        files
            .par_iter()
            .filter_map(|file| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(self.run_file(file, check))
            })
            .collect()
    }

    fn run_file(
        &self,
        file: &SourceFile,
        check: fn(&Checker, &str, &str, Language) -> CheckResult,
    ) -> CheckResult {
        let path = file.path.to_string_lossy();
        debug!(path = %path, language = %file.language, "checking file");

        match fs::read_to_string(&file.path) {
            Ok(source) => check(&self.checker, &path, &source, file.language),
            Err(e) => {
                warn!(path = %path, "could not read file: {}", e);
                let violation = Violation::new(
                    IO_ERROR,
                    Severity::Error,
                    format!("Could not read file: {e}"),
                    &*path,
                    1,
                    1,
                );
                CheckResult::new(path, file.language, vec![violation])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RulesConfig;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn runner() -> LintRunner {
        LintRunner::new(Checker::with_config(&RulesConfig::default()).unwrap())
    }

    fn write(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn results_keep_input_order() {
        let dir = tempdir().unwrap();
        let files: Vec<_> = (0..20)
            .map(|i| {
                let path = write(dir.path(), &format!("f{i}.js"), "var item = new Object();\n");
                SourceFile::new(path, Language::JavaScript)
            })
            .collect();

        let outcome = runner().run(&files, &CancellationToken::new());

        assert!(!outcome.cancelled());
        assert_eq!(outcome.results.len(), files.len());
        for (file, result) in files.iter().zip(&outcome.results) {
            assert_eq!(result.path, file.path.to_string_lossy());
            assert_eq!(result.violations.len(), 1);
        }
    }

    #[test]
    fn mixed_languages_are_checked_with_their_rules() {
        let dir = tempdir().unwrap();
        let files = vec![
            SourceFile::new(write(dir.path(), "a.js", "var a = 1;\n"), Language::JavaScript),
            SourceFile::new(write(dir.path(), "b.css", "a { color: red; top: 0; }\n"), Language::Css),
            SourceFile::new(write(dir.path(), "c.html", "<p class=\"x\" id=\"y\">x</p>\n"), Language::Html),
        ];

        let outcome = runner().run(&files, &CancellationToken::new());

        assert!(outcome.results[0].passed);
        assert_eq!(outcome.results[1].violations[0].rule_id, "C001");
        assert_eq!(outcome.results[2].violations[0].rule_id, "H001");
        assert!(!outcome.passed());
    }

    #[test]
    fn unreadable_file_becomes_io_error() {
        let dir = tempdir().unwrap();
        let missing = SourceFile::new(dir.path().join("missing.js"), Language::JavaScript);
        let present = SourceFile::new(write(dir.path(), "ok.js", "var a = 1;\n"), Language::JavaScript);

        let outcome = runner().run(&[missing, present], &CancellationToken::new());

        assert_eq!(outcome.results.len(), 2);
        let error = &outcome.results[0].violations[0];
        assert_eq!(error.rule_id, IO_ERROR);
        assert_eq!((error.line, error.column), (1, 1));
        assert!(outcome.results[1].passed);
    }

    #[test]
    fn deeply_nested_file_is_checked_on_a_worker() {
        let dir = tempdir().unwrap();
        let depth = 150;
        let mut source = String::new();
        for level in 0..depth {
            source.push_str(&format!("{}run(() => {{\n", "  ".repeat(level)));
        }
        for level in (0..depth).rev() {
            source.push_str(&format!("{}}});\n", "  ".repeat(level)));
        }
        let files = vec![
            SourceFile::new(write(dir.path(), "deep.js", &source), Language::JavaScript),
            SourceFile::new(write(dir.path(), "after.js", "var a = 1;\n"), Language::JavaScript),
        ];

        let outcome = runner().run(&files, &CancellationToken::new());

        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.passed(), "{:?}", outcome.results[0].violations);
    }

    #[test]
    fn cancelled_run_skips_every_file() {
        let dir = tempdir().unwrap();
        let files = vec![
            SourceFile::new(write(dir.path(), "a.js", "var a = 1;\n"), Language::JavaScript),
            SourceFile::new(write(dir.path(), "b.js", "var b = 1;\n"), Language::JavaScript),
        ];
        let token = CancellationToken::new();
        token.cancel();

        let outcome = runner().run(&files, &token);

        assert!(outcome.results.is_empty());
        assert_eq!(outcome.skipped, 2);
        assert!(outcome.cancelled());
    }

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
