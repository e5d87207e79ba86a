//! Source file discovery
//!
//! Directories are walked recursively, skipping hidden entries and
//! `node_modules`. Config `include`/`exclude` globs are matched against the
//! path relative to the walked root. Files named explicitly on the command
//! line bypass the globs.

use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use guidelint_core::{Config, SourceFile, detect_language};
use walkdir::WalkDir;

pub struct FileFilter {
    include: Option<GlobSet>,
    exclude: GlobSet,
}

impl FileFilter {
    pub fn from_config(config: &Config) -> Result<Self> {
        let include = if config.include.is_empty() {
            None
        } else {
            Some(build_glob_set(&config.include)?)
        };
        Ok(Self {
            include,
            exclude: build_glob_set(&config.exclude)?,
        })
    }

    pub fn accepts(&self, relative: &Path) -> bool {
        let included = self
            .include
            .as_ref()
            .is_none_or(|include| include.is_match(relative));
        included && !self.exclude.is_match(relative)
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).with_context(|| format!("Invalid glob pattern '{pattern}'"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Supported files under `roots`, sorted and without duplicates.
pub fn discover_files(roots: &[PathBuf], filter: &FileFilter) -> Result<Vec<SourceFile>> {
    let mut files = Vec::new();

    for root in roots {
        if !root.exists() {
            anyhow::bail!("Path does not exist: {}", root.display());
        }

        if root.is_file() {
            match detect_language(root) {
                Some(language) => files.push(SourceFile::new(normalize(root), language)),
                None => tracing::warn!(path = %root.display(), "skipping unsupported file"),
            }
            continue;
        }

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_entry(|e| !is_hidden(e))
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let Some(language) = detect_language(path) else {
                continue;
            };
            let relative = path.strip_prefix(root).unwrap_or(path);
            if filter.accepts(relative) {
                files.push(SourceFile::new(normalize(path), language));
            }
        }
    }

    files.sort();
    files.dedup();
    tracing::debug!(count = files.len(), "discovered files");
    Ok(files)
}

/// Drop `.` components so `./src/a.js` and `src/a.js` compare equal.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.') || name == "node_modules")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guidelint_core::Language;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn no_filter() -> FileFilter {
        FileFilter::from_config(&Config::default()).unwrap()
    }

    fn names(files: &[SourceFile], root: &Path) -> Vec<String> {
        files
            .iter()
            .map(|f| {
                f.path
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect()
    }

    #[test]
    fn finds_supported_languages_recursively() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        File::create(dir.path().join("index.html")).unwrap();
        File::create(dir.path().join("src/app.js")).unwrap();
        File::create(dir.path().join("src/style.css")).unwrap();
        File::create(dir.path().join("README.md")).unwrap();

        let files = discover_files(&[dir.path().to_path_buf()], &no_filter()).unwrap();

        assert_eq!(names(&files, dir.path()), ["index.html", "src/app.js", "src/style.css"]);
        assert_eq!(files[0].language, Language::Html);
        assert_eq!(files[1].language, Language::JavaScript);
    }

    #[test]
    fn skips_hidden_directories_and_node_modules() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::create_dir(dir.path().join("node_modules")).unwrap();
        File::create(dir.path().join(".cache/a.js")).unwrap();
        File::create(dir.path().join("node_modules/dep.js")).unwrap();
        File::create(dir.path().join("main.js")).unwrap();

        let files = discover_files(&[dir.path().to_path_buf()], &no_filter()).unwrap();

        assert_eq!(names(&files, dir.path()), ["main.js"]);
    }

    #[test]
    fn include_and_exclude_globs() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("src/vendor")).unwrap();
        File::create(dir.path().join("src/a.js")).unwrap();
        File::create(dir.path().join("src/vendor/lib.js")).unwrap();
        File::create(dir.path().join("build.js")).unwrap();

        let config = Config {
            include: vec!["src/**".to_string()],
            exclude: vec!["**/vendor/**".to_string()],
            ..Default::default()
        };
        let filter = FileFilter::from_config(&config).unwrap();
        let files = discover_files(&[dir.path().to_path_buf()], &filter).unwrap();

        assert_eq!(names(&files, dir.path()), ["src/a.js"]);
    }

    #[test]
    fn overlapping_roots_are_deduplicated() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("a.css");
        File::create(&file).unwrap();

        let files = discover_files(&[dir.path().to_path_buf(), file], &no_filter()).unwrap();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tempdir().unwrap();
        let result = discover_files(&[dir.path().join("nope")], &no_filter());
        assert!(result.is_err());
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let config = Config {
            exclude: vec!["src/[".to_string()],
            ..Default::default()
        };
        assert!(FileFilter::from_config(&config).is_err());
    }

    #[test]
    fn explicit_unsupported_file_is_skipped() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        File::create(&file).unwrap();

        let files = discover_files(&[file], &no_filter()).unwrap();
        assert!(files.is_empty());
    }
}
