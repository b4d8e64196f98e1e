//! Keyword search over source, markup, and config files.
//!
//! Walks the tree recursively, skipping version-control metadata, and
//! checks each eligible file for a literal substring.

use std::{fs, path::Path};

use ignore::WalkBuilder;

use super::resolve;

/// Most paths `search_keyword` returns.
pub const MAX_SEARCH_MATCHES: usize = 15;

/// Result text when nothing matched.
pub const NO_MATCHES: &str = "no matches";

/// Extensions eligible for search.
const SEARCHABLE_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "md", "json", "rs", "toml", "yaml", "yml",
];

/// Version-control metadata directories, skipped at any depth.
const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Find files under `path` whose text contains `keyword`.
///
/// Returns up to [`MAX_SEARCH_MATCHES`] paths relative to `root`, one per
/// line, in walk order. Unreadable files are skipped.
pub fn search_keyword(root: &Path, keyword: &str, path: &str) -> String {
    let start = match resolve(root, path) {
        Ok(start) => start,
        Err(e) => return e,
    };

    // The walk's own root never passes through `filter_entry`.
    if path_is_vcs(start.strip_prefix(root).unwrap_or(start.as_path())) {
        tracing::debug!(path, "search inside version-control metadata skipped");
        return NO_MATCHES.to_string();
    }

    let mut builder = WalkBuilder::new(&start);
    builder
        // Plain recursive walk: no ignore files, dotfiles included.
        .standard_filters(false)
        .filter_entry(|entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            let name = entry.file_name().to_string_lossy();
            !(is_dir && VCS_DIRS.iter().any(|vcs| name == *vcs))
        })
        .sort_by_file_name(Ord::cmp);

    let mut matches = Vec::new();

    for entry in builder.build().flatten() {
        if !entry.file_type().is_some_and(|ft| ft.is_file()) || !is_searchable(entry.path()) {
            continue;
        }

        let Ok(text) = fs::read_to_string(entry.path()) else {
            continue;
        };

        if text.contains(keyword) {
            let shown = entry.path().strip_prefix(root).unwrap_or(entry.path());
            matches.push(shown.to_string_lossy().into_owned());

            if matches.len() == MAX_SEARCH_MATCHES {
                break;
            }
        }
    }

    tracing::debug!(keyword, path, matches = matches.len(), "keyword search finished");

    if matches.is_empty() {
        NO_MATCHES.to_string()
    } else {
        matches.join("\n")
    }
}

fn path_is_vcs(path: &Path) -> bool {
    path.components()
        .any(|c| VCS_DIRS.iter().any(|vcs| c.as_os_str() == *vcs))
}

fn is_searchable(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SEARCHABLE_EXTENSIONS.contains(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    fn setup_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::write(root.join("README.md"), "Call save() to persist.").unwrap();
        fs::create_dir(root.join("src")).unwrap();
        fs::write(root.join("src/main.rs"), "fn save(doc: &Doc) {}").unwrap();
        fs::write(root.join("src/notes.txt"), "save").unwrap();
        fs::create_dir(root.join(".git")).unwrap();
        fs::write(root.join(".git/config.json"), "save").unwrap();
        fs::create_dir(root.join(".github")).unwrap();
        fs::write(root.join(".github/workflow.yml"), "run: save").unwrap();
        fs::write(root.join(".gitignore"), "src/\n").unwrap();

        dir
    }

    #[test]
    fn finds_literal_matches_in_allowed_extensions() {
        let dir = setup_tree();

        let result = search_keyword(dir.path(), "save", ".");

        // .txt is not searchable, .git is skipped, .gitignore is not honored.
        assert_eq!(result, ".github/workflow.yml\nREADME.md\nsrc/main.rs");
    }

    #[test]
    fn keyword_is_literal_not_regex() {
        let dir = setup_tree();

        assert_eq!(search_keyword(dir.path(), "save()", "."), "README.md");
        assert_eq!(search_keyword(dir.path(), "s.ve", "."), NO_MATCHES);
    }

    #[test]
    fn search_is_scoped_to_path() {
        let dir = setup_tree();
        assert_eq!(search_keyword(dir.path(), "save", "src"), "src/main.rs");
    }

    #[test]
    fn no_matches_sentinel() {
        let dir = setup_tree();
        assert_eq!(search_keyword(dir.path(), "nonexistent-token", "."), NO_MATCHES);
    }

    #[test]
    fn caps_results() {
        let dir = TempDir::new().unwrap();
        for i in 0..40 {
            fs::write(dir.path().join(format!("file{i:02}.rs")), "needle").unwrap();
        }

        let result = search_keyword(dir.path(), "needle", ".");

        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), MAX_SEARCH_MATCHES);
        assert_eq!(lines[0], "file00.rs");
    }

    #[test]
    fn unreadable_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bin.rs"), [0xFF, 0xFE, 0x00]).unwrap();
        fs::write(dir.path().join("ok.rs"), "needle").unwrap();

        assert_eq!(search_keyword(dir.path(), "needle", "."), "ok.rs");
    }

    #[test]
    fn vcs_directory_as_start_is_skipped() {
        let dir = setup_tree();
        fs::write(dir.path().join(".git/secret.json"), "token").unwrap();

        assert_eq!(search_keyword(dir.path(), "token", ".git"), NO_MATCHES);
        assert_eq!(search_keyword(dir.path(), "save", "./.git/"), NO_MATCHES);
    }

    #[test]
    fn rejects_parent_traversal() {
        let dir = setup_tree();
        let result = search_keyword(&dir.path().join("src"), "save", "..");
        assert!(result.starts_with("Error: path '..' is not allowed"));
    }
}
