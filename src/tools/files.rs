//! Directory listing and file reading.

use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

use super::resolve;

/// Longest prefix of a file returned by `read_file`, in characters.
pub const MAX_READ_CHARS: usize = 5000;

/// Bytes read from disk: enough for `MAX_READ_CHARS` of four-byte UTF-8.
const READ_BYTE_LIMIT: u64 = 4 * MAX_READ_CHARS as u64;

/// List a directory's immediate entries, one per line.
///
/// Entries are sorted by name. Directories carry a trailing `/`.
pub fn list_directory(root: &Path, path: &str) -> String {
    let dir = match resolve(root, path) {
        Ok(dir) => dir,
        Err(e) => return e,
    };

    let read_dir = match fs::read_dir(&dir) {
        Ok(read_dir) => read_dir,
        Err(e) => return format!("Error: cannot list '{path}': {e}"),
    };

    let mut entries: Vec<String> = read_dir
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let is_dir = entry.file_type().is_ok_and(|ft| ft.is_dir());
            let name = entry.file_name().to_string_lossy().into_owned();
            Some(if is_dir { format!("{name}/") } else { name })
        })
        .collect();

    // Sort for deterministic output.
    entries.sort();
    entries.join("\n")
}

/// Read up to the first [`MAX_READ_CHARS`] characters of a text file.
///
/// Truncation is silent. Binary or unreadable files produce an error result
/// carrying the underlying reason.
pub fn read_file(root: &Path, path: &str) -> String {
    let file = match resolve(root, path) {
        Ok(file) => file,
        Err(e) => return e,
    };

    let mut bytes = Vec::new();
    let read = File::open(&file).and_then(|f| f.take(READ_BYTE_LIMIT).read_to_end(&mut bytes));
    if let Err(e) = read {
        return format!("Error: cannot read '{path}': {e}");
    }
    let cut_short = bytes.len() as u64 == READ_BYTE_LIMIT;

    match String::from_utf8(bytes) {
        Ok(text) => text.chars().take(MAX_READ_CHARS).collect(),
        // The byte limit may split the last character.
        Err(e) if cut_short && e.utf8_error().error_len().is_none() => {
            let valid = e.utf8_error().valid_up_to();
            String::from_utf8_lossy(&e.as_bytes()[..valid])
                .chars()
                .take(MAX_READ_CHARS)
                .collect()
        }
        Err(e) => format!("Error: cannot read '{path}' as text: {}", e.utf8_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    /// A small checkout: a readme, a manifest, and one source file.
    fn checkout() -> TempDir {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("README.md"), "# Widgets\nSaves widgets.").unwrap();
        fs::write(repo.path().join("Cargo.toml"), "").unwrap();
        fs::create_dir(repo.path().join("src")).unwrap();
        fs::write(repo.path().join("src/lib.rs"), "pub fn save() {}").unwrap();
        repo
    }

    #[test]
    fn listing_is_sorted_and_marks_directories() {
        let repo = checkout();
        assert_eq!(
            list_directory(repo.path(), "."),
            "Cargo.toml\nREADME.md\nsrc/"
        );
        assert_eq!(list_directory(repo.path(), "src"), "lib.rs");
    }

    #[test]
    fn listing_an_empty_tree_is_empty_text() {
        let repo = TempDir::new().unwrap();
        assert_eq!(list_directory(repo.path(), "."), "");
    }

    #[test]
    fn listing_a_missing_directory_explains_why() {
        let repo = checkout();
        assert!(list_directory(repo.path(), "docs").starts_with("Error: cannot list 'docs'"));
    }

    #[test]
    fn listing_refuses_to_leave_the_tree() {
        let repo = checkout();

        let result = list_directory(&repo.path().join("src"), "..");

        assert!(result.starts_with("Error: path '..' is not allowed"));
        assert!(!result.contains("README.md"));
    }

    #[test]
    fn reads_whole_small_files() {
        let repo = checkout();
        assert_eq!(read_file(repo.path(), "src/lib.rs"), "pub fn save() {}");
        assert_eq!(read_file(repo.path(), "Cargo.toml"), "");
    }

    #[test]
    fn long_files_are_cut_at_the_char_limit() {
        let repo = TempDir::new().unwrap();
        // The limit counts characters, not bytes.
        fs::write(repo.path().join("CHANGELOG.md"), "é".repeat(MAX_READ_CHARS + 100)).unwrap();

        let result = read_file(repo.path(), "CHANGELOG.md");

        assert_eq!(result.chars().count(), MAX_READ_CHARS);
        assert!(!result.contains("..."));
    }

    #[test]
    fn huge_files_are_read_only_up_to_the_limit() {
        let repo = TempDir::new().unwrap();
        // Two-byte chars past the byte limit: the cut lands mid-character.
        let text = format!("a{}", "é".repeat(MAX_READ_CHARS * 3));
        fs::write(repo.path().join("dump.sql"), &text).unwrap();

        let result = read_file(repo.path(), "dump.sql");

        assert_eq!(result.chars().count(), MAX_READ_CHARS);
        assert!(result.starts_with("aé"));
    }

    #[test]
    fn directories_cannot_be_read() {
        let repo = checkout();
        assert!(read_file(repo.path(), "src").starts_with("Error: cannot read 'src'"));
    }

    #[test]
    fn binary_files_are_reported_not_returned() {
        let repo = TempDir::new().unwrap();
        fs::write(repo.path().join("logo.png"), [0x89, 0x50, 0x4E, 0x47, 0xFF]).unwrap();

        let result = read_file(repo.path(), "logo.png");

        assert!(result.starts_with("Error: cannot read 'logo.png' as text"));
    }

    #[test]
    fn missing_files_are_reported() {
        let repo = checkout();
        assert!(read_file(repo.path(), "src/main.rs").starts_with("Error: cannot read 'src/main.rs'"));
    }

    #[test]
    fn permission_errors_are_reported() {
        let repo = checkout();
        let key = repo.path().join("deploy.key");
        fs::write(&key, "private").unwrap();
        fs::set_permissions(&key, fs::Permissions::from_mode(0o000)).unwrap();

        let result = read_file(repo.path(), "deploy.key");

        // Permission bits do not bind root, so only check a denied read.
        if result != "private" {
            assert!(result.starts_with("Error: cannot read 'deploy.key'"));
        }
        fs::set_permissions(&key, fs::Permissions::from_mode(0o600)).unwrap();
    }

    #[test]
    fn reads_refuse_to_leave_the_tree() {
        let repo = checkout();

        let relative = read_file(&repo.path().join("src"), "../README.md");
        let absolute = read_file(repo.path(), &repo.path().join("README.md").to_string_lossy());

        assert!(relative.starts_with("Error: path '../README.md' is not allowed"));
        assert!(absolute.contains("is not allowed"));
    }
}
