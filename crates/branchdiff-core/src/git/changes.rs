use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use super::error::GitError;
use super::refs::validate_ref;
use super::runner::CommandRunner;
use super::types::{FileChange, FileStatus};

fn status_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([AMDRCTU])([0-9]{0,3})$").expect("valid status regex"))
}

/// Tracked files that differ between the working tree and `diff_ref`, in
/// git's output order. No changes is `Ok(vec![])`, not an error.
pub async fn get_changed_files<R: CommandRunner>(
    runner: &R,
    repo_root: &Path,
    diff_ref: &str,
) -> Result<Vec<FileChange>, GitError> {
    validate_ref(diff_ref)?;
    let out = runner
        .run(
            repo_root,
            &[
                "-c",
                "core.quotePath=false",
                "diff",
                "--name-status",
                "-M",
                diff_ref,
                "--",
            ],
        )
        .await?;
    parse_name_status(&out)
}

/// Parses `git diff --name-status` output. Any malformed line fails the whole
/// parse so a change set is either complete or an error.
pub fn parse_name_status(output: &str) -> Result<Vec<FileChange>, GitError> {
    output
        .lines()
        .filter(|line| !line.is_empty())
        .map(parse_line)
        .collect()
}

fn parse_line(line: &str) -> Result<FileChange, GitError> {
    let malformed = || GitError::Parse {
        raw_line: line.to_string(),
    };

    let fields: Vec<&str> = line.split('\t').collect();
    let code = status_code_re()
        .captures(fields[0])
        .and_then(|caps| caps[1].chars().next())
        .ok_or_else(malformed)?;
    // the trailing digits are a similarity score; only the letter matters
    let status = FileStatus::from_code(code).ok_or_else(malformed)?;

    let expected = if status.carries_original_path() { 3 } else { 2 };
    if fields.len() != expected {
        return Err(malformed());
    }

    let paths = fields[1..]
        .iter()
        .map(|raw| match unquote_path(raw) {
            Some(path) if !path.is_empty() => Ok(path),
            _ => Err(malformed()),
        })
        .collect::<Result<Vec<String>, GitError>>()?;

    Ok(match paths.as_slice() {
        [from, to] => FileChange::moved(status, from.clone(), to.clone()),
        [path] => FileChange::new(status, path.clone()),
        _ => return Err(malformed()),
    })
}

/// Undoes git's C-style quoting (`"a\tb"`, `"caf\303\251"`). Unquoted paths
/// are returned as-is; `None` means a broken escape.
fn unquote_path(raw: &str) -> Option<String> {
    let inner = match raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) if raw.len() >= 2 => inner,
        _ => return Some(raw.to_string()),
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        let escaped = match iter.next()? {
            b'\\' => b'\\',
            b'"' => b'"',
            b't' => b'\t',
            b'n' => b'\n',
            b'r' => b'\r',
            b'a' => 0x07,
            b'b' => 0x08,
            b'f' => 0x0c,
            b'v' => 0x0b,
            d @ b'0'..=b'3' => {
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    let next = iter.next()?;
                    if !(b'0'..=b'7').contains(&next) {
                        return None;
                    }
                    value = value * 8 + u32::from(next - b'0');
                }
                u8::try_from(value).ok()?
            }
            _ => return None,
        };
        bytes.push(escaped);
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::runner::fake::FakeRunner;

    const DIFF_ARGS: [&str; 7] = [
        "-c",
        "core.quotePath=false",
        "diff",
        "--name-status",
        "-M",
        "abc123",
        "--",
    ];

    #[test]
    fn test_modified_line() {
        let changes = parse_name_status("M\tfoo/bar.txt").unwrap();
        assert_eq!(changes, vec![FileChange::new(FileStatus::Modified, "foo/bar.txt")]);
        assert_eq!(changes[0].original_path, None);
    }

    #[test]
    fn test_rename_line_with_similarity() {
        let changes = parse_name_status("R100\told/a.txt\tnew/a.txt").unwrap();
        assert_eq!(
            changes,
            vec![FileChange::moved(FileStatus::Renamed, "old/a.txt", "new/a.txt")]
        );
    }

    #[test]
    fn test_copy_line() {
        let changes = parse_name_status("C075\tsrc/a.rs\tsrc/b.rs\n").unwrap();
        assert_eq!(changes[0].status, FileStatus::Copied);
        assert_eq!(changes[0].path, "src/b.rs");
        assert_eq!(changes[0].original_path.as_deref(), Some("src/a.rs"));
    }

    #[test]
    fn test_keeps_input_order() {
        let changes = parse_name_status("A\tnew.txt\nD\told.txt\nM\tkept.txt\n").unwrap();
        let statuses: Vec<FileStatus> = changes.iter().map(|c| c.status).collect();
        assert_eq!(
            statuses,
            vec![FileStatus::Added, FileStatus::Deleted, FileStatus::Modified]
        );
        let paths: Vec<&str> = changes.iter().map(|c| c.path.as_str()).collect();
        assert_eq!(paths, vec!["new.txt", "old.txt", "kept.txt"]);
    }

    #[test]
    fn test_every_status_letter() {
        let output = "A\ta\nM\tb\nD\tc\nR090\td\te\nC100\tf\tg\nT\th\nU\ti\n";
        let changes = parse_name_status(output).unwrap();
        assert_eq!(changes.len(), 7);
        for change in &changes {
            assert_eq!(
                change.original_path.is_some(),
                change.status.carries_original_path()
            );
        }
    }

    #[test]
    fn test_empty_output_is_no_changes() {
        assert!(parse_name_status("").unwrap().is_empty());
        assert!(parse_name_status("\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_fail_with_raw_line() {
        for bad in [
            "M",
            "M\ta\tb",
            "R100\tonly-one",
            "X\tunknown.txt",
            "Mx\tfoo",
            "M1234\tfoo",
            "M\t",
            "R\t\tnew",
        ] {
            match parse_name_status(&format!("A\tfine.txt\n{bad}\n")) {
                Err(GitError::Parse { raw_line }) => assert_eq!(raw_line, bad),
                other => panic!("{bad:?} should fail, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_quoted_paths_are_unquoted() {
        let changes =
            parse_name_status("M\t\"tab\\there.txt\"\nA\t\"caf\\303\\251.md\"\n").unwrap();
        assert_eq!(changes[0].path, "tab\there.txt");
        assert_eq!(changes[1].path, "café.md");
    }

    #[test]
    fn test_plain_path_with_spaces_and_quote_chars() {
        let changes = parse_name_status("M\tdocs/my file.txt\nA\t\"\n").unwrap();
        assert_eq!(changes[0].path, "docs/my file.txt");
        assert_eq!(changes[1].path, "\"");
    }

    #[test]
    fn test_broken_escape_is_parse_error() {
        assert!(matches!(
            parse_name_status("M\t\"bad\\q\""),
            Err(GitError::Parse { .. })
        ));
        assert!(matches!(
            parse_name_status("M\t\"trailing\\\""),
            Err(GitError::Parse { .. })
        ));
    }

    #[tokio::test]
    async fn test_changed_files_runs_name_status_in_root() {
        let runner = FakeRunner::new().ok(&DIFF_ARGS, "M\tsrc/lib.rs\nR100\ta\tb\n");
        let changes = get_changed_files(&runner, Path::new("/repo"), "abc123")
            .await
            .unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(runner.calls()[0].0, "/repo");
    }

    #[tokio::test]
    async fn test_changed_files_propagates_command_error() {
        let runner = FakeRunner::new().fail(&DIFF_ARGS, 128, "fatal: bad object abc123");
        let err = get_changed_files(&runner, Path::new("/repo"), "abc123")
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), Some(128));
    }
}
