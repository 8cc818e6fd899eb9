use anyhow::{Context, Result};
use git2::{Delta, Diff, DiffFindOptions, DiffOptions, Patch, Repository, Tree};
use tracing::debug;

use super::types::*;

pub struct DiffEngine;

impl DiffEngine {
    pub fn compute_diff(repo: &Repository, target: &ComparisonTarget) -> Result<DiffResult> {
        let mut diff_opts = DiffOptions::new();
        diff_opts.context_lines(target.context_lines);

        let base_tree = resolve_tree(repo, &target.base)?;

        let mut diff = match target.compare {
            Some(ref compare) => {
                let compare_tree = resolve_tree(repo, compare)?;
                repo.diff_tree_to_tree(
                    base_tree.as_ref(),
                    compare_tree.as_ref(),
                    Some(&mut diff_opts),
                )?
            }
            None => {
                diff_opts.include_untracked(true);
                diff_opts.recurse_untracked_dirs(true);
                diff_opts.show_untracked_content(true);
                repo.diff_tree_to_workdir_with_index(base_tree.as_ref(), Some(&mut diff_opts))?
            }
        };

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))
            .context("Rename detection failed")?;

        let files = Self::parse_diff(&diff)?;
        debug!(
            base = %target.base,
            compare = target.compare_label(),
            files = files.len(),
            "computed diff"
        );

        Ok(DiffResult {
            base_ref: target.base.clone(),
            compare_ref: target.compare_label().to_string(),
            files,
        })
    }

    fn parse_diff(diff: &Diff<'_>) -> Result<Vec<DiffFile>> {
        let num_deltas = diff.deltas().len();
        let mut files = Vec::with_capacity(num_deltas);

        for idx in 0..num_deltas {
            let Some(delta) = diff.get_delta(idx) else {
                continue;
            };

            let status = match delta.status() {
                Delta::Added | Delta::Untracked => FileStatus::Added,
                Delta::Deleted => FileStatus::Deleted,
                Delta::Modified => FileStatus::Modified,
                Delta::Renamed => FileStatus::Renamed,
                _ => FileStatus::Modified,
            };

            let path = delta
                .new_file()
                .path()
                .or_else(|| delta.old_file().path())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();

            let old_path = if status == FileStatus::Renamed {
                delta
                    .old_file()
                    .path()
                    .map(|p| p.to_string_lossy().into_owned())
            } else {
                None
            };

            // Binary and unchanged deltas produce no patch.
            let hunks = match Patch::from_diff(diff, idx)
                .with_context(|| format!("Failed to build patch for {path}"))?
            {
                Some(patch) if !delta.flags().is_binary() => Self::parse_patch(&patch)?,
                _ => Vec::new(),
            };

            files.push(DiffFile {
                path,
                status,
                old_path,
                hunks,
            });
        }

        Ok(files)
    }

    fn parse_patch(patch: &Patch<'_>) -> Result<Vec<DiffHunk>> {
        let mut hunks = Vec::with_capacity(patch.num_hunks());

        for hunk_idx in 0..patch.num_hunks() {
            let (hunk, line_count) = patch.hunk(hunk_idx)?;
            let mut lines = Vec::with_capacity(line_count);

            for line_idx in 0..line_count {
                let line = patch.line_in_hunk(hunk_idx, line_idx)?;
                // "\ No newline at end of file" markers carry no content.
                if matches!(line.origin(), '=' | '>' | '<') {
                    continue;
                }
                let content = String::from_utf8_lossy(line.content())
                    .trim_end_matches('\n')
                    .to_string();
                lines.push(DiffLine {
                    line_type: LineType::from_origin(line.origin()),
                    content,
                    old_num: line.old_lineno(),
                    new_num: line.new_lineno(),
                });
            }

            hunks.push(DiffHunk {
                old_start: hunk.old_start(),
                old_lines: hunk.old_lines(),
                new_start: hunk.new_start(),
                new_lines: hunk.new_lines(),
                lines,
            });
        }

        Ok(hunks)
    }
}

/// Resolve a revspec to a tree. An unborn `HEAD` (no commits yet) resolves to
/// no tree, so a fresh repository diffs as all-added.
fn resolve_tree<'r>(repo: &'r Repository, spec: &str) -> Result<Option<Tree<'r>>> {
    if spec == "HEAD" && repo.head().is_err() {
        return Ok(None);
    }
    let obj = repo
        .revparse_single(spec)
        .with_context(|| format!("Could not resolve: {spec}"))?;
    let tree = obj
        .peel_to_tree()
        .with_context(|| format!("{spec} does not point to a tree"))?;
    Ok(Some(tree))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn commit_all(repo: &Repository, msg: &str) {
        let sig = git2::Signature::now("Test", "test@test.com").unwrap();
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index
            .update_all(["*"].iter(), None)
            .unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, msg, &tree, &parent_refs)
            .unwrap();
    }

    /// Repo with `test.txt` committed and a `base` branch pointing at that commit.
    fn setup_repo(path: &Path) -> Repository {
        let repo = Repository::init(path).unwrap();
        fs::write(path.join("test.txt"), "hello\n").unwrap();
        commit_all(&repo, "initial");
        {
            let head = repo.head().unwrap().peel_to_commit().unwrap();
            repo.branch("base", &head, false).unwrap();
        }
        repo
    }

    fn target(base: &str, compare: Option<&str>) -> ComparisonTarget {
        ComparisonTarget::new(base, compare.map(str::to_string))
    }

    #[test]
    fn test_modified_file_between_refs() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        fs::write(dir.path().join("test.txt"), "hello\nworld\n").unwrap();
        commit_all(&repo, "modify");

        let result = DiffEngine::compute_diff(&repo, &target("base", Some("HEAD"))).unwrap();
        assert_eq!(result.base_ref, "base");
        assert_eq!(result.compare_ref, "HEAD");
        assert_eq!(result.files.len(), 1);

        let file = &result.files[0];
        assert_eq!(file.path, "test.txt");
        assert_eq!(file.status, FileStatus::Modified);
        assert_eq!(file.old_path, None);
        assert_eq!(file.hunks.len(), 1);

        let lines = &file.hunks[0].lines;
        assert_eq!(lines[0].line_type, LineType::Context);
        assert_eq!(lines[0].content, "hello");
        assert_eq!(lines[0].old_num, Some(1));
        assert_eq!(lines[0].new_num, Some(1));
        assert_eq!(lines[1].line_type, LineType::Add);
        assert_eq!(lines[1].content, "world");
        assert_eq!(lines[1].old_num, None);
        assert_eq!(lines[1].new_num, Some(2));
    }

    #[test]
    fn test_added_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        fs::write(dir.path().join("new.txt"), "new file\n").unwrap();
        commit_all(&repo, "add file");

        let result = DiffEngine::compute_diff(&repo, &target("base", Some("HEAD"))).unwrap();
        let file = result.files.iter().find(|f| f.path == "new.txt").unwrap();
        assert_eq!(file.status, FileStatus::Added);
        assert_eq!(file.line_stats(), (1, 0));
    }

    #[test]
    fn test_deleted_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        fs::remove_file(dir.path().join("test.txt")).unwrap();
        commit_all(&repo, "delete file");

        let result = DiffEngine::compute_diff(&repo, &target("base", Some("HEAD"))).unwrap();
        let file = result.files.iter().find(|f| f.path == "test.txt").unwrap();
        assert_eq!(file.status, FileStatus::Deleted);
        assert_eq!(file.line_stats(), (0, 1));
    }

    #[test]
    fn test_renamed_file_keeps_old_path() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        fs::rename(dir.path().join("test.txt"), dir.path().join("moved.txt")).unwrap();
        commit_all(&repo, "rename");

        let result = DiffEngine::compute_diff(&repo, &target("base", Some("HEAD"))).unwrap();
        assert_eq!(result.files.len(), 1);
        let file = &result.files[0];
        assert_eq!(file.status, FileStatus::Renamed);
        assert_eq!(file.path, "moved.txt");
        assert_eq!(file.old_path.as_deref(), Some("test.txt"));
    }

    #[test]
    fn test_working_tree_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        fs::write(dir.path().join("test.txt"), "goodbye\n").unwrap();

        let result = DiffEngine::compute_diff(&repo, &target("HEAD", None)).unwrap();
        assert_eq!(result.compare_ref, WORKING_TREE);
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].line_stats(), (1, 1));
    }

    #[test]
    fn test_untracked_file_counts_as_added() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        fs::write(dir.path().join("scratch.txt"), "notes\n").unwrap();

        let result = DiffEngine::compute_diff(&repo, &target("HEAD", None)).unwrap();
        let file = result
            .files
            .iter()
            .find(|f| f.path == "scratch.txt")
            .unwrap();
        assert_eq!(file.status, FileStatus::Added);
    }

    #[test]
    fn test_unborn_head_diffs_as_all_added() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("first.txt"), "one\n").unwrap();

        let result = DiffEngine::compute_diff(&repo, &target("HEAD", None)).unwrap();
        assert_eq!(result.files.len(), 1);
        assert_eq!(result.files[0].status, FileStatus::Added);
    }

    #[test]
    fn test_missing_newline_marker_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        fs::write(dir.path().join("test.txt"), "hello\nno newline").unwrap();
        commit_all(&repo, "no trailing newline");

        let result = DiffEngine::compute_diff(&repo, &target("base", Some("HEAD"))).unwrap();
        let lines = &result.files[0].hunks[0].lines;
        assert!(lines.iter().all(|l| !l.content.contains("No newline")));
        assert_eq!(lines.last().unwrap().content, "no newline");
    }

    #[test]
    fn test_unknown_ref_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let repo = setup_repo(dir.path());

        let err = DiffEngine::compute_diff(&repo, &target("no-such-branch", None)).unwrap_err();
        assert!(err.to_string().contains("no-such-branch"));
    }

    #[test]
    fn test_context_lines_limit_hunk() {
        let dir = tempfile::tempdir().unwrap();
        let original: String = (1..=10).map(|i| format!("line {i}\n")).collect();
        fs::write(dir.path().join("test.txt"), &original).unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_all(&repo, "initial");

        fs::write(
            dir.path().join("test.txt"),
            original.replace("line 5\n", "line five\n"),
        )
        .unwrap();

        let mut narrow = target("HEAD", None);
        narrow.context_lines = 1;
        let result = DiffEngine::compute_diff(&repo, &narrow).unwrap();
        let hunk = &result.files[0].hunks[0];
        let contents: Vec<_> = hunk.lines.iter().map(|l| l.content.as_str()).collect();
        assert_eq!(contents, ["line 4", "line 5", "line five", "line 6"]);
        assert_eq!(hunk.old_start, 4);
    }
}
