use anyhow::{Context, Result};
use git2::{BranchType, Repository};

use super::types::{RefInfo, RefType};

/// Local branches, then tags, then linked worktrees.
pub fn list_refs(repo: &Repository) -> Result<Vec<RefInfo>> {
    let mut refs = Vec::new();

    let branches = repo
        .branches(Some(BranchType::Local))
        .context("Failed to list branches")?;
    for branch in branches {
        let (branch, _) = branch.context("Failed to read branch")?;
        if let Some(name) = branch.name().context("Invalid branch name")? {
            refs.push(RefInfo {
                name: name.to_string(),
                ref_type: RefType::Branch,
            });
        }
    }

    let tag_names = repo.tag_names(None).context("Failed to list tags")?;
    refs.extend(tag_names.iter().flatten().map(|name| RefInfo {
        name: name.to_string(),
        ref_type: RefType::Tag,
    }));

    let worktrees = repo.worktrees().context("Failed to list worktrees")?;
    refs.extend(worktrees.iter().flatten().map(|name| RefInfo {
        name: name.to_string(),
        ref_type: RefType::Worktree,
    }));

    Ok(refs)
}
