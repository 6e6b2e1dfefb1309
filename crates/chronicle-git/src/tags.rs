//! Tag operations

use git2::Oid;
use semver::Version;
use tracing::{debug, instrument};

use crate::repository::{GitRepo, Result};
use crate::types::TagInfo;

impl GitRepo {
    /// Get all tags
    #[instrument(skip(self))]
    pub fn tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            if let Ok(commit) = self.repo.find_commit(oid) {
                tags.push(TagInfo::new(&name, commit.id().to_string()));
            } else if let Ok(tag) = self.repo.find_tag(oid) {
                // Annotated tag
                tags.push(TagInfo::new(&name, tag.target_id().to_string()));
            }

            true
        })?;

        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }

    /// Find the latest tag.
    ///
    /// Tags carrying a semantic version are ordered by that version. When no
    /// tag parses as one, the tag whose target commit is newest wins.
    #[instrument(skip(self))]
    pub fn find_latest_tag(&self) -> Result<Option<TagInfo>> {
        let tags = self.tags()?;

        let mut versioned_tags: Vec<_> = tags
            .iter()
            .filter_map(|t| {
                t.version
                    .as_ref()
                    .and_then(|v| Version::parse(v).ok())
                    .map(|v| (t, v))
            })
            .collect();

        versioned_tags.sort_by(|a, b| b.1.cmp(&a.1));

        let latest = versioned_tags.into_iter().next().map(|(t, _)| t.clone());
        let result = latest.or_else(|| self.newest_by_commit_time(tags));
        debug!(latest = ?result.as_ref().map(|t| &t.name), "found latest tag");
        Ok(result)
    }

    fn newest_by_commit_time(&self, tags: Vec<TagInfo>) -> Option<TagInfo> {
        tags.into_iter()
            .filter_map(|t| {
                let oid = Oid::from_str(&t.commit_hash).ok()?;
                let commit = self.repo.find_commit(oid).ok()?;
                Some((commit.time().seconds(), t))
            })
            .max_by_key(|(seconds, _)| *seconds)
            .map(|(_, t)| t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commits::tests::commit_file;
    use chronicle_core::config::LAST_TAG;
    use git2::{Repository, Signature, Time};
    use std::path::Path;
    use tempfile::TempDir;

    fn setup_repo_with_tags() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let repo = Repository::init(temp.path()).unwrap();

        let oid = commit_file(&repo, temp.path(), "file.txt", "Initial commit");
        let commit = repo.find_commit(oid).unwrap();
        repo.tag_lightweight("v1.2.0", commit.as_object(), false)
            .unwrap();
        repo.tag_lightweight("v1.10.0", commit.as_object(), false)
            .unwrap();
        repo.tag_lightweight("nightly", commit.as_object(), false)
            .unwrap();

        let sig = Signature::now("Test", "test@example.com").unwrap();
        repo.tag("v0.9.0", commit.as_object(), &sig, "old release", false)
            .unwrap();

        let git_repo = GitRepo::open(temp.path()).unwrap();
        (temp, git_repo)
    }

    #[test]
    fn test_list_tags() {
        let (_temp, repo) = setup_repo_with_tags();
        let mut names: Vec<_> = repo.tags().unwrap().into_iter().map(|t| t.name).collect();
        names.sort();
        assert_eq!(names, vec!["nightly", "v0.9.0", "v1.10.0", "v1.2.0"]);
    }

    #[test]
    fn test_find_latest_tag_uses_semver_order() {
        let (_temp, repo) = setup_repo_with_tags();
        let tag = repo.find_latest_tag().unwrap().unwrap();
        assert_eq!(tag.name, "v1.10.0");
        assert_eq!(tag.version, Some("1.10.0".to_string()));
    }

    fn commit_at(repo: &Repository, root: &Path, file: &str, message: &str, seconds: i64) {
        let sig = Signature::new("Test", "test@example.com", &Time::new(seconds, 0)).unwrap();
        std::fs::write(root.join(file), message).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();

        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let parents = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap();
    }

    #[test]
    fn test_find_latest_tag_without_versions_uses_newest_commit() {
        let temp = TempDir::new().unwrap();
        let raw = Repository::init(temp.path()).unwrap();

        commit_at(&raw, temp.path(), "a.txt", "Initial commit", 1_700_000_000);
        let head = raw.head().unwrap().peel_to_commit().unwrap();
        raw.tag_lightweight("release-2023", head.as_object(), false)
            .unwrap();

        commit_at(&raw, temp.path(), "b.txt", "feat: add export", 1_710_000_000);
        let head = raw.head().unwrap().peel_to_commit().unwrap();
        let sig = Signature::now("Test", "test@example.com").unwrap();
        raw.tag("release-2024", head.as_object(), &sig, "yearly release", false)
            .unwrap();

        commit_at(&raw, temp.path(), "c.txt", "fix: export encoding", 1_720_000_000);

        let repo = GitRepo::open(temp.path()).unwrap();
        let tag = repo.find_latest_tag().unwrap().unwrap();
        assert_eq!(tag.name, "release-2024");
        assert_eq!(tag.version, None);

        let commits = repo.commits_since(LAST_TAG, None).unwrap();
        let messages: Vec<_> = commits.iter().map(|c| c.message.as_str()).collect();
        assert_eq!(messages, vec!["fix: export encoding"]);
    }
}
