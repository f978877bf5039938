use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Default parent directory of development working trees on the panel host.
pub const DEFAULT_DEV_ROOT: &str = "/home/go/apps/develop/odoo-enterprise";

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Working tree of an instance's custom addons: `<dev_root>/<instance>/custom_addons`.
pub fn local_path_for(dev_root: &str, instance_name: &str) -> String {
    Path::new(dev_root)
        .join(instance_name)
        .join("custom_addons")
        .to_string_lossy()
        .into_owned()
}

/// An existing link between an instance and a repository, as returned by
/// `GET /api/github/config/:instance`. The token is never sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryLink {
    pub instance_name: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub repo_branch: String,
    #[serde(default)]
    pub local_path: Option<String>,
}

impl RepositoryLink {
    pub fn repo(&self) -> RepoRef {
        RepoRef {
            owner: self.repo_owner.clone(),
            name: self.repo_name.clone(),
        }
    }
}

/// Body of `POST /api/github/config`.
///
/// The branch is always the instance name and the path is derived from it;
/// neither is chosen by the user.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct NewRepositoryLink {
    pub instance_name: String,
    pub github_token: String,
    pub repo_owner: String,
    pub repo_name: String,
    pub repo_branch: String,
    pub local_path: String,
}

impl NewRepositoryLink {
    pub fn new(instance_name: &str, token: &str, repo: &RepoRef, dev_root: &str) -> Self {
        Self {
            instance_name: instance_name.to_string(),
            github_token: token.to_string(),
            repo_owner: repo.owner.clone(),
            repo_name: repo.name.clone(),
            repo_branch: instance_name.to_string(),
            local_path: local_path_for(dev_root, instance_name),
        }
    }

    /// Read view of the link once the backend has stored it.
    pub fn to_link(&self) -> RepositoryLink {
        RepositoryLink {
            instance_name: self.instance_name.clone(),
            repo_owner: self.repo_owner.clone(),
            repo_name: self.repo_name.clone(),
            repo_branch: self.repo_branch.clone(),
            local_path: Some(self.local_path.clone()),
        }
    }
}

impl fmt::Debug for NewRepositoryLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewRepositoryLink")
            .field("instance_name", &self.instance_name)
            .field("github_token", &"<redacted>")
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("repo_branch", &self.repo_branch)
            .field("local_path", &self.local_path)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    pub file: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// Snapshot of uncommitted changes in a working tree. Stale as soon as any
/// commit, push or pull runs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RepositoryStatus {
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default)]
    pub changes: Vec<FileChange>,
}

/// Identity returned by a successful token verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
}
