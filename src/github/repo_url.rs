use std::sync::LazyLock;

use regex::Regex;

use panel_common::RepoRef;

// Unanchored: the first `github.com/<owner>/<repo>` anywhere in the input wins.
static REPO_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"github\.com/([^/]+)/([^/.]+)").unwrap());

/// Known GitHub token prefixes.
/// See: https://github.blog/2021-04-05-behind-githubs-new-authentication-token-formats/
const GITHUB_TOKEN_PREFIXES: &[&str] = &[
    "ghp_",        // Personal access tokens (classic)
    "github_pat_", // Fine-grained personal access tokens
    "gho_",        // OAuth access tokens
    "ghu_",        // GitHub App user-to-server tokens
    "ghs_",        // GitHub App server-to-server tokens
    "ghr_",        // GitHub App refresh tokens
];

/// Whether a string looks like a GitHub token based on its prefix.
///
/// Format check only. The backend's verify endpoint is the authority; this
/// is used to log a hint before the round trip.
pub fn looks_like_github_token(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    GITHUB_TOKEN_PREFIXES
        .iter()
        .any(|prefix| token.starts_with(prefix))
}

/// Extract owner and repository name from a GitHub URL.
///
/// Accepts anything containing `github.com/<owner>/<repo>`:
/// - `https://github.com/owner/repo`
/// - `github.com/owner/repo` (no scheme)
/// - `https://github.com/owner/repo.git`
/// - `https://github.com/owner/repo/tree/main`
///
/// The repository name stops at the first `/` or `.`.
pub fn parse_repo_url(url: &str) -> Option<RepoRef> {
    let caps = REPO_URL_REGEX.captures(url)?;
    Some(RepoRef {
        owner: caps[1].to_string(),
        name: caps[2].to_string(),
    })
}
