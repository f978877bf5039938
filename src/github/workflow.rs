//! Connect-and-operate workflow for one instance's GitHub repository.
//!
//! ```text
//!            open ──(link found)──────────────► GitActions ◄─┐
//!             │                                   │ commit  │
//!          (no link)                              │ push    │
//!             ▼                                   │ pull ───┘
//!   ┌────► Input ──submit──► Verifying ──► Configuring ──► Success
//!   │        ▲                   │              │             │
//!   │      retry                 ▼              ▼             │ complete
//!   │        └──────────────── Error ◄──────────┘             │
//!   └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `close()` from any state cancels in-flight calls and returns to `Input`
//! with every field cleared.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::repo_url::{looks_like_github_token, parse_repo_url};
use crate::api::GitHubBackend;
use crate::errors::{PanelError, WorkflowError};
use panel_common::{DEFAULT_DEV_ROOT, GitHubUser, NewRepositoryLink, RepositoryLink, RepositoryStatus};

/// Pause between `Success` and the automatic reset.
pub const DEFAULT_SUCCESS_GRACE: Duration = Duration::from_millis(2000);

/// Outcome of the last git action. One slot, so success and error can never
/// be shown together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Success(String),
    Error(String),
}

/// State of the linked-repository panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitPanel {
    pub link: RepositoryLink,
    /// Last fetched working-tree status; `None` until loaded or after a failed refresh
    pub status: Option<RepositoryStatus>,
    pub commit_message: String,
    pub busy: bool,
    pub feedback: Option<Feedback>,
}

impl GitPanel {
    fn new(link: RepositoryLink) -> Self {
        Self {
            link,
            status: None,
            commit_message: String::new(),
            busy: false,
            feedback: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectStep {
    Input,
    Verifying,
    Configuring { user: GitHubUser },
    Success { user: GitHubUser, link: RepositoryLink },
    Error { message: String },
    GitActions(GitPanel),
}

impl ConnectStep {
    pub fn name(&self) -> &'static str {
        match self {
            ConnectStep::Input => "input",
            ConnectStep::Verifying => "verifying",
            ConnectStep::Configuring { .. } => "configuring",
            ConnectStep::Success { .. } => "success",
            ConnectStep::Error { .. } => "error",
            ConnectStep::GitActions(_) => "git-actions",
        }
    }
}

/// Connect form contents. Kept across `retry()`, cleared by `close()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectForm {
    pub token: String,
    pub repo_url: String,
    /// Set when `submit()` rejected the input without calling the backend
    pub validation_error: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum GitOp {
    Commit,
    Push,
    Pull,
}

impl GitOp {
    fn name(self) -> &'static str {
        match self {
            GitOp::Commit => "commit",
            GitOp::Push => "push",
            GitOp::Pull => "pull",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            GitOp::Commit => "Commit created successfully",
            GitOp::Push => "Push completed successfully",
            GitOp::Pull => "Pull completed successfully",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            GitOp::Commit => "Failed to create commit",
            GitOp::Push => "Failed to push",
            GitOp::Pull => "Failed to pull",
        }
    }
}

type TransitionObserver = Box<dyn Fn(&ConnectStep) + Send + Sync>;

/// One open GitHub dialog for one instance.
pub struct GitHubWorkflow<B> {
    backend: B,
    dev_root: String,
    success_grace: Duration,
    instance: Option<String>,
    step: ConnectStep,
    form: ConnectForm,
    cancel: CancellationToken,
    observer: Option<TransitionObserver>,
    /// Set when any backend call answered 401
    session_expired: bool,
}

/// Resolve `fut` unless `cancel` fires first.
async fn race<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, PanelError>>,
) -> Result<T, PanelError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PanelError::Cancelled),
        result = fut => result,
    }
}

impl<B: GitHubBackend> GitHubWorkflow<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            dev_root: DEFAULT_DEV_ROOT.to_string(),
            success_grace: DEFAULT_SUCCESS_GRACE,
            instance: None,
            step: ConnectStep::Input,
            form: ConnectForm::default(),
            cancel: CancellationToken::new(),
            observer: None,
            session_expired: false,
        }
    }

    pub fn with_dev_root(mut self, dev_root: impl Into<String>) -> Self {
        self.dev_root = dev_root.into();
        self
    }

    pub fn with_success_grace(mut self, grace: Duration) -> Self {
        self.success_grace = grace;
        self
    }

    /// Called after every state change, including busy flag flips.
    pub fn on_transition(mut self, observer: impl Fn(&ConnectStep) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn step(&self) -> &ConnectStep {
        &self.step
    }

    pub fn form(&self) -> &ConnectForm {
        &self.form
    }

    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    pub fn git_panel(&self) -> Option<&GitPanel> {
        match &self.step {
            ConnectStep::GitActions(panel) => Some(panel),
            _ => None,
        }
    }

    /// Whether the backend rejected the session token during this dialog.
    /// Failures still land in `Error` or feedback; this keeps the 401 visible
    /// to callers that must discard the stored session.
    pub fn session_expired(&self) -> bool {
        self.session_expired
    }

    /// Token that aborts the calls of the current session when cancelled.
    /// Follow with `close()`; a cancelled session stays where it was.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.form.token = token.into();
    }

    pub fn set_repo_url(&mut self, repo_url: impl Into<String>) {
        self.form.repo_url = repo_url.into();
    }

    /// Update the pending commit message. Ignored outside `GitActions`.
    pub fn set_commit_message(&mut self, message: impl Into<String>) {
        if let ConnectStep::GitActions(panel) = &mut self.step {
            panel.commit_message = message.into();
        }
    }

    /// Open the dialog for `instance` and detect an existing link.
    pub async fn open(&mut self, instance: impl Into<String>) -> Result<(), WorkflowError> {
        let instance = instance.into();
        self.reset();
        self.instance = Some(instance.clone());
        info!(instance = %instance, "Opening GitHub workflow");

        match race(&self.cancel, self.backend.get_config(&instance)).await {
            Ok(Some(link)) => {
                debug!(instance = %instance, repo = %link.repo(), "Existing repository link");
                self.transition(ConnectStep::GitActions(GitPanel::new(link)));
                self.refresh_status().await
            }
            Ok(None) => {
                debug!(instance = %instance, "No repository linked");
                Ok(())
            }
            Err(PanelError::Cancelled) => Err(WorkflowError::Cancelled),
            Err(e) => {
                self.note_error(&e);
                warn!(instance = %instance, error = %e, "Could not check repository link");
                Ok(())
            }
        }
    }

    /// Verify the token, store the link and initialize the repository.
    ///
    /// Invalid input leaves the session in `Input` with
    /// [`ConnectForm::validation_error`] set and makes no call. Backend
    /// failures land in `Error`.
    pub async fn submit(&mut self) -> Result<(), WorkflowError> {
        let instance = self.require_instance()?.to_string();
        if !matches!(self.step, ConnectStep::Input) {
            return Err(WorkflowError::InvalidStep {
                action: "connect",
                step: self.step.name(),
            });
        }

        let token = self.form.token.trim().to_string();
        let repo_url = self.form.repo_url.trim().to_string();
        if token.is_empty() || repo_url.is_empty() {
            self.form.validation_error =
                Some("Token and repository URL are both required".to_string());
            return Ok(());
        }
        let Some(repo) = parse_repo_url(&repo_url) else {
            self.form.validation_error = Some(
                "Invalid repository URL. Use the format: https://github.com/owner/repository"
                    .to_string(),
            );
            return Ok(());
        };
        self.form.validation_error = None;
        if !looks_like_github_token(&token) {
            debug!("Token does not carry a known GitHub prefix");
        }

        self.transition(ConnectStep::Verifying);
        let user = match race(&self.cancel, self.backend.verify_token(&token)).await {
            Ok(user) => user,
            Err(PanelError::Cancelled) => return Err(WorkflowError::Cancelled),
            Err(e) => {
                self.note_error(&e);
                self.fail(e.user_message("Invalid GitHub token"));
                return Ok(());
            }
        };

        self.transition(ConnectStep::Configuring { user: user.clone() });
        let new_link = NewRepositoryLink::new(&instance, &token, &repo, &self.dev_root);
        match race(&self.cancel, self.backend.create_config(&new_link)).await {
            Ok(()) => {}
            Err(PanelError::Cancelled) => return Err(WorkflowError::Cancelled),
            Err(e) => {
                self.note_error(&e);
                self.fail(e.user_message("Failed to save the repository configuration"));
                return Ok(());
            }
        }
        match race(&self.cancel, self.backend.init_repo(&instance)).await {
            Ok(()) => {}
            Err(PanelError::Cancelled) => return Err(WorkflowError::Cancelled),
            Err(e) => {
                self.note_error(&e);
                self.fail(e.user_message("Failed to initialize the repository"));
                return Ok(());
            }
        }

        self.transition(ConnectStep::Success {
            user,
            link: new_link.to_link(),
        });
        Ok(())
    }

    /// Wait out the grace delay, hand the new link to `on_success` and reset.
    pub async fn complete(
        &mut self,
        on_success: impl FnOnce(&RepositoryLink),
    ) -> Result<(), WorkflowError> {
        let ConnectStep::Success { link, .. } = &self.step else {
            return Err(WorkflowError::InvalidStep {
                action: "complete",
                step: self.step.name(),
            });
        };
        let link = link.clone();

        let grace = tokio::time::sleep(self.success_grace);
        race(&self.cancel, async {
            grace.await;
            Ok::<_, PanelError>(())
        })
        .await
        .map_err(|_| WorkflowError::Cancelled)?;

        on_success(&link);
        self.reset();
        self.notify();
        Ok(())
    }

    /// Back from `Error` to the form, keeping what was typed.
    pub fn retry(&mut self) -> Result<(), WorkflowError> {
        if !matches!(self.step, ConnectStep::Error { .. }) {
            return Err(WorkflowError::InvalidStep {
                action: "retry",
                step: self.step.name(),
            });
        }
        self.form.validation_error = None;
        self.transition(ConnectStep::Input);
        Ok(())
    }

    /// Cancel outstanding calls and clear the session.
    pub fn close(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        if let Some(instance) = &self.instance {
            debug!(instance = %instance, "Closing GitHub workflow");
        }
        self.reset();
        self.notify();
    }

    /// Commit the pending message. A blank message is rejected with error
    /// feedback and no call.
    pub async fn commit(&mut self) -> Result<(), WorkflowError> {
        let panel = self.ready_panel(GitOp::Commit)?;
        if panel.commit_message.trim().is_empty() {
            panel.feedback = Some(Feedback::Error("Enter a commit message".to_string()));
            return Ok(());
        }
        self.run_git(GitOp::Commit).await
    }

    pub async fn push(&mut self) -> Result<(), WorkflowError> {
        self.ready_panel(GitOp::Push)?;
        self.run_git(GitOp::Push).await
    }

    pub async fn pull(&mut self) -> Result<(), WorkflowError> {
        self.ready_panel(GitOp::Pull)?;
        self.run_git(GitOp::Pull).await
    }

    /// Re-fetch the working-tree status into the git panel.
    pub async fn refresh_status(&mut self) -> Result<(), WorkflowError> {
        let instance = self.require_instance()?.to_string();
        if self.git_panel().is_none() {
            return Err(WorkflowError::NotLinked { instance });
        }

        let result = race(&self.cancel, self.backend.status(&instance)).await;
        let status = match result {
            Ok(status) => Some(status),
            Err(PanelError::Cancelled) => return Err(WorkflowError::Cancelled),
            Err(e) => {
                self.note_error(&e);
                warn!(instance = %instance, error = %e, "Could not load repository status");
                None
            }
        };
        if let ConnectStep::GitActions(panel) = &mut self.step {
            panel.status = status;
        }
        self.notify();
        Ok(())
    }

    fn require_instance(&self) -> Result<&str, WorkflowError> {
        self.instance.as_deref().ok_or(WorkflowError::NotOpen)
    }

    /// The git panel, provided an operation may start now.
    fn ready_panel(&mut self, op: GitOp) -> Result<&mut GitPanel, WorkflowError> {
        let instance = self.require_instance()?.to_string();
        match &mut self.step {
            ConnectStep::GitActions(panel) if panel.busy => Err(WorkflowError::Busy { instance }),
            ConnectStep::GitActions(panel) => Ok(panel),
            ConnectStep::Input => Err(WorkflowError::NotLinked { instance }),
            other => Err(WorkflowError::InvalidStep {
                action: op.name(),
                step: other.name(),
            }),
        }
    }

    async fn run_git(&mut self, op: GitOp) -> Result<(), WorkflowError> {
        let instance = self.require_instance()?.to_string();
        let message = {
            let panel = self.ready_panel(op)?;
            panel.busy = true;
            panel.feedback = None;
            panel.commit_message.clone()
        };
        self.notify();
        info!(instance = %instance, op = op.name(), "Running git operation");

        let call = async {
            match op {
                GitOp::Commit => self.backend.commit(&instance, &message).await,
                GitOp::Push => self.backend.push(&instance).await,
                GitOp::Pull => self.backend.pull(&instance).await,
            }
        };
        let result = race(&self.cancel, call).await;
        if matches!(result, Err(PanelError::Cancelled)) {
            return Err(WorkflowError::Cancelled);
        }

        let succeeded = result.is_ok();
        if let Err(e) = &result {
            self.note_error(e);
        }
        if let ConnectStep::GitActions(panel) = &mut self.step {
            panel.busy = false;
            match result {
                Ok(()) => {
                    panel.feedback = Some(Feedback::Success(op.success_message().to_string()));
                    if matches!(op, GitOp::Commit) {
                        panel.commit_message.clear();
                    }
                }
                Err(e) => {
                    warn!(instance = %instance, op = op.name(), error = %e, "Git operation failed");
                    panel.feedback = Some(Feedback::Error(e.user_message(op.failure_message())));
                }
            }
        }
        self.notify();

        if succeeded {
            self.refresh_status().await?;
        }
        Ok(())
    }

    fn note_error(&mut self, error: &PanelError) {
        if error.is_unauthorized() {
            self.session_expired = true;
        }
    }

    fn fail(&mut self, message: String) {
        warn!(
            instance = self.instance.as_deref().unwrap_or_default(),
            error = %message,
            "GitHub connection failed"
        );
        self.transition(ConnectStep::Error { message });
    }

    fn transition(&mut self, step: ConnectStep) {
        info!(
            instance = self.instance.as_deref().unwrap_or_default(),
            from = self.step.name(),
            to = step.name(),
            "Workflow transition"
        );
        self.step = step;
        self.notify();
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(&self.step);
        }
    }

    fn reset(&mut self) {
        self.step = ConnectStep::Input;
        self.form = ConnectForm::default();
        self.instance = None;
        self.session_expired = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct FakeBackend {
        link: Option<RepositoryLink>,
        fail_config_lookup: bool,
        reject_token: bool,
        init_error: Option<String>,
        commit_error: Option<String>,
        hang_verify: bool,
        push_unauthorized: bool,
        created: Mutex<Option<NewRepositoryLink>>,
        config_calls: AtomicUsize,
        verify_calls: AtomicUsize,
        create_calls: AtomicUsize,
        init_calls: AtomicUsize,
        status_calls: AtomicUsize,
        commit_calls: AtomicUsize,
        push_calls: AtomicUsize,
        pull_calls: AtomicUsize,
    }

    fn remote(message: &Option<String>) -> PanelError {
        PanelError::Remote {
            status: 200,
            message: message.clone(),
        }
    }

    #[async_trait]
    impl GitHubBackend for FakeBackend {
        async fn get_config(&self, _instance: &str) -> Result<Option<RepositoryLink>, PanelError> {
            self.config_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_config_lookup {
                return Err(PanelError::Remote {
                    status: 500,
                    message: None,
                });
            }
            Ok(self.link.clone())
        }

        async fn verify_token(&self, _token: &str) -> Result<GitHubUser, PanelError> {
            self.verify_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_verify {
                std::future::pending::<()>().await;
            }
            if self.reject_token {
                return Err(PanelError::Remote {
                    status: 400,
                    message: Some("Bad credentials".to_string()),
                });
            }
            Ok(GitHubUser {
                username: "octo".to_string(),
                name: Some("Octo Cat".to_string()),
            })
        }

        async fn create_config(&self, link: &NewRepositoryLink) -> Result<(), PanelError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            *self.created.lock().unwrap() = Some(link.clone());
            Ok(())
        }

        async fn init_repo(&self, _instance: &str) -> Result<(), PanelError> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            match &self.init_error {
                Some(_) => Err(remote(&self.init_error)),
                None => Ok(()),
            }
        }

        async fn status(&self, _instance: &str) -> Result<RepositoryStatus, PanelError> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RepositoryStatus::default())
        }

        async fn commit(&self, _instance: &str, _message: &str) -> Result<(), PanelError> {
            self.commit_calls.fetch_add(1, Ordering::SeqCst);
            match &self.commit_error {
                Some(_) => Err(remote(&self.commit_error)),
                None => Ok(()),
            }
        }

        async fn push(&self, _instance: &str) -> Result<(), PanelError> {
            self.push_calls.fetch_add(1, Ordering::SeqCst);
            if self.push_unauthorized {
                return Err(PanelError::Unauthorized);
            }
            Ok(())
        }

        async fn pull(&self, _instance: &str) -> Result<(), PanelError> {
            self.pull_calls.fetch_add(1, Ordering::SeqCst);
            Err(PanelError::Remote {
                status: 200,
                message: None,
            })
        }
    }

    fn linked() -> RepositoryLink {
        RepositoryLink {
            instance_name: "cliente1".to_string(),
            repo_owner: "acme".to_string(),
            repo_name: "erp-addons".to_string(),
            repo_branch: "cliente1".to_string(),
            local_path: None,
        }
    }

    fn workflow(backend: FakeBackend) -> GitHubWorkflow<FakeBackend> {
        GitHubWorkflow::new(backend).with_success_grace(Duration::from_millis(10))
    }

    async fn opened_linked(backend: FakeBackend) -> GitHubWorkflow<FakeBackend> {
        let mut wf = workflow(FakeBackend {
            link: Some(linked()),
            ..backend
        });
        wf.open("cliente1").await.unwrap();
        wf
    }

    fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    // ── open ─────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_open_without_link_stays_in_input() {
        let mut wf = workflow(FakeBackend::default());
        wf.open("cliente1").await.unwrap();
        assert_eq!(wf.step(), &ConnectStep::Input);
        assert_eq!(wf.instance(), Some("cliente1"));
        assert_eq!(count(&wf.backend().status_calls), 0);
    }

    #[tokio::test]
    async fn test_open_with_link_loads_status_once() {
        let wf = opened_linked(FakeBackend::default()).await;
        let panel = wf.git_panel().unwrap();
        assert_eq!(panel.link, linked());
        assert_eq!(panel.status, Some(RepositoryStatus::default()));
        assert_eq!(count(&wf.backend().status_calls), 1);
    }

    #[tokio::test]
    async fn test_open_lookup_failure_falls_back_to_input() {
        let mut wf = workflow(FakeBackend {
            fail_config_lookup: true,
            ..Default::default()
        });
        wf.open("cliente1").await.unwrap();
        assert_eq!(wf.step(), &ConnectStep::Input);
    }

    // ── submit ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_submit_before_open() {
        let mut wf = workflow(FakeBackend::default());
        assert_eq!(wf.submit().await, Err(WorkflowError::NotOpen));
    }

    #[tokio::test]
    async fn test_blank_fields_rejected_without_call() {
        let mut wf = workflow(FakeBackend::default());
        wf.open("cliente1").await.unwrap();
        wf.set_token("   ");
        wf.set_repo_url("https://github.com/acme/erp-addons");
        wf.submit().await.unwrap();

        assert_eq!(wf.step(), &ConnectStep::Input);
        assert!(wf.form().validation_error.is_some());
        assert_eq!(count(&wf.backend().verify_calls), 0);
    }

    #[tokio::test]
    async fn test_invalid_url_never_verifies() {
        let mut wf = workflow(FakeBackend::default());
        wf.open("cliente1").await.unwrap();
        wf.set_token("ghp_valid");
        wf.set_repo_url("https://gitlab.com/acme/erp-addons");
        wf.submit().await.unwrap();

        assert_eq!(wf.step(), &ConnectStep::Input);
        assert!(
            wf.form()
                .validation_error
                .as_deref()
                .unwrap()
                .contains("Invalid repository URL")
        );
        assert_eq!(count(&wf.backend().verify_calls), 0);
    }

    #[tokio::test]
    async fn test_full_connect_then_reset_after_grace() {
        let transitions = Arc::new(Mutex::new(Vec::new()));
        let seen = transitions.clone();
        let mut wf = workflow(FakeBackend::default())
            .on_transition(move |step| seen.lock().unwrap().push(step.name()));

        wf.open("cliente1").await.unwrap();
        wf.set_token("  ghp_valid ");
        wf.set_repo_url("https://github.com/acme/erp-addons");
        wf.submit().await.unwrap();

        let created = wf.backend().created.lock().unwrap().clone().unwrap();
        assert_eq!(created.github_token, "ghp_valid");
        assert_eq!(created.repo_owner, "acme");
        assert_eq!(created.repo_name, "erp-addons");
        assert_eq!(created.repo_branch, "cliente1");
        assert_eq!(
            created.local_path,
            "/home/go/apps/develop/odoo-enterprise/cliente1/custom_addons"
        );
        assert_eq!(count(&wf.backend().init_calls), 1);

        match wf.step() {
            ConnectStep::Success { user, link } => {
                assert_eq!(user.username, "octo");
                assert_eq!(link.repo_branch, "cliente1");
            }
            other => panic!("Expected Success, got {other:?}"),
        }

        let mut completed = None;
        wf.complete(|link| completed = Some(link.repo_name.clone()))
            .await
            .unwrap();
        assert_eq!(completed.as_deref(), Some("erp-addons"));
        assert_eq!(wf.step(), &ConnectStep::Input);
        assert_eq!(wf.form(), &ConnectForm::default());
        assert_eq!(wf.instance(), None);

        let seen = transitions.lock().unwrap().clone();
        assert_eq!(seen, vec!["verifying", "configuring", "success", "input"]);
    }

    #[tokio::test]
    async fn test_custom_dev_root_reaches_payload() {
        let mut wf = workflow(FakeBackend::default()).with_dev_root("/srv/dev");
        wf.open("cliente2").await.unwrap();
        wf.set_token("ghp_valid");
        wf.set_repo_url("github.com/acme/erp");
        wf.submit().await.unwrap();
        let created = wf.backend().created.lock().unwrap().clone().unwrap();
        assert_eq!(created.local_path, "/srv/dev/cliente2/custom_addons");
    }

    #[tokio::test]
    async fn test_rejected_token_then_retry_keeps_fields() {
        let mut wf = workflow(FakeBackend {
            reject_token: true,
            ..Default::default()
        });
        wf.open("cliente1").await.unwrap();
        wf.set_token("ghp_bad");
        wf.set_repo_url("https://github.com/acme/erp-addons");
        wf.submit().await.unwrap();

        assert_eq!(
            wf.step(),
            &ConnectStep::Error {
                message: "Bad credentials".to_string()
            }
        );
        assert_eq!(count(&wf.backend().create_calls), 0);

        wf.retry().unwrap();
        assert_eq!(wf.step(), &ConnectStep::Input);
        assert_eq!(wf.form().token, "ghp_bad");
        assert_eq!(wf.form().repo_url, "https://github.com/acme/erp-addons");
    }

    #[tokio::test]
    async fn test_init_failure_prefers_backend_message() {
        let mut wf = workflow(FakeBackend {
            init_error: Some("Branch cliente1 already exists".to_string()),
            ..Default::default()
        });
        wf.open("cliente1").await.unwrap();
        wf.set_token("ghp_valid");
        wf.set_repo_url("https://github.com/acme/erp-addons");
        wf.submit().await.unwrap();
        assert_eq!(
            wf.step(),
            &ConnectStep::Error {
                message: "Branch cliente1 already exists".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_retry_outside_error_is_invalid() {
        let mut wf = workflow(FakeBackend::default());
        assert_eq!(
            wf.retry(),
            Err(WorkflowError::InvalidStep {
                action: "retry",
                step: "input"
            })
        );
    }

    #[tokio::test]
    async fn test_close_cancels_in_flight_verify() {
        let mut wf = workflow(FakeBackend {
            hang_verify: true,
            ..Default::default()
        });
        wf.open("cliente1").await.unwrap();
        wf.set_token("ghp_valid");
        wf.set_repo_url("https://github.com/acme/erp-addons");

        let handle = wf.cancel_handle();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });
        assert_eq!(wf.submit().await, Err(WorkflowError::Cancelled));
        assert_eq!(wf.step(), &ConnectStep::Verifying);
        assert_eq!(count(&wf.backend().create_calls), 0);

        wf.close();
        assert_eq!(wf.step(), &ConnectStep::Input);
        assert_eq!(wf.form(), &ConnectForm::default());
        assert!(!wf.cancel_handle().is_cancelled());
    }

    // ── git actions ──────────────────────────────────────────────────

    #[tokio::test]
    async fn test_commit_success_clears_message_and_refreshes_once() {
        let mut wf = opened_linked(FakeBackend::default()).await;
        wf.set_commit_message("Add sale report");
        wf.commit().await.unwrap();

        let panel = wf.git_panel().unwrap();
        assert_eq!(panel.commit_message, "");
        assert!(!panel.busy);
        assert_eq!(
            panel.feedback,
            Some(Feedback::Success("Commit created successfully".to_string()))
        );
        assert_eq!(count(&wf.backend().commit_calls), 1);
        // one on open, one after the commit
        assert_eq!(count(&wf.backend().status_calls), 2);
    }

    #[tokio::test]
    async fn test_commit_failure_keeps_message_and_replaces_success() {
        let mut wf = opened_linked(FakeBackend {
            commit_error: Some("nothing to commit".to_string()),
            ..Default::default()
        })
        .await;
        wf.push().await.unwrap();
        assert!(matches!(
            wf.git_panel().unwrap().feedback,
            Some(Feedback::Success(_))
        ));
        let status_before = count(&wf.backend().status_calls);

        wf.set_commit_message("WIP");
        wf.commit().await.unwrap();

        let panel = wf.git_panel().unwrap();
        assert_eq!(panel.commit_message, "WIP");
        assert_eq!(
            panel.feedback,
            Some(Feedback::Error("nothing to commit".to_string()))
        );
        assert_eq!(count(&wf.backend().status_calls), status_before);
    }

    #[tokio::test]
    async fn test_blank_commit_message_makes_no_call() {
        let mut wf = opened_linked(FakeBackend::default()).await;
        wf.set_commit_message("   ");
        wf.commit().await.unwrap();
        assert_eq!(count(&wf.backend().commit_calls), 0);
        assert!(matches!(
            wf.git_panel().unwrap().feedback,
            Some(Feedback::Error(_))
        ));
    }

    #[tokio::test]
    async fn test_pull_failure_uses_fallback_message() {
        let mut wf = opened_linked(FakeBackend::default()).await;
        wf.pull().await.unwrap();
        assert_eq!(
            wf.git_panel().unwrap().feedback,
            Some(Feedback::Error("Failed to pull".to_string()))
        );
        assert_eq!(count(&wf.backend().pull_calls), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_push_marks_session_expired() {
        let mut wf = opened_linked(FakeBackend {
            push_unauthorized: true,
            ..Default::default()
        })
        .await;
        assert!(!wf.session_expired());

        wf.push().await.unwrap();
        assert!(wf.session_expired());
        assert_eq!(
            wf.git_panel().unwrap().feedback,
            Some(Feedback::Error("Failed to push".to_string()))
        );
        assert_eq!(count(&wf.backend().status_calls), 1);

        wf.close();
        assert!(!wf.session_expired());
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_session() {
        let mut wf = opened_linked(FakeBackend::default()).await;
        wf.pull().await.unwrap();
        assert!(!wf.session_expired());
    }

    #[tokio::test]
    async fn test_git_action_without_link() {
        let mut wf = workflow(FakeBackend::default());
        wf.open("cliente1").await.unwrap();
        assert_eq!(
            wf.push().await,
            Err(WorkflowError::NotLinked {
                instance: "cliente1".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_git_action_while_busy_is_refused() {
        let mut wf = opened_linked(FakeBackend::default()).await;
        if let ConnectStep::GitActions(panel) = &mut wf.step {
            panel.busy = true;
        }
        assert_eq!(
            wf.push().await,
            Err(WorkflowError::Busy {
                instance: "cliente1".to_string()
            })
        );
        assert_eq!(count(&wf.backend().push_calls), 0);
    }
}
