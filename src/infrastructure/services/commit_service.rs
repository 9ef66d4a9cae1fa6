//! Commit service - version creation and commit-state resolution

use std::sync::Arc;

use tracing::debug;

use crate::domain::{
    compute_commit_hash, Commit, CommitId, CommitRepository, CommitState, DomainError, Prompt,
    PromptId, PromptRepository,
};

/// Commit service: records new versions and keeps the cached commit flag
/// consistent with the productive commit's fingerprint.
#[derive(Debug)]
pub struct CommitService {
    prompts: Arc<dyn PromptRepository>,
    commits: Arc<dyn CommitRepository>,
}

impl CommitService {
    pub fn new(prompts: Arc<dyn PromptRepository>, commits: Arc<dyn CommitRepository>) -> Self {
        Self { prompts, commits }
    }

    /// Record a new commit for a prompt and make it productive.
    ///
    /// The fingerprint is salted with the number of commits recorded so
    /// far, so re-committing identical content still produces a new hash.
    pub async fn commit(
        &self,
        prompt_id: &PromptId,
        author: impl Into<String>,
        message: Option<String>,
    ) -> Result<Commit, DomainError> {
        let prompt = self
            .prompts
            .get(prompt_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Prompt '{}' not found", prompt_id)))?;

        let generation = self.commits.commit_count(prompt_id).await?;
        let snapshot = prompt.snapshot();
        let commit_hash = compute_commit_hash(&snapshot, generation);

        let mut commit = Commit::new(
            CommitId::generate(),
            prompt.id().clone(),
            prompt.branch_id(),
            commit_hash,
            snapshot.value,
            snapshot.config,
            prompt.model_id(),
            author,
        );

        if let Some(message) = message {
            commit = commit.with_message(message);
        }

        let commit = self.commits.create(commit).await?;

        if !prompt.is_committed() {
            self.prompts.set_commit_flag(prompt_id, true).await?;
        }

        debug!(prompt_id = %prompt_id, commit_id = %commit.id(), "recorded commit");
        Ok(commit)
    }

    /// Resolve whether a prompt's current content matches its productive
    /// commit, persisting the flag only when it changed.
    ///
    /// Note that editing content back to the productive commit's exact
    /// value and configuration recomputes the same fingerprint, so the
    /// prompt reads as committed again without a new commit.
    pub async fn resolve_state(&self, prompt: &Prompt) -> Result<CommitState, DomainError> {
        let state = self.compute_state(prompt).await?;

        if state.is_committed() != prompt.is_committed() {
            self.prompts
                .set_commit_flag(prompt.id(), state.is_committed())
                .await?;
        }

        Ok(state)
    }

    /// All commits for a prompt, oldest first
    pub async fn history(&self, prompt_id: &PromptId) -> Result<Vec<Commit>, DomainError> {
        self.commits.list_by_prompt(prompt_id).await
    }

    async fn compute_state(&self, prompt: &Prompt) -> Result<CommitState, DomainError> {
        let Some(productive) = self.commits.productive_commit(prompt.id()).await? else {
            return Ok(CommitState::Dirty);
        };

        // The productive commit was hashed with the count of commits that
        // preceded it.
        let count = self.commits.commit_count(prompt.id()).await?;
        let generation = count.saturating_sub(1);
        let current_hash = compute_commit_hash(&prompt.snapshot(), generation);

        if current_hash == productive.commit_hash() {
            Ok(CommitState::Committed)
        } else {
            Ok(CommitState::Dirty)
        }
    }
}
