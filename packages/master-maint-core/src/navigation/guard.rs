use crate::buffer::EditBufferStore;
use crate::config::PromptConfig;
use crate::error::{EditorError, Result};
use crate::record::TabId;

use super::confirmation::{ConfirmResponse, Confirmation};

/// State of a single tab switch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchState {
    /// Waiting on the user's answer
    Pending,
    /// Active tab changed
    Switched,
    /// Active tab left as it was
    Aborted,
}

/// Terminal result of a switch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    Aborted,
}

/// One request to move from one tab to another.
///
/// Starts either settled (nothing to lose) or [`SwitchState::Pending`];
/// a pending attempt is resolved exactly once by [`SwitchAttempt::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchAttempt {
    from: TabId,
    to: TabId,
    state: SwitchState,
}

impl SwitchAttempt {
    pub fn from(&self) -> &TabId {
        &self.from
    }

    pub fn to(&self) -> &TabId {
        &self.to
    }

    pub fn state(&self) -> SwitchState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == SwitchState::Pending
    }

    /// Returns the outcome if the attempt is already settled.
    pub fn outcome(&self) -> Option<SwitchOutcome> {
        match self.state {
            SwitchState::Pending => None,
            SwitchState::Switched => Some(SwitchOutcome::Switched),
            SwitchState::Aborted => Some(SwitchOutcome::Aborted),
        }
    }

    /// Turns an attempt that settled as switched back into a pending one.
    pub(crate) fn reopen(mut self) -> Self {
        if self.state == SwitchState::Switched {
            self.state = SwitchState::Pending;
        }
        self
    }

    /// Settles a pending attempt with the user's answer.
    ///
    /// An already settled attempt keeps its outcome.
    pub fn resolve(mut self, response: ConfirmResponse) -> SwitchOutcome {
        if self.state == SwitchState::Pending {
            self.state = if response.is_confirmed() {
                SwitchState::Switched
            } else {
                SwitchState::Aborted
            };
        }
        match self.state {
            SwitchState::Switched => SwitchOutcome::Switched,
            _ => SwitchOutcome::Aborted,
        }
    }
}

/// Gate in front of tab switches.
///
/// Leaving a clean tab is always allowed. Leaving a dirty tab asks the
/// confirmation collaborator once; the dirty tab's buffer is kept either way.
#[derive(Debug, Clone, Default)]
pub struct NavigationGuard {
    prompt: PromptConfig,
}

impl NavigationGuard {
    pub fn new(prompt: PromptConfig) -> Self {
        Self { prompt }
    }

    pub fn prompt(&self) -> &PromptConfig {
        &self.prompt
    }

    /// Starts a switch attempt from `from` to `to`.
    ///
    /// # Returns
    /// `Result<SwitchAttempt, EditorError>`, settled as `Switched` when there
    /// is nothing unsaved to leave behind, otherwise `Pending`.
    pub fn begin(&self, store: &EditBufferStore, from: &TabId, to: &TabId) -> Result<SwitchAttempt> {
        if !store.contains_tab(to.as_str()) {
            return Err(EditorError::UnknownTab { tab: to.clone() });
        }

        let state = if from == to || !store.is_dirty(from)? {
            SwitchState::Switched
        } else {
            SwitchState::Pending
        };

        Ok(SwitchAttempt {
            from: from.clone(),
            to: to.clone(),
            state,
        })
    }

    /// Runs a full switch attempt, asking `confirmation` if needed.
    ///
    /// Makes at most one call to the collaborator.
    pub async fn request_switch(
        &self,
        store: &EditBufferStore,
        from: &TabId,
        to: &TabId,
        confirmation: &dyn Confirmation,
    ) -> Result<SwitchOutcome> {
        let attempt = self.begin(store, from, to)?;
        if let Some(outcome) = attempt.outcome() {
            return Ok(outcome);
        }

        tracing::debug!("Tab '{}' has unsaved edits, confirming switch to '{}'", from, to);
        let response = confirmation
            .ask(&self.prompt.title, &self.prompt.message)
            .await;
        Ok(attempt.resolve(response))
    }
}
