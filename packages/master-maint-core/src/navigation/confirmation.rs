use async_trait::async_trait;

/// Answer to a confirmation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmResponse {
    Confirmed,
    Cancelled,
}

impl ConfirmResponse {
    pub fn is_confirmed(self) -> bool {
        matches!(self, ConfirmResponse::Confirmed)
    }
}

impl From<bool> for ConfirmResponse {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            ConfirmResponse::Confirmed
        } else {
            ConfirmResponse::Cancelled
        }
    }
}

/// Dialog collaborator asked before discarding the user's context.
///
/// Each call must resolve exactly once. Dismissing the dialog counts as
/// [`ConfirmResponse::Cancelled`].
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn ask(&self, title: &str, message: &str) -> ConfirmResponse;
}
