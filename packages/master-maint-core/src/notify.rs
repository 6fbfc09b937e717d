//! User-facing notices.

use std::fmt;

use crate::error::EditorError;
use crate::record::{RecordId, TabId};

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Initial fetch failed; tabs stay empty
    LoadFailed { error: EditorError },
    /// A placeholder record was added
    RecordAdded { tab: TabId, id: RecordId },
    /// A record's delete mark was flipped
    DeleteToggled {
        tab: TabId,
        id: RecordId,
        deleted: bool,
    },
    /// A tab's buffer was committed
    Saved { tab: TabId, heading: String },
    /// Committing a tab's buffer failed; edits are kept
    SaveFailed { tab: TabId, error: EditorError },
}

impl Notice {
    /// Returns `true` for notices that report a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::LoadFailed { .. } | Notice::SaveFailed { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LoadFailed { .. } => write!(f, "データの取得に失敗しました"),
            Notice::RecordAdded { .. } => {
                write!(f, "新しいレコードを追加しました（保存するまで反映されません）")
            }
            Notice::DeleteToggled { id, deleted, .. } => {
                if *deleted {
                    write!(f, "ID: {} を削除しました（保存するまで反映されません）", id)
                } else {
                    write!(f, "ID: {} の削除を解除しました（保存するまで反映されません）", id)
                }
            }
            Notice::Saved { heading, .. } => write!(f, "{} のデータを保存しました", heading),
            Notice::SaveFailed { .. } => write!(f, "データの保存に失敗しました"),
        }
    }
}

/// Sink for user-facing notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Notifier that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) {
        match notice {
            Notice::LoadFailed { error } => tracing::error!("{} ({})", notice, error),
            Notice::SaveFailed { tab, error } => {
                tracing::error!("{} [{}] ({})", notice, tab, error)
            }
            _ => tracing::info!("{}", notice),
        }
    }
}
