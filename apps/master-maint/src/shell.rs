//! Executes parsed commands against an editing session.

use std::io::Write;
use std::sync::Arc;

use master_maint_core::{Confirmation, EditorError, Record, SwitchOutcome, TabSessionController};

use crate::commands::{Command, HELP};

/// Whether the shell keeps reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over a [`TabSessionController`].
pub struct Shell<W: Write> {
    session: TabSessionController,
    confirmation: Arc<dyn Confirmation>,
    out: W,
}

impl<W: Write> Shell<W> {
    /// Creates a shell writing its output to `out`.
    ///
    /// `confirmation` is asked before quitting with unsaved edits.
    pub fn new(
        session: TabSessionController,
        confirmation: Arc<dyn Confirmation>,
        out: W,
    ) -> Self {
        Self {
            session,
            confirmation,
            out,
        }
    }

    pub fn session(&self) -> &TabSessionController {
        &self.session
    }

    /// Prompt text showing the active tab and its dirty mark.
    pub fn prompt(&self) -> String {
        let dirty = self.session.is_dirty().unwrap_or(false);
        format!("[{}{}]> ", self.session.active_tab(), if dirty { "*" } else { "" })
    }

    /// Runs one command.
    ///
    /// Editor errors are reported to the output and do not stop the shell;
    /// only output failures are returned.
    pub async fn execute(&mut self, command: Command) -> anyhow::Result<Flow> {
        match self.dispatch(command).await {
            Ok(flow) => Ok(flow),
            Err(ShellError::Editor(e)) => {
                tracing::debug!("Command failed: {}", e);
                writeln!(self.out, "エラー: {}", e)?;
                Ok(Flow::Continue)
            }
            Err(ShellError::Output(e)) => Err(e.into()),
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<Flow, ShellError> {
        match command {
            Command::Empty => {}
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Tabs => self.print_tabs()?,
            Command::Switch(tab) => match self.session.request_switch(&tab).await? {
                SwitchOutcome::Switched => self.print_records()?,
                SwitchOutcome::Aborted => writeln!(self.out, "移動を中止しました")?,
            },
            Command::List => self.print_records()?,
            Command::Add => {
                self.session.add_record()?;
                self.print_records()?;
            }
            Command::Set { id, field, value } => {
                self.session.mutate(id, field, &value)?;
                let record = self.session.store().record(self.session.active_tab(), id)?;
                writeln!(self.out, "{}", format_row(record))?;
            }
            Command::Delete(id) => self.session.mark_deleted(id)?,
            Command::Restore(id) => self.session.restore(id)?,
            Command::Save => {
                if self.session.is_saving()? {
                    writeln!(self.out, "保存中です")?;
                } else if !self.session.is_dirty()? {
                    writeln!(self.out, "変更はありません")?;
                } else {
                    writeln!(self.out, "保存中...")?;
                    self.session.commit().await?;
                    writeln!(self.out, "保存しました")?;
                }
            }
            Command::Status => self.print_status()?,
            Command::Quit => return self.quit().await,
        }
        Ok(Flow::Continue)
    }

    async fn quit(&mut self) -> Result<Flow, ShellError> {
        let dirty = self.session.store().dirty_tabs();
        if dirty.is_empty() {
            return Ok(Flow::Quit);
        }

        let names: Vec<&str> = dirty.iter().map(|tab| tab.as_str()).collect();
        let message = format!(
            "未保存の変更があります（{}）。保存せずに終了しますか？",
            names.join(", ")
        );
        let title = &self.session.config().unsaved_prompt.title;
        if self.confirmation.ask(title, &message).await.is_confirmed() {
            tracing::info!("Quit with unsaved tabs: {}", names.join(", "));
            Ok(Flow::Quit)
        } else {
            Ok(Flow::Continue)
        }
    }

    fn print_tabs(&mut self) -> Result<(), ShellError> {
        let store = self.session.store();
        for tab in self.session.tabs() {
            let marker = if &tab.id == self.session.active_tab() { "*" } else { " " };
            let mut flags = Vec::new();
            if !store.is_loaded(&tab.id)? {
                flags.push("未読込");
            }
            if store.is_dirty(&tab.id)? {
                flags.push("未保存");
            }
            if store.is_saving(&tab.id)? {
                flags.push("保存中");
            }
            writeln!(
                self.out,
                "{} {:<8} {} {}",
                marker,
                tab.id,
                tab.heading(),
                flags.join(" ")
            )?;
        }
        Ok(())
    }

    fn print_records(&mut self) -> Result<(), ShellError> {
        let heading = self.session.active()?.heading();
        writeln!(self.out, "== {} ==", heading)?;
        writeln!(
            self.out,
            "{:>5}  {:<16} {:>4}  {:<6} {:<20} 状態",
            "ID", "名前", "年齢", "性別", "住所"
        )?;
        let mut count = 0;
        for record in self.session.visible_records()? {
            writeln!(self.out, "{}", format_row(record))?;
            count += 1;
        }
        if count == 0 {
            writeln!(self.out, "（レコードなし）")?;
        }
        Ok(())
    }

    fn print_status(&mut self) -> Result<(), ShellError> {
        let tab = self.session.active_tab().clone();
        let store = self.session.store();
        writeln!(
            self.out,
            "{}: 未保存={} 保存中={} 次のID={} 保存可能={}",
            tab,
            yes_no(store.is_dirty(&tab)?),
            yes_no(store.is_saving(&tab)?),
            store
                .next_id(&tab)?
                .map_or_else(|| "-".to_string(), |id| id.to_string()),
            yes_no(self.session.can_save()?)
        )?;
        Ok(())
    }
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "はい"
    } else {
        "いいえ"
    }
}

fn format_row(record: &Record) -> String {
    let state = match (record.is_new, record.is_deleted) {
        (_, true) => "削除予定",
        (true, false) => "新規",
        (false, false) => "",
    };
    format!(
        "{:>5}  {:<16} {:>4}  {:<6} {:<20} {}",
        record.id, record.name, record.age, record.gender, record.address, state
    )
}

/// Command failures, split by whether the shell can carry on.
#[derive(Debug, thiserror::Error)]
enum ShellError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Output(#[from] std::io::Error),
}
