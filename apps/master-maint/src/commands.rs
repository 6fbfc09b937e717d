//! Shell command parsing.

use master_maint_core::{RecordField, RecordId, TabId};
use thiserror::Error;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line
    Empty,
    /// List tabs with their state
    Tabs,
    /// Switch the active tab
    Switch(TabId),
    /// Show the active tab's records
    List,
    /// Add a placeholder record
    Add,
    /// Replace one field of a record
    Set {
        id: RecordId,
        field: RecordField,
        value: String,
    },
    /// Soft-delete a record
    Delete(RecordId),
    /// Undo a soft delete
    Restore(RecordId),
    /// Commit the active tab
    Save,
    /// Show the active tab's flags
    Status,
    Help,
    Quit,
}

/// Errors raised while parsing a shell line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("不明なコマンド '{0}'（help で一覧を表示）")]
    Unknown(String),

    #[error("{command}: {argument} を指定してください")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("不正な ID '{0}'")]
    InvalidId(String),

    #[error("不正な項目 '{0}'（name, age, gender, address）")]
    InvalidField(String),
}

pub const HELP: &str = "\
コマンド:
  tabs                      タブ一覧
  switch <tab>              タブを切り替える
  list                      レコード一覧
  add                       レコードを追加する
  set <id> <field> <value>  項目を変更する (name, age, gender, address)
  delete <id>               削除マークを付ける
  restore <id>              削除マークを外す
  save                      表示中のタブを保存する
  status                    タブの状態
  help                      このヘルプ
  quit                      終了する";

/// Splits off the first whitespace-delimited word.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(end) => (&input[..end], input[end..].trim_start()),
        None => (input, ""),
    }
}

fn parse_id(command: &'static str, raw: &str) -> Result<RecordId, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "<id>",
        });
    }
    raw.parse()
        .map_err(|_| CommandError::InvalidId(raw.to_string()))
}

/// Parses one shell line.
///
/// The value of `set` is the rest of the line after the field name and may
/// contain spaces or be empty.
pub fn parse(line: &str) -> Result<Command, CommandError> {
    let (word, rest) = split_word(line.trim_end());
    let command = match word.to_ascii_lowercase().as_str() {
        "" => Command::Empty,
        "tabs" => Command::Tabs,
        "switch" | "sw" => {
            let (tab, _) = split_word(rest);
            if tab.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "switch",
                    argument: "<tab>",
                });
            }
            Command::Switch(TabId::from(tab))
        }
        "list" | "ls" => Command::List,
        "add" => Command::Add,
        "set" => {
            let (id, rest) = split_word(rest);
            let id = parse_id("set", id)?;
            let (field, value) = split_word(rest);
            if field.is_empty() {
                return Err(CommandError::MissingArgument {
                    command: "set",
                    argument: "<field>",
                });
            }
            let field = field
                .parse()
                .map_err(|_| CommandError::InvalidField(field.to_string()))?;
            Command::Set {
                id,
                field,
                value: value.to_string(),
            }
        }
        "delete" | "del" | "rm" => Command::Delete(parse_id("delete", split_word(rest).0)?),
        "restore" => Command::Restore(parse_id("restore", split_word(rest).0)?),
        "save" => Command::Save,
        "status" => Command::Status,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(command)
}
