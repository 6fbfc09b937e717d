//! Console collaborators: line input, y/n confirmation, and notice output.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use master_maint_core::{ConfirmResponse, Confirmation, Notice, Notifier};

/// Reads one line from stdin without blocking the runtime.
///
/// Returns `None` at end of input.
pub async fn read_line() -> io::Result<Option<String>> {
    tokio::task::spawn_blocking(|| -> io::Result<Option<String>> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        Ok((read > 0).then_some(line))
    })
    .await
    .map_err(io::Error::other)?
}

/// Interprets a typed answer; anything but an explicit yes cancels.
pub fn parse_answer(answer: &str) -> ConfirmResponse {
    let answer = answer.trim().to_lowercase();
    ConfirmResponse::from(matches!(answer.as_str(), "y" | "yes" | "はい"))
}

/// Asks on stdout and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct StdinConfirmation;

#[async_trait]
impl Confirmation for StdinConfirmation {
    async fn ask(&self, title: &str, message: &str) -> ConfirmResponse {
        print!("[{}] {} [y/N] ", title, message);
        if let Err(e) = io::stdout().flush() {
            tracing::warn!("Failed to flush prompt: {}", e);
        }
        match read_line().await {
            Ok(Some(answer)) => parse_answer(&answer),
            Ok(None) => ConfirmResponse::Cancelled,
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                ConfirmResponse::Cancelled
            }
        }
    }
}

/// Prints notices, failures to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        if notice.is_error() {
            eprintln!("! {}", notice);
        } else {
            println!("* {}", notice);
        }
    }
}
