//! Read-eval-print loop over a single orchestrator

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use toolrelay_core::{ChatMessage, FinalAnswer, Orchestrator, SharedLogger};

pub const PROMPT: &str = "You: ";
pub const FAREWELL: &str =
    "Thanks for chatting with me. Feel free to reach out any time you have a question.";

fn is_exit(line: &str) -> bool {
    matches!(line.to_lowercase().as_str(), "exit" | "quit")
}

/// Chat until `exit`/`quit` or end of input
///
/// A failed turn is reported and rolled back to just after the user's
/// message, so the conversation stays valid for the next turn.
pub async fn run<R, W>(
    orchestrator: &Orchestrator,
    conversation: &mut Vec<ChatMessage>,
    input: R,
    out: &mut W,
    logger: &SharedLogger,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit(line) {
            writeln!(out, "{}", FAREWELL)?;
            break;
        }

        conversation.push(ChatMessage::user(line));
        let keep = conversation.len();

        match orchestrator.run(conversation).await {
            Ok(outcome) => {
                if let FinalAnswer::Text(Some(text)) = outcome.final_answer {
                    write!(out, "{}", text)?;
                }
                writeln!(out)?;
            }
            Err(e) => {
                logger.error(&format!("[Repl] Turn failed: {}", e));
                writeln!(out, "Error: {}", e)?;
                conversation.truncate(keep);
            }
        }
    }

    Ok(())
}
