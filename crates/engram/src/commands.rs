// SPDX-FileCopyrightText: 2026 Engram Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slash command parsing for the interactive shell.
//!
//! Any line starting with `/` is a command; everything else goes to the
//! orchestrator as a prompt. Unknown commands are reported rather than
//! sent to the model, so a typo never leaks into the conversation.

/// Entries kept live by `/memory-force`.
pub const FORCE_ARCHIVE_KEEP_LAST: usize = 5;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand<'a> {
    Help,
    Quit,
    /// Clear the live conversation, keeping the system prompt.
    ClearConversation,
    /// Replace the system prompt for this session.
    SetSystem(&'a str),
    MemoryStats,
    /// Deleting the archive requires an explicit `confirm` argument.
    MemoryClear { confirmed: bool },
    MemorySearch(&'a str),
    /// Archive everything except the most recent entries now.
    MemoryForce,
    /// Show what recall would inject for a query, without running a turn.
    MemoryPreview(&'a str),
    Unknown(&'a str),
}

/// Parses a line. Returns `None` for plain prompts.
pub fn parse(line: &str) -> Option<ShellCommand<'_>> {
    let line = line.trim();
    if !line.starts_with('/') {
        return None;
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    Some(match command {
        "/help" => ShellCommand::Help,
        "/quit" | "/exit" => ShellCommand::Quit,
        "/clear" => ShellCommand::ClearConversation,
        "/system" => ShellCommand::SetSystem(rest),
        "/memory-stats" => ShellCommand::MemoryStats,
        "/memory-clear" => ShellCommand::MemoryClear {
            confirmed: rest == "confirm",
        },
        "/memory-search" => ShellCommand::MemorySearch(rest),
        "/memory-force" => ShellCommand::MemoryForce,
        "/memory-preview" => ShellCommand::MemoryPreview(rest),
        other => ShellCommand::Unknown(other),
    })
}

pub const HELP_TEXT: &str = "\
/help                    show this help
/quit                    exit the shell
/clear                   clear the conversation (archive untouched)
/system <prompt>         replace the system prompt for this session
/memory-stats            archive statistics
/memory-search <query>   search archived memories
/memory-preview <query>  show what recall would inject for a query
/memory-force            archive all but the last 5 entries now
/memory-clear confirm    delete all archived memories";
