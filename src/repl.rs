use crate::directory::RenameOutcome;
use crate::render::{ render_directory, render_shell };
use crate::shell::ChatShell;
use crate::thread::{ FollowUpAnswer, SendOutcome };
use log::{ error, info };
use std::io;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };

const HELP: &str =
    "Commands:
  /list               show conversations
  /open <n|id>        open a conversation
  /new                start a new chat
  /edit <n|id>        rename a conversation (next line is the title, /cancel to abort)
  /rename <n|id> <t>  rename in one step
  /reset              clear the current thread locally
  /yes, /no           answer the follow-up question
  /sidebar            toggle the conversation list
  /logout             clear the stored session
  /quit               exit
Anything else is sent as a message; start it with // to send a leading /.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(String),
    New,
    Edit(String),
    Rename {
        target: String,
        title: String,
    },
    Cancel,
    Reset,
    Answer(FollowUpAnswer),
    Sidebar,
    Logout,
    Help,
    Quit,
    Text(String),
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Command::Text(line.to_string());
    }
    if trimmed.starts_with("//") {
        return Command::Text(trimmed[1..].to_string());
    }
    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };
    match (name, rest) {
        ("/list", _) => Command::List,
        ("/open", target) if !target.is_empty() => Command::Open(target.to_string()),
        ("/new", _) => Command::New,
        ("/edit", target) if !target.is_empty() => Command::Edit(target.to_string()),
        ("/rename", args) if !args.is_empty() => {
            let (target, title) = args.split_once(char::is_whitespace).unwrap_or((args, ""));
            Command::Rename {
                target: target.to_string(),
                title: title.to_string(),
            }
        }
        ("/cancel", _) => Command::Cancel,
        ("/reset", _) => Command::Reset,
        ("/yes", _) => Command::Answer(FollowUpAnswer::Yes),
        ("/no", _) => Command::Answer(FollowUpAnswer::No),
        ("/sidebar", _) => Command::Sidebar,
        ("/logout", _) => Command::Logout,
        ("/help", _) => Command::Help,
        ("/quit" | "/exit", _) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn describe_rename(outcome: &RenameOutcome) -> Option<String> {
    match outcome {
        RenameOutcome::Renamed(title) => Some(format!("Renamed to \"{}\".", title)),
        RenameOutcome::Cancelled => Some("Rename cancelled.".to_string()),
        RenameOutcome::Failed => Some("Rename failed; edit the title and try again, or /cancel.".to_string()),
        RenameOutcome::NotEditing => None,
    }
}

/// Applies one command. Returns `None` when the session should end,
/// otherwise an optional one-line notice shown above the re-rendered view.
pub async fn apply(shell: &mut ChatShell, command: Command) -> Option<Option<String>> {
    let notice = match command {
        Command::Quit => {
            return None;
        }
        Command::Help => Some(HELP.to_string()),
        Command::List =>
            Some(render_directory(shell.directory(), shell.active_conversation_id())),
        Command::Open(target) =>
            match shell.select_conversation(&target).await {
                Some(_) => None,
                None => Some(format!("No conversation matches {}.", target)),
            }
        Command::New => {
            shell.new_chat().await;
            None
        }
        Command::Edit(target) => {
            let id = shell.directory().select_conversation(&target);
            match id {
                Some(id) if shell.directory_mut().begin_edit(&id) =>
                    Some("Type the new title and press Enter (/cancel to abort).".to_string()),
                _ => Some(format!("No conversation matches {}.", target)),
            }
        }
        Command::Rename { target, title } => {
            match shell.directory().select_conversation(&target) {
                Some(id) => {
                    let directory = shell.directory_mut();
                    directory.begin_edit(&id);
                    directory.set_draft(title);
                    let outcome = directory.commit_edit().await;
                    describe_rename(&outcome)
                }
                None => Some(format!("No conversation matches {}.", target)),
            }
        }
        Command::Cancel => {
            shell.directory_mut().cancel_edit();
            None
        }
        Command::Reset => {
            shell.thread().reset_conversation();
            None
        }
        Command::Answer(answer) => {
            match shell.thread().answer_follow_up(answer).await {
                SendOutcome::Ignored => Some("There is no question to answer.".to_string()),
                _ => None,
            }
        }
        Command::Sidebar => {
            shell.toggle_sidebar();
            None
        }
        Command::Logout =>
            match shell.logout().await {
                Ok(()) => Some("Logged out.".to_string()),
                Err(e) => {
                    error!("Logout failed: {}", e);
                    Some("Logout failed.".to_string())
                }
            }
        Command::Unknown(name) => Some(format!("Unknown command {}. Try /help.", name)),
        Command::Text(text) => {
            if shell.directory().editing().is_some() {
                let directory = shell.directory_mut();
                directory.set_draft(text);
                let outcome = directory.commit_edit().await;
                describe_rename(&outcome)
            } else {
                let thread = shell.thread();
                thread.set_input(text);
                thread.submit().await;
                None
            }
        }
    };
    Some(notice)
}

/// Reads commands line by line until EOF or `/quit`, re-rendering the shell
/// after each one.
pub async fn run<R, W>(shell: &mut ChatShell, reader: R, mut writer: W) -> io::Result<()>
    where R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    writer.write_all(render_shell(shell).as_bytes()).await?;
    writer.write_all(b"\n> ").await?;
    writer.flush().await?;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let Some(notice) = apply(shell, parse_command(&line)).await else {
            info!("Session ended by user");
            break;
        };
        let mut out = String::new();
        if let Some(notice) = notice {
            out.push_str(&notice);
            out.push_str("\n\n");
        }
        out.push_str(&render_shell(shell));
        out.push_str("\n> ");
        writer.write_all(out.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
