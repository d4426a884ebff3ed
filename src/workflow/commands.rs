//! Named user actions mapped to workflow events.
//!
//! Any surface (the `session` REPL, a GUI shell, a test) drives the workflow
//! by looking a command up here and acting on the returned [`CommandAction`].

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use uuid::Uuid;

use crate::input::{describe_path, SourceKind};

use super::state::Event;

/// What the caller should do after a command parses.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandAction {
    Dispatch(Event),
    Dismiss(Uuid),
    Show,
    Help,
    Quit,
}

pub struct CommandEntry {
    pub name: &'static str,
    pub usage: &'static str,
    pub summary: &'static str,
    pub handler: fn(&str) -> Result<CommandAction>,
}

pub const COMMANDS: &[CommandEntry] = &[
    CommandEntry {
        name: "switch-tab",
        usage: "switch-tab <text|file>",
        summary: "Choose typed text or an uploaded file as the input",
        handler: switch_tab,
    },
    CommandEntry {
        name: "edit-text",
        usage: "edit-text <text>",
        summary: "Replace the text to analyse",
        handler: edit_text,
    },
    CommandEntry {
        name: "attach-file",
        usage: "attach-file <path>",
        summary: "Attach a .txt, .doc, .docx or .pdf file",
        handler: attach_file,
    },
    CommandEntry {
        name: "remove-file",
        usage: "remove-file",
        summary: "Detach the current file",
        handler: |_| Ok(CommandAction::Dispatch(Event::RemoveFile)),
    },
    CommandEntry {
        name: "detect",
        usage: "detect",
        summary: "Run AI detection on the current input",
        handler: |_| Ok(CommandAction::Dispatch(Event::SubmitDetection)),
    },
    CommandEntry {
        name: "request-optimize",
        usage: "request-optimize",
        summary: "Open the optimizer with the detected text",
        handler: |_| Ok(CommandAction::Dispatch(Event::RequestOptimize)),
    },
    CommandEntry {
        name: "edit-optimize-text",
        usage: "edit-optimize-text <text>",
        summary: "Replace the text to optimize",
        handler: |args| Ok(CommandAction::Dispatch(Event::EditOptimizeText(args.to_string()))),
    },
    CommandEntry {
        name: "start-optimize",
        usage: "start-optimize",
        summary: "Send the text to the optimization service",
        handler: |_| Ok(CommandAction::Dispatch(Event::SubmitOptimization)),
    },
    CommandEntry {
        name: "back-to-results",
        usage: "back-to-results",
        summary: "Return to the detection results",
        handler: |_| Ok(CommandAction::Dispatch(Event::BackToResults)),
    },
    CommandEntry {
        name: "copy-optimized",
        usage: "copy-optimized",
        summary: "Copy the optimized text",
        handler: |_| Ok(CommandAction::Dispatch(Event::CopyOptimized)),
    },
    CommandEntry {
        name: "download-optimized",
        usage: "download-optimized",
        summary: "Save the optimized text to the export directory",
        handler: |_| Ok(CommandAction::Dispatch(Event::ExportOptimized)),
    },
    CommandEntry {
        name: "new-detection",
        usage: "new-detection",
        summary: "Start over with an empty session",
        handler: |_| Ok(CommandAction::Dispatch(Event::Reset)),
    },
    CommandEntry {
        name: "dismiss",
        usage: "dismiss <notification-id>",
        summary: "Dismiss a notification",
        handler: dismiss,
    },
    CommandEntry {
        name: "show",
        usage: "show",
        summary: "Print the current session",
        handler: |_| Ok(CommandAction::Show),
    },
    CommandEntry {
        name: "help",
        usage: "help",
        summary: "List commands",
        handler: |_| Ok(CommandAction::Help),
    },
    CommandEntry {
        name: "quit",
        usage: "quit",
        summary: "Leave the session",
        handler: |_| Ok(CommandAction::Quit),
    },
];

pub fn lookup(name: &str) -> Option<&'static CommandEntry> {
    COMMANDS.iter().find(|entry| entry.name == name)
}

/// Splits `line` into a command name and the rest, then runs its handler.
/// Blank lines parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<CommandAction>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, args) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (line, ""),
    };
    let entry = lookup(name).ok_or_else(|| anyhow!("unknown command `{name}`, try `help`"))?;
    (entry.handler)(args).map(Some)
}

fn switch_tab(args: &str) -> Result<CommandAction> {
    let kind = match args.trim() {
        "text" => SourceKind::Text,
        "file" => SourceKind::File,
        other => bail!("expected `text` or `file`, got `{other}`"),
    };
    Ok(CommandAction::Dispatch(Event::SwitchTab(kind)))
}

fn edit_text(args: &str) -> Result<CommandAction> {
    Ok(CommandAction::Dispatch(Event::EditText(args.to_string())))
}

fn attach_file(args: &str) -> Result<CommandAction> {
    let path = args.trim();
    if path.is_empty() {
        bail!("usage: attach-file <path>");
    }
    let (descriptor, handle) = describe_path(Path::new(path))?;
    Ok(CommandAction::Dispatch(Event::AttachFile { descriptor, handle }))
}

fn dismiss(args: &str) -> Result<CommandAction> {
    let id = Uuid::parse_str(args.trim())
        .with_context(|| format!("`{}` is not a notification id", args.trim()))?;
    Ok(CommandAction::Dismiss(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FileHandle;
    use std::collections::HashSet;
    use std::io::Write;

    #[test]
    fn command_names_are_unique() {
        let names: HashSet<_> = COMMANDS.iter().map(|entry| entry.name).collect();
        assert_eq!(names.len(), COMMANDS.len());
        for entry in COMMANDS {
            assert!(entry.usage.starts_with(entry.name), "{}", entry.name);
        }
    }

    #[test]
    fn blank_line_is_nothing() {
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn edit_text_keeps_inner_whitespace() {
        let action = parse_line("edit-text  hello   world ").unwrap();
        assert_eq!(
            action,
            Some(CommandAction::Dispatch(Event::EditText("hello   world".into())))
        );
    }

    #[test]
    fn switch_tab_parses_kind() {
        assert_eq!(
            parse_line("switch-tab file").unwrap(),
            Some(CommandAction::Dispatch(Event::SwitchTab(SourceKind::File)))
        );
        assert!(parse_line("switch-tab audio").is_err());
    }

    #[test]
    fn unknown_command_is_an_error() {
        let err = parse_line("frobnicate now").unwrap_err();
        assert!(err.to_string().contains("frobnicate"));
    }

    #[test]
    fn new_detection_resets() {
        assert_eq!(
            parse_line("new-detection").unwrap(),
            Some(CommandAction::Dispatch(Event::Reset))
        );
    }

    #[test]
    fn dismiss_needs_a_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(
            parse_line(&format!("dismiss {id}")).unwrap(),
            Some(CommandAction::Dismiss(id))
        );
        assert!(parse_line("dismiss 42").is_err());
    }

    #[test]
    fn attach_file_describes_path() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "some text").unwrap();

        let action = parse_line(&format!("attach-file {}", file.path().display()))
            .unwrap()
            .unwrap();
        match action {
            CommandAction::Dispatch(Event::AttachFile { descriptor, handle }) => {
                assert_eq!(descriptor.size_bytes, 9);
                assert_eq!(descriptor.mime_type, "text/plain");
                assert_eq!(handle, FileHandle::Path(file.path().to_path_buf()));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn attach_file_without_path_fails() {
        assert!(parse_line("attach-file").is_err());
    }
}
