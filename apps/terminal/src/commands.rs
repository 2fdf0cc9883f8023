//! Line commands accepted from the terminal.

use shared::domain::{DraftField, RecordId};

pub const HELP: &str = "\
commands:
  refresh                 fetch the movie list again
  cancel                  stop automatic retries
  set <field> <value>     edit the draft (title, openingText, releaseDate)
  submit                  add the draft as a new movie
  delete <id>             delete a movie
  show                    print the current state
  help                    print this help
  quit                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCommand {
    Refresh,
    CancelRetry,
    SetDraftField { field: DraftField, value: String },
    SubmitDraft,
    Delete { id: RecordId },
    Show,
    Help,
    Quit,
}

impl UiCommand {
    pub fn name(&self) -> &'static str {
        match self {
            UiCommand::Refresh => "refresh",
            UiCommand::CancelRetry => "cancel_retry",
            UiCommand::SetDraftField { .. } => "set_draft_field",
            UiCommand::SubmitDraft => "submit_draft",
            UiCommand::Delete { .. } => "delete",
            UiCommand::Show => "show",
            UiCommand::Help => "help",
            UiCommand::Quit => "quit",
        }
    }
}

/// `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<UiCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "refresh" | "fetch" => UiCommand::Refresh,
        "cancel" => UiCommand::CancelRetry,
        "submit" | "add" => UiCommand::SubmitDraft,
        "show" | "ls" => UiCommand::Show,
        "help" | "?" => UiCommand::Help,
        "quit" | "exit" | "q" => UiCommand::Quit,
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            if field.is_empty() {
                return Err("usage: set <field> <value>".to_string());
            }
            let field = field.parse::<DraftField>().map_err(|err| err.to_string())?;
            // literal "\n" lets a single input line carry a multi-line opening text
            UiCommand::SetDraftField {
                field,
                value: value.replace("\\n", "\n"),
            }
        }
        "delete" | "rm" => {
            if rest.is_empty() {
                return Err("usage: delete <id>".to_string());
            }
            UiCommand::Delete {
                id: RecordId::from(rest),
            }
        }
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };

    Ok(Some(command))
}
