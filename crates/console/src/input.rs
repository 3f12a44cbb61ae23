//! Operator commands typed on stdin.

use std::path::PathBuf;

use rfidtrack_core::DomainError;
use rfidtrack_events::ReaderCommand;
use rfidtrack_session::UserAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Empty,
    Quit,
    Action(UserAction),
    /// Upload the catalog stored in a file.
    UploadFile(PathBuf),
}

/// Parse one stdin line: `start`, `stop`, `read-tag`, `upload <path>`,
/// `quit`/`exit`, or a raw `upload_inventory:<content>` command.
pub fn parse_input(line: &str) -> Result<ConsoleInput, DomainError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ConsoleInput::Empty);
    }
    if matches!(line, "quit" | "exit") {
        return Ok(ConsoleInput::Quit);
    }
    if let Some(path) = line.strip_prefix("upload ") {
        let path = path.trim();
        if path.is_empty() {
            return Err(DomainError::validation("upload needs a file path"));
        }
        return Ok(ConsoleInput::UploadFile(PathBuf::from(path)));
    }

    let action = match line.parse::<ReaderCommand>()? {
        ReaderCommand::Start => UserAction::Start,
        ReaderCommand::Stop => UserAction::Stop,
        ReaderCommand::ReadTag => UserAction::ReadTag,
        ReaderCommand::UploadInventory(content) => UserAction::UploadInventory(content),
    };
    Ok(ConsoleInput::Action(action))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_operator_lines() {
        assert_eq!(parse_input("  ").unwrap(), ConsoleInput::Empty);
        assert_eq!(parse_input("exit").unwrap(), ConsoleInput::Quit);
        assert_eq!(parse_input("start").unwrap(), ConsoleInput::Action(UserAction::Start));
        assert_eq!(parse_input("read-tag\n").unwrap(), ConsoleInput::Action(UserAction::ReadTag));
        assert_eq!(
            parse_input("upload ./catalog.json").unwrap(),
            ConsoleInput::UploadFile(PathBuf::from("./catalog.json"))
        );
        assert_eq!(
            parse_input("upload_inventory:[]").unwrap(),
            ConsoleInput::Action(UserAction::UploadInventory("[]".to_string()))
        );
    }

    #[test]
    fn rejects_unknown_lines() {
        assert!(parse_input("dance").is_err());
        assert!(parse_input("upload    ").is_err());
    }
}
