/// One line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Chats,
    /// New chat, optionally with a chosen id
    New(Option<String>),
    Open(String),
    Delete(String),
    Models,
    /// Select a model; `None` resets to the default
    Model(Option<String>),
    Key(String),
    Folder(String),
    Retry,
    ClearError,
    History,
    Quit,
    /// Plain text to send to the current chat
    Send(String),
    Empty,
    Unknown(String),
}

pub const HELP: &str = "\
Commands:
  /chats            list chats, most recent first
  /new [id]         start a new chat
  /open <id>        switch to a chat
  /delete <id>      delete a chat and its messages
  /history          show the current chat
  /models           list available models
  /model [name]     select a model (no name: default)
  /key <api key>    store the API key
  /folder <id>      store the folder id
  /retry            resend the last unanswered message
  /clear            clear the last error
  /quit             exit
Anything else is sent to the current chat.";

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Send(line.to_string());
        };

        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
            None => (rest, None),
        };
        let arg = arg.map(str::to_string);

        match (name, arg) {
            ("help" | "h", _) => Self::Help,
            ("chats", _) => Self::Chats,
            ("new", arg) => Self::New(arg),
            ("open", Some(id)) => Self::Open(id),
            ("delete", Some(id)) => Self::Delete(id),
            ("models", _) => Self::Models,
            ("model", arg) => Self::Model(arg),
            ("key", Some(key)) => Self::Key(key),
            ("folder", Some(id)) => Self::Folder(id),
            ("retry", _) => Self::Retry,
            ("clear", _) => Self::ClearError,
            ("history", _) => Self::History,
            ("quit" | "exit" | "q", _) => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent_trimmed() {
        assert_eq!(Command::parse("  hello there "), Command::Send("hello there".to_string()));
        assert_eq!(Command::parse("   "), Command::Empty);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(Command::parse("/open c1"), Command::Open("c1".to_string()));
        assert_eq!(Command::parse("/new"), Command::New(None));
        assert_eq!(Command::parse("/new  mine "), Command::New(Some("mine".to_string())));
        assert_eq!(Command::parse("/model"), Command::Model(None));
        assert_eq!(
            Command::parse("/model yandexgpt-lite"),
            Command::Model(Some("yandexgpt-lite".to_string()))
        );
    }

    #[test]
    fn test_missing_required_argument_is_unknown() {
        assert_eq!(Command::parse("/open"), Command::Unknown("/open".to_string()));
        assert_eq!(Command::parse("/frobnicate"), Command::Unknown("/frobnicate".to_string()));
    }
}
