use std::fmt::Display;
use std::io::{self, Write};
use std::sync::Arc;

use futures::StreamExt;

use chatrelay_session::{ChatSession, IgnoreReason, SessionManager, SubmitOutcome};

use crate::commands::{Command, HELP};

/// Command dispatch for the terminal front-end.
///
/// Failures of a single command are printed to `err` and the loop goes on;
/// only a broken output stream stops it.
pub struct Repl<W, E> {
    manager: Arc<SessionManager>,
    current: Arc<ChatSession>,
    out: W,
    err: E,
}

impl<W: Write, E: Write> Repl<W, E> {
    /// Start on the most recently active chat
    pub async fn start(manager: Arc<SessionManager>, out: W, err: E) -> anyhow::Result<Self> {
        let current = open_latest_or_new(&manager).await?;
        Ok(Self {
            manager,
            current,
            out,
            err,
        })
    }

    pub fn current(&self) -> &Arc<ChatSession> {
        &self.current
    }

    /// Run one command. Returns `false` once the user asked to quit.
    pub async fn handle(&mut self, command: Command) -> io::Result<bool> {
        match command {
            Command::Quit => return Ok(false),
            Command::Empty => {}
            Command::Help => writeln!(self.out, "{}", HELP)?,
            Command::Chats => match self.manager.chat_previews().await {
                Ok(previews) => {
                    for preview in previews {
                        let marker = if preview.chat_id == self.current.chat_id() { "*" } else { " " };
                        writeln!(
                            self.out,
                            "{} {}  {}  {}",
                            marker,
                            preview.display_date(),
                            preview.chat_id,
                            preview.display_text()
                        )?;
                    }
                }
                Err(e) => self.fail(e)?,
            },
            Command::New(id) => {
                let opened = match self.manager.create_chat(id.as_deref()).await {
                    Ok(chat) => self.manager.open(&chat.id).await,
                    Err(e) => Err(e),
                };
                match opened {
                    Ok(session) => {
                        self.current = session;
                        writeln!(self.out, "opened {}", self.current.chat_id())?;
                    }
                    Err(e) => self.fail(e)?,
                }
            }
            Command::Open(id) => match self.manager.open(&id).await {
                Ok(session) => {
                    self.current = session;
                    self.print_history().await?;
                }
                Err(e) => self.fail(e)?,
            },
            Command::Delete(id) => match self.manager.delete_chat(&id).await {
                Ok(true) => {
                    writeln!(self.out, "deleted {}", id)?;
                    if self.current.chat_id() == id {
                        match open_latest_or_new(&self.manager).await {
                            Ok(session) => {
                                self.current = session;
                                writeln!(self.out, "opened {}", self.current.chat_id())?;
                            }
                            Err(e) => self.fail(e)?,
                        }
                    }
                }
                Ok(false) => writeln!(self.out, "no chat {}", id)?,
                Err(e) => self.fail(e)?,
            },
            Command::History => self.print_history().await?,
            Command::Models => match self.manager.list_models().await {
                Ok(models) => {
                    for model in models {
                        writeln!(self.out, "  {}", model)?;
                    }
                }
                Err(e) => self.fail(e)?,
            },
            Command::Model(name) => {
                let settings = self.manager.settings();
                match settings.set_model(name.as_deref().unwrap_or("")).await {
                    Ok(()) => writeln!(self.out, "model: {}", name.as_deref().unwrap_or("default"))?,
                    Err(e) => self.fail(e)?,
                }
            }
            Command::Key(key) => match self.manager.settings().set_api_key(&key).await {
                Ok(()) => writeln!(self.out, "API key saved")?,
                Err(e) => self.fail(e)?,
            },
            Command::Folder(id) => match self.manager.settings().set_scope_id(&id).await {
                Ok(()) => writeln!(self.out, "folder id saved")?,
                Err(e) => self.fail(e)?,
            },
            Command::ClearError => self.current.clear_error(),
            Command::Retry => {
                let result = self.current.retry_last().await;
                self.report(result)?;
            }
            Command::Send(text) => {
                let result = self.current.submit(&text).await;
                self.report(result)?;
            }
            Command::Unknown(input) => {
                writeln!(self.err, "unknown command: {} (try /help)", input)?
            }
        }
        Ok(true)
    }

    pub async fn print_history(&mut self) -> io::Result<()> {
        let mut states = Box::pin(self.current.view_states());

        // Skip the loading placeholder
        while let Some(view) = states.next().await {
            if view.is_loading {
                continue;
            }
            writeln!(self.out, "--- chat {} ---", view.chat_id)?;
            for message in &view.messages {
                let who = if message.is_from_user() { "you" } else { "assistant" };
                writeln!(
                    self.out,
                    "[{}] {}: {}",
                    message.timestamp.format("%H:%M"),
                    who,
                    message.text
                )?;
            }
            if view.processing {
                writeln!(self.out, "(waiting for a reply; /retry to resend)")?;
            }
            if let Some(error) = &view.error {
                writeln!(self.out, "(last error: {})", error)?;
            }
            break;
        }
        Ok(())
    }

    fn report(&mut self, result: chatrelay_session::Result<SubmitOutcome>) -> io::Result<()> {
        match result {
            Ok(SubmitOutcome::Replied(reply)) => writeln!(self.out, "assistant: {}", reply.text),
            Ok(SubmitOutcome::Ignored(reason)) => match reason {
                IgnoreReason::BlankInput => Ok(()),
                IgnoreReason::InFlight => {
                    writeln!(self.out, "(still waiting for the previous reply)")
                }
                IgnoreReason::Stalled => {
                    writeln!(self.out, "(the last message was never answered; use /retry)")
                }
                IgnoreReason::NothingToRetry => writeln!(self.out, "(nothing to retry)"),
            },
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: impl Display) -> io::Result<()> {
        writeln!(self.err, "error: {}", error)
    }
}

/// Most recently active chat, or a fresh one when there are none
async fn open_latest_or_new(manager: &SessionManager) -> anyhow::Result<Arc<ChatSession>> {
    let latest = manager.chat_previews().await?.into_iter().next();
    let chat_id = match latest {
        Some(preview) => preview.chat_id,
        None => manager.create_chat(None).await?.id,
    };
    Ok(manager.open(&chat_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatrelay_llm::YandexGptClient;
    use chatrelay_persist::{FileSettings, MemoryStore, Settings};

    async fn manager(settings: Settings) -> Arc<SessionManager> {
        let manager = SessionManager::builder()
            .store(Arc::new(MemoryStore::new()))
            .gateway(Arc::new(YandexGptClient::new().unwrap()))
            .settings(settings)
            .build()
            .unwrap();
        Arc::new(manager)
    }

    #[tokio::test]
    async fn test_settings_write_failure_keeps_running() {
        let dir = tempfile::tempdir().unwrap();
        let settings_dir = dir.path().join("conf");
        let file = FileSettings::open(settings_dir.join("settings.toml")).await.unwrap();
        // A plain file where the directory should be makes every write fail
        std::fs::write(&settings_dir, "not a directory").unwrap();

        let manager = manager(Settings::new(Arc::new(file))).await;
        let (mut out, mut err) = (Vec::new(), Vec::new());
        {
            let mut repl = Repl::start(manager, &mut out, &mut err).await.unwrap();
            assert!(repl.handle(Command::Key("secret".into())).await.unwrap());
            assert!(repl.handle(Command::Folder("b1g".into())).await.unwrap());
            assert!(repl.handle(Command::Model(Some("yandexgpt-lite".into()))).await.unwrap());
            assert!(repl.handle(Command::Chats).await.unwrap());
        }

        let err = String::from_utf8(err).unwrap();
        assert_eq!(err.matches("error:").count(), 3);
        assert!(!String::from_utf8(out).unwrap().contains("saved"));
    }

    #[tokio::test]
    async fn test_new_open_and_delete_switch_chats() {
        let manager = manager(Settings::in_memory()).await;
        let (mut out, mut err) = (Vec::new(), Vec::new());
        {
            let mut repl = Repl::start(manager.clone(), &mut out, &mut err).await.unwrap();
            let first = repl.current().chat_id().to_string();

            repl.handle(Command::New(Some("second".into()))).await.unwrap();
            assert_eq!(repl.current().chat_id(), "second");

            repl.handle(Command::Delete("second".into())).await.unwrap();
            assert_eq!(repl.current().chat_id(), first);

            repl.handle(Command::Delete("missing".into())).await.unwrap();
            assert!(!repl.handle(Command::Quit).await.unwrap());
        }

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("opened second"));
        assert!(out.contains("deleted second"));
        assert!(out.contains("no chat missing"));
        assert!(err.is_empty());
    }

    #[tokio::test]
    async fn test_send_without_credentials_reports_error() {
        let manager = manager(Settings::in_memory()).await;
        let (mut out, mut err) = (Vec::new(), Vec::new());
        {
            let mut repl = Repl::start(manager, &mut out, &mut err).await.unwrap();
            assert!(repl.handle(Command::Send("Hello".into())).await.unwrap());
            assert!(repl.current().current_status().last_error.is_some());
        }
        assert!(String::from_utf8(err).unwrap().starts_with("error:"));
    }
}
