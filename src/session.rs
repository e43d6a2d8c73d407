use thiserror::Error;

use crate::chat::outreach::EmailDraft;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("please enter a job description URL")]
    EmptyUrl,

    #[error("already generating drafts for {0}")]
    Busy(String),

    #[error("cannot apply {event} while {state}")]
    InvalidTransition {
        event: &'static str,
        state: &'static str,
    },

    #[error("no drafts are being displayed")]
    NotDisplaying,

    #[error("there is no variation {0}")]
    NoSuchDraft(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    Generating {
        url: String,
    },
    Displaying {
        url: String,
        drafts: Vec<EmailDraft>,
    },
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Generating { .. } => "generating",
            SessionState::Displaying { .. } => "displaying",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Submit(String),
    InputChanged(String),
    GenerationComplete(Vec<EmailDraft>),
    GenerationFailed(String),
}

impl SessionEvent {
    fn name(&self) -> &'static str {
        match self {
            SessionEvent::Submit(_) => "submit",
            SessionEvent::InputChanged(_) => "input change",
            SessionEvent::GenerationComplete(_) => "generation complete",
            SessionEvent::GenerationFailed(_) => "generation failure",
        }
    }
}

/// Interactive session: nothing to show, a generation in flight for a URL, or
/// drafts on display for a URL. Changing the input away from the displayed URL
/// drops the stale drafts.
#[derive(Debug, Default)]
pub struct Session {
    input: String,
    state: SessionState,
    last_error: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn drafts(&self) -> Option<&[EmailDraft]> {
        match &self.state {
            SessionState::Displaying { drafts, .. } => Some(drafts),
            _ => None,
        }
    }

    pub fn handle(&mut self, event: SessionEvent) -> Result<&SessionState, SessionError> {
        let state = std::mem::take(&mut self.state);

        let next = match (state, event) {
            (SessionState::Generating { url }, SessionEvent::Submit(_)) => {
                self.state = SessionState::Generating { url: url.clone() };
                return Err(SessionError::Busy(url));
            }
            (state, SessionEvent::Submit(url)) => {
                let url = url.trim().to_string();
                if url.is_empty() {
                    self.state = state;
                    return Err(SessionError::EmptyUrl);
                }
                self.input = url.clone();
                self.last_error = None;
                SessionState::Generating { url }
            }

            (SessionState::Displaying { url, drafts }, SessionEvent::InputChanged(text)) => {
                let text = text.trim().to_string();
                let next = if text == url {
                    SessionState::Displaying { url, drafts }
                } else {
                    SessionState::Idle
                };
                self.input = text;
                next
            }
            (state, SessionEvent::InputChanged(text)) => {
                self.input = text.trim().to_string();
                state
            }

            (SessionState::Generating { url }, SessionEvent::GenerationComplete(drafts)) => {
                SessionState::Displaying { url, drafts }
            }
            (SessionState::Generating { .. }, SessionEvent::GenerationFailed(reason)) => {
                self.last_error = Some(reason);
                SessionState::Idle
            }
            (state, event) => {
                let err = SessionError::InvalidTransition {
                    event: event.name(),
                    state: state.name(),
                };
                self.state = state;
                return Err(err);
            }
        };

        self.state = next;
        Ok(&self.state)
    }

    /// Replaces the text of a displayed draft. Indices start at 1.
    pub fn edit(&mut self, index: usize, text: String) -> Result<(), SessionError> {
        let SessionState::Displaying { drafts, .. } = &mut self.state else {
            return Err(SessionError::NotDisplaying);
        };

        let draft = index
            .checked_sub(1)
            .and_then(|i| drafts.get_mut(i))
            .ok_or(SessionError::NoSuchDraft(index))?;
        *draft = EmailDraft::Generated(text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://jobs.example.com/1";

    fn drafts() -> Vec<EmailDraft> {
        vec![
            EmailDraft::Generated("first".to_string()),
            EmailDraft::Failed("Failed to generate Variation 2.".to_string()),
        ]
    }

    fn displaying() -> Session {
        let mut session = Session::new();
        session.handle(SessionEvent::Submit(URL.to_string())).unwrap();
        session.handle(SessionEvent::GenerationComplete(drafts())).unwrap();
        session
    }

    #[test]
    fn submit_then_complete_displays_drafts() {
        let session = displaying();
        assert_eq!(
            session.state(),
            &SessionState::Displaying {
                url: URL.to_string(),
                drafts: drafts()
            }
        );
        assert_eq!(session.input(), URL);
    }

    #[test]
    fn blank_submit_is_rejected_and_keeps_state() {
        let mut session = displaying();
        assert_eq!(
            session.handle(SessionEvent::Submit("  ".to_string())),
            Err(SessionError::EmptyUrl)
        );
        assert!(session.drafts().is_some());
    }

    #[test]
    fn submit_while_generating_is_busy() {
        let mut session = Session::new();
        session.handle(SessionEvent::Submit(URL.to_string())).unwrap();

        let err = session.handle(SessionEvent::Submit("https://other".to_string()));
        assert_eq!(err, Err(SessionError::Busy(URL.to_string())));
        assert_eq!(session.state(), &SessionState::Generating { url: URL.to_string() });
    }

    #[test]
    fn resubmitting_drops_old_drafts() {
        let mut session = displaying();
        session.handle(SessionEvent::Submit(URL.to_string())).unwrap();
        assert_eq!(session.state(), &SessionState::Generating { url: URL.to_string() });
        assert!(session.drafts().is_none());
    }

    #[test]
    fn changing_input_clears_stale_drafts() {
        let mut session = displaying();

        session.handle(SessionEvent::InputChanged(format!(" {} ", URL))).unwrap();
        assert!(session.drafts().is_some());

        session.handle(SessionEvent::InputChanged("https://other".to_string())).unwrap();
        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.input(), "https://other");
    }

    #[test]
    fn input_changes_while_generating_are_recorded() {
        let mut session = Session::new();
        session.handle(SessionEvent::InputChanged("draft".to_string())).unwrap();
        assert_eq!(session.state(), &SessionState::Idle);

        session.handle(SessionEvent::Submit(URL.to_string())).unwrap();
        session.handle(SessionEvent::InputChanged("typing".to_string())).unwrap();
        assert_eq!(session.input(), "typing");
        assert!(matches!(session.state(), SessionState::Generating { .. }));
    }

    #[test]
    fn failure_returns_to_idle_with_reason() {
        let mut session = Session::new();
        session.handle(SessionEvent::Submit(URL.to_string())).unwrap();
        session
            .handle(SessionEvent::GenerationFailed("boom".to_string()))
            .unwrap();

        assert_eq!(session.state(), &SessionState::Idle);
        assert_eq!(session.last_error(), Some("boom"));
    }

    #[test]
    fn completion_outside_generation_is_invalid() {
        let mut session = Session::new();
        let err = session.handle(SessionEvent::GenerationComplete(drafts()));
        assert_eq!(
            err,
            Err(SessionError::InvalidTransition {
                event: "generation complete",
                state: "idle"
            })
        );

        let mut session = displaying();
        assert!(session.handle(SessionEvent::GenerationFailed("late".to_string())).is_err());
        assert!(session.drafts().is_some());
    }

    #[test]
    fn edits_replace_displayed_drafts() {
        let mut session = displaying();
        session.edit(2, "rewritten by hand".to_string()).unwrap();

        let drafts = session.drafts().unwrap();
        assert_eq!(drafts[1], EmailDraft::Generated("rewritten by hand".to_string()));

        assert_eq!(session.edit(0, String::new()), Err(SessionError::NoSuchDraft(0)));
        assert_eq!(session.edit(3, String::new()), Err(SessionError::NoSuchDraft(3)));
    }

    #[test]
    fn edit_requires_displayed_drafts() {
        let mut session = Session::new();
        assert_eq!(session.edit(1, String::new()), Err(SessionError::NotDisplaying));
    }
}
