use log::warn;

use super::relay_client::{ ClientError, RelayClient };
use super::settings::{ SettingsStore, StoreError };
use crate::models::{ RelayRequest, Turn };

pub const ERROR_PREFIX: &str = "Error: ";
pub const FALLBACK_ERROR: &str = "Something went wrong. Please check your API key and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    pub label: &'static str,
    pub prompt: &'static str,
}

pub const SUGGESTIONS: [Suggestion; 3] = [
    Suggestion {
        label: "Explain quantum computing",
        prompt: "Explain quantum computing in simple terms",
    },
    Suggestion {
        label: "Write a haiku about AI",
        prompt: "Write a haiku about artificial intelligence",
    },
    Suggestion {
        label: "Latest tech trends",
        prompt: "What are the latest trends in technology?",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    CredentialEntry,
    Chat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    /// `modified` is true when shift (or another modifier) is held.
    Enter {
        modified: bool,
    },
}

pub struct ChatSession {
    store: SettingsStore,
    history: Vec<Turn>,
    draft: String,
    credential: String,
    loading: bool,
    view: View,
}

impl ChatSession {
    pub fn load(store: SettingsStore) -> Result<Self, StoreError> {
        let saved = store.load_credential()?.filter(|k| !k.is_empty());
        let view = if saved.is_some() { View::Chat } else { View::CredentialEntry };

        Ok(Self {
            store,
            history: Vec::new(),
            draft: String::new(),
            credential: saved.unwrap_or_default(),
            loading: false,
            view,
        })
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_credential(&mut self, credential: impl Into<String>) {
        self.credential = credential.into();
    }

    /// Returns false, changing nothing, when the credential is blank.
    pub fn save_credential(&mut self) -> Result<bool, StoreError> {
        if self.credential.trim().is_empty() {
            return Ok(false);
        }
        self.store.save_credential(&self.credential)?;
        self.view = View::Chat;
        Ok(true)
    }

    pub fn clear_credential(&mut self) -> Result<(), StoreError> {
        self.store.clear_credential()?;
        self.credential.clear();
        self.view = View::CredentialEntry;
        Ok(())
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        if !self.loading {
            self.draft = text.into();
        }
    }

    pub fn choose_suggestion(&mut self, index: usize) -> bool {
        match SUGGESTIONS.get(index) {
            Some(s) if self.history.is_empty() && !self.loading => {
                self.draft = s.prompt.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn handle_key(&mut self, key: Key) -> Option<RelayRequest> {
        if self.loading {
            return None;
        }
        match key {
            Key::Char(c) => {
                self.draft.push(c);
                None
            }
            Key::Backspace => {
                self.draft.pop();
                None
            }
            Key::Enter { modified: true } => {
                self.draft.push('\n');
                None
            }
            Key::Enter { modified: false } => self.begin_submit(),
        }
    }

    /// Optimistically records the draft as a user turn and returns the
    /// request carrying the whole history. `None` when there is nothing to
    /// send or a request is already in flight.
    pub fn begin_submit(&mut self) -> Option<RelayRequest> {
        if self.view != View::Chat || self.loading || self.draft.trim().is_empty() {
            return None;
        }

        let content = std::mem::take(&mut self.draft);
        self.history.push(Turn::user(content));
        self.loading = true;

        Some(RelayRequest {
            messages: self.history.clone(),
            api_key: self.credential.clone(),
        })
    }

    pub fn complete(&mut self, outcome: Result<String, ClientError>) {
        let turn = match outcome {
            Ok(content) => Turn::assistant(content),
            Err(e) => {
                warn!("Chat request failed: {}", e);
                let message = match e {
                    ClientError::Unrecognized(_) => FALLBACK_ERROR.to_string(),
                    other => other.to_string(),
                };
                Turn::assistant(format!("{}{}", ERROR_PREFIX, message))
            }
        };
        self.history.push(turn);
        self.loading = false;
    }

    pub async fn submit(&mut self, relay: &dyn RelayClient) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        let outcome = relay.send(&request).await;
        self.complete(outcome);
        true
    }
}
