use dialoguer::Password;
use indicatif::{ ProgressBar, ProgressStyle };
use log::warn;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::error::Error;
use std::path::Path;
use std::time::Duration;
use url::Url;

use super::relay_client::{ HttpRelayClient, RelayClient };
use super::render::Renderer;
use super::session::{ ChatSession, Key, View, SUGGESTIONS };
use super::settings::{ default_settings_path, SettingsStore };
use crate::cli::ChatArgs;

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Send(String),
    Continue(String),
    Suggestion(usize),
    ChangeKey,
    Help,
    Quit,
}

// Only an exact command word is a command; any other text, slashes
// included, is a message. A trailing `\` is the modified Enter.
fn parse_input(line: &str) -> Input {
    let command = match line.trim() {
        "/key" => Some(Input::ChangeKey),
        "/help" => Some(Input::Help),
        "/quit" | "/exit" => Some(Input::Quit),
        other => other
            .strip_prefix('/')
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|i| (1..=SUGGESTIONS.len()).contains(i))
            .map(|i| Input::Suggestion(i - 1)),
    };
    if let Some(command) = command {
        return command;
    }
    match line.strip_suffix('\\') {
        Some(head) => Input::Continue(head.to_string()),
        None => Input::Send(line.to_string()),
    }
}

fn print_help() {
    println!("Enter sends the message; end a line with \\ to add a newline instead.");
    println!("  /1../{}  use a suggested prompt", SUGGESTIONS.len());
    println!("  /key    change API key");
    println!("  /quit   exit");
    println!("Any other text, including text starting with /, is sent as a message.");
}

fn startup_banner(relay_url: &Url, settings_path: &Path) -> String {
    format!("Relay: {}\nSettings: {}", relay_url, settings_path.display())
}

pub async fn run(args: ChatArgs) -> Result<(), Box<dyn Error + Send + Sync>> {
    let store = SettingsStore::new(args.settings_path.clone().unwrap_or_else(default_settings_path));
    println!("{}", startup_banner(&args.relay_url, store.path()));

    let mut session = ChatSession::load(store)?;
    let relay = HttpRelayClient::new(args.relay_url.clone())?;
    let (width, _) = termimad::terminal_size();
    let renderer = Renderer::new(width as usize);
    let mut rl = DefaultEditor::new()?;

    if session.view() == View::Chat {
        println!("{}", renderer.render_welcome());
    }

    loop {
        match session.view() {
            View::CredentialEntry => {
                println!("Get your xAI API key from https://console.x.ai/");
                let key = match Password::new()
                    .with_prompt("xAI API key (xai-...)")
                    .allow_empty_password(true)
                    .interact()
                {
                    Ok(key) => key,
                    Err(e) => {
                        warn!("API key prompt closed: {}", e);
                        break;
                    }
                };
                session.set_credential(key.trim());
                if session.save_credential()? {
                    if session.history().is_empty() {
                        println!("{}", renderer.render_welcome());
                    }
                } else {
                    println!("An API key is required to start chatting.");
                }
            }
            View::Chat => {
                let line = match rl.readline_with_initial("> ", (session.draft(), "")) {
                    Ok(line) => line,
                    Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                    Err(e) => return Err(e.into()),
                };

                match parse_input(&line) {
                    Input::Quit => break,
                    Input::Help => print_help(),
                    Input::ChangeKey => session.clear_credential()?,
                    Input::Suggestion(i) => {
                        if !session.choose_suggestion(i) {
                            println!("Suggestions are only available in a new conversation.");
                        }
                    }
                    Input::Continue(text) => {
                        session.set_draft(text);
                        session.handle_key(Key::Enter { modified: true });
                    }
                    Input::Send(text) => {
                        session.set_draft(text);
                        if let Some(request) = session.handle_key(Key::Enter { modified: false }) {
                            let _ = rl.add_history_entry(line.as_str());
                            let shown = session.history().len();

                            let spinner = ProgressBar::new_spinner();
                            spinner.set_style(
                                ProgressStyle::default_spinner()
                                    .template("{spinner:.cyan} {msg}")
                                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                            );
                            spinner.set_message("Grok is thinking...");
                            spinner.enable_steady_tick(Duration::from_millis(100));

                            let outcome = relay.send(&request).await;
                            spinner.finish_and_clear();
                            session.complete(outcome);

                            for turn in &session.history()[shown..] {
                                println!("{}", renderer.render_turn(turn));
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_is_sent() {
        assert_eq!(parse_input("Hello"), Input::Send("Hello".into()));
    }

    #[test]
    fn trailing_backslash_continues_the_draft() {
        assert_eq!(parse_input("first line\\"), Input::Continue("first line".into()));
    }

    #[test]
    fn slash_commands() {
        assert_eq!(parse_input("/key"), Input::ChangeKey);
        assert_eq!(parse_input(" /quit "), Input::Quit);
        assert_eq!(parse_input("/2"), Input::Suggestion(1));
    }

    #[test]
    fn slash_text_that_is_not_a_command_is_sent() {
        assert_eq!(
            parse_input("/etc/hosts: what is this file for?"),
            Input::Send("/etc/hosts: what is this file for?".into())
        );
        assert_eq!(parse_input("/4"), Input::Send("/4".into()));
        assert_eq!(parse_input("/key rotation best practices"), Input::Send("/key rotation best practices".into()));
        assert_eq!(parse_input("/usr/bin/env \\"), Input::Continue("/usr/bin/env ".into()));
    }

    #[test]
    fn banner_names_relay_and_settings_file() {
        let url = Url::parse("http://relay.local:8080/api/chat").unwrap();
        let banner = startup_banner(&url, Path::new("/tmp/grok/settings.json"));
        assert_eq!(banner, "Relay: http://relay.local:8080/api/chat\nSettings: /tmp/grok/settings.json");
    }
}
