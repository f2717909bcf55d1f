use termimad::crossterm::style::Color;
use termimad::MadSkin;

use super::session::SUGGESTIONS;
use crate::models::{ Role, Turn };

pub struct Renderer {
    skin: MadSkin,
    width: usize,
}

impl Renderer {
    pub fn new(width: usize) -> Self {
        let mut skin = MadSkin::default_dark();
        skin.inline_code.set_fg(Color::Yellow);
        skin.headers[0].set_fg(Color::Cyan);
        skin.headers[1].set_fg(Color::Cyan);
        Self { skin, width: width.max(20) }
    }

    /// Assistant turns are markdown; user text is printed as typed.
    pub fn render_turn(&self, turn: &Turn) -> String {
        match turn.role {
            Role::Assistant => {
                let body = self.skin.text(&turn.content, Some(self.width)).to_string();
                format!("grok:\n{}", body)
            }
            Role::User => format!("you:\n{}\n", turn.content),
            Role::System => String::new(),
        }
    }

    pub fn render_welcome(&self) -> String {
        let mut out = String::from(
            "Welcome to Grok\nAsk me anything! I'm here to help with questions, creative writing, coding, and more.\n\n"
        );
        for (i, s) in SUGGESTIONS.iter().enumerate() {
            out.push_str(&format!("  /{}  {}\n", i + 1, s.label));
        }
        out
    }
}
