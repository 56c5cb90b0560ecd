// Chat session state - conversation turns and local input history
//
// The session holds the ordered turns sent with every completion request
// (system prompt first), the up/down-arrow input history, and the /save
// transcript dump. It knows nothing about the network or the animation.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Persona sent as the system turn of every conversation
pub const SYSTEM_PROMPT: &str = "You are Trinity from The Matrix. Respond as if you are this \
character - cool, direct, and technically knowledgeable. You have a slight edge to your \
personality, but you're helpful. If asked about who you are, mention you're Trinity from \
The Matrix. Keep your responses concise and efficient, like Trinity would.";

/// Replies longer than this are cut at a sentence boundary
const REPLY_CHAR_LIMIT: usize = 1000;

/// Earliest point the sentence-boundary search may cut at
const REPLY_CUT_FLOOR: usize = 800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One conversation turn, serialized directly into the API request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

/// Conversation turns plus local input history
pub struct ChatSession {
    turns: Vec<Turn>,
    history: Vec<String>,
    cursor: usize,
}

impl ChatSession {
    pub fn new(system_prompt: &str) -> Self {
        Self {
            turns: vec![Turn {
                role: Role::System,
                content: system_prompt.to_string(),
            }],
            history: Vec::new(),
            cursor: 0,
        }
    }

    /// All turns including the system prompt, ready for the request body
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of turns excluding the system prompt
    pub fn turn_count(&self) -> usize {
        self.turns.len().saturating_sub(1)
    }

    pub fn push_user(&mut self, content: &str) {
        self.turns.push(Turn {
            role: Role::User,
            content: content.to_string(),
        });
    }

    pub fn push_assistant(&mut self, content: &str) {
        self.turns.push(Turn {
            role: Role::Assistant,
            content: content.to_string(),
        });
    }

    /// Drop every turn except the system prompt
    pub fn clear(&mut self) {
        self.turns.truncate(1);
    }

    /// Remember a submitted input for up/down recall
    pub fn record_history(&mut self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.history.push(text.to_string());
        self.cursor = self.history.len();
    }

    /// Step back through history; None once at the oldest entry
    pub fn history_prev(&mut self) -> Option<String> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        self.history.get(self.cursor).cloned()
    }

    /// Step forward through history; an empty string past the newest entry
    /// clears the input line
    pub fn history_next(&mut self) -> Option<String> {
        if self.cursor + 1 < self.history.len() {
            self.cursor += 1;
            self.history.get(self.cursor).cloned()
        } else if self.cursor + 1 == self.history.len() {
            self.cursor = self.history.len();
            Some(String::new())
        } else {
            None
        }
    }

    /// Write the conversation (minus the system prompt) as a plain-text
    /// transcript
    pub fn save_transcript(&self, path: &Path) -> Result<()> {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create transcript {}", path.display()))?;
        for turn in self.turns.iter().skip(1) {
            let label = match turn.role {
                Role::User => "User",
                _ => "Assistant",
            };
            writeln!(file, "[{}]:\n{}\n", label, turn.content)
                .context("Failed to write transcript")?;
        }
        Ok(())
    }
}

/// Cut an overlong reply at the nearest sentence end past the floor, or
/// hard at the limit, and mark the cut.
pub fn truncate_reply(text: String) -> String {
    if text.chars().count() <= REPLY_CHAR_LIMIT {
        return text;
    }
    let chars: Vec<char> = text.chars().collect();
    let mut cut = REPLY_CHAR_LIMIT;
    while cut > REPLY_CUT_FLOOR && !matches!(chars[cut], '.' | '!' | '?') {
        cut -= 1;
    }
    let end = if cut > REPLY_CUT_FLOOR { cut + 1 } else { REPLY_CHAR_LIMIT };
    let mut truncated: String = chars[..end].iter().collect();
    truncated.push_str("\n\n... (Response truncated)");
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_the_system_prompt() {
        let mut session = ChatSession::new(SYSTEM_PROMPT);
        session.push_user("hello");
        session.push_assistant("hi");
        assert_eq!(session.turn_count(), 2);
        session.clear();
        assert_eq!(session.turn_count(), 0);
        assert_eq!(session.turns()[0].role, Role::System);
    }

    #[test]
    fn history_walks_backward_and_forward() {
        let mut session = ChatSession::new(SYSTEM_PROMPT);
        session.record_history("first");
        session.record_history("second");

        assert_eq!(session.history_prev().as_deref(), Some("second"));
        assert_eq!(session.history_prev().as_deref(), Some("first"));
        assert_eq!(session.history_prev(), None);

        assert_eq!(session.history_next().as_deref(), Some("second"));
        // Stepping past the newest entry clears the line
        assert_eq!(session.history_next().as_deref(), Some(""));
        assert_eq!(session.history_next(), None);
    }

    #[test]
    fn blank_inputs_are_not_recorded() {
        let mut session = ChatSession::new(SYSTEM_PROMPT);
        session.record_history("   ");
        assert_eq!(session.history_prev(), None);
    }

    #[test]
    fn short_replies_pass_through_unchanged() {
        let text = "short reply".to_string();
        assert_eq!(truncate_reply(text.clone()), text);
    }

    #[test]
    fn long_replies_cut_at_a_sentence_boundary() {
        let mut text = "a".repeat(850);
        text.push('.');
        text.push_str(&"b".repeat(500));
        let truncated = truncate_reply(text);
        assert!(truncated.starts_with(&"a".repeat(850)));
        assert!(truncated.contains("... (Response truncated)"));
        assert!(!truncated.contains('b'));
    }

    #[test]
    fn long_replies_without_sentences_cut_hard() {
        let text = "x".repeat(1500);
        let truncated = truncate_reply(text);
        assert!(truncated.ends_with("... (Response truncated)"));
        assert_eq!(
            truncated.chars().filter(|&c| c == 'x').count(),
            1000
        );
    }

    #[test]
    fn transcript_lists_both_speakers() {
        let dir = std::env::temp_dir().join("trinity-transcript-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("transcript.txt");

        let mut session = ChatSession::new(SYSTEM_PROMPT);
        session.push_user("knock knock");
        session.push_assistant("who is there");
        session.save_transcript(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[User]:\nknock knock"));
        assert!(contents.contains("[Assistant]:\nwho is there"));
        assert!(!contents.contains(&SYSTEM_PROMPT[..20]));

        std::fs::remove_file(&path).ok();
    }
}
