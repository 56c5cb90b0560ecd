// TUI application state
//
// The App serializes one request/response/animate cycle at a time: a
// submission spawns one background request task, the render loop polls its
// oneshot receiver every tick, and the reply is handed to the animator
// exactly once. While either the request or the animation is active, new
// submissions bounce off with a toast.

use super::input::InputLine;
use super::modal::Modal;
use super::toast::Toast;
use crate::commands::Command;
use crate::config::Config;
use crate::demo;
use crate::llm::LlmClient;
use crate::rain::{Grid, RevealAnimator};
use crate::session::{self, ChatSession};
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Hard cap on per-request response tokens; the baseline from config is
/// raised by a rough prompt-length estimate up to this
const RESPONSE_TOKEN_CAP: u32 = 300;

/// What the request worker hands back
type ReplyResult = Result<String, String>;

/// Single-slot handoff from the request worker to the render loop
pub struct PendingReply {
    rx: oneshot::Receiver<ReplyResult>,
    task: JoinHandle<()>,
    started: Instant,
}

/// Main application state for the TUI
pub struct App {
    pub config: Config,
    pub session: ChatSession,

    /// Character buffer for the rain pane
    pub grid: Grid,

    /// Current animation run, if any; kept after finishing so the settled
    /// text stays on screen
    pub animator: Option<RevealAnimator>,

    /// Outstanding completion request, at most one
    pub pending: Option<PendingReply>,

    pub input: InputLine,
    pub modal: Option<Modal>,
    pub toast: Option<Toast>,
    pub should_quit: bool,

    /// None in demo mode
    client: Option<Arc<LlmClient>>,

    /// Counts demo submissions to rotate canned replies
    demo_turn: usize,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let client = match (&config.api_key, config.demo_mode) {
            (Some(key), false) => Some(Arc::new(LlmClient::new(
                key.clone(),
                config.api_base.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?)),
            _ => None,
        };
        let session = ChatSession::new(&config.system_prompt);
        Ok(Self {
            config,
            session,
            grid: Grid::new(80, 24),
            animator: None,
            pending: None,
            input: InputLine::default(),
            modal: None,
            toast: None,
            should_quit: false,
            client,
            demo_turn: 0,
        })
    }

    /// A request is in flight or an animation is still running
    pub fn busy(&self) -> bool {
        self.pending.is_some() || self.animator.as_ref().is_some_and(|a| !a.is_finished())
    }

    /// Start animating a message on the current viewport
    pub fn reveal(&mut self, text: &str) {
        let animator = RevealAnimator::new(text, self.grid.width(), self.grid.height());
        self.grid.draw_frame(animator.columns(), animator.targets());
        self.animator = Some(animator);
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    /// Confirmation messages go through the animation when the screen is
    /// free, otherwise as a toast so they don't cut a running reveal short
    fn announce(&mut self, text: impl Into<String>) {
        let text = text.into();
        if self.busy() {
            self.show_toast(text);
        } else {
            self.reveal(&text);
        }
    }

    /// Submit a chat message: one request, one animation, strictly
    /// serialized. Rejects with a toast while either is active.
    pub fn submit(&mut self, text: String) {
        if self.busy() {
            self.show_toast("Hold on - still working on the previous message");
            return;
        }

        self.session.record_history(&text);
        self.session.push_user(&text);
        let max_tokens = (self.config.max_tokens + text.len() as u32 / 4).min(RESPONSE_TOKEN_CAP);

        let (tx, rx) = oneshot::channel();
        let task = if self.config.demo_mode {
            let turn = self.demo_turn;
            self.demo_turn += 1;
            tokio::spawn(async move {
                tokio::time::sleep(demo::RESPONSE_DELAY).await;
                let _ = tx.send(Ok(demo::reply(turn).to_string()));
            })
        } else if let Some(client) = &self.client {
            let client = Arc::clone(client);
            let model = self.config.model.clone();
            let turns = self.session.turns().to_vec();
            tokio::spawn(async move {
                let result = client
                    .complete(&model, &turns, max_tokens)
                    .await
                    .map_err(|e| format!("{:#}", e));
                let _ = tx.send(result);
            })
        } else {
            tokio::spawn(async move {
                let _ = tx.send(Err("no API key configured (set OPENAI_API_KEY)".to_string()));
            })
        };

        tracing::info!(turns = self.session.turn_count(), "dispatched completion request");
        self.pending = Some(PendingReply {
            rx,
            task,
            started: Instant::now(),
        });
    }

    /// One frame of work: poll the outstanding request, advance the
    /// animation, expire the toast. Called from the event loop tick.
    pub fn on_tick(&mut self) {
        self.poll_pending();

        if let Some(animator) = &mut self.animator {
            if !animator.is_finished() {
                animator.tick(Instant::now());
            }
            self.grid.draw_frame(animator.columns(), animator.targets());
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    /// Non-blocking check of the single-slot completion handoff
    fn poll_pending(&mut self) {
        let Some(pending) = &mut self.pending else {
            return;
        };
        match pending.rx.try_recv() {
            Ok(result) => {
                let elapsed = pending.started.elapsed();
                self.pending = None;
                match result {
                    Ok(text) => {
                        tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "reply received");
                        let text = session::truncate_reply(text);
                        self.session.push_assistant(&text);
                        self.reveal(&text);
                    }
                    Err(message) => {
                        tracing::warn!(error = %message, "completion failed");
                        self.reveal(&format!("Error: {}", message));
                    }
                }
            }
            Err(oneshot::error::TryRecvError::Empty) => {}
            Err(oneshot::error::TryRecvError::Closed) => {
                self.pending = None;
                self.reveal("Error: the request worker dropped its reply.");
            }
        }
    }

    /// Apply a parsed slash-command
    pub fn handle_command(&mut self, command: Command) {
        match command {
            Command::Help => self.modal = Some(Modal::help()),
            Command::Quit => self.should_quit = true,
            Command::Clear => {
                self.session.clear();
                self.announce("Conversation history cleared.");
            }
            Command::Save => self.save_transcript(),
            Command::Model(name) => {
                tracing::info!(from = %self.config.model, to = %name, "model switched");
                self.config.model = name;
                self.announce(format!("Model changed to {}.", self.config.model));
            }
            Command::System => {
                let info = self.system_info();
                self.announce(info);
            }
            Command::Color(color) => {
                self.config.color = color;
                self.announce(format!("Rain color changed to {}.", color.name()));
            }
        }
    }

    fn save_transcript(&mut self) {
        let filename = format!(
            "trinity-{}.txt",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        let path = PathBuf::from(filename);
        match self.session.save_transcript(&path) {
            Ok(()) => self.announce(format!("Conversation saved to {}", path.display())),
            Err(e) => self.announce(format!("Error saving conversation: {:#}", e)),
        }
    }

    fn system_info(&self) -> String {
        let key_status = if self.config.demo_mode {
            "demo mode (no key needed)"
        } else if self.config.api_key.is_some() {
            "configured"
        } else {
            "not configured"
        };
        format!(
            "Viewport: {}x{} characters\nCurrent model: {}\nMaximum tokens: {}\nHistory: {} messages\nAPI key: {}",
            self.grid.width(),
            self.grid.height(),
            self.config.model,
            self.config.max_tokens,
            self.session.turn_count(),
            key_status,
        )
    }

    /// Resize the rain pane; a running animation keeps its layout and is
    /// clipped by the grid until the next reveal
    pub fn resize_grid(&mut self, width: u16, height: u16) {
        self.grid.resize(width, height);
        if let Some(animator) = &self.animator {
            self.grid.draw_frame(animator.columns(), animator.targets());
        }
    }

    /// Abort the outstanding request, if any. Best-effort: the worker may
    /// still run to completion, its result is discarded.
    pub fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::RainColor;

    fn demo_config() -> Config {
        Config {
            demo_mode: true,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn second_submission_is_rejected_while_busy() {
        let mut app = App::new(demo_config()).unwrap();
        app.submit("first".to_string());
        assert!(app.busy());
        assert_eq!(app.session.turn_count(), 1);

        app.submit("second".to_string());
        // Rejected: no new turn, a busy toast instead
        assert_eq!(app.session.turn_count(), 1);
        assert!(app.toast.is_some());
        app.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn demo_reply_lands_as_one_animation() {
        let mut app = App::new(demo_config()).unwrap();
        app.submit("hello".to_string());

        // Let the canned-reply worker run its artificial delay
        tokio::time::sleep(demo::RESPONSE_DELAY + Duration::from_millis(100)).await;
        app.on_tick();

        assert!(app.pending.is_none());
        assert_eq!(app.session.turn_count(), 2);
        let animator = app.animator.as_ref().expect("reply should animate");
        assert!(!animator.targets().is_empty());
    }

    #[tokio::test]
    async fn animation_in_progress_counts_as_busy() {
        let mut app = App::new(demo_config()).unwrap();
        app.reveal("welcome message");
        assert!(app.busy());

        app.submit("too early".to_string());
        assert_eq!(app.session.turn_count(), 0);
        assert!(app.toast.is_some());
    }

    #[tokio::test]
    async fn color_command_applies_immediately() {
        let mut app = App::new(demo_config()).unwrap();
        app.handle_command(Command::Color(RainColor::Red));
        assert_eq!(app.config.color, RainColor::Red);
        // Idle screen: the confirmation animates
        assert!(app.animator.is_some());
    }

    #[tokio::test]
    async fn color_command_during_animation_becomes_a_toast() {
        let mut app = App::new(demo_config()).unwrap();
        app.reveal("long welcome message that is still running");
        app.handle_command(Command::Color(RainColor::Cyan));
        assert_eq!(app.config.color, RainColor::Cyan);
        assert!(app.toast.is_some());
    }

    #[tokio::test]
    async fn quit_command_sets_the_flag() {
        let mut app = App::new(demo_config()).unwrap();
        app.handle_command(Command::Quit);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn clear_command_resets_turns() {
        let mut app = App::new(demo_config()).unwrap();
        app.session.push_user("hello");
        app.session.push_assistant("hi");
        app.handle_command(Command::Clear);
        assert_eq!(app.session.turn_count(), 0);
    }
}
