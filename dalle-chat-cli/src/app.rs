use crate::client::RelayEvent;
use dalle_chat_shared::{ChatMessage, Intent};
use tracing::{debug, warn};

pub const IMAGE_CAPTION: &str = "Here's your generated image:";
pub const ERROR_MESSAGE: &str = "Sorry, there was an error processing your request.";

/// Stable handle to an entry in the [`Transcript`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId(usize);

/// Append-only message log. Entries are never removed, so a `MessageId`
/// stays valid for the whole session.
#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn push(&mut self, message: ChatMessage) -> MessageId {
        self.entries.push(message);
        MessageId(self.entries.len() - 1)
    }

    pub fn set_content(&mut self, id: MessageId, content: &str) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            entry.content.clear();
            entry.content.push_str(content);
        }
    }

    pub fn replace(&mut self, id: MessageId, message: ChatMessage) {
        if let Some(entry) = self.entries.get_mut(id.0) {
            *entry = message;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Request sent, chat response not open yet.
    Submitting,
    StreamingChat,
    AwaitingImage,
}

/// The assistant message currently receiving chunks.
#[derive(Debug)]
struct StreamTarget {
    id: MessageId,
    buffer: String,
}

/// A submission accepted by [`App::submit`], ready to be sent to the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub message: String,
    pub intent: Intent,
}

pub struct App {
    pub transcript: Transcript,
    pub input: String,
    pub cursor_position: usize,
    pub scroll_offset: usize,
    phase: Phase,
    streaming: Option<StreamTarget>,
}

impl App {
    pub fn new() -> Self {
        Self {
            transcript: Transcript::default(),
            input: String::new(),
            cursor_position: 0,
            scroll_offset: 0,
            phase: Phase::Idle,
            streaming: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Takes the input as a new user message. Returns `None` while a request
    /// is in flight or when the input is blank.
    pub fn submit(&mut self) -> Option<Submission> {
        if self.is_busy() {
            return None;
        }
        let message = self.input.trim().to_string();
        if message.is_empty() {
            return None;
        }

        self.push(ChatMessage::user(message.clone()));
        self.input.clear();
        self.cursor_position = 0;

        let intent = Intent::classify(&message);
        self.phase = match intent {
            Intent::Image => Phase::AwaitingImage,
            Intent::Chat => Phase::Submitting,
        };
        debug!("Submitted {:?} request, phase {:?}", intent, self.phase);

        Some(Submission { message, intent })
    }

    pub fn apply(&mut self, event: RelayEvent) {
        match event {
            RelayEvent::StreamOpened => {
                if self.phase != Phase::Submitting {
                    warn!("Stream opened while {:?}, ignoring", self.phase);
                    return;
                }
                let id = self.push(ChatMessage::assistant(""));
                debug!("Streaming into message {} of {}", id.0, self.transcript.len());
                self.streaming = Some(StreamTarget {
                    id,
                    buffer: String::new(),
                });
                self.phase = Phase::StreamingChat;
            }
            RelayEvent::Chunk(text) => {
                let Some(target) = self.streaming.as_mut() else {
                    warn!("Chunk with no streaming target, dropping");
                    return;
                };
                target.buffer.push_str(&text);
                self.transcript.set_content(target.id, &target.buffer);
                self.scroll_to_bottom();
            }
            RelayEvent::StreamEnded => {
                if let Some(target) = self.streaming.take() {
                    debug!("Stream finished with {} chars", target.buffer.len());
                }
                self.phase = Phase::Idle;
            }
            RelayEvent::Image(url) => {
                if self.phase != Phase::AwaitingImage {
                    warn!("Image arrived while {:?}, ignoring", self.phase);
                    return;
                }
                self.push(ChatMessage::image(IMAGE_CAPTION, url));
                self.phase = Phase::Idle;
            }
            RelayEvent::Failed(reason) => {
                if !self.is_busy() {
                    warn!("Failure with no request in flight: {}", reason);
                    return;
                }
                warn!("Request failed: {}", reason);
                let error = ChatMessage::assistant(ERROR_MESSAGE);
                match self.streaming.take() {
                    Some(target) => self.transcript.replace(target.id, error),
                    None => {
                        self.transcript.push(error);
                    }
                }
                self.scroll_to_bottom();
                self.phase = Phase::Idle;
            }
        }
    }

    fn push(&mut self, message: ChatMessage) -> MessageId {
        let id = self.transcript.push(message);
        self.scroll_to_bottom();
        id
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor_position = self.input.chars().count();
    }

    pub fn insert_char(&mut self, c: char) {
        if self.is_busy() {
            return;
        }
        let at = self.byte_index();
        self.input.insert(at, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.is_busy() || self.cursor_position == 0 {
            return;
        }
        self.cursor_position -= 1;
        let at = self.byte_index();
        self.input.remove(at);
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn scroll_up(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(amount);
    }

    pub fn scroll_down(&mut self, amount: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(amount);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dalle_chat_shared::MessageRole;

    fn app_with_input(input: &str) -> App {
        let mut app = App::new();
        for c in input.chars() {
            app.insert_char(c);
        }
        app
    }

    fn contents(app: &App) -> Vec<&str> {
        app.transcript.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn submit_appends_user_message_and_locks_input() {
        let mut app = app_with_input("  what is the capital of France  ");

        let submission = app.submit().unwrap();

        assert_eq!(submission.message, "what is the capital of France");
        assert_eq!(submission.intent, Intent::Chat);
        assert_eq!(app.transcript.len(), 1);
        assert_eq!(app.transcript.iter().next().unwrap().role, MessageRole::User);
        assert!(app.input.is_empty());
        assert_eq!(app.phase(), Phase::Submitting);

        app.insert_char('x');
        assert!(app.input.is_empty());
        assert!(app.submit().is_none());
    }

    #[test]
    fn blank_input_is_not_submitted() {
        let mut app = app_with_input("   ");
        assert!(app.submit().is_none());
        assert!(app.transcript.is_empty());
        assert!(!app.is_busy());
    }

    #[test]
    fn streamed_chunks_rewrite_one_placeholder() {
        let mut app = app_with_input("say hello");
        app.submit().unwrap();

        app.apply(RelayEvent::StreamOpened);
        assert_eq!(contents(&app), vec!["say hello", ""]);
        assert_eq!(app.phase(), Phase::StreamingChat);

        let mut seen = vec![contents(&app)[1].to_string()];
        for chunk in ["Hel", "lo"] {
            app.apply(RelayEvent::Chunk(chunk.to_string()));
            assert_eq!(app.transcript.len(), 2);
            seen.push(contents(&app)[1].to_string());
        }
        assert_eq!(seen, vec!["", "Hel", "Hello"]);

        app.apply(RelayEvent::StreamEnded);
        assert_eq!(contents(&app), vec!["say hello", "Hello"]);
        assert!(!app.is_busy());
    }

    #[test]
    fn image_response_appends_captioned_message() {
        let mut app = app_with_input("can you generate an image of a sunset");
        let submission = app.submit().unwrap();
        assert_eq!(submission.intent, Intent::Image);
        assert_eq!(app.phase(), Phase::AwaitingImage);

        app.apply(RelayEvent::Image("https://example.com/img.png".to_string()));

        assert_eq!(app.transcript.len(), 2);
        let reply = app.transcript.iter().last().unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, IMAGE_CAPTION);
        assert_eq!(reply.image_url.as_deref(), Some("https://example.com/img.png"));
        assert!(!app.is_busy());
    }

    #[test]
    fn failure_before_stream_appends_one_error() {
        let mut app = app_with_input("draw me a picture of a cat");
        app.submit().unwrap();

        app.apply(RelayEvent::Failed("500".to_string()));

        assert_eq!(contents(&app), vec!["draw me a picture of a cat", ERROR_MESSAGE]);
        assert!(!app.is_busy());
        assert!(app.submit().is_none());
        app.insert_char('a');
        assert_eq!(app.input, "a");
    }

    #[test]
    fn failure_mid_stream_replaces_partial_reply() {
        let mut app = app_with_input("tell me a story");
        app.submit().unwrap();
        app.apply(RelayEvent::StreamOpened);
        app.apply(RelayEvent::Chunk("Once upon".to_string()));

        app.apply(RelayEvent::Failed("connection reset".to_string()));

        assert_eq!(contents(&app), vec!["tell me a story", ERROR_MESSAGE]);
        assert!(!app.is_busy());

        // late events from the dead request change nothing
        app.apply(RelayEvent::Chunk(" a time".to_string()));
        app.apply(RelayEvent::Failed("again".to_string()));
        assert_eq!(contents(&app), vec!["tell me a story", ERROR_MESSAGE]);
    }

    #[test]
    fn transcript_changes_scroll_to_bottom() {
        let mut app = app_with_input("hi");
        app.submit().unwrap();
        app.apply(RelayEvent::StreamOpened);

        app.scroll_up(5);
        app.apply(RelayEvent::Chunk("hello".to_string()));
        assert_eq!(app.scroll_offset, 0);

        app.scroll_up(3);
        app.apply(RelayEvent::StreamEnded);
        app.insert_char('x');
        assert_eq!(app.scroll_offset, 3);
        app.submit().unwrap();
        assert_eq!(app.scroll_offset, 0);
    }

    #[test]
    fn cursor_edits_respect_multibyte_input() {
        let mut app = app_with_input("héllo");
        app.move_cursor_left();
        app.move_cursor_left();
        app.delete_char();
        assert_eq!(app.input, "hélo");
        app.move_cursor_home();
        app.insert_char('¡');
        assert_eq!(app.input, "¡hélo");
        app.move_cursor_end();
        assert_eq!(app.cursor_position, 5);
    }
}
