use crate::app::Submission;
use anyhow::Result;
use dalle_chat_shared::{Intent, RelayRequest};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Progress of one submission, reported back to the UI loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    StreamOpened,
    Chunk(String),
    StreamEnded,
    Image(String),
    Failed(String),
}

#[derive(Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    url: String,
}

impl RelayClient {
    pub fn new(url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            url,
        }
    }

    /// Runs the submission on its own task; events arrive on `events`.
    pub fn submit(&self, submission: Submission, events: mpsc::UnboundedSender<RelayEvent>) {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.run(submission, &events).await {
                error!("Relay request failed: {:#}", e);
                let _ = events.send(RelayEvent::Failed(e.to_string()));
            }
        });
    }

    async fn run(
        &self,
        submission: Submission,
        events: &mpsc::UnboundedSender<RelayEvent>,
    ) -> Result<()> {
        info!("Sending {:?} request to {}", submission.intent, self.url);
        let response = self
            .http
            .post(&self.url)
            .json(&RelayRequest::new(submission.message))
            .send()
            .await?
            .error_for_status()?;

        match submission.intent {
            Intent::Image => {
                let url: String = response.json().await?;
                debug!("Received image URL {}", url);
                let _ = events.send(RelayEvent::Image(url));
            }
            Intent::Chat => {
                let _ = events.send(RelayEvent::StreamOpened);
                let mut stream = response.bytes_stream();
                let mut decoder = Utf8Decoder::default();
                while let Some(chunk) = stream.next().await {
                    let text = decoder.decode(&chunk?);
                    if !text.is_empty() && events.send(RelayEvent::Chunk(text)).is_err() {
                        debug!("UI went away, dropping stream");
                        return Ok(());
                    }
                }
                let rest = decoder.finish();
                if !rest.is_empty() {
                    let _ = events.send(RelayEvent::Chunk(rest));
                }
                let _ = events.send(RelayEvent::StreamEnded);
            }
        }
        Ok(())
    }
}

/// Decodes a byte stream as UTF-8 without splitting characters that straddle
/// chunk boundaries.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let mut out = String::new();
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    out.push_str(text);
                    self.pending.clear();
                    return out;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // valid_up_to guarantees this prefix is UTF-8
                    out.push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + bad);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return out;
                        }
                    }
                }
            }
        }
    }

    /// Flushes a trailing incomplete character, if any.
    pub fn finish(&mut self) -> String {
        let rest = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        rest
    }
}
