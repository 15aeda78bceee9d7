//! Turn processing: user input in, analysis and replies out.
//!
//! The [`TurnProcessor`] is the only owner of the conversation history.
//! Response and voice-capture work runs on spawned tasks that never touch
//! the history; each task reports a single [`TaskOutcome`] over a channel,
//! and the owner applies it with [`TurnProcessor::apply`]. Presentation
//! updates go out as [`ChatEvent`]s on a broadcast channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use crate::{
    analysis::Analyzer,
    conversation::{CONTEXT_WINDOW, Conversation},
    error::{Error, Result},
    events::{ChatEvent, Sender},
    responder::{DEFAULT_SYSTEM_PROMPT, GenerationError, Responder, ResponseRequest},
    speech::{
        LISTEN_TIMEOUT, ListenError, PHRASE_LIMIT, SpeechError, SpeechOutput, SpeechRecognizer,
        SpeechSynthesizer, VoiceGender,
    },
};

/// Input that ends the session
pub const EXIT_COMMAND: &str = "exit";

/// Turn processor configuration
#[derive(Debug, Clone)]
pub struct TurnConfig {
    /// System preamble for every request
    pub system_prompt: String,
    /// Number of history entries sent as context
    pub context_window: usize,
    /// How long to wait for speech to start
    pub listen_timeout: Duration,
    /// Longest phrase captured per listen
    pub phrase_limit: Duration,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            context_window: CONTEXT_WINDOW,
            listen_timeout: LISTEN_TIMEOUT,
            phrase_limit: PHRASE_LIMIT,
        }
    }
}

/// Result of work done off the owning task
#[derive(Debug)]
pub enum TaskOutcome {
    /// A response task finished
    Response { turn: u64, result: Result<String> },
    /// A voice capture finished
    Voice { result: Result<String> },
    /// The speech worker failed to speak an utterance
    Speech(SpeechError),
}

/// What `submit_user_text` did with its input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// A turn was started
    Started { turn: u64 },
    /// The input was the exit command
    Shutdown,
}

/// Whether the session should keep going after an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

/// Sends exactly one outcome for a spawned task, even if the task panics
/// or is dropped before finishing.
struct OutcomeGuard {
    tx: Option<mpsc::UnboundedSender<TaskOutcome>>,
    turn: Option<u64>,
}

impl OutcomeGuard {
    fn response(turn: u64, tx: mpsc::UnboundedSender<TaskOutcome>) -> Self {
        Self {
            tx: Some(tx),
            turn: Some(turn),
        }
    }

    fn voice(tx: mpsc::UnboundedSender<TaskOutcome>) -> Self {
        Self {
            tx: Some(tx),
            turn: None,
        }
    }

    fn outcome(&self, result: Result<String>) -> TaskOutcome {
        match self.turn {
            Some(turn) => TaskOutcome::Response { turn, result },
            None => TaskOutcome::Voice { result },
        }
    }

    fn finish(mut self, result: Result<String>) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(self.outcome(result));
        }
    }
}

impl Drop for OutcomeGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            tracing::warn!(turn = ?self.turn, "task ended without an outcome");
            let error: Error = match self.turn {
                Some(_) => GenerationError::Interrupted.into(),
                None => ListenError::Device("capture ended unexpectedly".into()).into(),
            };
            let _ = tx.send(self.outcome(Err(error)));
        }
    }
}

/// Orchestrates turns between the presentation layer, the analyzer, the
/// responder and speech.
pub struct TurnProcessor {
    config: TurnConfig,
    conversation: Conversation,
    analyzer: Arc<dyn Analyzer>,
    responder: Arc<dyn Responder>,
    recognizer: Arc<dyn SpeechRecognizer>,
    speech: SpeechOutput,
    event_tx: broadcast::Sender<ChatEvent>,
    outcome_tx: mpsc::UnboundedSender<TaskOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<TaskOutcome>,
    in_flight: usize,
    next_turn: u64,
}

impl TurnProcessor {
    /// Create a processor and start its speech worker
    pub fn new(
        config: TurnConfig,
        analyzer: Arc<dyn Analyzer>,
        responder: Arc<dyn Responder>,
        recognizer: Arc<dyn SpeechRecognizer>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Result<Self> {
        let (event_tx, _) = broadcast::channel(256);
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let speech_tx = outcome_tx.clone();
        let speech = SpeechOutput::spawn(synthesizer, move |e| {
            let _ = speech_tx.send(TaskOutcome::Speech(e));
        })?;

        Ok(Self {
            config,
            conversation: Conversation::new(),
            analyzer,
            responder,
            recognizer,
            speech,
            event_tx,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
            next_turn: 0,
        })
    }

    /// Subscribe to presentation events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.event_tx.subscribe()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn config(&self) -> &TurnConfig {
        &self.config
    }

    pub fn speech(&self) -> &SpeechOutput {
        &self.speech
    }

    /// Number of response and voice tasks still running
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.event_tx.send(event);
    }

    fn emit_error(&self, error: Error) {
        tracing::warn!(kind = ?error.kind(), "{}", error);
        self.emit(ChatEvent::Error {
            kind: error.kind(),
            message: error.to_string(),
        });
    }

    /// Handle a line of user input.
    ///
    /// Records the turn, shows it, analyzes it and starts a response task.
    /// The exit command only signals shutdown.
    pub fn submit_user_text(&mut self, text: &str) -> Submission {
        if text.eq_ignore_ascii_case(EXIT_COMMAND) {
            tracing::debug!("exit requested");
            self.emit(ChatEvent::Shutdown);
            return Submission::Shutdown;
        }

        self.conversation.push_user(text);
        self.emit(ChatEvent::Message {
            sender: Sender::User,
            text: text.to_string(),
        });

        match self.analyzer.analyze(text) {
            Ok(result) => self.emit(ChatEvent::Analysis { result }),
            Err(e) => self.emit_error(e.into()),
        }

        self.emit(ChatEvent::Typing { active: true });
        let turn = self.spawn_response(text);
        Submission::Started { turn }
    }

    fn spawn_response(&mut self, text: &str) -> u64 {
        let turn = self.next_turn;
        self.next_turn += 1;
        self.in_flight += 1;

        let system_prompt = self.config.system_prompt.clone();
        let context = self.conversation.recent(self.config.context_window).to_vec();
        let user_text = text.to_string();
        let analyzer = Arc::clone(&self.analyzer);
        let responder = Arc::clone(&self.responder);
        let guard = OutcomeGuard::response(turn, self.outcome_tx.clone());

        tracing::debug!(turn, context = context.len(), "starting response task");
        tokio::spawn(async move {
            let result: std::result::Result<String, GenerationError> = async {
                let entities = analyzer.extract_entities(&user_text)?;
                let request = ResponseRequest {
                    system_prompt,
                    context,
                    user_text,
                    entities,
                };
                responder.respond(&request).await
            }
            .await;
            guard.finish(result.map_err(Error::from));
        });

        turn
    }

    /// Start a one-shot listen in the background
    pub fn start_voice_capture(&mut self) {
        self.in_flight += 1;
        self.emit(ChatEvent::Listening { active: true });

        let recognizer = Arc::clone(&self.recognizer);
        let timeout = self.config.listen_timeout;
        let phrase_limit = self.config.phrase_limit;
        let guard = OutcomeGuard::voice(self.outcome_tx.clone());

        tokio::spawn(async move {
            let result = recognizer.listen(timeout, phrase_limit).await;
            guard.finish(result.map_err(Error::from));
        });
    }

    /// Wait for the next task outcome
    pub async fn next_outcome(&mut self) -> Option<TaskOutcome> {
        self.outcome_rx.recv().await
    }

    /// Apply a task outcome to the history and the presentation
    pub fn apply(&mut self, outcome: TaskOutcome) -> Flow {
        match outcome {
            TaskOutcome::Response { turn, result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                match result {
                    Ok(reply) => {
                        tracing::debug!(turn, chars = reply.chars().count(), "reply received");
                        self.conversation.push_assistant(reply.clone());
                        self.emit(ChatEvent::Message {
                            sender: Sender::Assistant,
                            text: reply.clone(),
                        });
                        self.speech.speak(reply);
                    }
                    Err(e) => self.emit_error(e),
                }
                self.emit(ChatEvent::Typing { active: false });
                Flow::Continue
            }
            TaskOutcome::Voice { result } => {
                self.in_flight = self.in_flight.saturating_sub(1);
                let flow = match result {
                    Ok(text) => {
                        self.emit(ChatEvent::VoiceTranscript { text: text.clone() });
                        match self.submit_user_text(spoken_input(&text)) {
                            Submission::Started { .. } => Flow::Continue,
                            Submission::Shutdown => Flow::Shutdown,
                        }
                    }
                    Err(e) => {
                        self.emit_error(e);
                        Flow::Continue
                    }
                };
                self.emit(ChatEvent::Listening { active: false });
                flow
            }
            TaskOutcome::Speech(e) => {
                self.emit_error(Error::SpeechOutput(e));
                Flow::Continue
            }
        }
    }

    /// Apply outcomes until no task is left running
    pub async fn settle(&mut self) -> Flow {
        while self.in_flight > 0 {
            let Some(outcome) = self.outcome_rx.recv().await else {
                break;
            };
            if self.apply(outcome) == Flow::Shutdown {
                return Flow::Shutdown;
            }
        }
        Flow::Continue
    }

    /// Apply every outcome that is already waiting, without blocking
    pub fn drain_ready(&mut self) -> Flow {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if self.apply(outcome) == Flow::Shutdown {
                return Flow::Shutdown;
            }
        }
        Flow::Continue
    }

    /// Forget the conversation
    pub fn clear_history(&mut self) {
        self.conversation.clear();
        self.emit(ChatEvent::HistoryCleared);
    }

    pub fn change_voice(&self, gender: VoiceGender) {
        match self.speech.set_voice(gender) {
            Ok(()) => tracing::debug!(%gender, "voice changed"),
            Err(e) => self.emit_error(Error::VoiceChange(e)),
        }
    }

    pub fn set_speech_rate(&self, wpm: u32) {
        if let Err(e) = self.speech.set_rate(wpm) {
            self.emit_error(Error::VoiceChange(e));
        }
    }

    pub fn set_speech_volume(&self, volume: f32) {
        if let Err(e) = self.speech.set_volume(volume) {
            self.emit_error(Error::VoiceChange(e));
        }
    }

    /// Silence current and queued speech
    pub fn stop_speaking(&self) {
        self.speech.stop_all();
    }

    /// Echo a selected history entry into the conversation view
    pub fn recall_history_item(&self, entry: &str) {
        self.emit(ChatEvent::Notice {
            text: format!("Loading history: {entry}"),
        });
    }
}

/// Transcribers punctuate, so "Exit." has to count as the exit command
fn spoken_input(transcript: &str) -> &str {
    let bare = transcript.trim_end_matches(['.', '!', '?']).trim_end();
    if bare.eq_ignore_ascii_case(EXIT_COMMAND) {
        bare
    } else {
        transcript
    }
}
