//! Plain stdin/stdout modes: single command and line console

use crate::commands::{self, CommandResult, VoiceCommand};
use crate::utils::describe_entities;
use iris_agent::{ChatEvent, DisplayHistory, Flow, Sender, Submission, TurnProcessor, VoiceGender};
use iris_ai::Model;
use std::io::{self, Write};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

/// Render an event as a console line. Returns `None` for events that have
/// nothing to print.
pub fn format_event(event: &ChatEvent) -> Option<String> {
    match event {
        // The user's own text is already on screen
        ChatEvent::Message {
            sender: Sender::User,
            ..
        } => None,
        ChatEvent::Message { sender, text } => Some(format!("{}: {}", sender.display_name(), text)),
        ChatEvent::Typing { active: true } => Some("[Iris is typing...]".to_string()),
        ChatEvent::Listening { active: true } => Some("[Listening...]".to_string()),
        ChatEvent::Typing { active: false } | ChatEvent::Listening { active: false } => None,
        ChatEvent::Analysis { result } => Some(format!(
            "[sentiment: {} | complexity: {} | keywords: {} | entities: {}]",
            result.sentiment,
            result.complexity,
            if result.keywords.is_empty() {
                "none".to_string()
            } else {
                result.keywords.join(", ")
            },
            describe_entities(
                result
                    .named_entities
                    .iter()
                    .map(|e| (e.text.as_str(), e.label.as_str()))
            ),
        )),
        ChatEvent::VoiceTranscript { text } => Some(format!("You (voice): {}", text)),
        ChatEvent::Error { message, .. } => Some(message.clone()),
        ChatEvent::Notice { text } => Some(text.clone()),
        ChatEvent::HistoryCleared => Some("Conversation cleared.".to_string()),
        ChatEvent::Shutdown => None,
    }
}

fn print_event(event: &ChatEvent) {
    let Some(line) = format_event(event) else {
        return;
    };
    if matches!(event, ChatEvent::Error { .. }) {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

/// Hand every event that is already queued to `on_event`
fn drain_events(events: &mut broadcast::Receiver<ChatEvent>, on_event: &mut impl FnMut(&ChatEvent)) {
    loop {
        match events.try_recv() {
            Ok(event) => on_event(&event),
            Err(TryRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "console fell behind");
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => break,
        }
    }
}

/// Wait until the speech queue has played out, applying speech failures as
/// they are reported
async fn wait_for_speech(
    processor: &mut TurnProcessor,
    events: &mut broadcast::Receiver<ChatEvent>,
    mut on_event: impl FnMut(&ChatEvent),
) {
    loop {
        let busy = processor.speech().is_speaking() || processor.speech().pending() > 0;
        processor.drain_ready();
        drain_events(events, &mut on_event);
        if !busy {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Send one prompt, print everything it produced and wait for the reply to
/// be spoken
pub async fn run_command(processor: &mut TurnProcessor, command: &str) -> anyhow::Result<()> {
    println!("iris> {}", command);
    println!();

    let mut events = processor.subscribe();
    if let Submission::Started { turn } = processor.submit_user_text(command.trim()) {
        tracing::debug!(turn, "waiting for reply");
        processor.settle().await;
    }

    drain_events(&mut events, &mut print_event);
    wait_for_speech(processor, &mut events, print_event).await;
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}

/// Line console: reads stdin while replies arrive in the background
pub async fn run_interactive(
    processor: &mut TurnProcessor,
    model: &Model,
    voice: VoiceGender,
) -> anyhow::Result<()> {
    if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        eprintln!("iris ({}) - /help for commands", model.id);
        eprintln!();
    }

    let mut events = processor.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history = DisplayHistory::new();
    let mut voice = voice;
    prompt()?;

    loop {
        tokio::select! {
            Some(outcome) = processor.next_outcome() => {
                if processor.apply(outcome) == Flow::Shutdown {
                    break;
                }
            }
            event = events.recv() => {
                let event = match event {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "console fell behind");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                if event.is_terminal() {
                    break;
                }
                match &event {
                    ChatEvent::Message { sender, text } => {
                        history.record(sender.display_name(), text);
                    }
                    ChatEvent::HistoryCleared => history.clear(),
                    _ => {}
                }
                print_event(&event);
                if matches!(event, ChatEvent::Message { sender: Sender::Assistant, .. }) {
                    prompt()?;
                }
            }
            line = lines.next_line() => {
                // EOF
                let Some(line) = line? else {
                    break;
                };
                let input = line.trim();
                if input.is_empty() {
                    prompt()?;
                    continue;
                }

                match commands::execute_command(input, voice) {
                    None => {
                        if processor.submit_user_text(input) == Submission::Shutdown {
                            break;
                        }
                        continue;
                    }
                    Some(CommandResult::Exit) => break,
                    Some(CommandResult::Clear) => processor.clear_history(),
                    Some(CommandResult::SetVoice(gender)) => {
                        processor.change_voice(gender);
                        voice = gender;
                        println!("Voice set to {}.", gender);
                    }
                    Some(CommandResult::OpenVoiceSelector) => {
                        println!("{}", VoiceCommand::describe(voice));
                    }
                    Some(CommandResult::SetRate(wpm)) => {
                        processor.set_speech_rate(wpm);
                        println!("Speaking rate set to {} words per minute.", wpm);
                    }
                    Some(CommandResult::SetVolume(volume)) => {
                        processor.set_speech_volume(volume);
                        println!("Volume set to {:.0}%.", volume * 100.0);
                    }
                    Some(CommandResult::SetTheme(_)) => {
                        println!("Themes apply to the full-screen interface.");
                    }
                    Some(CommandResult::Listen) => processor.start_voice_capture(),
                    Some(CommandResult::StopSpeaking) => processor.stop_speaking(),
                    Some(CommandResult::History) => {
                        if history.is_empty() {
                            println!("No messages yet.");
                        }
                        for (i, entry) in history.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, entry);
                        }
                    }
                    Some(CommandResult::Message(msg)) => println!("{}", msg),
                    Some(CommandResult::Unknown(cmd)) => {
                        println!("Unknown command: /{}", cmd);
                        println!("Type /help for available commands.");
                    }
                }
                prompt()?;
            }
        }
    }

    processor.stop_speaking();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use iris_agent::responder::GenerationError;
    use iris_agent::speech::{ListenError, SpeechError};
    use iris_agent::{
        AnalysisResult, Complexity, Entity, ErrorKind, LexiconAnalyzer, Responder,
        ResponseRequest, Sentiment, SpeechRecognizer, SpeechSynthesizer, TurnConfig,
    };
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    struct EchoResponder;

    #[async_trait]
    impl Responder for EchoResponder {
        async fn respond(&self, request: &ResponseRequest) -> Result<String, GenerationError> {
            Ok(format!("echo: {}", request.user_text))
        }
    }

    struct DeafRecognizer;

    #[async_trait]
    impl SpeechRecognizer for DeafRecognizer {
        async fn listen(
            &self,
            _timeout: Duration,
            _phrase_limit: Duration,
        ) -> Result<String, ListenError> {
            Err(ListenError::NoMatch)
        }
    }

    struct BrokenSpeaker;

    impl SpeechSynthesizer for BrokenSpeaker {
        fn speak(&self, _text: &str, _cancel: &CancellationToken) -> Result<(), SpeechError> {
            Err(SpeechError::Engine("no audio device".into()))
        }

        fn set_voice(&self, _gender: VoiceGender) -> Result<(), SpeechError> {
            Ok(())
        }

        fn set_rate(&self, _wpm: u32) -> Result<(), SpeechError> {
            Ok(())
        }

        fn set_volume(&self, _volume: f32) -> Result<(), SpeechError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_speech_failure_while_waiting_is_reported() {
        let mut processor = TurnProcessor::new(
            TurnConfig::default(),
            Arc::new(LexiconAnalyzer::new()),
            Arc::new(EchoResponder),
            Arc::new(DeafRecognizer),
            Arc::new(BrokenSpeaker),
        )
        .unwrap();
        let mut events = processor.subscribe();
        processor.submit_user_text("hello");
        processor.settle().await;

        let mut seen = Vec::new();
        drain_events(&mut events, &mut |e: &ChatEvent| seen.push(e.clone()));
        assert!(seen.contains(&ChatEvent::Message {
            sender: Sender::Assistant,
            text: "echo: hello".into()
        }));

        seen.clear();
        tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_speech(&mut processor, &mut events, |e| seen.push(e.clone())),
        )
        .await
        .unwrap();
        assert!(seen.iter().any(|e| matches!(
            e,
            ChatEvent::Error { kind: ErrorKind::SpeechOutput, message }
                if message.ends_with("no audio device")
        )));
    }

    #[test]
    fn test_user_messages_are_not_echoed() {
        let event = ChatEvent::Message {
            sender: Sender::User,
            text: "hi".into(),
        };
        assert_eq!(format_event(&event), None);
        let event = ChatEvent::Message {
            sender: Sender::Assistant,
            text: "Hello!".into(),
        };
        assert_eq!(format_event(&event).as_deref(), Some("Iris: Hello!"));
    }

    #[test]
    fn test_analysis_line() {
        let event = ChatEvent::Analysis {
            result: AnalysisResult {
                sentiment: Sentiment::Positive,
                keywords: vec!["paris".into(), "love".into()],
                named_entities: vec![Entity::new("Paris", "GPE")],
                complexity: Complexity::Low,
            },
        };
        assert_eq!(
            format_event(&event).as_deref(),
            Some("[sentiment: positive | complexity: Low | keywords: paris, love | entities: Paris (GPE)]")
        );
    }

    #[test]
    fn test_indicators_and_errors() {
        assert_eq!(
            format_event(&ChatEvent::Typing { active: true }).as_deref(),
            Some("[Iris is typing...]")
        );
        assert_eq!(format_event(&ChatEvent::Typing { active: false }), None);
        assert_eq!(format_event(&ChatEvent::Listening { active: false }), None);
        let error = ChatEvent::Error {
            kind: ErrorKind::SpeechInput,
            message: "Error processing voice input: Sorry, I couldn't understand that.".into(),
        };
        assert_eq!(
            format_event(&error).as_deref(),
            Some("Error processing voice input: Sorry, I couldn't understand that.")
        );
        assert_eq!(format_event(&ChatEvent::Shutdown), None);
    }
}
