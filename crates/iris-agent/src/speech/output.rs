//! Single-threaded FIFO speech output.

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use tokio_util::sync::CancellationToken;

use super::{SpeechError, SpeechSynthesizer, VoiceGender};

type ErrorSink = Box<dyn Fn(SpeechError) + Send + 'static>;

struct QueueState {
    pending: VecDeque<String>,
    /// Token for the utterance being spoken, if any
    current: Option<CancellationToken>,
}

struct Shared {
    state: Mutex<QueueState>,
    wake: Condvar,
}

/// Handle to the speech worker.
///
/// Cloning is cheap; every clone feeds the same queue and worker.
#[derive(Clone)]
pub struct SpeechOutput {
    shared: Arc<Shared>,
    engine: Arc<dyn SpeechSynthesizer>,
}

impl SpeechOutput {
    /// Start the worker thread. `on_error` is called on the worker for each
    /// failed utterance.
    pub fn spawn(
        engine: Arc<dyn SpeechSynthesizer>,
        on_error: impl Fn(SpeechError) + Send + 'static,
    ) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                current: None,
            }),
            wake: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker_engine = Arc::clone(&engine);
        let on_error: ErrorSink = Box::new(on_error);
        thread::Builder::new()
            .name("iris-speech".into())
            .spawn(move || run_worker(worker_shared, worker_engine, on_error))?;

        Ok(Self { shared, engine })
    }

    /// Queue text to be spoken after everything already queued
    pub fn speak(&self, text: impl Into<String>) {
        let mut state = self.shared.state.lock();
        state.pending.push_back(text.into());
        self.shared.wake.notify_one();
    }

    /// Drop everything queued and cut off the current utterance
    pub fn stop_all(&self) {
        let mut state = self.shared.state.lock();
        let dropped = state.pending.len();
        state.pending.clear();
        if let Some(current) = &state.current {
            current.cancel();
        }
        tracing::debug!(dropped, "speech stopped");
    }

    /// Number of utterances waiting behind the current one
    pub fn pending(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Whether an utterance is being spoken right now
    pub fn is_speaking(&self) -> bool {
        self.shared.state.lock().current.is_some()
    }

    pub fn set_voice(&self, gender: VoiceGender) -> Result<(), SpeechError> {
        self.engine.set_voice(gender)
    }

    pub fn set_rate(&self, wpm: u32) -> Result<(), SpeechError> {
        self.engine.set_rate(wpm)
    }

    pub fn set_volume(&self, volume: f32) -> Result<(), SpeechError> {
        self.engine.set_volume(volume)
    }
}

fn run_worker(shared: Arc<Shared>, engine: Arc<dyn SpeechSynthesizer>, on_error: ErrorSink) {
    loop {
        let (text, token) = {
            let mut state = shared.state.lock();
            while state.pending.is_empty() {
                shared.wake.wait(&mut state);
            }
            let Some(text) = state.pending.pop_front() else {
                continue;
            };
            let token = CancellationToken::new();
            state.current = Some(token.clone());
            (text, token)
        };

        if let Err(e) = engine.speak(&text, &token) {
            tracing::warn!(error = %e, "speech synthesis failed");
            on_error(e);
        }

        shared.state.lock().current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    /// Records utterances; each one blocks until released or cancelled.
    #[derive(Default)]
    struct GatedSynthesizer {
        spoken: Mutex<Vec<String>>,
        cancelled: Mutex<Vec<String>>,
        gate: Mutex<bool>,
        active: Mutex<u32>,
        max_active: Mutex<u32>,
    }

    impl GatedSynthesizer {
        fn open(&self) {
            *self.gate.lock() = true;
        }
    }

    impl SpeechSynthesizer for GatedSynthesizer {
        fn speak(&self, text: &str, cancel: &CancellationToken) -> Result<(), SpeechError> {
            {
                let mut active = self.active.lock();
                *active += 1;
                let mut max = self.max_active.lock();
                *max = (*max).max(*active);
            }
            loop {
                if cancel.is_cancelled() {
                    self.cancelled.lock().push(text.to_string());
                    break;
                }
                if *self.gate.lock() {
                    self.spoken.lock().push(text.to_string());
                    break;
                }
                thread::sleep(Duration::from_millis(2));
            }
            *self.active.lock() -= 1;
            if text == "fail" {
                return Err(SpeechError::Engine("boom".into()));
            }
            Ok(())
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

    fn wait_until(mut condition: impl FnMut() -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !condition() {
            assert!(Instant::now() < deadline, "condition not reached in time");
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn test_utterances_play_in_order_one_at_a_time() {
        let engine = Arc::new(GatedSynthesizer::default());
        let output = SpeechOutput::spawn(engine.clone(), |_| {}).unwrap();

        for i in 0..5 {
            output.speak(format!("line {i}"));
        }
        engine.open();
        wait_until(|| engine.spoken.lock().len() == 5);

        let expected: Vec<String> = (0..5).map(|i| format!("line {i}")).collect();
        assert_eq!(*engine.spoken.lock(), expected);
        assert_eq!(*engine.max_active.lock(), 1);
        wait_until(|| !output.is_speaking());
        assert_eq!(output.pending(), 0);
    }

    #[test]
    fn test_stop_all_clears_queue_and_halts_current() {
        let engine = Arc::new(GatedSynthesizer::default());
        let output = SpeechOutput::spawn(engine.clone(), |_| {}).unwrap();

        output.speak("playing");
        wait_until(|| output.is_speaking());
        for i in 0..3 {
            output.speak(format!("queued {i}"));
        }
        assert_eq!(output.pending(), 3);

        output.stop_all();
        assert_eq!(output.pending(), 0);
        wait_until(|| engine.cancelled.lock().len() == 1);
        assert_eq!(*engine.cancelled.lock(), vec!["playing".to_string()]);

        // The worker is still alive for later utterances
        engine.open();
        output.speak("after stop");
        wait_until(|| engine.spoken.lock().len() == 1);
        assert_eq!(*engine.spoken.lock(), vec!["after stop".to_string()]);
    }

    #[test]
    fn test_failures_are_reported_and_worker_continues() {
        let engine = Arc::new(GatedSynthesizer::default());
        engine.open();
        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = errors.clone();
        let output = SpeechOutput::spawn(engine.clone(), move |e| sink.lock().push(e)).unwrap();

        output.speak("fail");
        output.speak("fine");
        wait_until(|| engine.spoken.lock().len() == 2);
        wait_until(|| errors.lock().len() == 1);
        assert_eq!(errors.lock()[0], SpeechError::Engine("boom".into()));
    }
}
