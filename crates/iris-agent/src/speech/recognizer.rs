//! Microphone capture gated by voice activity detection, transcribed remotely.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use hound::{WavSpec, WavWriter};
use iris_ai::{AudioClip, TranscriptionProvider};
use webrtc_vad::{SampleRate, Vad, VadMode};

use super::{ListenError, SpeechRecognizer};

/// Capture rate; one of the rates the VAD accepts and the rate Whisper prefers
pub const SAMPLE_RATE: u32 = 16_000;
/// 30 ms of audio at [`SAMPLE_RATE`]
pub const FRAME_LEN: usize = 480;
/// Unvoiced frames (0.8 s) that end a phrase
const PAUSE_FRAMES: usize = 27;
/// Unvoiced frames kept ahead of the first voiced one
const PRE_ROLL_FRAMES: usize = 10;

/// A source of 16 kHz mono PCM.
///
/// Samples flow into `samples` until the returned handle is dropped.
pub trait Microphone: Send + Sync + 'static {
    type Handle;

    fn open(&self, samples: mpsc::Sender<Vec<i16>>) -> Result<Self::Handle, ListenError>;
}

/// The default input device, read through cpal
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalMicrophone;

impl Microphone for CpalMicrophone {
    type Handle = Stream;

    fn open(&self, samples: mpsc::Sender<Vec<i16>>) -> Result<Stream, ListenError> {
        let device = cpal::default_host()
            .default_input_device()
            .ok_or_else(|| ListenError::Device("no input device".to_string()))?;
        let config = StreamConfig {
            channels: 1,
            sample_rate: cpal::SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let chunk = data
                        .iter()
                        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                        .collect();
                    // Receiver gone means the listen attempt is over
                    let _ = samples.send(chunk);
                },
                |err| tracing::warn!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| ListenError::Device(e.to_string()))?;
        stream
            .play()
            .map_err(|e| ListenError::Device(e.to_string()))?;
        Ok(stream)
    }
}

/// Voice activity detector settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sensitivity {
    Quality,
    LowBitrate,
    Aggressive,
    VeryAggressive,
}

impl Sensitivity {
    /// Map a 0-3 level, clamping anything above 3
    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Sensitivity::Quality,
            1 => Sensitivity::LowBitrate,
            2 => Sensitivity::Aggressive,
            _ => Sensitivity::VeryAggressive,
        }
    }

    fn vad_mode(self) -> VadMode {
        match self {
            Sensitivity::Quality => VadMode::Quality,
            Sensitivity::LowBitrate => VadMode::LowBitrate,
            Sensitivity::Aggressive => VadMode::Aggressive,
            Sensitivity::VeryAggressive => VadMode::VeryAggressive,
        }
    }
}

/// Records one phrase from a [`Microphone`] and sends it to a transcription
/// endpoint.
pub struct RecordingRecognizer<M: Microphone = CpalMicrophone> {
    microphone: Arc<M>,
    sensitivity: Sensitivity,
    transcriber: Arc<dyn TranscriptionProvider>,
}

impl<M: Microphone> RecordingRecognizer<M> {
    pub fn new(microphone: M, transcriber: Arc<dyn TranscriptionProvider>) -> Self {
        Self {
            microphone: Arc::new(microphone),
            sensitivity: Sensitivity::Aggressive,
            transcriber,
        }
    }

    pub fn with_sensitivity(mut self, sensitivity: Sensitivity) -> Self {
        self.sensitivity = sensitivity;
        self
    }
}

#[async_trait]
impl<M: Microphone> SpeechRecognizer for RecordingRecognizer<M> {
    async fn listen(
        &self,
        timeout: Duration,
        phrase_limit: Duration,
    ) -> Result<String, ListenError> {
        tracing::debug!(?timeout, ?phrase_limit, "listening");
        let microphone = Arc::clone(&self.microphone);
        let sensitivity = self.sensitivity;
        let samples = tokio::task::spawn_blocking(move || {
            capture_phrase(microphone.as_ref(), sensitivity, timeout, phrase_limit)
        })
        .await
        .map_err(|e| ListenError::Device(e.to_string()))??;

        let audio = encode_wav(&samples)?;
        let text = self
            .transcriber
            .transcribe(AudioClip::wav(audio))
            .await
            .map_err(|e| ListenError::Request(e.to_string()))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ListenError::NoMatch);
        }
        Ok(text.to_string())
    }
}

/// Block until one phrase has been heard.
///
/// Waits up to `timeout` for speech to start, then records until a pause or
/// until `phrase_limit` has passed. The microphone handle is released on
/// every return path.
fn capture_phrase<M: Microphone>(
    microphone: &M,
    sensitivity: Sensitivity,
    timeout: Duration,
    phrase_limit: Duration,
) -> Result<Vec<i16>, ListenError> {
    let (tx, rx) = mpsc::channel();
    let _handle = microphone.open(tx)?;

    let mut vad = Vad::new();
    vad.set_mode(sensitivity.vad_mode());
    vad.set_sample_rate(SampleRate::Rate16kHz);

    let mut phrase = PhraseBuffer::new();
    let mut pending: Vec<i16> = Vec::new();
    let wait_until = Instant::now() + timeout;
    let mut phrase_until: Option<Instant> = None;

    loop {
        let deadline = phrase_until.unwrap_or(wait_until);
        let now = Instant::now();
        // A live device never goes quiet, so the deadline is checked per chunk
        if now >= deadline {
            return finish(phrase, ListenError::Timeout);
        }
        match rx.recv_timeout(deadline - now) {
            Ok(chunk) => {
                pending.extend(chunk);
                while pending.len() >= FRAME_LEN {
                    let frame: Vec<i16> = pending.drain(..FRAME_LEN).collect();
                    let voiced = vad.is_voice_segment(&frame).unwrap_or(false);
                    if phrase.push(frame, voiced) {
                        return Ok(phrase.into_samples());
                    }
                    if phrase.started() && phrase_until.is_none() {
                        phrase_until = Some(Instant::now() + phrase_limit);
                    }
                }
            }
            Err(RecvTimeoutError::Timeout) => return finish(phrase, ListenError::Timeout),
            Err(RecvTimeoutError::Disconnected) => return finish(phrase, ListenError::NoMatch),
        }
    }
}

/// What was heard so far, or `unheard` if speech never started
fn finish(phrase: PhraseBuffer, unheard: ListenError) -> Result<Vec<i16>, ListenError> {
    if phrase.started() {
        Ok(phrase.into_samples())
    } else {
        Err(unheard)
    }
}

/// Collects frames around a single voiced stretch.
#[derive(Debug, Default)]
pub struct PhraseBuffer {
    samples: Vec<i16>,
    pre_roll: Vec<Vec<i16>>,
    started: bool,
    silent_run: usize,
}

impl PhraseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Add one frame; returns true once a pause closes the phrase
    pub fn push(&mut self, frame: Vec<i16>, voiced: bool) -> bool {
        if !self.started {
            if !voiced {
                self.pre_roll.push(frame);
                if self.pre_roll.len() > PRE_ROLL_FRAMES {
                    self.pre_roll.remove(0);
                }
                return false;
            }
            self.started = true;
            for f in self.pre_roll.drain(..) {
                self.samples.extend(f);
            }
        }

        self.samples.extend(frame);
        if voiced {
            self.silent_run = 0;
        } else {
            self.silent_run += 1;
        }
        self.silent_run >= PAUSE_FRAMES
    }

    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}

/// Encode 16-bit mono PCM as an in-memory WAV file
pub fn encode_wav(samples: &[i16]) -> Result<Vec<u8>, ListenError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            WavWriter::new(&mut cursor, spec).map_err(|e| ListenError::Device(e.to_string()))?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .map_err(|e| ListenError::Device(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| ListenError::Device(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct FixedTranscriber(Option<&'static str>);

    #[async_trait]
    impl TranscriptionProvider for FixedTranscriber {
        async fn transcribe(&self, _clip: AudioClip) -> iris_ai::Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| iris_ai::Error::api("server_error", "unavailable"))
        }
    }

    /// Sets `closed` when the capture handle is dropped
    struct CloseFlag(Arc<AtomicBool>);

    impl Drop for CloseFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    /// Opens fine but never delivers a sample
    struct StalledMicrophone {
        closed: Arc<AtomicBool>,
        // Keeps the channel connected so the wait runs to its deadline
        sender: parking_lot::Mutex<Option<mpsc::Sender<Vec<i16>>>>,
    }

    impl Microphone for StalledMicrophone {
        type Handle = CloseFlag;

        fn open(&self, samples: mpsc::Sender<Vec<i16>>) -> Result<CloseFlag, ListenError> {
            *self.sender.lock() = Some(samples);
            Ok(CloseFlag(self.closed.clone()))
        }
    }

    /// Delivers a fixed recording and then hangs up
    struct RecordedMicrophone(Vec<i16>);

    impl Microphone for RecordedMicrophone {
        type Handle = ();

        fn open(&self, samples: mpsc::Sender<Vec<i16>>) -> Result<(), ListenError> {
            for chunk in self.0.chunks(1024) {
                let _ = samples.send(chunk.to_vec());
            }
            Ok(())
        }
    }

    struct MissingMicrophone;

    impl Microphone for MissingMicrophone {
        type Handle = ();

        fn open(&self, _samples: mpsc::Sender<Vec<i16>>) -> Result<(), ListenError> {
            Err(ListenError::Device("no input device".to_string()))
        }
    }

    #[tokio::test]
    async fn test_no_speech_times_out_and_releases_microphone() {
        let closed = Arc::new(AtomicBool::new(false));
        let microphone = StalledMicrophone {
            closed: closed.clone(),
            sender: parking_lot::Mutex::new(None),
        };
        let recognizer =
            RecordingRecognizer::new(microphone, Arc::new(FixedTranscriber(Some("hello"))));

        let started = Instant::now();
        let err = recognizer
            .listen(Duration::from_millis(200), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert_eq!(err, ListenError::Timeout);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_silent_recording_is_not_transcribed() {
        let recognizer = RecordingRecognizer::new(
            RecordedMicrophone(vec![0; FRAME_LEN * 20]),
            // A transcription request would surface as Request
            Arc::new(FixedTranscriber(None)),
        );
        let err = recognizer
            .listen(Duration::from_secs(5), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert_eq!(err, ListenError::NoMatch);
    }

    #[tokio::test]
    async fn test_missing_microphone_is_a_device_error() {
        let recognizer =
            RecordingRecognizer::new(MissingMicrophone, Arc::new(FixedTranscriber(Some("hello"))));
        let err = recognizer
            .listen(Duration::from_secs(5), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ListenError::Device(_)));
    }

    #[test]
    fn test_phrase_ends_after_a_pause() {
        let mut phrase = PhraseBuffer::new();
        for _ in 0..15 {
            assert!(!phrase.push(vec![0; FRAME_LEN], false));
        }
        assert!(!phrase.started());

        assert!(!phrase.push(vec![1; FRAME_LEN], true));
        assert!(phrase.started());
        for _ in 0..PAUSE_FRAMES - 1 {
            assert!(!phrase.push(vec![0; FRAME_LEN], false));
        }
        // Speech resumes, so the pause count starts over
        assert!(!phrase.push(vec![1; FRAME_LEN], true));
        for _ in 0..PAUSE_FRAMES - 1 {
            assert!(!phrase.push(vec![0; FRAME_LEN], false));
        }
        assert!(phrase.push(vec![0; FRAME_LEN], false));

        let frames = PRE_ROLL_FRAMES + 2 + 2 * PAUSE_FRAMES - 1;
        assert_eq!(phrase.into_samples().len(), frames * FRAME_LEN);
    }

    #[test]
    fn test_encoded_wav_is_16khz_mono() {
        let audio = encode_wav(&[0, i16::MAX / 2, -i16::MAX / 2]).unwrap();
        let reader = hound::WavReader::new(Cursor::new(audio)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, SAMPLE_RATE);
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 3);
    }

    #[test]
    fn test_sensitivity_levels() {
        assert_eq!(Sensitivity::from_level(0), Sensitivity::Quality);
        assert_eq!(Sensitivity::from_level(2), Sensitivity::Aggressive);
        assert_eq!(Sensitivity::from_level(9), Sensitivity::VeryAggressive);
    }
}
