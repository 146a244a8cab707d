use crate::foundation::error::{TrainreelError, TrainreelResult};
use crate::narration::engine::{SpeechEngine, SpeechEvent, Utterance};
use crate::narration::voice::{Voice, VoiceCatalog};
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};

/// espeak-ng's default speaking rate in words per minute.
const BASE_WPM: f32 = 175.0;

/// Speech engine backed by the `espeak-ng` command line synthesizer.
///
/// Each utterance is a child process; pause and resume suspend it with `SIGSTOP`/`SIGCONT`.
#[derive(Debug)]
pub struct CommandSpeechEngine {
    program: PathBuf,
    current: Arc<Mutex<Option<Playback>>>,
    voices: Mutex<Option<Vec<Voice>>>,
}

#[derive(Debug)]
struct Playback {
    pid: Pid,
    stopped: Arc<AtomicBool>,
}

impl Default for CommandSpeechEngine {
    fn default() -> Self {
        Self::new("espeak-ng")
    }
}

impl CommandSpeechEngine {
    /// Use `program` as the synthesizer binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            current: Arc::new(Mutex::new(None)),
            voices: Mutex::new(None),
        }
    }

    /// `true` when the synthesizer can be invoked.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    fn args(utterance: &Utterance) -> Vec<String> {
        let voice = utterance
            .voice
            .as_ref()
            .map(|v| v.lang.clone())
            .unwrap_or_else(|| utterance.lang.clone());
        let mut args = Vec::with_capacity(8);
        if !voice.is_empty() {
            args.push("-v".to_owned());
            args.push(voice.to_ascii_lowercase());
        }
        args.extend([
            "-s".to_owned(),
            rate_to_wpm(utterance.rate).to_string(),
            "-p".to_owned(),
            pitch_to_espeak(utterance.pitch).to_string(),
            "-a".to_owned(),
            volume_to_amplitude(utterance.volume).to_string(),
            "--stdin".to_owned(),
        ]);
        args
    }

    fn signal_current(&self, signal: Signal) {
        if let Some(p) = lock(&self.current).as_ref()
            && let Err(e) = kill(p.pid, Some(signal))
        {
            tracing::debug!(pid = %p.pid, ?signal, error = %e, "failed to signal espeak-ng");
        }
    }
}

impl SpeechEngine for CommandSpeechEngine {
    fn speak(&self, utterance: &Utterance, events: Sender<SpeechEvent>) -> TrainreelResult<()> {
        self.stop();

        let mut child = Command::new(&self.program)
            .args(Self::args(utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                TrainreelError::speech(format!(
                    "failed to spawn '{}': {e}",
                    self.program.display()
                ))
            })?;

        let pid = Pid::from_raw(child.id() as i32);
        let stopped = Arc::new(AtomicBool::new(false));
        *lock(&self.current) = Some(Playback {
            pid,
            stopped: stopped.clone(),
        });

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TrainreelError::speech("failed to open espeak-ng stdin (unexpected)"))?;
        let text = utterance.text.clone();
        let current = self.current.clone();
        let _ = events.send(SpeechEvent::Started);

        std::thread::spawn(move || {
            // A write error means the process already died; `wait` reports why.
            let _ = stdin.write_all(text.as_bytes());
            drop(stdin);

            let mut stderr = String::new();
            if let Some(mut s) = child.stderr.take() {
                let _ = s.read_to_string(&mut stderr);
            }
            let status = child.wait();

            {
                let mut cur = lock(&current);
                if cur.as_ref().is_some_and(|p| p.pid == pid) {
                    *cur = None;
                }
            }

            let event = if stopped.load(Ordering::Acquire) {
                SpeechEvent::Interrupted
            } else {
                match status {
                    Ok(s) if s.success() => SpeechEvent::Finished,
                    Ok(s) => SpeechEvent::Error(format!("espeak-ng exited with {s}: {}", stderr.trim())),
                    Err(e) => SpeechEvent::Error(format!("failed to wait for espeak-ng: {e}")),
                }
            };
            let _ = events.send(event);
        });

        Ok(())
    }

    fn stop(&self) {
        let Some(p) = lock(&self.current).take() else {
            return;
        };
        p.stopped.store(true, Ordering::Release);
        // A stopped process must be continued to act on SIGTERM.
        let _ = kill(p.pid, Some(Signal::SIGCONT));
        if let Err(e) = kill(p.pid, Some(Signal::SIGTERM)) {
            tracing::debug!(pid = %p.pid, error = %e, "espeak-ng already gone");
        }
    }

    fn pause(&self) {
        self.signal_current(Signal::SIGSTOP);
    }

    fn resume(&self) {
        self.signal_current(Signal::SIGCONT);
    }
}

impl VoiceCatalog for CommandSpeechEngine {
    fn voices(&self) -> TrainreelResult<Vec<Voice>> {
        let mut cache = lock(&self.voices);
        if let Some(v) = cache.as_ref() {
            return Ok(v.clone());
        }

        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| {
                TrainreelError::speech(format!(
                    "failed to list voices with '{}': {e}",
                    self.program.display()
                ))
            })?;
        if !output.status.success() {
            return Err(TrainreelError::speech(format!(
                "'{} --voices' exited with {}",
                self.program.display(),
                output.status
            )));
        }

        let voices = parse_voice_list(&String::from_utf8_lossy(&output.stdout));
        if !voices.is_empty() {
            *cache = Some(voices.clone());
        }
        Ok(voices)
    }
}

impl Drop for CommandSpeechEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
/// ```
pub fn parse_voice_list(table: &str) -> Vec<Voice> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let _priority = cols.next()?;
            let lang = cols.next()?;
            let _age_gender = cols.next()?;
            let name = cols.next()?.replace('_', " ");
            Some(Voice::new(name, lang))
        })
        .collect()
}

fn rate_to_wpm(rate: f32) -> u32 {
    (BASE_WPM * rate).round().clamp(80.0, 450.0) as u32
}

fn pitch_to_espeak(pitch: f32) -> u32 {
    (pitch * 50.0).round().clamp(0.0, 99.0) as u32
}

fn volume_to_amplitude(volume: f32) -> u32 {
    (volume * 100.0).round().clamp(0.0, 200.0) as u32
}

#[cfg(test)]
#[path = "../../tests/unit/narration/espeak.rs"]
mod tests;
