use log::{debug, warn};
use reqwest::blocking::Client;
use rodio::{Decoder, OutputStreamBuilder, Sink};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum VoiceError {
    #[error("speech request failed: {0}")]
    Synthesis(#[from] reqwest::Error),
    #[error("speech endpoint answered {0}")]
    SynthesisStatus(reqwest::StatusCode),
    #[error("cannot access voice file: {0}")]
    Io(#[from] io::Error),
    #[error("no audio output: {0}")]
    Stream(#[from] rodio::StreamError),
    #[error("cannot decode voice file: {0}")]
    Decode(#[from] rodio::decoder::DecoderError),
}

pub(crate) trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError>;
}

/// The same endpoint gTTS wraps; one GET per synthesized term.
pub(crate) struct GoogleTranslateTts {
    client: Client,
    lang: String,
}

impl GoogleTranslateTts {
    const ENDPOINT: &'static str = "https://translate.google.com/translate_tts";

    pub fn new(lang: &str) -> GoogleTranslateTts {
        GoogleTranslateTts {
            client: Client::new(),
            lang: lang.to_string(),
        }
    }
}

impl SpeechSynthesizer for GoogleTranslateTts {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, VoiceError> {
        let response = self
            .client
            .get(Self::ENDPOINT)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.lang.as_str()),
                ("q", text),
            ])
            .send()?;
        if !response.status().is_success() {
            return Err(VoiceError::SynthesisStatus(response.status()));
        }
        Ok(response.bytes()?.to_vec())
    }
}

pub(crate) trait AudioPlayer: Send + Sync {
    /// Blocks the calling thread until playback finishes.
    fn play(&self, path: &Path) -> Result<(), VoiceError>;
}

pub(crate) struct RodioPlayer;

impl AudioPlayer for RodioPlayer {
    fn play(&self, path: &Path) -> Result<(), VoiceError> {
        let stream = OutputStreamBuilder::open_default_stream()?;
        let sink = Sink::connect_new(stream.mixer());
        let source = Decoder::new(BufReader::new(File::open(path)?))?;
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

/// Replaces filesystem-unsafe characters before a term becomes a filename.
pub(crate) fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect()
}

/// Filename-keyed audio cache: keys are the stems of `.mp3` files found in
/// the cache directory, lookups use the sanitized term text.
pub(crate) struct VoiceCache {
    dir: PathBuf,
    known: Mutex<HashSet<String>>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    player: Box<dyn AudioPlayer>,
}

impl VoiceCache {
    pub fn open(
        dir: &Path,
        synthesizer: Box<dyn SpeechSynthesizer>,
        player: Box<dyn AudioPlayer>,
    ) -> Result<VoiceCache, VoiceError> {
        fs::create_dir_all(dir)?;
        let mut known = HashSet::new();
        scan_voices(dir, &mut known)?;
        debug!("[Voice] {} cached voice file(s) under {:?}", known.len(), dir);
        Ok(VoiceCache {
            dir: dir.to_path_buf(),
            known: Mutex::new(known),
            synthesizer,
            player,
        })
    }

    fn voice_path(&self, text: &str) -> (String, PathBuf) {
        let key = sanitize(text);
        let path = self.dir.join(format!("{key}.mp3"));
        (key, path)
    }

    /// Synthesizes and saves on a cache miss, then plays. Blocks until the
    /// audio has finished.
    pub fn speak(&self, text: &str) -> Result<(), VoiceError> {
        let (key, path) = self.voice_path(text);
        let hit = self.known.lock().unwrap().contains(&key);
        if !hit {
            let audio = self.synthesizer.synthesize(text)?;
            fs::write(&path, &audio)?;
            self.known.lock().unwrap().insert(key);
            debug!("[Voice] Synthesized {:?} -> {:?}", text, path);
        }
        self.player.play(&path)
    }

    /// Fire-and-forget playback on its own thread; the thread is never
    /// joined and failures are demoted to warnings.
    pub fn speak_detached(self: &Arc<Self>, text: String) {
        let cache = Arc::clone(self);
        thread::spawn(move || {
            if let Err(err) = cache.speak(&text) {
                warn!("[Voice] Cannot speak {:?}: {}", text, err);
            }
        });
    }
}

fn scan_voices(dir: &Path, known: &mut HashSet<String>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            scan_voices(&path, known)?;
        } else if path.extension().is_some_and(|ext| ext == "mp3") {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                known.insert(stem.to_string());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct CountingSynth(Arc<AtomicU32>);

    impl SpeechSynthesizer for CountingSynth {
        fn synthesize(&self, _text: &str) -> Result<Vec<u8>, VoiceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0u8; 4])
        }
    }

    struct SilentPlayer(Arc<AtomicU32>);

    impl AudioPlayer for SilentPlayer {
        fn play(&self, _path: &Path) -> Result<(), VoiceError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("beidanci-voice-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn counting_cache(dir: &Path) -> (VoiceCache, Arc<AtomicU32>, Arc<AtomicU32>) {
        let synth_calls = Arc::new(AtomicU32::new(0));
        let play_calls = Arc::new(AtomicU32::new(0));
        let cache = VoiceCache::open(
            dir,
            Box::new(CountingSynth(Arc::clone(&synth_calls))),
            Box::new(SilentPlayer(Arc::clone(&play_calls))),
        )
        .unwrap();
        (cache, synth_calls, play_calls)
    }

    #[test]
    fn sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize("a/b?c"), "a_b_c");
        assert_eq!(sanitize("<>:\"/|?*"), "________");
        assert_eq!(sanitize("plain word"), "plain word");
    }

    #[test]
    fn second_speak_skips_synthesis() {
        let dir = temp_dir("hit");
        let (cache, synth_calls, play_calls) = counting_cache(&dir);

        cache.speak("banana").unwrap();
        cache.speak("banana").unwrap();

        assert_eq!(synth_calls.load(Ordering::SeqCst), 1);
        assert_eq!(play_calls.load(Ordering::SeqCst), 2);
        assert!(dir.join("banana.mp3").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn existing_files_are_hits_on_open() {
        let dir = temp_dir("scan");
        fs::write(dir.join("apple.mp3"), b"fake").unwrap();

        let (cache, synth_calls, _plays) = counting_cache(&dir);
        cache.speak("apple").unwrap();
        assert_eq!(synth_calls.load(Ordering::SeqCst), 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn sanitized_text_maps_to_one_cache_file() {
        let dir = temp_dir("sanitized");
        let (cache, synth_calls, _plays) = counting_cache(&dir);

        cache.speak("what/ever?").unwrap();
        cache.speak("what/ever?").unwrap();

        assert_eq!(synth_calls.load(Ordering::SeqCst), 1);
        assert!(dir.join("what_ever_.mp3").exists());

        let _ = fs::remove_dir_all(&dir);
    }
}
