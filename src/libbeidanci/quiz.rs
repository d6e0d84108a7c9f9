use crate::libbeidanci::store::{VocabularyEntry, VocabularySet};
use crate::libbeidanci::voice::{sanitize, VoiceCache};
use crate::libbeidanci::Error;
use chrono::Local;
use colored::Colorize;
use log::debug;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use text_io::read;

const ANSWER_HEADER: (&str, &str) = ("[Answer]", "[User Input]");

/// Running tally for one quiz pass. Mutated once per prompt, consumed by
/// `summarize` when the pass is over.
#[derive(Debug)]
pub(crate) struct QuizResult {
    title: String,
    correct: u32,
    wrong: u32,
    started: Instant,
    answer_pairs: Vec<(String, String)>,
}

impl QuizResult {
    pub fn new(title: &str) -> QuizResult {
        QuizResult {
            title: title.to_string(),
            correct: 0,
            wrong: 0,
            started: Instant::now(),
            answer_pairs: vec![(ANSWER_HEADER.0.to_string(), ANSWER_HEADER.1.to_string())],
        }
    }

    pub fn record_correct(&mut self, expected: &str, given: &str) {
        self.correct += 1;
        self.answer_pairs
            .push((expected.to_string(), given.to_string()));
    }

    pub fn record_wrong(&mut self, expected: &str, given: &str) {
        self.wrong += 1;
        self.answer_pairs
            .push((expected.to_string(), format!("**{given}**")));
    }

    pub fn summarize(self) -> QuizSummary {
        let total = self.correct + self.wrong;
        let accuracy = if total == 0 {
            0.0
        } else {
            f64::from(self.correct) / f64::from(total) * 100.0
        };
        QuizSummary {
            title: self.title,
            correct: self.correct,
            wrong: self.wrong,
            total,
            accuracy,
            time_cost: self.started.elapsed(),
            finish_date: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            answer_pairs: self.answer_pairs,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct QuizSummary {
    pub title: String,
    pub correct: u32,
    pub wrong: u32,
    pub total: u32,
    pub accuracy: f64,
    pub time_cost: Duration,
    pub finish_date: String,
    answer_pairs: Vec<(String, String)>,
}

impl fmt::Display for QuizSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Result ===")?;
        writeln!(f, "Title: {}", self.title)?;
        writeln!(f, "Correct: {}/{}", self.correct, self.total)?;
        writeln!(f, "Accuracy: {:5.2}%", self.accuracy)?;
        writeln!(f, "Time Cost: {:.1}s", self.time_cost.as_secs_f64())?;
        write!(f, "Finish Date: {}", self.finish_date)
    }
}

impl QuizSummary {
    /// Two columns padded to the widest expected/given strings.
    fn detail_table(&self) -> String {
        let mut expected_width = 0;
        let mut given_width = 0;
        for (expected, given) in &self.answer_pairs {
            expected_width = expected_width.max(expected.chars().count());
            given_width = given_width.max(given.chars().count());
        }
        let mut table = String::new();
        for (expected, given) in &self.answer_pairs {
            table.push_str(&format!(
                "{expected:<expected_width$} | {given:<given_width$}\n"
            ));
        }
        table
    }

    pub fn save_transcript(&self, results_dir: &Path) -> Result<PathBuf, Error> {
        fs::create_dir_all(results_dir).map_err(|err| Error::Write {
            path: results_dir.to_path_buf(),
            source: err,
        })?;
        let stamp = Local::now().format("%Y-%m-%d_%H%M%S");
        let path = results_dir.join(format!("result_{}_{}.txt", stamp, sanitize(&self.title)));
        let text = format!("{}\n\n=== Answering Detail ===\n{}", self, self.detail_table());
        fs::write(&path, text).map_err(|err| Error::Write {
            path: path.clone(),
            source: err,
        })?;
        Ok(path)
    }
}

pub(crate) struct Quiz {
    title: String,
    entries: Vec<VocabularyEntry>,
    voice: Arc<VoiceCache>,
}

impl Quiz {
    pub fn new(set: &VocabularySet, voice: Arc<VoiceCache>) -> Quiz {
        Quiz {
            title: set.title.clone(),
            entries: set.vocabulary.clone(),
            voice,
        }
    }

    /// One prompt per entry in presentation order: show the translation,
    /// read the typed answer, score by exact match, then hand the expected
    /// term to the voice cache without waiting for it.
    pub fn run(&self, results_dir: &Path) -> Result<QuizSummary, Error> {
        let mut result = QuizResult::new(&self.title);
        let total = self.entries.len();
        for (idx, entry) in self.entries.iter().enumerate() {
            println!(
                "{}{}",
                format!("{}/{}. ", idx + 1, total).cyan(),
                entry.cht.as_str().black().bold().on_white()
            );
            print!("{} ", ">".cyan());
            io::stdout().flush().ok();
            let answer: String = read!("{}\n");

            if answer == entry.eng {
                result.record_correct(&entry.eng, &answer);
                println!("{}", "Correct!".bright_green());
            } else {
                result.record_wrong(&entry.eng, &answer);
                println!("{}", format!("Wrong: {}", entry.eng).bright_red());
            }
            println!();

            self.voice.speak_detached(entry.eng.clone());
        }

        let summary = result.summarize();
        let transcript = summary.save_transcript(results_dir)?;
        debug!("[Quiz] Transcript saved to {:?}", transcript);
        println!("{summary}\n");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn tally_adds_up_after_summarize() {
        let mut result = QuizResult::new("Fruits");
        result.record_correct("apple", "apple");
        result.record_correct("banana", "banana");
        result.record_wrong("cherry", "chery");

        let summary = result.summarize();
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.wrong, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.correct + summary.wrong, summary.total);
        assert!((summary.accuracy - 66.666).abs() < 0.01);
    }

    #[test]
    fn empty_quiz_summarizes_to_zero_accuracy() {
        let summary = QuizResult::new("Nothing").summarize();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.accuracy, 0.0);
    }

    #[test]
    fn accuracy_stays_within_percent_bounds() {
        let mut all_wrong = QuizResult::new("Bad day");
        all_wrong.record_wrong("a", "b");
        assert_eq!(all_wrong.summarize().accuracy, 0.0);

        let mut all_right = QuizResult::new("Good day");
        all_right.record_correct("a", "a");
        assert_eq!(all_right.summarize().accuracy, 100.0);
    }

    #[test]
    fn detail_table_is_aligned_and_marks_wrong_answers() {
        let mut result = QuizResult::new("Mixed");
        result.record_correct("apple", "apple");
        result.record_wrong("watermelon", "water");
        let table = result.summarize().detail_table();

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "[Answer]   | [User Input]");
        assert_eq!(lines[1], "apple      | apple       ");
        assert_eq!(lines[2], "watermelon | **water**   ");
    }

    #[test]
    fn transcript_contains_summary_and_detail() {
        let dir = std::env::temp_dir().join(format!("beidanci-quiz-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut result = QuizResult::new("Fruits");
        result.record_correct("apple", "apple");
        let summary = result.summarize();

        let path = summary.save_transcript(&dir).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("=== Result ==="));
        assert!(text.contains("Title: Fruits"));
        assert!(text.contains("=== Answering Detail ==="));
        assert!(text.contains("[Answer]"));

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("result_"));
        assert!(name.ends_with("_Fruits.txt"));

        let _ = fs::remove_dir_all(&dir);
    }
}
