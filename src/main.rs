use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{debug, warn};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use text_io::read;

mod libbeidanci;

use crate::libbeidanci::quiz::Quiz;
use crate::libbeidanci::record::RecordStore;
use crate::libbeidanci::store::VocabularyStore;
use crate::libbeidanci::voice::{GoogleTranslateTts, RodioPlayer, VoiceCache};
use crate::libbeidanci::Error;

const MENU_LETTERS: usize = 26;

#[derive(Parser, Debug)]
#[command(name = "背單詞 (Bèidāncí)")]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,
    #[arg(long, value_name = "DIR", default_value = "voices")]
    voices_dir: PathBuf,
    #[arg(long, value_name = "DIR", default_value = "results")]
    results_dir: PathBuf,
    /// Language tag passed to speech synthesis.
    #[arg(long, default_value = "en")]
    lang: String,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[derive(Debug, PartialEq)]
enum Choice {
    Set(usize),
    Exit,
    Invalid,
}

impl Choice {
    fn from_str(set_count: usize, input: &str) -> Choice {
        let trimmed = input.trim();
        if trimmed == "0" {
            return Choice::Exit;
        }
        match trimmed.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => {
                let index = (c.to_ascii_uppercase() as usize) - ('A' as usize);
                if index < set_count.min(MENU_LETTERS) {
                    Choice::Set(index)
                } else {
                    Choice::Invalid
                }
            }
            _ => Choice::Invalid,
        }
    }
}

fn read_selection() -> String {
    loop {
        print!("{} ", ">".cyan());
        io::stdout().flush().ok();
        let line: String = read!("{}\n");
        if !line.trim().is_empty() {
            return line;
        }
    }
}

fn main() -> Result<(), Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let mut store = VocabularyStore::load(&args.data_dir)?;
    debug!(
        "[Setup] {} vocabulary set(s) under {:?}",
        store.len(),
        args.data_dir
    );
    if store.is_empty() {
        println!(
            "{}",
            format!(
                "No vocabulary sets under {:?}. Convert some with zhuanhuanqi first!",
                args.data_dir
            )
            .yellow()
        );
        return Ok(());
    }
    if store.len() > MENU_LETTERS {
        warn!(
            "[Setup] {} sets found; only the first {} fit the menu.",
            store.len(),
            MENU_LETTERS
        );
    }

    let voice = Arc::new(VoiceCache::open(
        &args.voices_dir,
        Box::new(GoogleTranslateTts::new(&args.lang)),
        Box::new(RodioPlayer),
    )?);
    let mut records = RecordStore::load(&args.results_dir.join("records.json"));

    loop {
        println!("{}", "=== Choose Vocabulary Set ===".cyan());
        for (i, title) in store.titles().iter().take(MENU_LETTERS).enumerate() {
            let letter = char::from(b'A' + i as u8);
            let best = records.get_record(title);
            if best > 0.0 {
                println!(
                    "[{}] {} {}",
                    letter.to_string().bold(),
                    title,
                    format!("[{best:.0}%]").bright_green()
                );
            } else {
                println!("[{}] {}", letter.to_string().bold(), title);
            }
        }
        println!("[{}] Exit", "0".bold());

        let input = read_selection();
        let choice = Choice::from_str(store.len(), &input);
        debug!("[Menu] choice: {:?}", choice);

        match choice {
            Choice::Exit => {
                println!("{}", "Bye!".cyan());
                return Ok(());
            }
            Choice::Invalid => {
                println!(
                    "{}",
                    "Pick one of the listed letters, or 0 to exit.".bright_red()
                );
            }
            Choice::Set(index) => {
                println!();
                let set = store.get_vocabulary_set(index)?;
                let quiz = Quiz::new(set, Arc::clone(&voice));
                let summary = quiz.run(&args.results_dir)?;
                let best = records.update_record(&summary)?;
                debug!("[Records] Best for {:?} now {:.2}%", summary.title, best);
            }
        }
    }
}
