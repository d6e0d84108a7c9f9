use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::exit;
use text_io::read;

mod libbeidanci;

use crate::libbeidanci::convert;

#[derive(Parser, Debug)]
#[command(name = "轉換器 (Zhuǎnhuànqì)")]
#[command(version, about, long_about = None)]
struct Args {
    /// Tab-separated source file, one `term<TAB>translation` per line.
    source: Option<PathBuf>,
    /// Title of the new vocabulary set.
    title: Option<String>,
    #[arg(short, long, value_name = "DIR", default_value = "data")]
    data_dir: PathBuf,
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let source = args
        .source
        .unwrap_or_else(|| prompt("Convert source file:").into());
    let title = args
        .title
        .unwrap_or_else(|| prompt("Vocabulary set title:"));

    match convert::convert_file(&source, &title, &args.data_dir) {
        Ok(output) => {
            info!(
                "{}",
                format!("Converted {:?} -> {:?} as {:?}", source, output, title).cyan()
            );
        }
        Err(err) => {
            error!("{}", format!("Conversion failed: {}", err).red());
            exit(1);
        }
    }
}

fn prompt(label: &str) -> String {
    print!("{} ", label.cyan());
    io::stdout().flush().ok();
    let line: String = read!("{}\n");
    line.trim().to_string()
}
