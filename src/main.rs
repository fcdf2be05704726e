// Version information constants
const VERSION: &str = env!("CARGO_PKG_VERSION");

use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{BufWriter, Write};
use std::path::Path;

mod align;
mod category;
mod compare;
mod error;
mod extract;
mod norm;
mod pipeline;
mod plot;
mod progress;
mod region;
mod stats;
mod track;

/// Logger manager supporting dynamic progress display and detailed logging
pub struct Logger {
    writer: BufWriter<std::fs::File>,
    last_progress: String,
}

impl Logger {
    pub fn new(file: std::fs::File) -> Self {
        Self {
            writer: BufWriter::new(file),
            last_progress: String::new(),
        }
    }

    /// Record detailed log information
    pub fn log(&mut self, message: &str) -> std::io::Result<()> {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.writer, "[{}] {}", timestamp, message)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Record a non-fatal data problem and echo it to stderr
    pub fn warn(&mut self, message: &str) -> std::io::Result<()> {
        self.finish_progress()?;
        eprintln!("[Warning] {}", message);
        self.log(&format!("[Warning] {}", message))
    }

    /// Display dynamic progress information (overwrite previous line)
    pub fn progress(&mut self, message: &str) -> std::io::Result<()> {
        if !self.last_progress.is_empty() {
            print!("\r{}", " ".repeat(self.last_progress.len()));
        }
        print!("\r{}", message);
        std::io::stdout().flush()?;
        self.last_progress = message.to_string();
        Ok(())
    }

    /// Finish progress display
    pub fn finish_progress(&mut self) -> std::io::Result<()> {
        if !self.last_progress.is_empty() {
            println!();
            self.last_progress.clear();
        }
        Ok(())
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two replicate groups of reactivity tracks over a region
    Compare(pipeline::CompareArgs),
    /// Extract a region from a reactivity track or a dot-bracket structure file
    Extract(extract::ExtractArgs),
}

fn open_log(explicit: &Option<String>, default: &Path) -> Result<Logger, Box<dyn Error>> {
    let log_file = match explicit {
        Some(log_path) => std::fs::File::create(log_path)?,
        None => std::fs::File::create(default)?,
    };
    Ok(Logger::new(log_file))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compare(args) => {
            if args.output.trim().is_empty() {
                return Err("Error: Output directory cannot be empty".into());
            }
            std::fs::create_dir_all(&args.output)?;
            let mut logger = open_log(&args.log, &Path::new(&args.output).join("compare.log"))?;
            pipeline::run_compare(&args, &mut logger)
        }
        Commands::Extract(args) => {
            let mut logger = open_log(&args.log, Path::new("extract.log"))?;
            extract::run_extract(&args, &mut logger)
        }
    }
}
