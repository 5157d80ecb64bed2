// src/utils/log.rs
use chrono::Local;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LOG_DIR: &str = "logs";

fn log_path(filename: &str) -> io::Result<PathBuf> {
    let log_dir = Path::new(LOG_DIR);
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }
    Ok(log_dir.join(filename))
}

/// Appends a timestamped entry to `logs/<filename>`.
///
/// # Arguments
///
/// * `filename` - Name of the log file inside the `logs` directory
/// * `message` - The message to log
pub fn log_to_file(filename: &str, message: &str) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path(filename)?)?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    writeln!(file, "[{}] {}", timestamp, message)?;
    file.flush()
}

/// Logs a multi-line message under a banner.
pub fn log_with_header(filename: &str, header: &str, message: &str) -> io::Result<()> {
    let formatted_message = format!(
        "===== {} =====\n{}\n====================",
        header, message
    );
    log_to_file(filename, &formatted_message)
}

/// Appends a row to `logs/<filename>`, writing `headers` first if the file
/// is new.
pub fn log_csv(filename: &str, headers: &[&str], data: &[String]) -> io::Result<()> {
    let path = log_path(filename)?;
    let file_exists = path.exists();

    let mut file = OpenOptions::new().create(true).append(true).open(&path)?;

    if !file_exists && !headers.is_empty() {
        writeln!(file, "{}", headers.join(","))?;
    }

    writeln!(file, "{}", data.join(","))?;
    file.flush()
}
