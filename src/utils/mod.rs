pub mod id;
pub mod text;
pub mod validation;

use std::io::{self, BufRead, IsTerminal, Write};

use jiff::Timestamp;

pub use id::generate_uuid;
pub use text::{contains_ignore_case, slugify, truncate_string};

/// Current time as an RFC 3339 string, the format stored on local records.
pub fn iso_timestamp() -> String {
    Timestamp::now().to_string()
}

/// Check if stdin is a TTY (interactive)
pub fn is_stdin_tty() -> bool {
    io::stdin().is_terminal()
}

/// Print a prompt and read one trimmed line from stdin.
///
/// Returns `None` at end of input.
pub fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    let mut stdout = io::stdout();
    write!(stdout, "{prompt}")?;
    stdout.flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
