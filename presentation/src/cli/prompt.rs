//! Line prompts outside the REPL

use std::io::{self, BufRead, Write};

/// Print `prompt` and read one line from stdin, without the line ending.
pub fn prompt_line(prompt: &str) -> io::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{}", prompt)?;
    stdout.flush()?;
    read_trimmed_line(&mut io::stdin().lock())
}

fn read_trimmed_line(reader: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "no input"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
