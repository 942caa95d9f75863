//! Environment struct (stdin/stdout)

use std::io::{self, Read, Stdin, Stdout};

/// Execution environment
pub struct Environment {
    pub stdin: Stdin,
    pub stdout: Stdout,
    pub stdin_isatty: bool,
    pub program_name: String,
}

impl Environment {
    pub fn init() -> Self {
        Self::default()
    }

    /// Read all of stdin, unless it is a terminal
    pub fn read_stdin(&mut self) -> io::Result<Option<String>> {
        if self.stdin_isatty {
            return Ok(None);
        }
        let mut content = String::new();
        self.stdin.read_to_string(&mut content)?;
        Ok(Some(content))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
            stdin_isatty: atty::is(atty::Stream::Stdin),
            program_name: "curlgenie".to_string(),
        }
    }
}
