//! Line-oriented terminal I/O, generic so the modes can be driven from tests

use std::io::{self, BufRead, Write};

pub struct Console<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> Console<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// Print `prompt` and read one line; `None` at end of input
    pub fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn say(&mut self, text: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", text.as_ref())
    }

    pub fn output(&self) -> &O {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_and_eof() {
        let mut console = Console::new("e4\r\nhint\n".as_bytes(), Vec::new());
        assert_eq!(console.prompt("> ").unwrap().as_deref(), Some("e4"));
        assert_eq!(console.prompt("> ").unwrap().as_deref(), Some("hint"));
        assert_eq!(console.prompt("> ").unwrap(), None);
        console.say("bye").unwrap();
        assert_eq!(String::from_utf8(console.output().clone()).unwrap(), "> > > bye\n");
    }
}
