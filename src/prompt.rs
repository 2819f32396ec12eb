use std::io::{self, BufRead, Write};

/// Where questions are asked and progress is reported.
pub trait Console {
    /// Show `prompt` and return the trimmed answer. End of input reads as an empty answer.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// Line-oriented console over any reader/writer pair, normally stdin/stdout.
pub struct TextConsole<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TextConsole<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl TextConsole<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console for TextConsole<R, W> {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "\n{}\n>> ", prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "\n{}", message)?;
        self.output.flush()
    }
}

/// Ask for a value that must not be empty. Prints `missing` and yields `None` otherwise.
pub fn ask_required(
    console: &mut dyn Console,
    prompt: &str,
    missing: &str,
) -> io::Result<Option<String>> {
    let answer = console.ask(prompt)?;
    if answer.is_empty() {
        console.say(missing)?;
        return Ok(None);
    }
    Ok(Some(answer))
}

pub fn ask_optional(console: &mut dyn Console, prompt: &str) -> io::Result<Option<String>> {
    let answer = console.ask(prompt)?;
    Ok(Some(answer).filter(|a| !a.is_empty()))
}

/// Yes/no question that defaults to no.
pub fn confirm(console: &mut dyn Console, prompt: &str) -> io::Result<bool> {
    let answer = console.ask(&format!("{} (N/y)", prompt))?;
    Ok(answer.to_lowercase().starts_with('y'))
}
