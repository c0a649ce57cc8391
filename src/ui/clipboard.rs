use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};

use base64::{engine::general_purpose::STANDARD, Engine};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("Clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("Clipboard I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Primary copy failed ({primary}); fallback failed ({fallback})")]
    Exhausted {
        primary: Box<ClipboardError>,
        fallback: Box<ClipboardError>,
    },
}

pub trait Clipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

type Tool = (&'static str, &'static [&'static str]);

const TOOLS: &[Tool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
    ("clip", &[]),
];

/// Copies through the first clipboard tool found on the host.
pub struct SystemClipboard {
    tools: &'static [Tool],
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self { tools: TOOLS }
    }
}

impl SystemClipboard {
    fn run(program: &str, args: &[&str], text: &str) -> Result<(), ClipboardError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        // Stdin is dropped before waiting so the tool sees end of input.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(text.as_bytes()),
            None => Ok(()),
        };

        // Always reaped, even when the write failed.
        let status = child.wait()?;
        if !status.success() {
            return Err(ClipboardError::Unavailable(format!(
                "{} exited with {}",
                program, status
            )));
        }

        Ok(written?)
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        for (program, args) in self.tools {
            match Self::run(program, args, text) {
                Ok(()) => return Ok(()),
                Err(ClipboardError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => log::warn!("{} could not copy: {}", program, e),
            }
        }

        Err(ClipboardError::Unavailable(
            "no clipboard tool found".to_string(),
        ))
    }
}

/// Asks the terminal itself to set its selection (OSC 52). Only meaningful
/// when stdout is a terminal.
pub struct TerminalClipboard;

impl TerminalClipboard {
    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }
}

impl Clipboard for TerminalClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(ClipboardError::Unavailable(
                "stdout is not a terminal".to_string(),
            ));
        }

        stdout.write_all(Self::sequence(text).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

pub struct FallbackClipboard<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Clipboard, F: Clipboard> FallbackClipboard<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Clipboard, F: Clipboard> Clipboard for FallbackClipboard<P, F> {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let primary = match self.primary.write_text(text) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        log::warn!("Primary clipboard failed, trying fallback: {}", primary);

        self.fallback
            .write_text(text)
            .map_err(|fallback| ClipboardError::Exhausted {
                primary: Box::new(primary),
                fallback: Box::new(fallback),
            })
    }
}

/// Clipboard used by the console: system tool first, terminal selection second.
pub fn default_clipboard() -> FallbackClipboard<SystemClipboard, TerminalClipboard> {
    FallbackClipboard::new(SystemClipboard::default(), TerminalClipboard)
}
