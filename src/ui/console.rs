// Console Controller - line-oriented front end for a counter session
//
// Reads commands, applies them to the CounterSession and redraws the affected
// channel. The selected channel lives here, not in the core.

use crate::channel::ChannelCounter;
use crate::models::ChannelName;
use crate::services::{CounterSession, SessionError};
use crate::state::ChannelEvent;
use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tokio::sync::broadcast;

/// Stacks longer than this are abbreviated in the display
const STACK_PREVIEW: usize = 8;

/// Text shown by `help`
pub const HELP_TEXT: &str = "\
PDA concept:
  States per channel: q0 (start), q1 (counting), qf (target reached)
  Increment: q0 -> q1 -> q1 (push) -> qf (at target)
  Reset: any -> q0 (clear stack)
  Stack: one 1 pushed per increment
  Input symbols: '1' for increment, 'R' for reset
  Three independent automata: channels A, B, C
  Counts and stacks persist across sessions

Commands:
  a | b | c | select <X>   select a channel
  + | inc                  increment the selected channel
  reset [X]                reset the selected channel, or channel X
  show                     show all channels
  help                     show this text
  quit                     save and exit";

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(ChannelName),
    Increment,
    /// Reset the selected channel, or the named one
    Reset(Option<String>),
    Show,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let mut words = line.split_whitespace();
        let Some(head) = words.next() else {
            return Ok(None);
        };
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("Too many arguments: {}", line.trim()));
        }

        let command = match (head.to_ascii_lowercase().as_str(), arg) {
            ("a" | "b" | "c", None) => Command::Select(parse_channel(head)?),
            ("select", Some(name)) => Command::Select(parse_channel(name)?),
            ("+" | "inc" | "increment", None) => Command::Increment,
            ("reset" | "r", name) => Command::Reset(name.map(str::to_string)),
            ("show", None) => Command::Show,
            ("help" | "?", None) => Command::Help,
            ("quit" | "exit" | "q", None) => Command::Quit,
            _ => return Err(format!("Unknown command: {}", line.trim())),
        };
        Ok(Some(command))
    }
}

fn parse_channel(name: &str) -> Result<ChannelName, String> {
    name.parse::<ChannelName>().map_err(|e| e.to_string())
}

/// Render one channel the way the display shows it.
pub fn render_channel(channel: &ChannelCounter) -> String {
    format!(
        "Channel {}  {:>8}  State: {}  Stack: {}  Input: {}",
        channel.name(),
        channel.count(),
        channel.state(),
        render_stack(channel.stack()),
        channel.last_input()
    )
}

fn render_stack(stack: &[u32]) -> String {
    if stack.len() <= STACK_PREVIEW {
        return format!("{:?}", stack);
    }
    let head: Vec<String> = stack[..STACK_PREVIEW].iter().map(u32::to_string).collect();
    format!("[{}, ... ({} entries)]", head.join(", "), stack.len())
}

/// Console controller that wires input lines to a session
///
/// Generic over its input and output so it can be driven from tests.
pub struct ConsoleController<R, W> {
    session: CounterSession,
    selected: ChannelName,
    events: broadcast::Receiver<ChannelEvent>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsoleController<R, W> {
    pub fn new(session: CounterSession, input: R, output: W) -> Self {
        let events = session.registry().subscribe();
        Self {
            session,
            selected: ChannelName::A,
            events,
            input,
            output,
        }
    }

    /// Run until `quit` or end of input.
    ///
    /// # Returns
    /// The session, so the caller can log its metrics or save it once more
    pub fn run(mut self) -> Result<CounterSession> {
        writeln!(self.output, "Multi-Channel PDA Counter (target {})", self.session.target())?;
        self.show_all()?;

        let mut line = String::new();
        loop {
            write!(self.output, "[{}] > ", self.selected)?;
            self.output.flush()?;

            line.clear();
            let read = self
                .input
                .read_line(&mut line)
                .context("Failed to read console input")?;
            if read == 0 {
                writeln!(self.output)?;
                break;
            }

            match Command::parse(&line) {
                Ok(None) => {}
                Ok(Some(Command::Quit)) => break,
                Ok(Some(command)) => self.execute(command)?,
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        }

        Ok(self.session)
    }

    /// The channel increments currently go to.
    pub fn selected(&self) -> ChannelName {
        self.selected
    }

    fn execute(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Select(name) => {
                self.selected = name;
                tracing::debug!("Selected channel {}", name);
            }
            Command::Increment => {
                let name = self.selected;
                match self.session.increment(name.as_str()) {
                    Ok(reached) => {
                        self.refresh()?;
                        if reached {
                            // Terminal bell stands in for the beep
                            writeln!(self.output, "\x07Channel {} reached target!", name)?;
                        }
                    }
                    Err(e) => self.report(e)?,
                }
            }
            Command::Reset(name) => {
                let name = name.unwrap_or_else(|| self.selected.to_string());
                match self.session.reset(&name) {
                    Ok(()) => self.refresh()?,
                    Err(e) => self.report(e)?,
                }
            }
            Command::Show => self.show_all()?,
            Command::Help => writeln!(self.output, "{}", HELP_TEXT)?,
            Command::Quit => {}
        }
        Ok(())
    }

    /// Redraw every channel touched since the last refresh.
    fn refresh(&mut self) -> Result<()> {
        let mut touched: Vec<ChannelName> = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(ChannelEvent::Incremented { channel, .. } | ChannelEvent::Reset { channel }) => {
                    if !touched.contains(&channel) {
                        touched.push(channel);
                    }
                }
                Ok(ChannelEvent::TargetReached { .. }) => {}
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::debug!("Display lagged {} events, redrawing all", skipped);
                    touched = ChannelName::ALL.to_vec();
                }
                Err(_) => break,
            }
        }

        for name in touched {
            let row = render_channel(self.session.registry().channel(name));
            writeln!(self.output, "{}", row)?;
        }
        Ok(())
    }

    fn show_all(&mut self) -> Result<()> {
        for channel in self.session.registry().channels() {
            writeln!(self.output, "{}", render_channel(channel))?;
        }
        Ok(())
    }

    fn report(&mut self, error: SessionError) -> Result<()> {
        match &error {
            SessionError::Registry(_) => tracing::warn!("{}", error),
            SessionError::Persistence(_) => tracing::error!("{}", error),
        }
        // A failed save still leaves the in-memory change visible
        self.refresh()?;
        writeln!(self.output, "Error: {}", error)?;
        Ok(())
    }
}
