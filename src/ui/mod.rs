// UI module - console front end
//
// This module contains:
// - ConsoleController: reads commands, drives a CounterSession, redraws channels
// - Command: parsed console input

pub mod console;

pub use console::{Command, ConsoleController, HELP_TEXT, render_channel};
