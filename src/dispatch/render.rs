use std::io::{self, IsTerminal, Write};

use anyhow::Result;

use crate::plugins::{PluginInstance, PluginResult};

/// How results are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Text for a person at a terminal
    Human,
    /// One JSON object per line for another program
    Machine,
}

impl OutputMode {
    /// Machine output when forced or when stdout is redirected.
    pub fn detect(force_pipe: bool) -> Self {
        Self::select(force_pipe, io::stdout().is_terminal())
    }

    pub fn select(force_pipe: bool, stdout_is_terminal: bool) -> Self {
        if force_pipe || !stdout_is_terminal {
            OutputMode::Machine
        } else {
            OutputMode::Human
        }
    }
}

/// Writes one result with the renderer selected by `mode`.
pub fn render(
    instance: &dyn PluginInstance,
    result: &PluginResult,
    mode: OutputMode,
    out: &mut dyn Write,
) -> Result<()> {
    match mode {
        OutputMode::Machine => instance.display_machine(result, out),
        OutputMode::Human => instance.display_human(result, out),
    }
}
