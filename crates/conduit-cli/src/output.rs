//! Output formatting and writing utilities
//!
//! Responses and configuration are rendered either for humans (status line,
//! optional headers, body) or as JSON.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use conduit_core::http::Response;
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }
        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = match self.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::JsonPretty | OutputFormat::Human => serde_json::to_string_pretty(value)?,
        };
        trace!(bytes = formatted.len(), "Outputting data");
        self.writeln(&formatted)
    }

    /// Write a response.
    ///
    /// Human output prints the status line, the headers when `include_headers`
    /// is set, then the body unless it was already streamed.
    pub fn response(&mut self, response: &Response, include_headers: bool, body_streamed: bool) -> Result<()> {
        if !self.is_human() {
            return self.data(response);
        }

        if !self.quiet {
            let status_line = status_line(response);
            let status_line = if !self.use_color {
                status_line
            } else if response.is_success() {
                status_line.green().bold().to_string()
            } else if matches!(response.status, Some(300..=399)) {
                status_line.yellow().bold().to_string()
            } else {
                status_line.red().bold().to_string()
            };
            self.writeln(&status_line)?;

            if include_headers {
                for (name, value) in response.headers.iter() {
                    let name = if self.use_color {
                        name.cyan().to_string()
                    } else {
                        name.to_string()
                    };
                    self.writeln(&format!("{}: {}", name, value))?;
                }
            }
            self.writeln("")?;
        }

        if !body_streamed {
            self.writer.write_all(&response.body)?;
            if !response.body.ends_with(b"\n") && !response.body.is_empty() {
                self.writeln("")?;
            }
            self.writer.flush()?;
        }
        Ok(())
    }
}

fn status_line(response: &Response) -> String {
    let status = response.status.map(|s| s.to_string()).unwrap_or_else(|| "???".to_string());
    if response.reason_phrase.is_empty() {
        status
    } else {
        format!("{} {}", status, response.reason_phrase)
    }
}
