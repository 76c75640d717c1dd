//! Output formatting for CLI commands

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "success": true,
                        "message": message
                    })
                );
            }
        }
    }

    /// Prints a non-fatal warning to stderr
    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Text => eprintln!("Warning: {}", message),
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "warning": message
                    })
                );
            }
        }
    }

    /// Prints structured data
    pub fn data<T: Serialize>(&self, data: &T) {
        match self.format {
            OutputFormat::Text => {
                // Callers normally print their own text; fall back to pretty JSON
                if let Ok(json) = serde_json::to_string_pretty(data) {
                    println!("{}", json);
                }
            }
            OutputFormat::Json => {
                if let Ok(json) = serde_json::to_string(data) {
                    println!("{}", json);
                }
            }
        }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
