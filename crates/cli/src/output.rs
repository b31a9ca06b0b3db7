//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use runwatch_lib::RunSummary;

/// Output format for the run summary
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable block output (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print the run summary in the requested format.
pub fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Table => {
            println!();
            println!("{}", "Run Summary".bold());
            println!("{}", "=".repeat(50));
            println!(
                "Peak Memory:    {}",
                format_bytes(summary.peak_memory_bytes).cyan()
            );
            match summary.average_cpu_millicores {
                Some(average) => println!("Average CPU:    {}", format_cpu(average).cyan()),
                None => print_warning("No CPU samples collected"),
            }
            match summary.duration_millis {
                Some(millis) => println!("Duration:       {}", format!("{} ms", millis).cyan()),
                None => print_warning("Duration not available"),
            }
            println!("Samples:        {}", summary.sample_count);
        }
    }

    Ok(())
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format millicores as human-readable string
pub fn format_cpu(millicores: f64) -> String {
    if millicores >= 1000.0 {
        format!("{:.2} cores", millicores / 1000.0)
    } else {
        format!("{:.2}m", millicores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512B");
        assert_eq!(format_bytes(64 * 1024), "64.00Ki");
        assert_eq!(format_bytes(250 * 1024 * 1024), "250.00Mi");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00Gi");
    }

    #[test]
    fn test_format_cpu() {
        assert_eq!(format_cpu(86.67), "86.67m");
        assert_eq!(format_cpu(1500.0), "1.50 cores");
    }
}
