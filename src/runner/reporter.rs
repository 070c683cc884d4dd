use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

use crate::collection::RequestInstance;
use crate::http::Response;
use crate::runner::types::RunSummary;

pub struct RunReporter {
    verbose: bool,
}

impl RunReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    pub fn print_header(&self, file_path: &str, selected: usize, total: usize) {
        println!(
            "\nRunning {} of {} requests from {}...\n",
            selected,
            total,
            file_path.bold()
        );
    }

    /// 打印单个实例的结果
    pub fn print_result(&self, instance: &RequestInstance) {
        let passed = instance.failed_assertions() == 0 && !instance.has_transport_error();
        let symbol = if passed { "✓".green() } else { "✗".red() };

        let timing = match instance.response() {
            Some(Response::Received(r)) => {
                format!(" {} ({}ms)", r.status.code(), r.duration.as_millis())
            }
            _ => String::new(),
        };

        println!(
            " {} [{}] {} - {} {}{}",
            symbol,
            instance.id(),
            instance.name,
            instance.method.as_str().cyan(),
            instance.url,
            timing
        );

        if let Some(error) = instance.response().and_then(|r| r.error()) {
            println!("   {}: {}", "Error".red().bold(), error);
        }

        for result in instance.results() {
            if result.passed {
                if self.verbose {
                    println!("     {} {}", "✓".green(), result.message);
                }
                continue;
            }
            println!("     {} {}", "✗".red(), result.message);
            for detail in result.details.lines() {
                println!("       {}", detail.dimmed());
            }
        }
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        println!("\n{}", "━".repeat(50));
        println!("{}", "Summary".bold());
        println!("{}", "━".repeat(50));

        println!("  > Total requests: {}", summary.total_requests);
        println!("  > Total assertions: {}", summary.total_assertions);
        println!(
            "  > Total passed assertions: {}",
            summary.passed_assertions.to_string().green()
        );
        let failed = summary.failed_assertions.to_string();
        println!(
            "  > Total failed assertions: {}",
            if summary.failed_assertions == 0 {
                failed.green()
            } else {
                failed.red()
            }
        );
        println!(
            "  > Duration: {:.3}s",
            summary.total_duration.as_secs_f64()
        );

        if !summary.failed_requests.is_empty() {
            println!("  > Requests with failed assertions:");
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["ID", "Name", "URL", "Failed"]);
            for request in &summary.failed_requests {
                table.add_row(vec![
                    Cell::new(request.id),
                    Cell::new(&request.name),
                    Cell::new(&request.url).add_attribute(Attribute::Dim),
                    Cell::new(request.failed_assertions).fg(Color::Red),
                ]);
            }
            println!("{}", table);
        }

        if !summary.transport_errors.is_empty() {
            println!("  > Transport errors:");
            for failure in &summary.transport_errors {
                println!(
                    "    >> ({}): {} - {}",
                    failure.id,
                    failure.name,
                    failure.error.red()
                );
            }
        }
        println!();
    }
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new(false)
    }
}
