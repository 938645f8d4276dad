//! Output formatting and styling module.
//!
//! Everything the binary prints goes through [`OutputFormatter`]; structured
//! diagnostics go through `tracing` instead.

use crate::category::CategorySet;
use crate::record::RelocationRecord;
use colored::*;
use std::collections::BTreeMap;

/// Prints styled CLI output.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use tidyup::output::OutputFormatter;
    /// OutputFormatter::success("Directory sorted");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints one line per planned relocation.
    pub fn planned_moves(records: &[RelocationRecord]) {
        for record in records {
            let marker = if record.is_directory { "/" } else { "" };
            println!(
                " - {}{} {} {}/",
                record.original_name,
                marker,
                "→".cyan(),
                record.category
            );
        }
    }

    /// Prints a table of entry counts per category.
    pub fn summary_table(records: &[RelocationRecord]) {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.category.as_str()).or_insert(0) += 1;
        }

        Self::header("SUMMARY");

        let width = counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!(
            "{:<width$} | {}",
            "Category".bold(),
            "Entries".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 12));
        for (category, count) in &counts {
            println!(
                "{:<width$} | {} {}",
                category,
                count.to_string().green(),
                entry_word(*count),
                width = width
            );
        }
        println!("{}", "-".repeat(width + 12));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            records.len().to_string().green().bold(),
            entry_word(records.len()),
            width = width
        );
    }

    /// Lists every category with its extensions.
    pub fn category_list(set: &CategorySet) {
        for category in set.categories() {
            let role = if category.name == set.directory_category() {
                Some("receives directories")
            } else if category.name == set.unknown_category() {
                Some("receives unrecognized files")
            } else {
                None
            };
            match role {
                Some(role) => println!("{} ({})", category.name.bold(), role.dimmed()),
                None => {
                    let extensions: Vec<&str> = category
                        .extensions
                        .iter()
                        .filter(|ext| !ext.is_empty())
                        .map(String::as_str)
                        .collect();
                    println!("{}: {}", category.name.bold(), extensions.join(", "));
                }
            }
        }
    }
}

fn entry_word(count: usize) -> &'static str {
    if count == 1 { "entry" } else { "entries" }
}
