use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::models::Dependency;

/// Print a summary of the generated report.
///
/// With `quiet` only the confirmation line is printed.
pub fn render(report: &[Dependency], output: &Path, quiet: bool) {
    if !quiet {
        let found = report.iter().filter(|d| d.license.is_some()).count();
        let missing = report.len() - found;

        println!(
            "\n {} v{}\n",
            "spm-licenses".bold(),
            env!("CARGO_PKG_VERSION")
        );

        if !report.is_empty() {
            println!("{}", build_table(report));
        }

        println!(
            " Dependencies: {}  With license: {}  Missing: {}\n",
            report.len(),
            found.to_string().green(),
            if missing > 0 {
                missing.to_string().yellow()
            } else {
                missing.to_string().normal()
            },
        );
    }

    println!(
        "Licenses were successfully generated and saved to: {}",
        output.display()
    );
}

fn build_table(report: &[Dependency]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Name").add_attribute(Attribute::Bold),
            Cell::new("Organisation").add_attribute(Attribute::Bold),
            Cell::new("Version").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
        ]);

    for dep in report {
        let (license_str, license_color) = match dep.license {
            Some(_) => ("✓ found", Color::Green),
            None => ("✗ missing", Color::Yellow),
        };

        table.add_row(vec![
            Cell::new(&dep.name),
            Cell::new(dep.organisation().unwrap_or_default()),
            Cell::new(dep.version.as_deref().unwrap_or("-")),
            Cell::new(license_str)
                .fg(license_color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    table
}
