//! Output formatters for the build report

use anyhow::Result;
use colored::*;
use searchbook_core::report::{DropdownKind, Notice};
use searchbook_core::{BuildReport, NoticeScope, Severity};
use std::collections::BTreeMap;

/// Print the report in human-readable format with colors and hierarchy
pub fn print_human(report: &BuildReport) {
    let title = if report.written {
        format!("Built: {}", report.output.display())
    } else {
        format!("Dry run: {} (not written)", report.output.display())
    };
    println!("{}", title.bold());
    println!();

    println!("{}", "Sheets:".bold().underline());
    println!("  {} {}", report.search_sheet.cyan().bold(), "(search)".bright_black());
    for sheet in &report.sheets {
        let category = sheet
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "catch-all".to_string());
        let marker = if sheet.canonical || sheet.category.is_none() {
            String::new()
        } else {
            " (not referenced)".to_string()
        };
        println!(
            "  {} {} {} rows from {}{}",
            sheet.name.cyan(),
            format!("[{}]", category).bright_black(),
            sheet.data_rows,
            sheet.source_file,
            marker.yellow()
        );
    }
    println!();

    if !report.blocks.is_empty() {
        println!("{}", "Search blocks:".bold().underline());
        for block in &report.blocks {
            println!(
                "  {} {} {} {}",
                format!("row {:>4}", block.row).yellow(),
                block.category.to_string().bold(),
                "->".bright_black(),
                block.sheet
            );
        }
        println!();
    }

    if let Some(dropdown) = &report.dropdown {
        let source = match &dropdown.kind {
            DropdownKind::Inline => "inline list".to_string(),
            DropdownKind::HiddenSheet(name) => format!("hidden sheet {}", name),
        };
        println!(
            "{} {} with {} values ({})",
            "Issuer dropdown:".bold(),
            dropdown.cell.yellow(),
            dropdown.values,
            source
        );
        println!();
    }

    if !report.skipped_files.is_empty() {
        println!("{}", "Skipped files:".bold().underline());
        for file in &report.skipped_files {
            println!("  {}", file.bright_black());
        }
        println!();
    }

    print_notices(&report.notices);

    let warning_count = report.warning_count();
    let info_count = report
        .notices
        .iter()
        .filter(|n| n.severity == Severity::Info)
        .count();

    println!("{}", "Summary:".bold().underline());
    println!("  {} {}", "Sheets:".bold(), report.sheet_count());
    println!("  {} {}", "Search blocks:".bold(), report.blocks.len());
    if warning_count > 0 {
        println!("  {} {}", "Warnings:".yellow().bold(), warning_count);
    }
    if info_count > 0 {
        println!("  {} {}", "Info:".blue().bold(), info_count);
    }

    if report.written {
        println!();
        println!(
            "{} type an identifier into {} of {}; pick an issuer in the dropdown to narrow license rows",
            "Usage:".green().bold(),
            report.id_cell.yellow(),
            report.search_sheet.cyan()
        );
    }
}

fn print_notices(notices: &[Notice]) {
    if notices.is_empty() {
        return;
    }

    // Group notices by scope for hierarchical display
    let mut run_notices = Vec::new();
    let mut scoped: BTreeMap<(&str, String), Vec<&Notice>> = BTreeMap::new();

    for notice in notices {
        match &notice.scope {
            NoticeScope::Run => run_notices.push(notice),
            NoticeScope::Category(category) => scoped
                .entry(("Category:", category.to_string()))
                .or_default()
                .push(notice),
            NoticeScope::File(file) => scoped
                .entry(("File:", file.clone()))
                .or_default()
                .push(notice),
            NoticeScope::Sheet(sheet) => scoped
                .entry(("Sheet:", sheet.clone()))
                .or_default()
                .push(notice),
        }
    }

    println!("{}", "Notices:".bold().underline());
    for notice in run_notices {
        print_notice(notice, 1);
    }
    for ((label, name), notices) in &scoped {
        println!("  {} {}", label.bold(), name.cyan());
        for notice in notices {
            print_notice(notice, 2);
        }
    }
    println!();
}

fn print_notice(notice: &Notice, indent: usize) {
    let indent_str = "  ".repeat(indent);
    let severity_str = match notice.severity {
        Severity::Warning => "WARN".yellow().bold(),
        Severity::Info => "INFO".blue().bold(),
    };

    println!("{}{} {}", indent_str, severity_str, notice.message);
}

/// Print the report in JSON format
pub fn print_json(report: &BuildReport) -> Result<()> {
    let output = serde_json::json!({
        "report": report,
        "summary": {
            "sheets": report.sheet_count(),
            "blocks": report.blocks.len(),
            "warnings": report.warning_count(),
            "info": report.notices.iter().filter(|n| n.severity == Severity::Info).count(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
