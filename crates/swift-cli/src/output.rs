//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use swift_core::audit::ConsistencyReport;
use swift_core::import::ImportReport;
use swift_core::model::{CountrySwiftCodes, SwiftCode, SwiftCodeDetails};
use swift_core::mutate::{DeleteOutcome, InsertOutcome};
use swift_core::resolver::LinkState;
use unicode_width::UnicodeWidthStr;

const CODE_WIDTH: usize = 11;
const BANK_WIDTH: usize = 32;
const ADDRESS_WIDTH: usize = 40;

/// Print a code and, for a headquarters, its branches.
pub fn print_details(details: &SwiftCodeDetails) {
    let code = &details.code;
    println!(
        "{} {}",
        code.swift_code.cyan().bold(),
        role_label(code.is_headquarter)
    );
    println!();
    println!("{}: {}", "Bank".bold(), code.bank_name);
    println!("{}: {}", "Address".bold(), display_address(&code.address));
    println!(
        "{}: {} ({})",
        "Country".bold(),
        code.country_name,
        code.country_iso2.dimmed()
    );

    if details.branches.is_some() {
        println!();
        let branches = details.branches();
        if branches.is_empty() {
            println!("{}", "No branches linked.".dimmed());
        } else {
            println!("{} ({})", "Branches".bold(), branches.len());
            print_code_table(branches);
        }
    }
}

/// Print every code of one country.
pub fn print_country(listing: &CountrySwiftCodes) {
    println!(
        "{} {}",
        listing.country_name.cyan().bold(),
        format!("({})", listing.country_iso2).dimmed()
    );
    println!();
    print_code_table(&listing.swift_codes);
    println!();
    println!("{} code(s) total", listing.swift_codes.len());
}

fn print_code_table(codes: &[SwiftCode]) {
    println!(
        "{} {} {} {}",
        pad_right("CODE", CODE_WIDTH).bold(),
        pad_right("ROLE", 6).bold(),
        pad_right("BANK", BANK_WIDTH).bold(),
        "ADDRESS".bold()
    );
    println!("{}", "─".repeat(CODE_WIDTH + 6 + BANK_WIDTH + ADDRESS_WIDTH + 3).dimmed());

    for code in codes {
        let role = if code.is_headquarter { "HQ".yellow() } else { "branch".normal() };
        println!(
            "{} {} {} {}",
            pad_right(&code.swift_code, CODE_WIDTH),
            pad_colored(role, 6),
            pad_right(&truncate_visual(&code.bank_name, BANK_WIDTH), BANK_WIDTH),
            truncate_visual(&display_address(&code.address), ADDRESS_WIDTH)
        );
    }
}

pub fn print_import_report(report: &ImportReport) {
    println!("  {:<20} {}", "Inserted".green(), report.inserted);
    println!("  {:<20} {}", "Already present", report.ignored);
    println!("  {:<20} {}", "Linked".green(), report.linked);
    println!("  {:<20} {}", dangling_label(report.dangling), report.dangling);
    if report.links_ignored > 0 {
        println!("  {:<20} {}", "Links kept", report.links_ignored);
    }
    if report.role_conflicts > 0 {
        println!("  {:<20} {}", "Role conflicts".yellow(), report.role_conflicts);
    }
    if report.synthesized_parents > 0 {
        println!("  {:<20} {}", "Parents created".cyan(), report.synthesized_parents);
    }
}

pub fn print_insert_outcome(outcome: &InsertOutcome) {
    if outcome.role_conflict {
        println!("  {}", "Stored with a different role, links left unchanged".yellow());
    }
    match &outcome.link {
        Some(LinkState::Linked(hq)) if outcome.link_written => {
            println!("  {} {}", "Linked to".green(), hq.cyan());
        }
        Some(LinkState::Dangling) if outcome.link_written => {
            println!("  {}", "Headquarters not stored yet, link left dangling".yellow());
        }
        Some(_) => println!("  {}", "Existing link kept".dimmed()),
        None => {}
    }
    if outcome.repaired > 0 {
        println!("  {} {} branch link(s)", "Repaired".green(), outcome.repaired);
    }
}

pub fn print_delete_outcome(outcome: &DeleteOutcome) {
    if outcome.orphaned_links > 0 {
        println!(
            "  {} {} link(s) still reference {}",
            "!".yellow().bold(),
            outcome.orphaned_links,
            outcome.swift_code
        );
    }
    if outcome.links_removed > 0 {
        println!("  {} {}", "Removed own link".dimmed(), outcome.links_removed);
    }
    if outcome.links_detached > 0 {
        println!("  {} {} branch link(s)", "Detached".yellow(), outcome.links_detached);
    }
}

pub fn print_audit(report: &ConsistencyReport) {
    if report.is_consistent() {
        println!("{} No link inconsistencies", "✓".green().bold());
    } else {
        println!("{} Link inconsistencies found", "✗".red().bold());
    }
    println!();

    println!("{} ({})", "Dangling links".bold(), report.dangling.len());
    for branch in &report.dangling {
        println!("  {}", branch.dimmed());
    }

    if !report.stale_dangling.is_empty() {
        println!();
        println!("{} ({})", "Stale dangling links".red().bold(), report.stale_dangling.len());
        for link in &report.stale_dangling {
            println!("  {} → {} (headquarters now present)", link.branch, link.headquarter.cyan());
        }
    }

    if !report.orphaned.is_empty() {
        println!();
        println!("{} ({})", "Orphaned links".red().bold(), report.orphaned.len());
        for link in &report.orphaned {
            let target = link.headquarter.as_deref().unwrap_or("-");
            println!("  {} → {}", link.branch, target.cyan());
        }
    }

    if !report.unlinked_branches.is_empty() {
        println!();
        println!(
            "{} ({})",
            "Branches without a link".red().bold(),
            report.unlinked_branches.len()
        );
        for branch in &report.unlinked_branches {
            println!("  {}", branch);
        }
    }

    if !report.linked_headquarters.is_empty() {
        println!();
        println!(
            "{} ({})",
            "Headquarters with a branch link".red().bold(),
            report.linked_headquarters.len()
        );
        for link in &report.linked_headquarters {
            let target = link.headquarter.as_deref().unwrap_or("-");
            println!("  {} → {}", link.branch, target.cyan());
        }
    }
}

fn role_label(is_headquarter: bool) -> ColoredString {
    if is_headquarter {
        "[headquarters]".yellow()
    } else {
        "[branch]".dimmed()
    }
}

fn dangling_label(count: usize) -> ColoredString {
    if count > 0 {
        "Dangling".yellow()
    } else {
        "Dangling".normal()
    }
}

fn display_address(address: &str) -> String {
    if address.is_empty() {
        "-".to_string()
    } else {
        address.to_string()
    }
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Pad a colored label; padding is computed on the plain text.
fn pad_colored(label: ColoredString, width: usize) -> String {
    let visual = UnicodeWidthStr::width(&*label);
    let padding = width.saturating_sub(visual);
    format!("{}{}", label, " ".repeat(padding))
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = unicode_width::UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
