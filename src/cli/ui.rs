use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
    Warning,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
        StyleType::Warning => style(text).yellow(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned cell for a numeric value.
pub fn number_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Valuation band of a PE ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeClass {
    Low,
    Medium,
    High,
}

impl PeClass {
    pub fn label(self) -> &'static str {
        match self {
            PeClass::Low => "low",
            PeClass::Medium => "medium",
            PeClass::High => "high",
        }
    }

    fn color(self) -> Color {
        match self {
            PeClass::Low => Color::Green,
            PeClass::Medium => Color::Yellow,
            PeClass::High => Color::Red,
        }
    }
}

/// Above 25 is high, below 15 is low.
pub fn classify_pe(pe_ratio: f64) -> PeClass {
    if pe_ratio > 25.0 {
        PeClass::High
    } else if pe_ratio < 15.0 {
        PeClass::Low
    } else {
        PeClass::Medium
    }
}

/// Creates a cell for a PE ratio, colored by its valuation band.
pub fn pe_cell(pe_ratio: f64) -> Cell {
    Cell::new(format!("{pe_ratio:.2}"))
        .fg(classify_pe(pe_ratio).color())
        .set_alignment(CellAlignment::Right)
}

/// Styles a PE ratio for inline text, colored by its valuation band.
pub fn style_pe(pe_ratio: f64) -> String {
    let text = format!("{pe_ratio:.2}");
    let styled = match classify_pe(pe_ratio) {
        PeClass::Low => style(text).green(),
        PeClass::Medium => style(text).yellow(),
        PeClass::High => style(text).red(),
    };
    styled.to_string()
}

/// Formats rupees with Indian digit grouping, e.g. `₹12,34,567.89`.
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let grouped = if whole.len() <= 3 {
        whole.to_string()
    } else {
        let (head, tail) = whole.split_at(whole.len() - 3);
        let mut groups: Vec<&str> = Vec::new();
        let mut end = head.len();
        while end > 2 {
            groups.push(&head[end - 2..end]);
            end -= 2;
        }
        groups.push(&head[..end]);
        groups.reverse();
        format!("{},{}", groups.join(","), tail)
    };

    format!("{sign}₹{grouped}.{fraction}")
}

/// Formats a large rupee amount with a T/B/M/K suffix.
pub fn format_large_number(value: f64) -> String {
    if value >= 1e12 {
        format!("₹{:.2}T", value / 1e12)
    } else if value >= 1e9 {
        format!("₹{:.2}B", value / 1e9)
    } else if value >= 1e6 {
        format!("₹{:.2}M", value / 1e6)
    } else if value >= 1e3 {
        format!("₹{:.2}K", value / 1e3)
    } else {
        format!("₹{value:.2}")
    }
}

pub fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, with_message: bool) -> ProgressBar {
    let template = if with_message {
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    } else {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    };

    let pb = ProgressBar::new(len);
    if let Ok(bar_style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(bar_style.progress_chars("#>-"));
    }
    pb
}
