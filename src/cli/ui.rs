use crate::core::format::variation_text;
use crate::core::result::DataSource;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
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

pub fn value_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying percentage variation with color coding.
pub fn variation_cell(variation: f64) -> Cell {
    let color = if variation >= 0.0 {
        Color::Green
    } else {
        Color::Red
    };
    Cell::new(variation_text(variation))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

/// One line telling whether the data is live or cached.
pub fn source_line(source: DataSource) -> String {
    match source {
        DataSource::Network => style_text("Live data", StyleType::Subtle),
        DataSource::Local => style_text(
            "Offline: showing last saved data. Run again to refresh.",
            StyleType::Subtle,
        ),
    }
}

/// Framed error panel shown in place of a table.
pub fn error_panel(message: &str) -> String {
    let mut table = new_styled_table();
    table.add_row(vec![
        Cell::new(message)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold)
            .set_alignment(CellAlignment::Center),
    ]);
    table.to_string()
}

/// Creates a spinner shown while a feed is loading.
pub fn new_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
