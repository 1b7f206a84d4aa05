pub mod bitcoins;
pub mod convert;
pub mod rates;
pub mod setup;
pub mod stocks;
pub mod ui;

use crate::core::result::UiState;
use comfy_table::Table;
use std::future::Future;

/// Shows a spinner until `future` completes.
pub async fn wait_with_spinner<T>(message: &str, future: impl Future<Output = T>) -> T {
    let pb = ui::new_spinner(message);
    let output = future.await;
    pb.finish_and_clear();
    output
}

/// Renders a settled feed: a titled table with its provenance, or the
/// error panel. `Loading` renders as a single subtle line.
pub fn render_state<T>(title: &str, state: &UiState<Vec<T>>, render: impl Fn(&[T]) -> Table) -> String {
    let mut output = format!("{}\n\n", ui::style_text(title, ui::StyleType::Title));
    match state {
        UiState::Loading => {
            output.push_str(&ui::style_text("Loading...", ui::StyleType::Subtle));
        }
        UiState::Success { data, source } => {
            output.push_str(&render(data).to_string());
            output.push_str(&format!("\n{}", ui::source_line(*source)));
        }
        UiState::Error { message } => {
            output.push_str(&ui::error_panel(message));
        }
    }
    output
}
