use super::ui;
use crate::core::format::{br_date_time, br_number};
use crate::core::result::UiState;
use crate::core::state::StateHolder;
use crate::core::stocks::{StockUiModel, Stocks, filter_stocks};
use crate::core::sync::FeedResult;
use comfy_table::Table;

pub const TITLE: &str = "Stock indices";

pub fn build_table(stocks: &[StockUiModel]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Index"),
        ui::header_cell("Name"),
        ui::header_cell("Location"),
        ui::header_cell("Points"),
        ui::header_cell("Variation"),
        ui::header_cell("Updated"),
    ]);
    for stock in stocks {
        let location = if stock.country_location.is_empty() {
            stock.city_location.clone()
        } else {
            format!("{}, {}", stock.city_location, stock.country_location)
        };
        table.add_row(vec![
            stock.name.clone().into(),
            stock.full_name.clone().into(),
            location.into(),
            ui::value_cell(br_number(stock.points, 2)),
            ui::variation_cell(stock.variation),
            br_date_time(&stock.stock_date).into(),
        ]);
    }
    table
}

/// Renders the feed, narrowed to the stocks matching `filter` when given.
pub fn render(state: &FeedResult<Stocks>, filter: Option<&str>) -> String {
    match (state, filter) {
        (UiState::Success { data, source }, Some(query)) => {
            let matching: Vec<StockUiModel> =
                filter_stocks(data, query).into_iter().cloned().collect();
            if matching.is_empty() {
                return format!(
                    "{}\n\n{}",
                    ui::style_text(TITLE, ui::StyleType::Title),
                    ui::style_text(
                        &format!("No stock matches \"{query}\""),
                        ui::StyleType::Subtle
                    )
                );
            }
            super::render_state(TITLE, &UiState::success(matching, *source), build_table)
        }
        _ => super::render_state(TITLE, state, build_table),
    }
}

pub async fn run(holder: &StateHolder<Stocks>, filter: Option<&str>) -> anyhow::Result<()> {
    let state = super::wait_with_spinner("Fetching stock indices...", holder.reload()).await;
    println!("{}", render(&state, filter));
    Ok(())
}
