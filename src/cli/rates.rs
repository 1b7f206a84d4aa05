use super::ui;
use crate::core::format::{br_date_time, brl_currency};
use crate::core::rates::{RateUiModel, Rates};
use crate::core::state::StateHolder;
use crate::core::sync::FeedResult;
use comfy_table::Table;

pub const TITLE: &str = "Exchange rates";

pub fn build_table(rates: &[RateUiModel]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell("Code"),
        ui::header_cell("Value"),
        ui::header_cell("Variation"),
        ui::header_cell("Updated"),
    ]);
    for rate in rates {
        table.add_row(vec![
            rate.currency_name.clone().into(),
            rate.currency_term.clone().into(),
            ui::value_cell(brl_currency(rate.unitary_rate)),
            ui::variation_cell(rate.variation),
            br_date_time(&rate.rate_date).into(),
        ]);
    }
    table
}

pub fn render(state: &FeedResult<Rates>) -> String {
    super::render_state(TITLE, state, build_table)
}

pub async fn run(holder: &StateHolder<Rates>) -> anyhow::Result<()> {
    let state = super::wait_with_spinner("Fetching exchange rates...", holder.reload()).await;
    println!("{}", render(&state));
    Ok(())
}
