use super::ui;
use crate::core::bitcoins::{BitcoinUiModel, Bitcoins};
use crate::core::format::{br_date_time, br_number, brl_currency};
use crate::core::state::StateHolder;
use crate::core::sync::FeedResult;
use comfy_table::Table;

pub const TITLE: &str = "Bitcoin";

/// Formats the quote in the currency the exchange reports it in.
fn quote_value(bitcoin: &BitcoinUiModel) -> String {
    if bitcoin.currency_symbol.eq_ignore_ascii_case("BRL") {
        brl_currency(bitcoin.unitary_value)
    } else {
        format!(
            "{} {}",
            bitcoin.currency_symbol,
            br_number(bitcoin.unitary_value, 2)
        )
    }
}

pub fn build_table(bitcoins: &[BitcoinUiModel]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Exchange"),
        ui::header_cell("Currency"),
        ui::header_cell("Value"),
        ui::header_cell("Variation"),
        ui::header_cell("Updated"),
    ]);
    for bitcoin in bitcoins {
        table.add_row(vec![
            bitcoin.name.clone().into(),
            bitcoin.currency_name.clone().into(),
            ui::value_cell(quote_value(bitcoin)),
            ui::variation_cell(bitcoin.variation),
            br_date_time(&bitcoin.bitcoin_date).into(),
        ]);
    }
    table
}

pub fn render(state: &FeedResult<Bitcoins>) -> String {
    super::render_state(TITLE, state, build_table)
}

pub async fn run(holder: &StateHolder<Bitcoins>) -> anyhow::Result<()> {
    let state = super::wait_with_spinner("Fetching bitcoin quotes...", holder.reload()).await;
    println!("{}", render(&state));
    Ok(())
}
