use super::ui;
use crate::core::format::{br_date_time, br_number, brl_currency};
use crate::core::rates::{Conversion, ConversionError, Direction, Rates, convert};
use crate::core::result::UiState;
use crate::core::state::StateHolder;
use crate::core::sync::FeedResult;

pub const TITLE: &str = "Currency converter";

fn conversion_line(conversion: &Conversion) -> String {
    let foreign = |value: f64| format!("{} {}", br_number(value, 2), conversion.currency_term);
    match conversion.direction {
        Direction::ToBrl => format!(
            "{} = {}",
            foreign(conversion.amount),
            brl_currency(conversion.converted)
        ),
        Direction::FromBrl => format!(
            "{} = {}",
            brl_currency(conversion.amount),
            foreign(conversion.converted)
        ),
    }
}

/// Renders the conversion against the settled rates. Offline runs convert
/// with the cached rates; an error state renders the error panel.
pub fn render(
    state: &FeedResult<Rates>,
    code: &str,
    amount: f64,
    direction: Direction,
) -> Result<String, ConversionError> {
    let title = ui::style_text(TITLE, ui::StyleType::Title);
    let UiState::Success { data, source } = state else {
        return Ok(super::render_state(TITLE, state, |_| ui::new_styled_table()));
    };

    let conversion = convert(data, code, amount, direction)?;
    let rate_line = format!(
        "{} ({}): 1 {} = {} on {}",
        conversion.currency_name,
        conversion.currency_term,
        conversion.currency_term,
        brl_currency(conversion.unitary_rate),
        br_date_time(&conversion.rate_date)
    );
    Ok(format!(
        "{title}\n\n{}\n{}\n{}",
        console::style(conversion_line(&conversion)).bold(),
        ui::style_text(&rate_line, ui::StyleType::Subtle),
        ui::source_line(*source)
    ))
}

pub async fn run(
    holder: &StateHolder<Rates>,
    code: &str,
    amount: f64,
    direction: Direction,
) -> anyhow::Result<()> {
    let state = super::wait_with_spinner("Fetching exchange rates...", holder.reload()).await;
    println!("{}", render(&state, code, amount, direction)?);
    Ok(())
}
