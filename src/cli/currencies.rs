use super::ui;
use crate::core::{FetchFailure, RateProvider};
use anyhow::{Context, Result};
use comfy_table::Cell;
use std::io::Write;

/// Prints every known currency with its rate against `base`.
pub async fn run<W: Write>(provider: &dyn RateProvider, base: &str, out: &mut W) -> Result<()> {
    let spinner = ui::new_spinner("Fetching currencies...");
    let result = provider.fetch_rates(base).await;
    spinner.finish_and_clear();

    let rates = result.context(FetchFailure::CurrencyList.message())?;

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Currency"),
        ui::header_cell(&format!("Rate (per 1 {})", rates.base)),
    ]);
    for (code, rate) in rates.iter() {
        table.add_row(vec![Cell::new(code), ui::rate_cell(rate)]);
    }

    writeln!(out, "{table}")?;
    writeln!(
        out,
        "\n{} {}",
        ui::style_text("Currencies:", ui::StyleType::Label),
        rates.len()
    )?;
    Ok(())
}
