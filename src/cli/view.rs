//! Terminal rendering of the converter view.

use super::ui;
use crate::core::ConverterState;

fn currency_line(label: &str, code: &str, state: &ConverterState) -> String {
    let mut line = format!("{} {}", ui::style_text(label, ui::StyleType::Label), code);
    if !state.is_known_currency(code) {
        line.push(' ');
        line.push_str(&ui::style_text("(unknown currency)", ui::StyleType::Error));
    }
    line
}

/// Renders the whole view: title, error banner, inputs and the result area.
pub fn render(state: &ConverterState) -> String {
    let mut output = format!(
        "{}\n\n",
        ui::style_text("Currency Converter", ui::StyleType::Title)
    );

    if let Some(failure) = state.error() {
        output.push_str(&ui::style_text(failure.message(), ui::StyleType::Error));
        output.push_str("\n\n");
    }

    output.push_str(&format!(
        "{} {}\n",
        ui::style_text("Amount:", ui::StyleType::Label),
        state.amount()
    ));
    output.push_str(&currency_line("From:  ", state.source(), state));
    output.push('\n');
    output.push_str(&currency_line("To:    ", state.target(), state));
    output.push('\n');
    if !state.currencies().is_empty() {
        output.push_str(&ui::style_text(
            &format!("{} currencies available", state.currencies().len()),
            ui::StyleType::Subtle,
        ));
        output.push('\n');
    }

    output.push('\n');
    if state.is_loading() {
        output.push_str(&ui::style_text("Loading...", ui::StyleType::Subtle));
    } else if let Some(quote) = state.converted_amount() {
        output.push_str(&ui::style_text(&quote.to_string(), ui::StyleType::Result));
    }

    output
}
