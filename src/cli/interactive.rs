//! Event driven converter session. Each stdin line is an input event; fetch
//! completions arrive on the same channel so fetches overlap freely and the
//! state decides which completions still apply.

use super::{ui, view};
use crate::core::converter::{Completion, FetchRequest, Ticket};
use crate::core::{ConverterState, RateProvider, RateTable};
use anyhow::{Result, bail};
use std::io::Write;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

const HELP: &str = "\
Commands:
  amount <value>   set the amount to convert
  from <code>      set the source currency
  to <code>        set the target currency
  swap             exchange source and target
  refresh          reload the currency list and convert again
  list             show known currencies
  help             show this help
  quit             leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Amount(String),
    From(String),
    To(String),
    Swap,
    Refresh,
    List,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let command = parts.next().unwrap_or_default().to_lowercase();
        let argument = parts.next();
        if parts.next().is_some() {
            bail!("Too many arguments: {}", s.trim());
        }

        match (command.as_str(), argument) {
            ("amount" | "a", value) => Ok(Input::Amount(value.unwrap_or_default().to_string())),
            ("from" | "f", Some(code)) => Ok(Input::From(code.to_string())),
            ("to" | "t", Some(code)) => Ok(Input::To(code.to_string())),
            ("swap", None) => Ok(Input::Swap),
            ("refresh", None) => Ok(Input::Refresh),
            ("list" | "ls", None) => Ok(Input::List),
            ("help" | "?", None) => Ok(Input::Help),
            ("quit" | "exit" | "q", None) => Ok(Input::Quit),
            _ => bail!("Unknown command: {}. Type 'help' for usage", s.trim()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FetchKind {
    CurrencyList,
    Conversion,
}

enum Event {
    Input(Input),
    InvalidInput(String),
    InputClosed,
    Fetched(FetchKind, Ticket, Result<RateTable>),
}

fn spawn_fetch(
    provider: &Arc<dyn RateProvider>,
    events: &mpsc::UnboundedSender<Event>,
    kind: FetchKind,
    request: FetchRequest,
) {
    let provider = Arc::clone(provider);
    let events = events.clone();
    debug!(?kind, ticket = ?request.ticket, base = %request.base, "Spawning fetch");
    tokio::spawn(async move {
        let result = provider.fetch_rates(&request.base).await;
        // The session may be gone already
        let _ = events.send(Event::Fetched(kind, request.ticket, result));
    });
}

fn spawn_reader<R>(reader: R, events: mpsc::UnboundedSender<Event>)
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    let event = match line.parse::<Input>() {
                        Ok(input) => Event::Input(input),
                        Err(e) => Event::InvalidInput(e.to_string()),
                    };
                    if events.send(event).is_err() {
                        return;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(error = %e, "Failed to read input");
                    break;
                }
            }
        }
        let _ = events.send(Event::InputClosed);
    });
}

/// Runs the session until `quit`, or until input ends and no tracked fetch
/// is in flight.
pub async fn run<R, W>(
    provider: Arc<dyn RateProvider>,
    mut state: ConverterState,
    reader: R,
    out: &mut W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
    W: Write,
{
    let (events, mut inbox) = mpsc::unbounded_channel();
    spawn_reader(reader, events.clone());

    spawn_fetch(
        &provider,
        &events,
        FetchKind::CurrencyList,
        state.begin_currency_list(),
    );
    if let Some(request) = state.begin_conversion() {
        spawn_fetch(&provider, &events, FetchKind::Conversion, request);
    }
    writeln!(out, "{}\n", view::render(&state))?;

    let mut input_open = true;
    while let Some(event) = inbox.recv().await {
        let changed = match event {
            Event::Input(Input::Quit) => break,
            Event::Input(Input::Help) => {
                writeln!(out, "{HELP}\n")?;
                false
            }
            Event::Input(Input::List) => {
                if state.currencies().is_empty() {
                    writeln!(
                        out,
                        "{}\n",
                        ui::style_text("No currencies loaded", ui::StyleType::Subtle)
                    )?;
                } else {
                    writeln!(out, "{}\n", state.currencies().join(" "))?;
                }
                false
            }
            Event::Input(input) => {
                let request = match input {
                    Input::Amount(amount) => state.set_amount(&amount),
                    Input::From(code) => state.set_source(&code),
                    Input::To(code) => state.set_target(&code),
                    Input::Swap => state.swap(),
                    Input::Refresh => {
                        let list = state.begin_currency_list();
                        spawn_fetch(&provider, &events, FetchKind::CurrencyList, list);
                        state.begin_conversion()
                    }
                    Input::List | Input::Help | Input::Quit => None,
                };
                if let Some(request) = request {
                    spawn_fetch(&provider, &events, FetchKind::Conversion, request);
                }
                true
            }
            Event::InvalidInput(message) => {
                writeln!(out, "{}\n", ui::style_text(&message, ui::StyleType::Error))?;
                false
            }
            Event::InputClosed => {
                input_open = false;
                false
            }
            Event::Fetched(kind, ticket, result) => {
                let completion = match kind {
                    FetchKind::CurrencyList => state.finish_currency_list(ticket, result),
                    FetchKind::Conversion => state.finish_conversion(ticket, result),
                };
                completion == Completion::Applied
            }
        };

        if changed {
            writeln!(out, "{}\n", view::render(&state))?;
        }
        if !input_open && !state.is_loading() {
            break;
        }
    }

    debug!("Session finished");
    Ok(())
}
