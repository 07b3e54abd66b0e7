//! Converter view state, its explicit transitions and the async driver
//! that runs fetches against a [`RateProvider`].

use crate::core::config::ConverterDefaults;
use crate::core::rates::{RateProvider, RateTable};
use anyhow::{Result, anyhow};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

/// The two kinds of fetch failure surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    CurrencyList,
    Conversion,
}

impl FetchFailure {
    pub fn message(&self) -> &'static str {
        match self {
            FetchFailure::CurrencyList => "Failed to fetch currencies. Please try again later.",
            FetchFailure::Conversion => "Failed to convert currency. Please try again later.",
        }
    }
}

impl Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// Identifies one issued fetch. Only the completion carrying the awaited
/// ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub ticket: Ticket,
    pub base: String,
}

/// Outcome of feeding a fetch completion into the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// A successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub amount: String,
    pub source: String,
    pub target: String,
    pub rate: f64,
    pub converted: Decimal,
}

impl Quote {
    pub fn converted_display(&self) -> String {
        format!("{:.2}", self.converted)
    }
}

impl Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} = {} {}",
            self.amount,
            self.source,
            self.converted_display(),
            self.target
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConversionPhase {
    Idle,
    Loading { ticket: Ticket },
    Success,
    Failure(FetchFailure),
}

/// Parses a user supplied amount. Only positive numbers qualify for
/// conversion.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let input = input.trim();
    Decimal::from_str(input)
        .or_else(|_| Decimal::from_scientific(input))
        .ok()
        .filter(|amount| amount.is_sign_positive() && !amount.is_zero())
}

/// `round(amount * rate, 2)`, midpoint away from zero. `None` when the
/// rate is not representable or the product overflows.
pub fn convert_amount(amount: Decimal, rate: f64) -> Option<Decimal> {
    if !rate.is_finite() {
        return None;
    }
    // Display of f64 is the shortest round-tripping form, never exponential.
    let rate = Decimal::from_str(&rate.to_string()).ok()?;
    amount
        .checked_mul(rate)
        .map(|v| v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone)]
pub struct ConverterState {
    source: String,
    target: String,
    amount: String,
    list_base: String,
    currencies: Vec<String>,
    quote: Option<Quote>,
    error: Option<FetchFailure>,
    phase: ConversionPhase,
    pending_list: Option<Ticket>,
    next_ticket: u64,
}

impl ConverterState {
    pub fn new(defaults: &ConverterDefaults, list_base: &str) -> Self {
        ConverterState {
            source: normalize_code(&defaults.source),
            target: normalize_code(&defaults.target),
            amount: defaults.amount.trim().to_string(),
            list_base: normalize_code(list_base),
            currencies: Vec::new(),
            quote: None,
            error: None,
            phase: ConversionPhase::Idle,
            pending_list: None,
            next_ticket: 0,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    pub fn error(&self) -> Option<FetchFailure> {
        self.error
    }

    pub fn phase(&self) -> &ConversionPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.pending_list.is_some() || matches!(self.phase, ConversionPhase::Loading { .. })
    }

    /// Last successful conversion, even if a later attempt failed.
    pub fn last_quote(&self) -> Option<&Quote> {
        self.quote.as_ref()
    }

    /// The conversion to display: only while idle, error free, and the
    /// latest conversion cycle succeeded.
    pub fn converted_amount(&self) -> Option<&Quote> {
        if self.is_loading() || self.error.is_some() || self.phase != ConversionPhase::Success {
            return None;
        }
        self.quote.as_ref()
    }

    /// Whether `code` is selectable. Anything goes until the list is loaded.
    pub fn is_known_currency(&self, code: &str) -> bool {
        self.currencies.is_empty() || self.currencies.iter().any(|c| c == code)
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    pub fn begin_currency_list(&mut self) -> FetchRequest {
        let ticket = self.issue_ticket();
        self.pending_list = Some(ticket);
        debug!(?ticket, base = %self.list_base, "Currency list fetch started");
        FetchRequest {
            ticket,
            base: self.list_base.clone(),
        }
    }

    pub fn finish_currency_list(&mut self, ticket: Ticket, result: Result<RateTable>) -> Completion {
        if self.pending_list != Some(ticket) {
            debug!(?ticket, "Discarding stale currency list response");
            return Completion::Stale;
        }
        self.pending_list = None;

        match result {
            Ok(table) => {
                self.currencies = table.currencies();
                self.error = None;
                debug!(count = self.currencies.len(), "Currency list loaded");
            }
            Err(e) => {
                debug!(error = %e, "Currency list fetch failed");
                self.error = Some(FetchFailure::CurrencyList);
            }
        }
        Completion::Applied
    }

    /// Starts a conversion cycle for the current inputs. Returns `None`, and
    /// clears the result, when the inputs do not allow a conversion.
    pub fn begin_conversion(&mut self) -> Option<FetchRequest> {
        if self.source.is_empty() || self.target.is_empty() || parse_amount(&self.amount).is_none()
        {
            debug!(amount = %self.amount, "Skipping conversion");
            self.phase = ConversionPhase::Idle;
            self.quote = None;
            return None;
        }

        let ticket = self.issue_ticket();
        if let ConversionPhase::Loading { ticket: previous } = self.phase {
            debug!(?previous, ?ticket, "Superseding in-flight conversion");
        }
        self.phase = ConversionPhase::Loading { ticket };
        Some(FetchRequest {
            ticket,
            base: self.source.clone(),
        })
    }

    pub fn finish_conversion(&mut self, ticket: Ticket, result: Result<RateTable>) -> Completion {
        if self.phase != (ConversionPhase::Loading { ticket }) {
            debug!(?ticket, "Discarding stale conversion response");
            return Completion::Stale;
        }

        match result.and_then(|table| self.quote_from(&table)) {
            Ok(quote) => {
                debug!(%quote, "Conversion succeeded");
                self.quote = Some(quote);
                self.error = None;
                self.phase = ConversionPhase::Success;
            }
            Err(e) => {
                debug!(error = %e, "Conversion failed");
                self.error = Some(FetchFailure::Conversion);
                self.phase = ConversionPhase::Failure(FetchFailure::Conversion);
            }
        }
        Completion::Applied
    }

    fn quote_from(&self, table: &RateTable) -> Result<Quote> {
        let rate = table
            .rate(&self.target)
            .ok_or_else(|| anyhow!("No rate for {} in {} table", self.target, table.base))?;
        let amount =
            parse_amount(&self.amount).ok_or_else(|| anyhow!("Invalid amount: {}", self.amount))?;
        let converted = convert_amount(amount, rate)
            .ok_or_else(|| anyhow!("Cannot convert {} at rate {}", amount, rate))?;

        Ok(Quote {
            amount: self.amount.clone(),
            source: self.source.clone(),
            target: self.target.clone(),
            rate,
            converted,
        })
    }

    pub fn set_source(&mut self, code: &str) -> Option<FetchRequest> {
        self.source = normalize_code(code);
        self.begin_conversion()
    }

    pub fn set_target(&mut self, code: &str) -> Option<FetchRequest> {
        self.target = normalize_code(code);
        self.begin_conversion()
    }

    pub fn set_amount(&mut self, amount: &str) -> Option<FetchRequest> {
        self.amount = amount.trim().to_string();
        self.begin_conversion()
    }

    pub fn swap(&mut self) -> Option<FetchRequest> {
        std::mem::swap(&mut self.source, &mut self.target);
        self.begin_conversion()
    }
}

/// Drives a [`ConverterState`] against a rate provider, one fetch at a time
/// or both mount fetches concurrently.
pub struct Converter {
    provider: Arc<dyn RateProvider>,
    state: ConverterState,
}

impl Converter {
    pub fn new(provider: Arc<dyn RateProvider>, state: ConverterState) -> Self {
        Converter { provider, state }
    }

    pub fn state(&self) -> &ConverterState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ConverterState {
        &mut self.state
    }

    pub fn provider(&self) -> Arc<dyn RateProvider> {
        Arc::clone(&self.provider)
    }

    #[instrument(name = "LoadCurrencyList", skip(self))]
    pub async fn load_currency_list(&mut self) -> Completion {
        let request = self.state.begin_currency_list();
        let result = self.provider.fetch_rates(&request.base).await;
        self.state.finish_currency_list(request.ticket, result)
    }

    /// Runs one conversion cycle. `None` when no conversion was attempted.
    #[instrument(name = "Convert", skip(self))]
    pub async fn convert(&mut self) -> Option<Completion> {
        let request = self.state.begin_conversion()?;
        let result = self.provider.fetch_rates(&request.base).await;
        Some(self.state.finish_conversion(request.ticket, result))
    }

    /// Mount: fetches the currency list and converts the initial inputs
    /// concurrently. Returns every failure seen, list first, since the
    /// shared error slot only keeps the last one.
    #[instrument(name = "Mount", skip(self))]
    pub async fn mount(&mut self) -> Vec<FetchFailure> {
        let list_request = self.state.begin_currency_list();
        let conversion_request = self.state.begin_conversion();

        let provider = &self.provider;
        let list_fetch = provider.fetch_rates(&list_request.base);
        let conversion_fetch = async {
            match &conversion_request {
                Some(request) => Some(provider.fetch_rates(&request.base).await),
                None => None,
            }
        };
        let (list_result, conversion_result) = futures::join!(list_fetch, conversion_fetch);

        let mut failures = Vec::new();
        if list_result.is_err() {
            failures.push(FetchFailure::CurrencyList);
        }
        self.state.finish_currency_list(list_request.ticket, list_result);

        if let (Some(request), Some(result)) = (conversion_request, conversion_result) {
            self.state.finish_conversion(request.ticket, result);
            if let ConversionPhase::Failure(failure) = self.state.phase {
                failures.push(failure);
            }
        }
        failures
    }
}
