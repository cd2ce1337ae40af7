//! Line-oriented interactive mode.

use std::io::Write;

use ratewidget_common::{codes, CurrencyCode, MAJOR_CURRENCIES, WIDGET_CURRENCIES};
use ratewidget_fx::ConversionError;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::render;
use crate::session::{ConverterSession, SessionError};

/// A parsed interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Amount(String),
    From(String),
    To(String),
    Swap,
    Refresh,
    Rates,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("'{0}' needs a value")]
    MissingArgument(&'static str),
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(None);
        };
        let arg = parts.next().map(str::to_string);

        let command = match word.to_ascii_lowercase().as_str() {
            "amount" | "a" => Command::Amount(arg.ok_or(CommandError::MissingArgument("amount"))?),
            "from" | "f" => Command::From(arg.ok_or(CommandError::MissingArgument("from"))?),
            "to" | "t" => Command::To(arg.ok_or(CommandError::MissingArgument("to"))?),
            "swap" | "s" => Command::Swap,
            "refresh" | "r" => Command::Refresh,
            "rates" => Command::Rates,
            "show" | "convert" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            // A bare number sets the amount.
            other if other.parse::<f64>().is_ok() => Command::Amount(other.to_string()),
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

const HELP: &str = "\
Commands:
  amount <n>   set the amount (a bare number works too)
  from <code>  set the source currency
  to <code>    set the target currency
  swap, s      exchange source and target
  refresh, r   fetch current rates
  rates        show the reference-rate table
  show         convert with the current selection
  quit, q      leave
";

/// Interactive widget state and its output sink.
pub struct Repl<W> {
    session: ConverterSession,
    display_base: CurrencyCode,
    out: W,
}

impl<W: Write> Repl<W> {
    pub fn new(session: ConverterSession, display_base: CurrencyCode, out: W) -> Self {
        Self {
            session,
            display_base,
            out,
        }
    }

    /// Load rates, show the first conversion, then process commands until
    /// `quit` or end of input.
    pub async fn run<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        writeln!(
            self.out,
            "Currencies: {}",
            codes(&WIDGET_CURRENCIES)
                .iter()
                .map(|c| c.code())
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        self.refresh().await?;
        self.show()?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let command = match Command::parse(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    writeln!(self.out, "{}", e)?;
                    continue;
                }
            };
            debug!(?command, "Interactive command");

            if !self.execute(command).await? {
                break;
            }
        }
        Ok(())
    }

    /// Apply one command. Returns false when the session should end.
    pub async fn execute(&mut self, command: Command) -> std::io::Result<bool> {
        let input_result = match command {
            Command::Amount(value) => self.session.set_amount(&value),
            Command::From(code) => self.session.set_from(&code),
            Command::To(code) => self.session.set_to(&code),
            Command::Swap => {
                self.session.swap();
                writeln!(self.out, "Converting {}", self.session.pair())?;
                Ok(())
            }
            Command::Refresh => {
                self.refresh().await?;
                Ok(())
            }
            Command::Rates => {
                self.rates()?;
                return Ok(true);
            }
            Command::Show => Ok(()),
            Command::Help => {
                write!(self.out, "{}", HELP)?;
                return Ok(true);
            }
            Command::Quit => return Ok(false),
        };

        match input_result {
            Ok(()) => self.show()?,
            Err(e) => writeln!(self.out, "{}", e)?,
        }
        Ok(true)
    }

    async fn refresh(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "Loading rates...")?;
        match self.session.refresh().await {
            Ok(snapshot) => write!(self.out, "{}", render::updated_at(&snapshot)),
            Err(e) => {
                warn!(error = %e, "Refresh failed");
                writeln!(self.out, "Could not load rates: {}", e)?;
                if self.session.snapshot().is_ok() {
                    writeln!(self.out, "Keeping previously loaded rates")?;
                }
                Ok(())
            }
        }
    }

    fn show(&mut self) -> std::io::Result<()> {
        match self.session.convert() {
            Ok(result) => {
                if let Some(age) = self.session.staleness() {
                    write!(self.out, "{}", render::stale_warning(age))?;
                }
                write!(self.out, "{}", render::conversion(&result))
            }
            // Nothing to show for an empty or non-positive amount.
            Err(SessionError::Conversion(ConversionError::InvalidAmount(_))) => {
                writeln!(self.out, "Enter an amount greater than zero")
            }
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    fn rates(&mut self) -> std::io::Result<()> {
        match self
            .session
            .reference_table(&self.display_base, &codes(&MAJOR_CURRENCIES))
        {
            Ok(rows) => write!(self.out, "{}", render::reference_table(&rows)),
            Err(e) => writeln!(self.out, "{}", e),
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratewidget_fx::{FetchError, MockRateSource, RateQuote, RateStore};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn code(c: &str) -> CurrencyCode {
        CurrencyCode::new(c).unwrap()
    }

    fn sample_quote() -> RateQuote {
        let mut rates = BTreeMap::new();
        rates.insert(code("EUR"), 0.9);
        rates.insert(code("JPY"), 150.0);
        rates.insert(code("CNY"), 7.2);
        RateQuote::new(rates)
    }

    fn setup_repl(source: Arc<MockRateSource>) -> Repl<Vec<u8>> {
        let store = Arc::new(RateStore::new(source));
        let session = ConverterSession::new(store, code("USD"), chrono::Duration::hours(1));
        Repl::new(session, code("CNY"), Vec::new())
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("  "), Ok(None));
        assert_eq!(
            Command::parse("amount 250"),
            Ok(Some(Command::Amount("250".into())))
        );
        assert_eq!(Command::parse("42.5"), Ok(Some(Command::Amount("42.5".into()))));
        assert_eq!(Command::parse("FROM eur"), Ok(Some(Command::From("eur".into()))));
        assert_eq!(Command::parse("s"), Ok(Some(Command::Swap)));
        assert_eq!(Command::parse("r"), Ok(Some(Command::Refresh)));
        assert_eq!(Command::parse("to"), Err(CommandError::MissingArgument("to")));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".into()))
        );
    }

    #[tokio::test]
    async fn test_session_script() {
        let source = Arc::new(MockRateSource::new("test"));
        source.push_response(Ok(sample_quote()));
        let mut repl = setup_repl(source.clone());

        let script: &[u8] = b"from EUR\nto JPY\nswap\nrates\nq\nto GBP\n";
        repl.run(script).await.unwrap();

        let output = String::from_utf8(repl.into_output()).unwrap();
        assert!(output.contains("100.00 USD = 720.00 CNY (Chinese Yuan)"));
        assert!(output.contains("100.00 EUR = 16,666.6667 JPY (Japanese Yen)"));
        assert!(output.contains("100.00 JPY = 0.60 EUR (Euro)"));
        assert!(output.contains("CNY/USD          0.1389"));
        // Input after quit is not processed.
        assert!(!output.contains("Unknown currency: GBP"));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_initial_load() {
        let source = Arc::new(MockRateSource::new("test"));
        source.push_response(Err(FetchError::HttpStatus(503)));
        let mut repl = setup_repl(source);

        let script: &[u8] = b"";
        repl.run(script).await.unwrap();

        let output = String::from_utf8(repl.into_output()).unwrap();
        assert!(output.contains("Could not load rates: Rate source returned HTTP 503"));
        assert!(output.contains("Exchange rates are not loaded yet"));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_rates() {
        let source = Arc::new(MockRateSource::new("test"));
        source.push_response(Ok(sample_quote()));
        source.push_response(Err(FetchError::Network("timed out".into())));
        let mut repl = setup_repl(source);

        let script: &[u8] = b"refresh\n0\n";
        repl.run(script).await.unwrap();

        let output = String::from_utf8(repl.into_output()).unwrap();
        assert!(output.contains("Keeping previously loaded rates"));
        assert!(output.contains("Enter an amount greater than zero"));
    }
}
