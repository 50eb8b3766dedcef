//! # quill-totals
//!
//! Prints per-line totals, document aggregates and (for invoices) the
//! derived status of a sales document read as JSON.
//!
//! ## Input
//! ```json
//! {
//!   "kind": "invoice",
//!   "document": { "id": "inv-1", "number": "F-1001", "lines": [ ... ], ... },
//!   "payments": [ { "invoice_id": "inv-1", "amount_minor": 5000, ... } ]
//! }
//! ```
//!
//! ## Usage
//! ```text
//! quill-totals [--locale sv-SE] [--today YYYY-MM-DD] [FILE]
//! ```
//! Reads stdin when no file is given. Logs go to stderr (`RUST_LOG`).

use std::io::Read;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use quill_core::format::{format_money_minor_in, Locale};
use quill_core::invoice_status::{derive_invoice_status, InvoiceSnapshot};
use quill_core::{
    DocumentTotals, Invoice, InvoiceStatus, LineTotals, Order, Payment, Quote, SalesDocument,
};

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DocumentInput {
    Quote {
        document: Quote,
    },
    Order {
        document: Order,
    },
    Invoice {
        document: Invoice,
        #[serde(default)]
        payments: Vec<Payment>,
    },
}

#[derive(Debug, Serialize)]
struct LineReport<'a> {
    id: &'a str,
    description: &'a str,
    totals: LineTotals,
}

#[derive(Debug, Serialize)]
struct InvoiceReport {
    paid_minor: i64,
    balance_minor: i64,
    status: InvoiceStatus,
    formatted_balance: String,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    kind: &'static str,
    number: &'a str,
    currency: &'a str,
    lines: Vec<LineReport<'a>>,
    totals: DocumentTotals,
    formatted_total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    invoice: Option<InvoiceReport>,
}

struct Options {
    locale: Locale,
    today: NaiveDate,
    path: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let options = parse_args(std::env::args().skip(1))?;

    let input = match options.path {
        Some(ref path) => {
            debug!(%path, "Reading document from file");
            std::fs::read_to_string(path)?
        }
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let document: DocumentInput = serde_json::from_str(&input)?;
    let report = build_report(&document, options.locale, options.today);
    info!(
        kind = report.kind,
        number = report.number,
        lines = report.lines.len(),
        total_minor = report.totals.total_minor,
        "Document totals computed"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Initializes the tracing subscriber, writing to stderr so stdout stays JSON.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - Default: INFO level, DEBUG for quill crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quill=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_args<I>(args: I) -> Result<Options, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = String>,
{
    let mut options = Options {
        locale: Locale::default(),
        today: Utc::now().date_naive(),
        path: None,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--locale" => {
                let value = args.next().ok_or("--locale needs a value")?;
                options.locale = value.parse()?;
            }
            "--today" => {
                let value = args.next().ok_or("--today needs a value")?;
                options.today = NaiveDate::parse_from_str(&value, "%Y-%m-%d")?;
            }
            "-h" | "--help" => {
                return Err("usage: quill-totals [--locale TAG] [--today YYYY-MM-DD] [FILE]".into());
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option: {}", other).into());
            }
            _ => options.path = Some(arg),
        }
    }

    Ok(options)
}

fn summarize<'a, D: SalesDocument>(
    kind: &'static str,
    number: &'a str,
    document: &'a D,
    locale: Locale,
) -> Report<'a> {
    let totals = document.totals();
    let currency = document.currency();
    let lines = document
        .lines()
        .iter()
        .map(|line| LineReport {
            id: &line.id,
            description: &line.description,
            totals: line.totals(),
        })
        .collect();

    Report {
        kind,
        number,
        currency,
        lines,
        formatted_total: format_money_minor_in(totals.total_minor, currency, locale),
        totals,
        invoice: None,
    }
}

fn build_report(input: &DocumentInput, locale: Locale, today: NaiveDate) -> Report<'_> {
    match input {
        DocumentInput::Quote { document } => summarize("quote", &document.number, document, locale),
        DocumentInput::Order { document } => summarize("order", &document.number, document, locale),
        DocumentInput::Invoice { document, payments } => {
            let mut report = summarize("invoice", &document.number, document, locale);
            let snapshot = InvoiceSnapshot::from_invoice(document, payments);
            report.invoice = Some(InvoiceReport {
                paid_minor: snapshot.paid_minor,
                balance_minor: snapshot.balance_minor,
                status: derive_invoice_status(&snapshot, today),
                formatted_balance: format_money_minor_in(
                    snapshot.balance_minor,
                    &document.currency,
                    locale,
                ),
            });
            report
        }
    }
}
