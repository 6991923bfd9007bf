//! CLI tool for the payment form.
//!
//! # Usage
//!
//! ```bash
//! # Group a card number as the form does while typing
//! payform format 1234567812345678
//!
//! # Validate a full set of card details
//! payform validate --card 1234567812345678 --expiry 12/30 --cvc 123 --postal 12345
//!
//! # Run a simulated payment
//! payform submit --card 1234567812345678 --expiry 12/30 --cvc 123 --postal 12345 --success-rate 1
//!
//! # Show the saved card details the form pre-fills with
//! payform prefill --token test1234
//! ```
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default `info`).

use clap::{Args, Parser, Subcommand, ValueEnum};
use payment_form::form::FieldKey;
use payment_form::format::format_card_input;
use payment_form::gateway::GatewayConfig;
use payment_form::i18n::MessageCatalog;
use payment_form::mask::mask_card_number;
use payment_form::prefill::DEFAULT_PREFILL_TOKEN;
use payment_form::{FieldName, PaymentFormController, SubmitError};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "payform")]
#[command(author, version, about = "Card payment form validation and simulated checkout")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Group a card number into blocks of four
    Format {
        /// Raw card number input
        raw: String,
    },

    /// Validate card details
    Validate {
        #[command(flatten)]
        card: CardArgs,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Validate card details and run a simulated payment
    Submit {
        #[command(flatten)]
        card: CardArgs,

        #[command(flatten)]
        display: DisplayArgs,

        /// How long the simulated payment takes
        #[arg(long, default_value = "1500")]
        delay_ms: u64,

        /// Probability that the simulated payment succeeds
        #[arg(long, default_value = "0.95")]
        success_rate: f64,
    },

    /// Load saved card details into the form
    Prefill {
        /// Token identifying the saved details
        #[arg(short, long, default_value = DEFAULT_PREFILL_TOKEN)]
        token: String,

        /// Output format
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Args)]
struct CardArgs {
    /// Card number, as typed
    #[arg(long, default_value = "")]
    card: String,

    /// Expiry date (MM/YY)
    #[arg(long, default_value = "")]
    expiry: String,

    /// Card verification code
    #[arg(long, default_value = "")]
    cvc: String,

    /// Billing postal code
    #[arg(long, default_value = "")]
    postal: String,
}

#[derive(Args)]
struct DisplayArgs {
    /// Language for error messages
    #[arg(short, long)]
    lang: Option<String>,

    /// JSON message catalog for the language given with --lang
    #[arg(long, requires = "lang")]
    catalog: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Format { raw } => {
            println!("{}", format_card_input(&raw));
        }
        Commands::Validate { card, display } => {
            let mut controller = build_controller(&display, GatewayConfig::default());
            cmd_validate(&mut controller, &card, display.output);
        }
        Commands::Submit {
            card,
            display,
            delay_ms,
            success_rate,
        } => {
            let config = GatewayConfig {
                delay: Duration::from_millis(delay_ms),
                success_probability: success_rate,
            };
            let mut controller = build_controller(&display, config);
            cmd_submit(&mut controller, &card, display.output).await;
        }
        Commands::Prefill { token, output } => {
            let display = DisplayArgs {
                lang: None,
                catalog: None,
                output,
            };
            let mut controller = build_controller(&display, GatewayConfig::default());
            cmd_prefill(&mut controller, &token, output).await;
        }
    }
}

fn build_controller(display: &DisplayArgs, gateway: GatewayConfig) -> PaymentFormController {
    let catalog = MessageCatalog::english();

    if let (Some(lang), Some(path)) = (&display.lang, &display.catalog) {
        let loaded = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|json| catalog.load_json(lang, &json).map_err(|e| e.to_string()));
        if let Err(e) = loaded {
            eprintln!("Error: cannot load catalog {}: {}", path.display(), e);
            std::process::exit(2);
        }
    }

    let controller = PaymentFormController::builder()
        .translator(Arc::new(catalog))
        .gateway_config(gateway)
        .build();

    match controller {
        Ok(controller) => {
            if let Some(lang) = &display.lang {
                controller.set_language(lang);
            }
            controller
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn fill(controller: &mut PaymentFormController, card: &CardArgs) {
    controller.on_card_input(&card.card);
    controller.input(FieldName::Expiry, &card.expiry);
    controller.input(FieldName::Cvc, &card.cvc);
    controller.input(FieldName::PostalCode, &card.postal);
    for &field in FieldName::ALL {
        controller.blur(field);
    }
}

fn field_errors(controller: &PaymentFormController) -> Vec<(FieldName, Vec<String>)> {
    FieldName::ALL
        .iter()
        .map(|&field| (field, controller.visible_errors(field)))
        .filter(|(_, errors)| !errors.is_empty())
        .collect()
}

fn print_field_errors(errors: &[(FieldName, Vec<String>)], output: OutputFormat) {
    match output {
        OutputFormat::Text => {
            println!("Valid: {}", if errors.is_empty() { "yes" } else { "no" });
            for (field, messages) in errors {
                for message in messages {
                    println!("{}: {}", field, message);
                }
            }
        }
        OutputFormat::Json => {
            let errors: serde_json::Map<String, serde_json::Value> = errors
                .iter()
                .map(|(field, messages)| (field.to_string(), json!(messages)))
                .collect();
            println!(
                "{}",
                json!({ "valid": errors.is_empty(), "errors": errors })
            );
        }
    }
}

fn cmd_validate(controller: &mut PaymentFormController, card: &CardArgs, output: OutputFormat) {
    fill(controller, card);
    let errors = field_errors(controller);
    print_field_errors(&errors, output);
    std::process::exit(if errors.is_empty() { 0 } else { 1 });
}

async fn cmd_submit(controller: &mut PaymentFormController, card: &CardArgs, output: OutputFormat) {
    fill(controller, card);

    let result = controller.submit().await;
    let status = controller.payment_status().map(|s| s.as_str()).unwrap_or("");

    match result {
        Ok(receipt) => {
            match output {
                OutputFormat::Text => {
                    println!("Payment: {}", status);
                    println!("Token: {}", receipt.token_id);
                    println!("Message: {}", controller.translate("status.success"));
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        json!({ "paymentStatus": status, "receipt": receipt })
                    );
                }
            }
            std::process::exit(0);
        }
        Err(SubmitError::InvalidForm { .. }) => {
            print_field_errors(&field_errors(controller), output);
            std::process::exit(1);
        }
        Err(e) => {
            match output {
                OutputFormat::Text => {
                    println!("Payment: {}", status);
                    println!("Error: {}", e);
                    println!("Message: {}", controller.translate("status.failed"));
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        json!({ "paymentStatus": status, "error": e.to_string() })
                    );
                }
            }
            std::process::exit(1);
        }
    }
}

async fn cmd_prefill(controller: &mut PaymentFormController, token: &str, output: OutputFormat) {
    match controller.load_payment_form(token).await {
        Ok(loaded) => {
            let form = controller.form();
            let card = mask_card_number(form.value(FieldName::CardNumber));
            let expiry = form.value(FieldName::Expiry);
            let postal = form.value(FieldName::PostalCode);
            match output {
                OutputFormat::Text => {
                    println!("Loaded: {}", if loaded { "yes" } else { "no" });
                    println!("Card Number: {}", card);
                    println!("Expiry: {}", expiry);
                    println!("Postal Code: {}", postal);
                }
                OutputFormat::Json => {
                    println!(
                        "{}",
                        json!({
                            "loaded": loaded,
                            "cardNumber": card,
                            "expiry": expiry,
                            "postalCode": postal,
                        })
                    );
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
