//! Synthetic submission load generator.
//!
//! Gated behind `--enabled` or `LOAD_DEMO_ENABLED=1`: absent either, this
//! binary exits immediately without constructing anything. It builds its
//! own `Orchestrator` against an `InProcessLedger` and its own `Metrics`
//! instance, so it never touches a production metrics registry.

use gateway_core::{Metrics, Orchestrator};
use gateway_types::{AccountId, Bic, Currency, Payment, PaymentStatus};
use gateway_validator::{SanctionsList, ValidatorConfig};
use idempotency_store::IdempotencyConfig;
use ledger_client::LedgerClientConfig;
use rate_limiter::RateLimiterConfig;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use worker_pool::WorkerPoolConfig;

const CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "JPY"];
const BICS: &[&str] = &["BANKGB2LXXX", "BANKUS33XXX", "BANKDEFFXXX", "BANKFRPPXXX"];

fn enabled() -> bool {
    std::env::args().any(|a| a == "--enabled") || std::env::var("LOAD_DEMO_ENABLED").as_deref() == Ok("1")
}

fn submission_count() -> usize {
    std::env::var("LOAD_DEMO_COUNT").ok().and_then(|v| v.parse().ok()).unwrap_or(200)
}

fn random_payment(rng: &mut impl Rng) -> Payment {
    let now = chrono::Utc::now();
    let amount = rng.gen_range(10..250_000);
    let currency = CURRENCIES[rng.gen_range(0..CURRENCIES.len())];
    let debtor_bank = BICS[rng.gen_range(0..BICS.len())];
    let creditor_bank = BICS[rng.gen_range(0..BICS.len())];

    Payment {
        payment_id: Uuid::nil(),
        amount: rust_decimal::Decimal::new(amount, 2),
        currency: Currency::new(currency),
        debtor_bank: Bic::parse(debtor_bank).expect("fixed BIC pool is well-formed"),
        creditor_bank: Bic::parse(creditor_bank).expect("fixed BIC pool is well-formed"),
        debtor_account: AccountId::new("GB00BANK00000000000001").unwrap(),
        creditor_account: AccountId::new("US00BANK00000000000002").unwrap(),
        debtor_name: "Synthetic Sender".to_string(),
        creditor_name: "Synthetic Receiver".to_string(),
        reference: "LOAD-DEMO".to_string(),
        status: PaymentStatus::Initiated,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::main]
async fn main() {
    if !enabled() {
        eprintln!("load-generator: disabled; pass --enabled or set LOAD_DEMO_ENABLED=1 to run");
        return;
    }

    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let count = submission_count();
    tracing::info!(count, "starting synthetic load run");

    let metrics = Arc::new(Metrics::new().expect("metrics registration"));
    let orchestrator = Orchestrator::start(
        ValidatorConfig::default(),
        SanctionsList::default(),
        LedgerClientConfig::default(),
        WorkerPoolConfig { queue_size: 1024, worker_pool_size: 8, drain_deadline: Duration::from_secs(10) },
        RateLimiterConfig::default(),
        IdempotencyConfig::default(),
        Duration::from_secs(2),
        metrics.clone(),
    );

    let mut rng = rand::thread_rng();
    let mut accepted = 0usize;
    let mut rejected_admission = 0usize;

    for i in 0..count {
        let payment = random_payment(&mut rng);
        let key = format!("load-demo-{i}");
        match orchestrator.submit_payment(payment, Some(&key), &["load-demo".to_string()], None).await {
            Ok(_) => accepted += 1,
            Err(error) => {
                rejected_admission += 1;
                tracing::debug!(%error, "submission not admitted");
            }
        }
    }

    tokio::time::sleep(Duration::from_millis(500)).await;
    orchestrator.close().await;

    tracing::info!(accepted, rejected_admission, "load run complete");
    if let Ok(rendered) = metrics.render() {
        println!("{rendered}");
    }
}
