use sqlx::migrate::Migrator;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use corepay::adapters::PostgresLedger;
use corepay::cbs::{CbsAccountClient, CbsAuthClient, CbsStatusClient, CbsTransferClient};
use corepay::domain::Channel;
use corepay::gateway::PaymentGatewayClient;
use corepay::services::{TapMoneyService, TransactionQueryService, TransferService};
use corepay::{config, create_app, db, startup, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::from_env()?;

    // Setup logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database pool
    let pool = db::create_pool(&config).await?;

    // Run migrations
    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;
    tracing::info!("Database migrations completed");

    let report = startup::validate_environment(&config, &pool).await?;
    report.print();
    if !report.database {
        anyhow::bail!("Startup validation failed: database is unreachable");
    }

    // CBS clients share one authenticated session
    let cbs_auth = Arc::new(CbsAuthClient::new(
        config.cbs_base_url.clone(),
        config.cbs_username.clone(),
        config.cbs_password.clone(),
    ));
    let cbs_status: Arc<CbsStatusClient> = Arc::new(CbsStatusClient::new(
        config.cbs_base_url.clone(),
        cbs_auth.clone(),
    ));
    let accounts = Arc::new(CbsAccountClient::new(
        config.cbs_base_url.clone(),
        cbs_auth.clone(),
    ));
    let transfers_api = Arc::new(CbsTransferClient::new(config.cbs_base_url.clone(), cbs_auth));
    let payments = Arc::new(PaymentGatewayClient::new(
        config.gateway_base_url.clone(),
        config.gateway_username.clone(),
        config.gateway_password.clone(),
    ));
    let ledger = Arc::new(PostgresLedger::new(pool.clone()));
    tracing::info!(cbs = %config.cbs_base_url, gateway = %config.gateway_base_url, "Upstream clients initialized");

    let transfers = TransferService::new(
        cbs_status.clone(),
        accounts.clone(),
        transfers_api,
        ledger.clone(),
    );
    let tapmoney = TapMoneyService::new(
        cbs_status.clone(),
        accounts,
        payments,
        ledger.clone(),
        Channel {
            id: config.tapmoney_channel_id.clone(),
        },
        config.tapmoney_biller_code.clone(),
    );
    let transactions = TransactionQueryService::new(ledger.clone());

    let server_port = config.server_port;
    let state = AppState {
        config: Arc::new(config),
        ledger,
        cbs_status,
        transfers,
        tapmoney,
        transactions,
    };
    let app = create_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
