use std::sync::Arc;

use chrono::Utc;

use infinite_cargo::auth::Session;
use infinite_cargo::board::BidBoard;
use infinite_cargo::classifier::Context;
use infinite_cargo::config::Config;
use infinite_cargo::dispatcher::Dispatcher;
use infinite_cargo::external::HttpBidAPI;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    tracing::info!(?config, "starting review queue");

    let api = HttpBidAPI::from_config(&config)?;
    let session = Session::new(config.token.clone());
    let dispatcher = Dispatcher::new(Arc::new(api), Arc::new(session), config.role)
        .with_timeout(config.request_timeout);

    let mut board = BidBoard::new(Arc::new(dispatcher), Context::for_role(config.role));
    board.refresh().await?;

    for row in board.rows(Utc::now()) {
        let bid = &row.view.record;
        tracing::info!(
            bid_id = %bid.id,
            status = row.classification.display_label,
            priority = ?row.classification.priority,
            amount = bid.bid_amount,
            currency = bid.currency.code(),
            actions = ?row.classification.allowed_actions,
            "bid"
        );
    }

    let summary = board.summary();
    tracing::info!(
        total = summary.total,
        pending = summary.pending,
        accepted = summary.accepted,
        rejected = summary.rejected,
        counter_offers = summary.counter_offers,
        average_bid_amount = summary.average_bid_amount,
        "summary"
    );

    Ok(())
}
