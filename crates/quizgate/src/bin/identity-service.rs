//! Identity service binary.

use clap::Parser;
use quizgate::prelude::*;

#[tokio::main]
async fn main() -> Result<(), QuizgateError> {
    let args = IdentityArgs::parse();
    quizgate::init_tracing(&args.log_level)?;

    let settings = args.session.settings()?;
    let store = args.credential_store().await?;

    tracing::info!(
        listen = %args.listen,
        users = store.len(),
        ttl = ?settings.ttl(),
        "starting identity service"
    );

    IdentityServer::builder()
        .bind(&args.listen.to_string())
        .home_url(&args.home_url)
        .build(store, settings.codec().clone())
        .await?
        .run()
        .await
}
