//! Quiz service binary.

use clap::Parser;
use quizgate::prelude::*;

#[tokio::main]
async fn main() -> Result<(), QuizgateError> {
    let args = QuizArgs::parse();
    quizgate::init_tracing(&args.log_level)?;

    let settings = args.session.settings()?;
    let bank = args.question_bank().await?;

    tracing::info!(
        listen = %args.listen,
        auth_service = %args.auth_service_url,
        questions = bank.len(),
        "starting quiz service"
    );

    QuizServer::builder()
        .bind(&args.listen.to_string())
        .login_url(&args.login_url)
        .bridge_config(args.bridge_config())
        .bank(bank)
        .build(&args.auth_service_url, settings.codec().clone())
        .await?
        .run()
        .await
}
