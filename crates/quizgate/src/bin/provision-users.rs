//! Credential provisioning binary.

use clap::Parser;
use quizgate::prelude::*;

#[tokio::main]
async fn main() -> Result<(), QuizgateError> {
    let args = ProvisionArgs::parse();
    quizgate::init_tracing(&args.log_level)?;

    let users = args.provision().await?;
    tracing::info!(output = %args.output.display(), users, "credential file ready");
    Ok(())
}
