mod cli;
mod infra;
mod routes;
mod server;
mod ticker;

use absence_log::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
