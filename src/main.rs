use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    church_client::frameworks::cli::run().await
}
