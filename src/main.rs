#[tokio::main]
async fn main() {
    let exit_code = tagvcr::app::startup::startup().await;
    std::process::exit(exit_code);
}
