#[tokio::main]
async fn main() {
    if let Err(e) = medboard_lib::run().await {
        eprintln!("medboard: {e}");
        std::process::exit(1);
    }
}
