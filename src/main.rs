#[tokio::main]
async fn main() {
    if let Err(e) = clinirx::run().await {
        eprintln!("clinirx: {e}");
        std::process::exit(1);
    }
}
