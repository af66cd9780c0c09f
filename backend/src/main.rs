#[tokio::main]
async fn main() -> std::io::Result<()> {
    menumap::start_server().await
}
