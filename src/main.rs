#[tokio::main]
async fn main() {
    if let Err(e) = resto_pos_lib::run().await {
        eprintln!("RestoPOS 启动失败: {}", e);
        std::process::exit(1);
    }
}
