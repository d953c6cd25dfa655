use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[rocket::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    if let Err(e) = chat_relay::rocket().launch().await {
        // pretty_print 会把错误标记为已处理，避免 drop 时 panic
        let reason = e.pretty_print();
        anyhow::bail!("chat relay stopped: {reason}");
    }

    Ok(())
}
