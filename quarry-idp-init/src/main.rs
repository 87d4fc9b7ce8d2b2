use crate::config::load_settings;

mod client;
mod config;
mod core;
mod storage;

fn main() -> anyhow::Result<()> {
    let settings = load_settings()?;

    let _log_flusher = quarry_telemetry::init_tracing(env!("CARGO_BIN_NAME"))?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(core::run(settings))?;

    Ok(())
}
