use std::{env, time::Duration};

use crate::defs::TICKS_PER_SECOND;

// Runtime knobs for the binaries (not gameplay tuning).

pub fn default_seed() -> u32 {
    env::var("WDVN_SEED")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0x5eed_1234)
}

pub fn default_ticks() -> u64 {
    env::var("WDVN_TICKS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10 * TICKS_PER_SECOND as u64)
}

/// Real-time tick interval; `WDVN_TICK_RATE` overrides the rate in Hz.
pub fn tick_interval() -> Duration {
    let rate = env::var("WDVN_TICK_RATE")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|&hz| hz > 0)
        .unwrap_or(TICKS_PER_SECOND as u64);
    Duration::from_micros(1_000_000 / rate)
}

/// Load `.env`, install the tracing subscriber and a panic hook that logs.
pub fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}
