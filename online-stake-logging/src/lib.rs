// Copyright (c) 2021 MASSA LABS <info@massa.net>

//! Structured trace events of the online stake engine

/// Emits a `trace!` event named `$evt` with a JSON payload
/// ```
/// # use online_stake_logging::stake_trace;
/// stake_trace!("account.update", { "round": 12, "addr": "A1" });
/// ```
#[macro_export]
macro_rules! stake_trace {
    ($evt:expr, $params:tt) => {
        tracing::trace!("stake_trace:{}:{}", $evt, serde_json::json!($params));
    };
}
