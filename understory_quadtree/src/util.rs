// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Emit a `tracing` event at the given level when the `tracing` feature is enabled.
///
/// Without the feature the arguments are not evaluated.
macro_rules! event {
    ($level:ident, $($arg:tt)+) => {{
        #[cfg(feature = "tracing")]
        tracing::$level!($($arg)+);
    }};
}

pub(crate) use event;
