//! One-shot CLI commands and terminal rendering helpers

pub mod convert;
pub mod history;
pub mod rates;
pub mod setup;
pub mod ui;

use std::time::Duration;

/// How long a one-shot command waits for a published value before
/// reporting the request as failed. The library itself models no
/// timeouts; this is purely the terminal adapter's exit condition.
pub(crate) const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);
