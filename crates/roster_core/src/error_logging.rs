//! Error logging through tracing with miette formatting

/// Log an error at ERROR level using its Debug formatting, which gives
/// miette diagnostics their code and help text.
#[macro_export]
macro_rules! log_error {
    ($err:expr) => {{
        let err = &$err;
        tracing::error!("{:?}", err);
    }};
    ($msg:expr, $err:expr) => {{
        let err = &$err;
        tracing::error!("{}: {:?}", $msg, err);
    }};
}
