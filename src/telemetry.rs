//! Opt-in `tracing` subscriber setup for hosts embedding `sankey-rs`.
//!
//! The pipeline logs under the `sankey_rs` target: `debug` for data
//! replacement and dropped rows, `trace` for every recomputed stage
//! (graph, layout, appearance, frame) and for level shifts, `warn` when a
//! gated render fails. Hosts that already own a subscriber only need a
//! directive from [`LogDetail::directive`].

/// How much of the pipeline to log when no `RUST_LOG` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogDetail {
    /// Failed renders only.
    Quiet,
    /// Data replacement and dropped rows.
    #[default]
    Data,
    /// Every stage recomputation and level shift.
    Stages,
}

impl LogDetail {
    /// `EnvFilter` directive scoped to this crate.
    #[must_use]
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "sankey_rs=warn",
            Self::Data => "sankey_rs=debug",
            Self::Stages => "sankey_rs=trace",
        }
    }
}

/// Installs a compact subscriber at [`LogDetail::Data`].
///
/// See [`init_tracing`].
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing(LogDetail::default())
}

/// Installs a compact global subscriber when the `telemetry` feature is on.
///
/// `RUST_LOG` wins over `detail` when set. Returns `false` without the
/// feature, or when the host already installed a global subscriber.
#[must_use]
pub fn init_tracing(detail: LogDetail) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(detail.directive()));
        return tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = detail;
        false
    }
}
