/// Configuration for the zstd codec engine.
///
/// ```text
/// ┌────────────────┬────────────────────────────────────────────────────┐
/// │ Field          │ Purpose                                            │
/// ├────────────────┼────────────────────────────────────────────────────┤
/// │ window_log_max │ Largest window (as log2 bytes) a frame may demand  │
/// └────────────────┴────────────────────────────────────────────────────┘
/// ```
///
/// The window size bounds how much memory the engine allocates while
/// decoding. When `window_log_max` is `None` the engine's own default
/// applies (27, i.e. 128 MiB); frames that need a larger window are
/// rejected with a codec error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineConfig {
    pub window_log_max: Option<u32>,
}

impl EngineConfig {
    #[must_use]
    pub fn with_window_log_max(mut self, log: u32) -> Self {
        self.window_log_max = Some(log);
        self
    }
}
