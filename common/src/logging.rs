//! Logger setup shared by binaries

use log::LevelFilter;

/// Initialize `env_logger` with an `info` default.
///
/// `RUST_LOG` still takes precedence when set. Calling this more than once is
/// harmless; later calls are ignored.
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Initialize `env_logger` with the given default level.
pub fn init_with_level(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();
}
