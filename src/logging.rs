//! Browser console logging.

/// Route `log` records to the browser console at `level` and report Rust
/// panics there too. Safe to call more than once.
pub fn init_console_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(level).is_err() {
        log::debug!("console logger already installed");
    }
}
