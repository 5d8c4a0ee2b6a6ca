use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            // Log to browser console via tracing-wasm
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            // A second init (e.g. module re-instantiation) keeps the first subscriber
            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;
        use std::env;
        use std::ffi::OsStr;
        use std::io;
        use std::path::Path;
        use once_cell::sync::OnceCell;

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        const DEFAULT_LOG_FILE: &str = "logs/spincube.log";

        pub fn init() {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"));

            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            // RUST_LOG_FILE=logs/other.log overrides the rolling file location
            let log_path = env::var("RUST_LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
            let (dir, file) = split_log_path(&log_path);
            let (nb_writer, guard) = tracing_appender::non_blocking(
                tracing_appender::rolling::daily(dir, file),
            );
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(console_layer)
                .with(file_layer)
                .try_init();

            std::panic::set_hook(Box::new(|info| {
                let mut msg = String::new();
                if let Some(loc) = info.location() {
                    msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
                }
                if let Some(s) = info.payload().downcast_ref::<&str>() { msg.push_str(s); }
                else if let Some(s) = info.payload().downcast_ref::<String>() { msg.push_str(s); }
                else { msg.push_str("<non-string panic>"); }
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
            }));
        }

        fn split_log_path(log_path: &str) -> (&Path, &OsStr) {
            let path = Path::new(log_path);
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let file = path.file_name().unwrap_or(OsStr::new("spincube.log"));
            (dir, file)
        }

        #[cfg(test)]
        mod tests {
            use super::*;

            #[test]
            fn default_log_path_splits_into_dir_and_file() {
                let (dir, file) = split_log_path(DEFAULT_LOG_FILE);
                assert_eq!(dir, Path::new("logs"));
                assert_eq!(file, OsStr::new("spincube.log"));
            }

            #[test]
            fn bare_file_name_logs_into_cwd() {
                let (dir, file) = split_log_path("cube.log");
                assert_eq!(dir, Path::new("."));
                assert_eq!(file, OsStr::new("cube.log"));
            }
        }
    }
}
