//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Logging setup
//! - Wall-clock time
//! - Default storage backend
//! - Haptic output

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
use crate::persistence::MemoryStorage;
use crate::persistence::{Clock, Storage};

/// Environment variable overriding the native data directory
pub const DATA_DIR_ENV: &str = "ZONE_RUNNER_DATA";

/// Install the logger for this target. Safe to call more than once.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .try_init();
    }
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[cfg(target_arch = "wasm32")]
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn now_ms(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Persistent storage for this target, in-memory if none is available
pub fn default_storage() -> Box<dyn Storage> {
    #[cfg(target_arch = "wasm32")]
    let storage: Box<dyn Storage> = match crate::persistence::LocalStorage::new() {
        Ok(storage) => Box::new(storage),
        Err(e) => {
            log::warn!("{} - progress will not persist", e);
            Box::new(MemoryStorage::new())
        }
    };

    #[cfg(not(target_arch = "wasm32"))]
    let storage: Box<dyn Storage> = {
        let dir = std::env::var_os(DATA_DIR_ENV)
            .map(std::path::PathBuf::from)
            .unwrap_or_else(|| std::path::PathBuf::from(".zone-runner"));
        Box::new(crate::persistence::FileStorage::new(dir))
    };

    storage
}

/// Play a vibration pattern (ms on/off pairs) if the device supports it
pub fn vibrate(pattern: &[u32]) {
    #[cfg(target_arch = "wasm32")]
    {
        let Some(navigator) = web_sys::window().map(|w| w.navigator()) else {
            return;
        };
        let array = js_sys::Array::new();
        for &ms in pattern {
            array.push(&wasm_bindgen::JsValue::from(ms));
        }
        let _ = navigator.vibrate_with_pattern(&array);
    }
    #[cfg(not(target_arch = "wasm32"))]
    log::trace!("vibrate {:?}", pattern);
}
