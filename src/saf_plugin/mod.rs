// Tauri plugin hosting the storage bridge.
// Builds the platform bridge at setup, manages it as app state and installs it
// for native callers going through the C ABI.

use std::sync::Arc;

use tauri::{
    plugin::{Builder, TauriPlugin},
    AppHandle, Manager, Runtime, State,
};

use crate::bridge::StorageBridge;
use crate::config::{BridgeConfig, CONFIG_FILE_NAME};
use crate::fs_abstraction::{DenyingPicker, LocalProvider};
use crate::types::RootStatus;

/// Managed state wrapper around the process bridge.
pub struct BridgeState(pub Arc<StorageBridge>);

/// Tauri command to request the storage root
#[tauri::command]
pub fn bridge_request_root(state: State<'_, BridgeState>) -> RootStatus {
    state.0.request_root()
}

/// Tauri command to peek at root resolution without consuming it
#[tauri::command]
pub fn bridge_root_status(state: State<'_, BridgeState>) -> Option<RootStatus> {
    state.0.root_status()
}

/// Tauri command to list a registered directory
#[tauri::command]
pub fn bridge_list_directory(state: State<'_, BridgeState>, path: String) -> Vec<String> {
    state.0.list_directory(&path)
}

/// Tauri command to open a registered file as a raw descriptor
#[tauri::command]
pub fn bridge_open_descriptor(state: State<'_, BridgeState>, path: String, mode: String) -> i32 {
    state.0.open_as_descriptor(&path, &mode)
}

fn load_config<R: Runtime>(app: &AppHandle<R>) -> BridgeConfig {
    let path = match app.path().app_config_dir() {
        Ok(dir) => dir.join(CONFIG_FILE_NAME),
        Err(e) => {
            tracing::warn!("[Bridge] No app config dir ({}); using default config", e);
            return BridgeConfig::default();
        }
    };
    BridgeConfig::load(&path).unwrap_or_else(|e| {
        tracing::warn!("[Bridge] {}; using default config", e);
        BridgeConfig::default()
    })
}

#[cfg(target_os = "android")]
fn build_bridge<R: Runtime>(app: &AppHandle<R>, config: BridgeConfig) -> StorageBridge {
    use crate::android::{AndroidFsProvider, AndroidTreePicker};

    if config.allow_legacy {
        if let Some(root) = crate::utils::legacy_root_path() {
            tracing::info!("[Bridge] No scoped storage; serving {} directly", root.display());
            return StorageBridge::new(
                Arc::new(LocalProvider::unrestricted(root)),
                Arc::new(DenyingPicker),
                config,
            );
        }
    }

    StorageBridge::new(
        Arc::new(AndroidFsProvider::new(app.clone())),
        Arc::new(AndroidTreePicker::new(app.clone())),
        config,
    )
}

#[cfg(not(target_os = "android"))]
fn build_bridge<R: Runtime>(_app: &AppHandle<R>, config: BridgeConfig) -> StorageBridge {
    let provider = match crate::utils::legacy_root_path() {
        Some(root) => LocalProvider::unrestricted(root),
        None => LocalProvider::scoped(),
    };
    StorageBridge::new(Arc::new(provider), Arc::new(DenyingPicker), config)
}

/// Initialize the bridge plugin
pub fn init<R: Runtime>() -> TauriPlugin<R> {
    Builder::new("doctree-bridge")
        .invoke_handler(tauri::generate_handler![
            bridge_request_root,
            bridge_root_status,
            bridge_list_directory,
            bridge_open_descriptor
        ])
        .setup(|app, _api| {
            crate::logging::init();
            let config = load_config(app);
            let bridge = Arc::new(build_bridge(app, config));
            if !crate::install_bridge(bridge.clone()) {
                tracing::warn!(
                    "[Bridge] A bridge was already installed; native callers keep the first one"
                );
            }
            app.manage(BridgeState(bridge));
            Ok(())
        })
        .build()
}

/// Extension trait for easy access to the managed bridge
pub trait BridgeExt<R: Runtime> {
    fn storage_bridge(&self) -> Option<Arc<StorageBridge>>;
}

impl<R: Runtime, T: Manager<R>> BridgeExt<R> for T {
    fn storage_bridge(&self) -> Option<Arc<StorageBridge>> {
        self.try_state::<BridgeState>().map(|state| state.0.clone())
    }
}
