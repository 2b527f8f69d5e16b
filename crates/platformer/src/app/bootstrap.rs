use engine::{resolve_app_paths, AppError, AppPaths, LoopConfig, Scene};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use super::config::{load_config_file, resolve_config_path, GameplayConfig};
use super::gameplay;

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Platformer Startup ===");

    let paths = resolve_app_paths()?;
    info!(
        root = %paths.root.display(),
        assets = %paths.assets_dir.display(),
        "app_paths_resolved"
    );

    let gameplay_config = load_gameplay_config(&paths);
    let config = LoopConfig {
        window_title: format!("Platformer {}", env!("CARGO_PKG_VERSION")),
        ..LoopConfig::default()
    };

    Ok(AppWiring {
        config,
        scene: gameplay::build_scene(gameplay_config),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn load_gameplay_config(paths: &AppPaths) -> GameplayConfig {
    let path = resolve_config_path(&paths.config_dir);
    match load_config_file(&path) {
        Ok(Some(config)) => {
            info!(
                path = %path.display(),
                platforms = config.platforms.len(),
                "gameplay_config_loaded"
            );
            config
        }
        Ok(None) => {
            warn!(path = %path.display(), "gameplay_config_missing_using_defaults");
            GameplayConfig::default()
        }
        Err(err) => {
            error!(error = %err, "gameplay_config_invalid_using_defaults");
            GameplayConfig::default()
        }
    }
}
