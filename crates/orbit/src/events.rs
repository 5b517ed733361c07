use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum AppEvent {
    DatasetChanged(PathBuf),
    ConfigReload,
}
