pub mod app_config;
pub mod config;
pub mod error;
pub mod shops;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use shops::{default_shops, load_shops, load_shops_or_default, Shop, ShopsFile};
pub use types::{GpsFix, LatLng, Rep, UploadResponse, VisitRecord};
