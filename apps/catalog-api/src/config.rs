use core_config::server::ServerConfig;
use core_config::{app_info, env_or_default, env_required, AppInfo, ConfigError, Environment, FromEnv};
use database::mongodb::MongoConfig;
use domain_catalog::service::{DEFAULT_MAX_FILE_BYTES, DEFAULT_MAX_FILES};
use domain_catalog::{CloudinaryConfig, UploadLimits};

/// Complete application configuration, loaded once at startup.
///
/// Environment variables:
/// - `APP_ENV` - "development" (default) or "production"
/// - `HOST` / `PORT` - listen address
/// - `MONGODB_URL`, `MONGODB_DATABASE` (required) - see [`MongoConfig`]
/// - `CLOUDINARY_CLOUD_NAME`, `CLOUDINARY_API_KEY`, `CLOUDINARY_API_SECRET`
///   (required) - image store credentials
/// - `MAX_FILE_SIZE` (optional, default 5 MiB) - per-image byte limit
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub cloudinary: CloudinaryConfig,
    pub uploads: UploadLimits,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongodb = MongoConfig::from_env()?.with_app_name(env!("CARGO_PKG_NAME"));

        let cloudinary = CloudinaryConfig::new(
            env_required("CLOUDINARY_CLOUD_NAME")?,
            env_required("CLOUDINARY_API_KEY")?,
            env_required("CLOUDINARY_API_SECRET")?,
        );

        let max_file_bytes = env_or_default("MAX_FILE_SIZE", &DEFAULT_MAX_FILE_BYTES.to_string())
            .parse::<usize>()
            .map_err(|e| ConfigError::ParseError {
                key: "MAX_FILE_SIZE".to_string(),
                details: e.to_string(),
            })?;

        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mongodb,
            cloudinary,
            uploads: UploadLimits {
                max_files: DEFAULT_MAX_FILES,
                max_file_bytes,
            },
        })
    }
}
