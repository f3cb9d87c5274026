mod endpoints;
mod reader;
mod types;

pub use endpoints::Endpoints;
pub use reader::{ConfigReader, DEFAULT_CONFIG_FILE};
pub use types::{Account, AccountConfig, Config, DEFAULT_ACCOUNT, ExtensionConfig, UploadJob};
