pub mod config;
pub mod credentials;
pub mod error;
pub mod package;
pub mod plan;
pub mod token;

pub use config::{Account, AccountConfig, Config, Endpoints, ExtensionConfig, UploadJob};
pub use credentials::{ClientCredentials, CredentialStore};
pub use error::{Error, Result};
pub use package::resolve_package;
pub use plan::{Plan, TokenStep, TokenStrategy};
pub use token::{AccessToken, AuthorizedAccount};
