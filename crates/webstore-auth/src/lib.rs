// OAuth token acquisition for webstore accounts

pub mod acquirer;
pub mod error;
pub mod listener;
pub mod prompt;
pub mod token;

pub use acquirer::TokenAcquirer;
pub use error::{Error, Result};
pub use listener::{CallbackListener, DEFAULT_CALLBACK_PORT};
pub use prompt::{OOB_REDIRECT_URI, prompt_for_code};
pub use token::{TokenClient, WEBSTORE_SCOPE, authorization_url};
