use crate::listener::{CallbackListener, DEFAULT_CALLBACK_PORT};
use crate::prompt::{OOB_REDIRECT_URI, prompt_for_code};
use crate::token::{TokenClient, authorization_url};
use crate::{Error, Result};
use std::time::Duration;
use tokio::io::{BufReader, Stdin};
use tokio::sync::Mutex;
use webstore_core::{AccessToken, Account, Endpoints, TokenStep, TokenStrategy};

/// Obtains access tokens using whichever strategy the plan chose
pub struct TokenAcquirer {
    tokens: TokenClient,
    auth_url: String,
    port: u16,
    timeout: Option<Duration>,
    open_browser: bool,
    /// One buffer for the whole run; codes read ahead for later accounts stay in it
    stdin: Mutex<BufReader<Stdin>>,
}

impl TokenAcquirer {
    pub fn new(endpoints: &Endpoints) -> Self {
        Self {
            tokens: TokenClient::new(endpoints.token_url.clone()),
            auth_url: endpoints.auth_url.clone(),
            port: DEFAULT_CALLBACK_PORT,
            timeout: None,
            open_browser: true,
            stdin: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }

    /// Listen for the redirect on a different port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Give up on the browser flow after this long
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Only print the URL instead of launching a browser
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }

    pub async fn acquire(&self, step: &TokenStep) -> Result<AccessToken> {
        let account = &step.account;

        match step.strategy {
            TokenStrategy::Refresh => {
                let refresh_token = account
                    .refresh_token
                    .as_deref()
                    .ok_or_else(|| Error::NoRefreshToken(account.name.clone()))?;
                self.tokens.refresh(account, refresh_token).await
            }
            TokenStrategy::Browser => self.browser_flow(account).await,
            TokenStrategy::CopyPaste => self.copy_paste_flow(account).await,
        }
    }

    async fn browser_flow(&self, account: &Account) -> Result<AccessToken> {
        let listener = CallbackListener::bind(self.port).await?;
        let redirect_uri = listener.redirect_uri();
        let consent_url = authorization_url(&self.auth_url, &account.client_id, &redirect_uri);

        println!();
        println!("Authorization for account: {}", account.name);
        println!("================");
        println!();

        if self.open_browser {
            println!("Opening browser for authorization.. Please confirm privileges to continue..");
            if let Err(e) = webbrowser::open(&consent_url) {
                tracing::warn!("Could not open browser: {}", e);
            }
        }
        println!();
        println!(
            "If the browser didn't open within a minute, please visit {} manually to continue",
            redirect_uri
        );
        println!();

        let code = listener
            .wait_for_code(&account.name, &consent_url, self.timeout)
            .await?;
        tracing::debug!("Received authorization code for account '{}'", account.name);

        self.tokens
            .exchange_code(account, &code, &redirect_uri)
            .await
    }

    async fn copy_paste_flow(&self, account: &Account) -> Result<AccessToken> {
        let consent_url = authorization_url(&self.auth_url, &account.client_id, OOB_REDIRECT_URI);

        println!();
        println!("Authorization for account: {}", account.name);
        println!("================");

        let code = {
            let mut stdin = self.stdin.lock().await;
            prompt_for_code(&mut *stdin, tokio::io::stdout(), &consent_url).await?
        };

        self.tokens
            .exchange_code(account, &code, OOB_REDIRECT_URI)
            .await
    }
}
