use crate::{Error, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Redirect marker telling the provider to show the code instead of redirecting
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Show the consent URL and read one line holding the authorization code
pub async fn prompt_for_code<R, W>(mut input: R, mut output: W, auth_url: &str) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    output
        .write_all(format!("Please open {} and enter code: ", auth_url).as_bytes())
        .await?;
    output.flush().await?;

    let mut line = String::new();
    input.read_line(&mut line).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;

    let code = line.trim();
    if code.is_empty() {
        return Err(Error::NoCode);
    }

    Ok(code.to_string())
}
