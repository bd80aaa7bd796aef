use futures::StreamExt;

use crate::error::Result;

/// Drain a streamed response body into one contiguous string.
///
/// Chunks are appended strictly in arrival order until the stream is
/// exhausted; the accumulated bytes are decoded as UTF-8 (lossily)
/// once at the end, so multi-byte characters split across chunk
/// boundaries survive intact. No size cap is enforced; the caller
/// owns any upstream limits. The response body is consumed by value,
/// so the connection is released on every exit path.
pub(crate) async fn drain_text(response: reqwest::Response) -> Result<String> {
    let mut stream = response.bytes_stream();
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
