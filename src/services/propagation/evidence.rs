use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::bot::error::Error;
use crate::constants::limits::MAX_ATTACHMENT_BYTES;
use crate::constants::messages::NO_EVIDENCE;
use crate::services::propagation::report::{EvidenceFile, EvidenceForm};

/// Upload name for the `index`th attachment link
pub fn file_name_for(url: &Url, index: usize) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(|name| {
            name.chars()
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
                .collect::<String>()
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("attachment{}", index + 1))
}

/// Evidence text with links that could not be re-uploaded appended
pub fn with_failed_links(evidence_text: &str, failed: &[Url]) -> String {
    if failed.is_empty() {
        return evidence_text.to_string();
    }
    let links = failed
        .iter()
        .map(Url::as_str)
        .collect::<Vec<_>>()
        .join("\n");
    if evidence_text == NO_EVIDENCE {
        links
    } else {
        format!("{}\n{}", evidence_text, links)
    }
}

fn too_large(url: &Url) -> Error {
    Error::InvalidOperation(format!(
        "{} is larger than {} bytes",
        url, MAX_ATTACHMENT_BYTES
    ))
}

/// Append a downloaded chunk, refusing to grow past `limit`
fn push_capped(body: &mut Vec<u8>, chunk: &[u8], limit: usize) -> bool {
    if body.len() + chunk.len() > limit {
        return false;
    }
    body.extend_from_slice(chunk);
    true
}

async fn download(client: &Client, url: &Url) -> Result<Vec<u8>, Error> {
    let mut response = client.get(url.clone()).send().await?.error_for_status()?;
    if response
        .content_length()
        .is_some_and(|len| len > MAX_ATTACHMENT_BYTES as u64)
    {
        return Err(too_large(url));
    }

    // Chunked bodies carry no length, so the cap is enforced while reading
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if !push_capped(&mut body, &chunk, MAX_ATTACHMENT_BYTES) {
            return Err(too_large(url));
        }
    }
    Ok(body)
}

/// Fetch every attachment link of a form.
///
/// Links that fail to download are moved into the evidence text so the
/// report still points at them.
pub async fn collect_attachments(client: &Client, form: &mut EvidenceForm) -> Vec<EvidenceFile> {
    let mut files = Vec::with_capacity(form.attachment_links.len());
    let mut failed = Vec::new();

    for (index, url) in form.attachment_links.iter().enumerate() {
        match download(client, url).await {
            Ok(data) => {
                debug!("Downloaded evidence {} ({} bytes)", url, data.len());
                files.push(EvidenceFile {
                    name: file_name_for(url, index),
                    data,
                });
            }
            Err(e) => {
                warn!("Could not download evidence {}: {}", url, e);
                failed.push(url.clone());
            }
        }
    }

    form.evidence_text = with_failed_links(&form.evidence_text, &failed);
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_file_name_from_path() {
        assert_eq!(
            file_name_for(&url("https://cdn.example.com/a/b/proof.png?ex=1"), 0),
            "proof.png"
        );
        assert_eq!(file_name_for(&url("https://example.com/"), 2), "attachment3");
        assert_eq!(
            file_name_for(&url("https://example.com/we%20ird%3F.jpg"), 0),
            "we20ird3F.jpg"
        );
    }

    #[test]
    fn test_push_capped_stops_at_limit() {
        let mut body = Vec::new();
        assert!(push_capped(&mut body, &[1; 6], 10));
        assert!(push_capped(&mut body, &[2; 4], 10));
        assert_eq!(body.len(), 10);

        assert!(!push_capped(&mut body, &[3], 10));
        assert_eq!(body.len(), 10);
    }

    #[tokio::test]
    async fn test_download_without_length_is_capped() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n")
                .await
                .unwrap();
            let chunk = vec![b'x'; 1024 * 1024];
            for _ in 0..(MAX_ATTACHMENT_BYTES / chunk.len() + 2) {
                let header = format!("{:x}\r\n", chunk.len());
                if socket.write_all(header.as_bytes()).await.is_err()
                    || socket.write_all(&chunk).await.is_err()
                    || socket.write_all(b"\r\n").await.is_err()
                {
                    return;
                }
            }
            let _ = socket.write_all(b"0\r\n\r\n").await;
        });

        let link = url(&format!("http://{}/huge.png", addr));
        let result = download(&Client::new(), &link).await;

        tokio_test::assert_err!(result);
    }

    #[test]
    fn test_failed_links_replace_placeholder() {
        let failed = [url("https://example.com/a.png"), url("https://example.com/b.png")];
        assert_eq!(
            with_failed_links(NO_EVIDENCE, &failed),
            "https://example.com/a.png\nhttps://example.com/b.png"
        );
        assert_eq!(
            with_failed_links("screenshots below", &failed[..1]),
            "screenshots below\nhttps://example.com/a.png"
        );
        assert_eq!(with_failed_links("text", &[]), "text");
    }
}
