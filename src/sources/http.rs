use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::errors::{DigestError, DigestResult};
use crate::sources::traits::FeedFetcher;

const USER_AGENT: &str = concat!("stablecoin-digest/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP fetcher with a bounded request timeout
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
    }
}

impl FeedFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> DigestResult<Vec<u8>> {
        let fetch_error = |reason: String| DigestError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                fetch_error("timed out".to_string())
            } else {
                fetch_error(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status)));
        }

        let bytes = response.bytes().map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve one connection on a local port, handing the socket to `handle`
    fn serve_once<H>(handle: H) -> String
    where
        H: FnOnce(std::net::TcpStream) + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((stream, _)) = listener.accept() {
                handle(stream);
            }
        });
        format!("http://{}/feed.xml", addr)
    }

    fn read_request(stream: &mut std::net::TcpStream) {
        let mut buf = [0u8; 4096];
        let mut request = Vec::new();
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf) {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
    }

    #[test]
    fn test_non_success_status_is_fetch_error() {
        let url = serve_once(|mut stream| {
            read_request(&mut stream);
            stream
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                .ok();
        });

        let err = HttpFetcher::new(Duration::from_secs(5)).fetch(&url).unwrap_err();

        match err {
            DigestError::Fetch { url: failed, reason } => {
                assert_eq!(failed, url);
                assert!(reason.contains("HTTP 404"), "reason was {}", reason);
            }
            other => panic!("expected fetch error, got {:?}", other),
        }
    }

    #[test]
    fn test_silent_server_times_out() {
        let url = serve_once(|mut stream| {
            read_request(&mut stream);
            thread::sleep(Duration::from_secs(5));
            drop(stream);
        });

        let err = HttpFetcher::new(Duration::from_secs(1)).fetch(&url).unwrap_err();

        assert!(
            matches!(err, DigestError::Fetch { ref reason, .. } if reason == "timed out"),
            "got {:?}",
            err
        );
    }

    #[test]
    fn test_success_returns_body() {
        let url = serve_once(|mut stream| {
            read_request(&mut stream);
            stream
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\n<rss>")
                .ok();
        });

        let body = HttpFetcher::new(Duration::from_secs(5)).fetch(&url).unwrap();
        assert_eq!(body, b"<rss>");
    }

    #[test]
    fn test_unreachable_host_is_fetch_error() {
        let fetcher = HttpFetcher::new(Duration::from_secs(2));
        let err = fetcher.fetch("http://127.0.0.1:9/feed.xml").unwrap_err();

        assert!(
            matches!(err, DigestError::Fetch { ref url, .. } if url == "http://127.0.0.1:9/feed.xml")
        );
    }

    #[test]
    fn test_user_agent_names_crate() {
        assert!(USER_AGENT.starts_with("stablecoin-digest/"));
    }
}
