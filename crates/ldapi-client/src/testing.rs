//! In-process directory responder for unit tests.
//!
//! Speaks just enough LDAP to accept binds and, optionally, answer every
//! search with an empty result. Other requests are read and left
//! unanswered.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::config::DirectoryConfig;

const BIND_REQUEST: u8 = 0x60;
const SEARCH_REQUEST: u8 = 0x63;
const BIND_RESPONSE: u8 = 0x61;
const SEARCH_RESULT_DONE: u8 = 0x65;

/// A listening responder; dropped with the test runtime.
pub struct Responder {
    port: u16,
    connections: Arc<AtomicUsize>,
}

impl Responder {
    /// Starts listening on an ephemeral local port.
    pub async fn start(answer_searches: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let connections = Arc::new(AtomicUsize::new(0));

        let accepted = Arc::clone(&connections);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                accepted.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(stream, answer_searches));
            }
        });

        Self { port, connections }
    }

    /// Connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// A configuration pointing at this responder.
    pub fn config(&self) -> DirectoryConfig {
        DirectoryConfig {
            host: format!("ldap://127.0.0.1:{}", self.port),
            base_dn: "dc=example,dc=com".to_string(),
            bind_dn: "cn=admin,dc=example,dc=com".to_string(),
            bind_password: "secret".to_string(),
            connection_timeout_secs: 2,
            ..DirectoryConfig::default()
        }
    }
}

async fn serve(mut stream: TcpStream, answer_searches: bool) {
    while let Some(message) = read_message(&mut stream).await {
        // LDAPMessage body: INTEGER messageID, then the protocol op.
        let id_len = usize::from(message[1]);
        let id = &message[2..2 + id_len];
        let reply = match message[2 + id_len] {
            BIND_REQUEST => Some(BIND_RESPONSE),
            SEARCH_REQUEST if answer_searches => Some(SEARCH_RESULT_DONE),
            _ => None,
        };
        if let Some(tag) = reply {
            if stream.write_all(&response(id, tag)).await.is_err() {
                return;
            }
        }
    }
}

/// Reads one SEQUENCE and returns its contents.
async fn read_message(stream: &mut TcpStream) -> Option<Vec<u8>> {
    let _tag = stream.read_u8().await.ok()?;
    let first = stream.read_u8().await.ok()?;
    let len = if first < 0x80 {
        usize::from(first)
    } else {
        let mut len = 0usize;
        for _ in 0..(first & 0x7f) {
            len = (len << 8) | usize::from(stream.read_u8().await.ok()?);
        }
        len
    };
    let mut body = vec![0; len];
    stream.read_exact(&mut body).await.ok()?;
    Some(body)
}

/// A success result: resultCode 0, empty matchedDN and diagnostic message.
fn response(id: &[u8], tag: u8) -> Vec<u8> {
    let mut body = vec![0x02, u8::try_from(id.len()).unwrap()];
    body.extend_from_slice(id);
    body.extend_from_slice(&[tag, 0x07, 0x0a, 0x01, 0x00, 0x04, 0x00, 0x04, 0x00]);

    let mut message = vec![0x30, u8::try_from(body.len()).unwrap()];
    message.extend_from_slice(&body);
    message
}
