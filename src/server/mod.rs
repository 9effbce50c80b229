//! Minimal HTTP front end over the toolkit: one accept loop, a pure router,
//! and a startup-loaded card registry shared by the handlers.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpListener, TcpStream};

pub mod api;
pub mod routes;

use crate::api::{ApiClient, ApiError};
use crate::cards::CardCatalog;

/// Card catalog fetched once at startup; battles are fetched per request.
pub struct CardRegistry {
    pub client: ApiClient,
    pub catalog: CardCatalog,
}

impl CardRegistry {
    pub fn load() -> Result<CardRegistry, ApiError> {
        let client = ApiClient::from_env()?;
        let catalog = client.card_catalog()?;
        log::info!("card registry loaded: {} cards", catalog.len());
        Ok(CardRegistry { client, catalog })
    }

    /// Assemble from pre-built parts (tests, offline runs).
    pub fn with_parts(client: ApiClient, catalog: CardCatalog) -> CardRegistry {
        CardRegistry { client, catalog }
    }
}

#[derive(Debug)]
pub enum ServerError {
    Io(io::Error),
    Registry(ApiError),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Registry(err) => write!(f, "card registry load failed: {err}"),
        }
    }
}

impl std::error::Error for ServerError {}

pub fn run_server(bind_addr: &str) -> Result<(), ServerError> {
    let registry = CardRegistry::load().map_err(ServerError::Registry)?;
    let listener = TcpListener::bind(bind_addr).map_err(ServerError::Io)?;
    println!("fraywatch server listening on http://{bind_addr}");

    for stream in listener.incoming() {
        match stream {
            Ok(mut stream) => {
                if let Err(err) = handle_connection(&registry, &mut stream) {
                    eprintln!("request error: {err}");
                }
            }
            Err(err) => eprintln!("connection failed: {err}"),
        }
    }

    Ok(())
}

fn handle_connection(registry: &CardRegistry, stream: &mut TcpStream) -> io::Result<()> {
    let mut buffer = [0_u8; 16_384];
    let bytes_read = stream.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(());
    }

    let request = String::from_utf8_lossy(&buffer[..bytes_read]);
    let request_line = request.lines().next().unwrap_or_default();
    let mut request_parts = request_line.split_whitespace();
    let method = request_parts.next().unwrap_or("GET");
    let path = request_parts.next().unwrap_or("/");

    let response = routes::route_request(registry, method, path).to_http_string();
    stream.write_all(response.as_bytes())?;
    stream.flush()?;
    Ok(())
}
