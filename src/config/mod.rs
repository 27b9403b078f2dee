use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
const DEFAULT_STORE_CONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_STORE_CONNECT_DELAY_MS: u64 = 2000;

pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub store_connect_attempts: u32,
    pub store_connect_delay: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let host: IpAddr = env::var("HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse()
            .expect("HOST must be a valid IP address");
        let port = env_parsed("PORT", DEFAULT_PORT);

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: SocketAddr::from((host, port)),
            jwt_secret: env::var("SECRET_KEY")
                .expect("SECRET_KEY must be set")
                .trim()
                .to_string(),
            token_ttl_minutes: env_parsed("TOKEN_TTL_MINUTES", DEFAULT_TOKEN_TTL_MINUTES),
            store_connect_attempts: env_parsed(
                "STORE_CONNECT_ATTEMPTS",
                DEFAULT_STORE_CONNECT_ATTEMPTS,
            ),
            store_connect_delay: Duration::from_millis(env_parsed(
                "STORE_CONNECT_DELAY_MS",
                DEFAULT_STORE_CONNECT_DELAY_MS,
            )),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparsable value for {}, using default", name);
                default
            }
        },
        Err(_) => default,
    }
}
