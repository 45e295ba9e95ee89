//! linkcheck: command-line front end for the URL Shortener validation core.
//!
//! Runs the same checks the shorten/lookup/admin handlers run, so operators
//! can test candidate URLs, slugs, admin credentials and request bodies
//! against the deployed configuration without going through HTTP.
//!
//! Run:
//! ```bash
//! linkcheck url 'https://Example.COM:443/path'
//! linkcheck slug my-link_1
//! echo 'Bearer <token>' | ADMIN_TOKEN=... linkcheck auth
//! echo '{"url":"https://example.com"}' | linkcheck ingest
//! ```
//!
//! Verdicts are printed to stdout as JSON; logs go to stderr.
//! Configuration: See `config.rs` for all environment variables.

mod config;

use std::process;

use domain::slug::{generate_unique_slug, Base36SlugGenerator};
use domain::{validate_assigned_slug, validate_lookup_slug, validate_url, CoreError, Slug};
use futures_util::{stream, Stream};
use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use http_common::{check_bearer_auth, ingest_json_body, MAX_BODY_BYTES};
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Longest `Authorization` line accepted on stdin.
const MAX_AUTH_LINE: u64 = 4096;

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Url(String),
    Slug(String),
    Lookup(String),
    Generate(u64),
    Auth,
    Ingest(String),
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Url(_) => "url",
            Command::Slug(_) => "slug",
            Command::Lookup(_) => "lookup",
            Command::Generate(_) => "generate",
            Command::Auth => "auth",
            Command::Ingest(_) => "ingest",
        }
    }
}

#[derive(Serialize)]
struct UrlOut {
    url: String,
}

#[derive(Serialize)]
struct SlugOut {
    slug: Slug,
}

#[derive(Serialize)]
struct AuthOut {
    authorized: bool,
}

#[derive(Serialize)]
struct BodyOut {
    size: usize,
    fields: Map<String, Value>,
}

/// A failed check: HTTP-equivalent status plus the error envelope.
type Failure = (u16, Value);

fn print_usage() {
    eprintln!(
        "{}\n\nUsage:\n  linkcheck url <url>\n  linkcheck slug <slug>\n  linkcheck lookup <slug>\n  linkcheck generate <id>\n  linkcheck auth            (reads an Authorization header value from stdin)\n  linkcheck ingest [<content-type>]   (reads a request body from stdin)\n\nNotes:\n  - ADMIN_TOKEN, LOG_FORMAT and SLUG_MIN_WIDTH are read from the environment.",
        domain::about()
    );
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Option<Command>, String> {
    let mut args = args.into_iter();
    let Some(cmd) = args.next() else {
        return Ok(None);
    };

    let command = match cmd.as_str() {
        "url" => Command::Url(args.next().ok_or("missing <url> for url")?),
        "slug" => Command::Slug(args.next().ok_or("missing <slug> for slug")?),
        "lookup" => Command::Lookup(args.next().ok_or("missing <slug> for lookup")?),
        "generate" => {
            let raw = args.next().ok_or("missing <id> for generate")?;
            let id = raw
                .parse()
                .map_err(|_| format!("invalid id for generate: {}", raw))?;
            Command::Generate(id)
        }
        "auth" => Command::Auth,
        "ingest" => Command::Ingest(
            args.next()
                .unwrap_or_else(|| "application/json".to_string()),
        ),
        "help" | "--help" | "-h" => return Ok(None),
        unk => return Err(format!("unknown command: {}", unk)),
    };

    if let Some(extra) = args.next() {
        return Err(format!("unexpected argument: {}", extra));
    }
    Ok(Some(command))
}

fn to_json<T: Serialize>(out: &T) -> Result<Value, Failure> {
    serde_json::to_value(out).map_err(|_| (500, http_common::json_err("internal")))
}

/// Adapt an async reader into the chunk stream the ingester consumes.
fn reader_chunks<R: AsyncRead + Unpin>(
    reader: R,
) -> impl Stream<Item = std::io::Result<Vec<u8>>> + Unpin {
    Box::pin(stream::unfold(reader, |mut reader| async move {
        let mut buf = vec![0u8; 1024];
        match reader.read(&mut buf).await {
            Ok(0) => None,
            Ok(n) => {
                buf.truncate(n);
                Some((Ok(buf), reader))
            }
            Err(e) => Some((Err(e), reader)),
        }
    }))
}

async fn read_auth_header<R: AsyncRead + Unpin>(input: R) -> HeaderMap {
    let mut line = String::new();
    let mut headers = HeaderMap::new();
    if input
        .take(MAX_AUTH_LINE)
        .read_to_string(&mut line)
        .await
        .is_err()
    {
        return headers;
    }
    let value = line.lines().next().unwrap_or_default();
    if let Ok(v) = HeaderValue::from_str(value) {
        headers.insert(AUTHORIZATION, v);
    }
    headers
}

async fn run<R: AsyncRead + Unpin>(
    command: Command,
    cfg: &config::Config,
    input: R,
) -> Result<Value, Failure> {
    match command {
        Command::Url(raw) => {
            let url = validate_url(&raw).map_err(|e| http_common::error_response(e.kind(), &e))?;
            to_json(&UrlOut { url })
        }
        Command::Slug(raw) => {
            let slug = validate_assigned_slug(&raw)
                .map_err(|e| http_common::error_response(e.kind(), &e))?;
            to_json(&SlugOut { slug })
        }
        Command::Lookup(raw) => {
            let slug =
                validate_lookup_slug(&raw).map_err(|e| http_common::error_response(e.kind(), &e))?;
            to_json(&SlugOut { slug })
        }
        Command::Generate(start) => {
            let generator = Base36SlugGenerator::new(cfg.slug_min_width);
            let mut next = start;
            let slug = generate_unique_slug(
                &generator,
                || {
                    let id = next;
                    next = next
                        .checked_add(1)
                        .ok_or_else(|| CoreError::Repository("id space exhausted".into()))?;
                    Ok(id)
                },
                |_| Ok(false),
            )
            .map_err(|e| http_common::core_error_response(&e))?;
            to_json(&SlugOut { slug })
        }
        Command::Auth => {
            let headers = read_auth_header(input).await;
            if !check_bearer_auth(&headers, cfg.admin_token.as_ref()) {
                return Err(http_common::unauthorized());
            }
            to_json(&AuthOut { authorized: true })
        }
        Command::Ingest(content_type) => {
            let body = ingest_json_body(
                Some(content_type.as_str()),
                None,
                reader_chunks(input),
                MAX_BODY_BYTES,
            )
            .await
            .map_err(|e| http_common::error_response(e.kind(), &e))?;
            to_json(&BodyOut {
                size: body.size,
                fields: body.fields,
            })
        }
    }
}

#[tokio::main]
async fn main() {
    // Load and validate config first (fail fast on misconfiguration)
    let cfg = match config::Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    init_tracing(&cfg);
    cfg.warn_if_insecure();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(Some(c)) => c,
        Ok(None) => {
            print_usage();
            return;
        }
        Err(msg) => {
            eprintln!("error: {}", msg);
            print_usage();
            process::exit(2);
        }
    };

    let name = command.name();
    match run(command, &cfg, tokio::io::stdin()).await {
        Ok(out) => {
            info!(command = name, "check passed");
            println!("{}", out);
        }
        Err((status, body)) => {
            warn!(command = name, status, "check failed");
            println!("{}", body);
            process::exit(1);
        }
    }
}

fn init_tracing(cfg: &config::Config) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);
    match cfg.log_format {
        config::LogFormat::Json => {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_timer(fmt::time::SystemTime)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        config::LogFormat::Pretty => {
            registry
                .with(
                    fmt::layer()
                        .pretty()
                        .with_target(true)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_common::AdminSecret;

    const TOKEN: &str = "correct-horse-battery-staple";

    fn cfg() -> config::Config {
        config::Config {
            admin_token: Some(AdminSecret::new(TOKEN)),
            log_format: config::LogFormat::Pretty,
            slug_min_width: 4,
        }
    }

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(
            parse_args(args(&["url", "https://e.com"])),
            Ok(Some(Command::Url("https://e.com".into())))
        );
        assert_eq!(parse_args(args(&["generate", "42"])), Ok(Some(Command::Generate(42))));
        assert_eq!(
            parse_args(args(&["ingest"])),
            Ok(Some(Command::Ingest("application/json".into())))
        );
        assert_eq!(parse_args(args(&[])), Ok(None));
        assert!(parse_args(args(&["url"])).is_err());
        assert!(parse_args(args(&["generate", "-1"])).is_err());
        assert!(parse_args(args(&["slug", "a", "b"])).is_err());
        assert!(parse_args(args(&["nope"])).is_err());
    }

    #[tokio::test]
    async fn url_command_reports_canonical_form_or_reason() {
        let out = run(Command::Url("https://Example.COM:443/path".into()), &cfg(), &b""[..])
            .await
            .unwrap();
        assert_eq!(out, serde_json::json!({"url": "https://example.com/path"}));

        let (status, body) = run(Command::Url("http://169.254.169.254/".into()), &cfg(), &b""[..])
            .await
            .unwrap_err();
        assert_eq!(status, 422);
        assert_eq!(body["error"]["code"], "policy_violation");
    }

    #[tokio::test]
    async fn slug_commands_use_their_policies() {
        let out = run(Command::Slug("My-Link_1".into()), &cfg(), &b""[..]).await.unwrap();
        assert_eq!(out, serde_json::json!({"slug": "my-link_1"}));

        let (status, _) = run(Command::Slug("admin".into()), &cfg(), &b""[..]).await.unwrap_err();
        assert_eq!(status, 422);

        let out = run(Command::Lookup("admin".into()), &cfg(), &b""[..]).await.unwrap();
        assert_eq!(out, serde_json::json!({"slug": "admin"}));
    }

    #[tokio::test]
    async fn generate_skips_reserved_codes() {
        let admin_id = u64::from_str_radix("admin", 36).unwrap();
        let out = run(Command::Generate(admin_id), &cfg(), &b""[..]).await.unwrap();
        assert_eq!(out, serde_json::json!({"slug": "admio"}));

        let out = run(Command::Generate(7), &cfg(), &b""[..]).await.unwrap();
        assert_eq!(out, serde_json::json!({"slug": "0007"}));
    }

    #[tokio::test]
    async fn auth_command_checks_bearer_token() {
        let line = format!("Bearer {TOKEN}\n");
        let out = run(Command::Auth, &cfg(), line.as_bytes()).await.unwrap();
        assert_eq!(out, serde_json::json!({"authorized": true}));

        let (status, _) = run(Command::Auth, &cfg(), &b"Bearer wrong\n"[..])
            .await
            .unwrap_err();
        assert_eq!(status, 401);

        let mut unconfigured = cfg();
        unconfigured.admin_token = None;
        let (status, _) = run(Command::Auth, &unconfigured, line.as_bytes())
            .await
            .unwrap_err();
        assert_eq!(status, 401);
    }

    #[tokio::test]
    async fn ingest_command_reads_body_from_input() {
        let body = br#"{"url":"https://example.com","slug":null}"#;
        let out = run(Command::Ingest("application/json".into()), &cfg(), &body[..])
            .await
            .unwrap();
        assert_eq!(out["size"], body.len());
        assert_eq!(out["fields"]["url"], "https://example.com");

        let big = vec![b' '; MAX_BODY_BYTES + 1];
        let (status, envelope) = run(Command::Ingest("application/json".into()), &cfg(), &big[..])
            .await
            .unwrap_err();
        assert_eq!(status, 400);
        assert_eq!(envelope["error"]["code"], "bad_body");

        let (status, _) = run(Command::Ingest("text/plain".into()), &cfg(), &body[..])
            .await
            .unwrap_err();
        assert_eq!(status, 400);
    }
}
