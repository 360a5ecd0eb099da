//! Mints a bearer token with the configured secret, e.g. for the first call
//! to the admin-only registration route.
//!
//! $ cargo run --bin issue_token -- --subject 1 --admin

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use workclock::application_impl::{JwtHs256Codec, JwtTokenAuthority};
use workclock::application_port::TokenAuthority;
use workclock::domain_model::SubjectId;
use workclock::infra_local::SystemClock;
use workclock::settings::parse_settings;

#[derive(Parser, Debug)]
#[command(about = "Issue a WorkClock bearer token")]
struct Args {
    #[arg(long)]
    settings: Option<String>,
    #[arg(long)]
    subject: i64,
    #[arg(long)]
    admin: bool,
    /// Overrides auth.token_ttl_minutes.
    #[arg(long)]
    ttl_minutes: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = parse_settings(args.settings.as_deref())?;

    let authority = JwtTokenAuthority::new(
        Arc::new(JwtHs256Codec::new(settings.auth.secret.as_bytes())),
        Arc::new(SystemClock),
        Duration::from_secs(settings.auth.token_ttl_minutes * 60),
    );
    let token = match args.ttl_minutes {
        Some(minutes) => authority.issue(
            SubjectId(args.subject),
            args.admin,
            Duration::from_secs(minutes * 60),
        )?,
        None => authority.issue_default(SubjectId(args.subject), args.admin)?,
    };

    println!("{}", token.bearer());
    Ok(())
}
