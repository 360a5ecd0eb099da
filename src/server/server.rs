use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_model::CallSiteId;
use crate::domain_port::*;
use crate::infra_local::*;
use crate::infra_mysql::*;
use crate::logger::*;
use crate::resilience::*;
use crate::settings::Settings;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Breaker-protected call sites. Each name maps to exactly one breaker.
pub mod call_site {
    use super::CallSiteId;

    pub const REGISTER: CallSiteId = CallSiteId::from_static("auth.register");
    pub const FAULT_DEMO: CallSiteId = CallSiteId::from_static("fault.demo");
}

/// Everything the server needs that is not derived from settings. Tests
/// build one of these by hand to swap in fakes.
pub struct Components {
    pub identity_repo: Arc<dyn IdentityRepo>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub notification_sink: Arc<dyn NotificationSink>,
    pub clock: Arc<dyn Clock>,
    pub fault_source: Arc<dyn FaultSource>,
    pub signing_secret: Vec<u8>,
    pub token_ttl: Duration,
    pub breaker: BreakerConfig,
    pub fault_odds: FaultOdds,
}

pub struct Server {
    pub identity_service: Arc<dyn IdentityService>,
    pub fault_demo_service: Arc<dyn FaultDemoService>,
    pub token_authority: Arc<dyn TokenAuthority>,
    pub breakers: Arc<BreakerRegistry>,
    notifier_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    mysql: Option<MySqlIdentityRepo>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let cancel = CancellationToken::new();

        let mut mysql = None;
        let identity_repo: Arc<dyn IdentityRepo> = match settings.identity.backend.as_str() {
            "memory" => Arc::new(InMemoryIdentityRepo::new()),
            "mysql" => {
                let dsn = settings
                    .identity
                    .dsn
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("identity.dsn is required for mysql"))?;
                let repo = MySqlIdentityRepo::connect(dsn).await?;
                mysql = Some(repo.clone());
                Arc::new(repo)
            }
            other => return Err(anyhow::anyhow!("Unknown identity backend: {}", other)),
        };

        let mut notifier_handle = None;
        let notification_sink: Arc<dyn NotificationSink> =
            match settings.notification.backend.as_str() {
                "log" => Arc::new(LogNotificationSink),
                "queued" => {
                    let (sink, handle) = QueuedNotificationSink::spawn(
                        Arc::new(LogNotificationSink),
                        settings.notification.queue_capacity,
                        cancel.clone(),
                    );
                    notifier_handle = Some(handle);
                    Arc::new(sink)
                }
                other => return Err(anyhow::anyhow!("Unknown notification backend: {}", other)),
            };

        let components = Components {
            identity_repo,
            password_hasher: Arc::new(Argon2PasswordHasher),
            notification_sink,
            clock: Arc::new(SystemClock),
            fault_source: Arc::new(RandomFaultSource),
            signing_secret: settings.auth.secret.clone().into_bytes(),
            token_ttl: settings.auth.token_ttl(),
            breaker: BreakerConfig {
                failure_threshold: settings.breaker.failure_threshold,
                recovery_timeout: Duration::from_secs(settings.breaker.recovery_timeout_secs),
                ..BreakerConfig::default()
            },
            fault_odds: FaultOdds {
                target: settings.fault_demo.target,
                sides: settings.fault_demo.sides,
            },
        };

        let (mut server, identity_service) = Self::build(components, cancel);
        server.mysql = mysql;
        server.notifier_handle = Mutex::new(notifier_handle);

        if let Some(seed) = &settings.identity.seed_admin {
            let id = identity_service
                .ensure_admin(&seed.name, &seed.gmail, &seed.password)
                .await?;
            info!("admin identity {} available as {}", id, seed.gmail);
        }

        info!("server started");
        Ok(server)
    }

    /// Builds a server from hand-picked components and makes sure an admin
    /// identity exists.
    pub async fn from_components_with_admin(
        components: Components,
        name: &str,
        gmail: &str,
        password: &str,
    ) -> anyhow::Result<Self> {
        let (server, identity_service) = Self::build(components, CancellationToken::new());
        identity_service.ensure_admin(name, gmail, password).await?;
        Ok(server)
    }

    fn build(components: Components, cancel: CancellationToken) -> (Self, Arc<RealIdentityService>) {
        let codec: Arc<dyn ClaimsCodec> =
            Arc::new(JwtHs256Codec::new(&components.signing_secret));
        let token_authority: Arc<dyn TokenAuthority> = Arc::new(JwtTokenAuthority::new(
            codec,
            components.clock.clone(),
            components.token_ttl,
        ));

        let identity_service = Arc::new(RealIdentityService::new(
            components.identity_repo,
            components.password_hasher,
            token_authority.clone(),
            components.notification_sink,
        ));
        let fault_demo_service: Arc<dyn FaultDemoService> = Arc::new(DiceFaultDemoService::new(
            components.fault_source,
            components.fault_odds,
        ));

        let breakers = Arc::new(BreakerRegistry::new(components.clock, components.breaker));
        // Registered up front so they show in snapshots before first use.
        breakers.breaker(call_site::REGISTER);
        breakers.breaker(call_site::FAULT_DEMO);

        let server = Server {
            identity_service: identity_service.clone(),
            fault_demo_service,
            token_authority,
            breakers,
            notifier_handle: Mutex::new(None),
            cancel,
            mysql: None,
        };
        (server, identity_service)
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = match self.notifier_handle.lock() {
            Ok(mut lock) => lock.take(),
            Err(_) => None,
        };
        if let Some(handle) = handle {
            let r = handle.await;
            info!("notification worker stopped: {:?}", r);
        }

        for snapshot in self.breakers.snapshots() {
            debug!(
                "breaker {} at shutdown: {} ({} consecutive failures)",
                snapshot.call_site, snapshot.state, snapshot.consecutive_failures
            );
        }

        if let Some(repo) = &self.mysql {
            repo.close().await;
        }
    }
}
