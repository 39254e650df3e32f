//! Server lifecycle management helpers.
//!
//! Builds the provider adapters, the access gate and the API services once at
//! startup, then wires them into the Actix application.

use crate::middleware;
use actix_files::Files;
use actix_web::dev::RequestHead;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use log::{debug, info, warn};
use solarlead_api::OtpRateLimiter;
use solarlead_auth::{
    CookieConfig, HostedAuthClient, IdentityProvider, IdentityToolkitClient, OtpService,
    RestUserRepository, SessionResolver, UserRepository,
};
use solarlead_configs::{ServerConfig, SiteSettings};
use solarlead_gate::{AccessGate, AccessGateMiddleware, RouteTable};
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::Arc;

/// Shared application components, constructed once and injected into every
/// worker through `web::Data`.
#[derive(Clone)]
pub struct ApplicationComponents {
    pub identity: Arc<dyn IdentityProvider>,
    pub user_repo: Arc<dyn UserRepository>,
    pub otp_service: Arc<OtpService>,
    pub gate: Arc<AccessGate>,
    pub cookie_config: Arc<CookieConfig>,
    pub otp_rate_limiter: Arc<OtpRateLimiter>,
}

/// Build provider adapters, the route table and the access gate.
pub fn bootstrap(config: &ServerConfig) -> Result<ApplicationComponents> {
    let identity: Arc<dyn IdentityProvider> = Arc::new(HostedAuthClient::new(&config.identity)?);
    let user_repo: Arc<dyn UserRepository> = Arc::new(RestUserRepository::new(&config.identity)?);
    info!("Identity provider: {}", config.identity.base_url);

    if config.identity.anon_key.is_empty() {
        warn!("identity.anon_key is empty; provider calls will be rejected");
    }
    if config.identity.service_key.is_empty() {
        warn!("identity.service_key is empty; role lookups will fail and the admin area stays closed");
    }

    let mut otp_service = OtpService::new(identity.clone(), config.auth.default_country_code.clone());
    if config.phone_otp.enabled {
        let phone_provider =
            IdentityToolkitClient::new(&config.phone_otp, config.identity.request_timeout_ms)?;
        otp_service =
            otp_service.with_phone_provider(Arc::new(phone_provider), config.phone_otp.id_token_provider.clone());
        info!("Phone OTP: secondary provider at {}", config.phone_otp.base_url);
    } else {
        info!("Phone OTP: primary provider SMS channel");
    }

    let routes = RouteTable::from_settings(&config.routes)?.with_index_file(&config.site.index_file);
    debug!(
        "Routes: user area {}, admin area {}, login {}",
        routes.user_home(),
        routes.admin_home(),
        routes.login_path()
    );
    let gate = AccessGate::new(routes, SessionResolver::new(identity.clone()), user_repo.clone());

    Ok(ApplicationComponents {
        identity,
        user_repo,
        otp_service: Arc::new(otp_service),
        gate: Arc::new(gate),
        cookie_config: Arc::new(CookieConfig::from_settings(&config.auth)),
        otp_rate_limiter: Arc::new(OtpRateLimiter::from_settings(&config.auth)),
    })
}

fn worker_count(config: &ServerConfig) -> usize {
    if config.server.workers == 0 {
        num_cpus::get()
    } else {
        config.server.workers
    }
}

fn check_site_root(site: &SiteSettings) {
    let root = Path::new(&site.root_dir);
    if !root.is_dir() {
        warn!("Site directory {} does not exist; only /api will answer", root.display());
    } else if !root.join(&site.index_file).is_file() {
        warn!("Site directory {} has no {}", root.display(), site.index_file);
    }
}

/// Html documents under a gated prefix are reachable only through their
/// directory path, which the gate classifies. Other gated assets pass.
fn is_gated_page(routes: &RouteTable, path: &Path) -> bool {
    let is_page = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
    let is_index = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case(routes.index_file()));

    is_page && !is_index && routes.is_under_gated_prefix(&format!("/{}", path.to_string_lossy()))
}

fn site_files(site: &SiteSettings, routes: &RouteTable) -> Files {
    let routes = routes.clone();
    Files::new("/", &site.root_dir)
        .index_file(site.index_file.clone())
        .path_filter(move |path: &Path, _: &RequestHead| !is_gated_page(&routes, path))
}

/// Register app data, the JSON API and the static site on one worker's app.
fn configure_app(cfg: &mut web::ServiceConfig, components: &ApplicationComponents, site: &SiteSettings) {
    cfg.app_data(web::Data::new(components.identity.clone()))
        .app_data(web::Data::new(components.user_repo.clone()))
        .app_data(web::Data::new(components.otp_service.clone()))
        .app_data(web::Data::new(components.gate.clone()))
        .app_data(web::Data::new(components.cookie_config.clone()))
        .app_data(web::Data::new(components.otp_rate_limiter.clone()))
        .configure(solarlead_api::configure_routes)
        .service(site_files(site, components.gate.routes()));
}

/// Where the server listens.
enum Bind {
    Addr(String),
    Listener(TcpListener),
}

/// Build, bind and start the HTTP server. The returned future runs it.
fn start_server(
    config: &ServerConfig,
    components: &ApplicationComponents,
    bind: Bind,
) -> Result<actix_web::dev::Server> {
    let components = components.clone();
    let cors_config = config.security.cors.clone();
    let site = config.site.clone();

    let server = HttpServer::new(move || {
        // Last wrap runs first: CORS, then Logger, then the gate.
        App::new()
            .wrap(AccessGateMiddleware::new(
                components.gate.clone(),
                components.cookie_config.clone(),
            ))
            .wrap(middleware::request_logger())
            .wrap(middleware::build_cors_from_config(&cors_config))
            .configure(|cfg| configure_app(cfg, &components, &site))
    })
    .workers(worker_count(config));

    let server = match bind {
        Bind::Addr(addr) => server.bind(addr)?,
        Bind::Listener(listener) => server.listen(listener)?,
    };
    Ok(server.run())
}

/// Start the HTTP server and run until Ctrl+C.
pub async fn run(config: &ServerConfig, components: ApplicationComponents) -> Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    check_site_root(&config.site);
    info!("Starting HTTP server on {}", bind_addr);
    info!(
        "Server config: workers={}, site={}",
        worker_count(config),
        config.site.root_dir
    );
    debug!("Endpoints: POST /api/auth/otp/send, POST /api/auth/otp/verify, POST /api/auth/logout, GET /api/auth/me");

    let server = start_server(config, &components, Bind::Addr(bind_addr))?;

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(Err(e)) => log::error!("Server failed: {}", e),
                Err(e) => log::error!("Server task failed: {}", e),
                Ok(Ok(())) => {},
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
            server_handle.stop(true).await;
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// A running HTTP server instance intended for integration tests.
///
/// Same middleware stack and routes as production, bound to an ephemeral port.
pub struct RunningTestHttpServer {
    pub base_url: String,
    pub bind_addr: SocketAddr,
    server_handle: actix_web::dev::ServerHandle,
    server_task: tokio::task::JoinHandle<std::io::Result<()>>,
}

impl RunningTestHttpServer {
    pub async fn shutdown(self) {
        self.server_handle.stop(false).await;
        let _ = self.server_task.await;
    }
}

/// Start the HTTP server for integration tests on a random available port.
///
/// Does not install Ctrl+C handling; the caller must invoke `shutdown()`.
pub async fn run_for_tests(
    config: &ServerConfig,
    components: ApplicationComponents,
) -> Result<RunningTestHttpServer> {
    let bind_ip = if config.server.host.is_empty() {
        "127.0.0.1"
    } else {
        config.server.host.as_str()
    };

    let listener = TcpListener::bind((bind_ip, 0))?;
    let bind_addr = listener.local_addr()?;

    let server = start_server(config, &components, Bind::Listener(listener))?;

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    Ok(RunningTestHttpServer {
        base_url: format!("http://{}", bind_addr),
        bind_addr,
        server_handle,
        server_task,
    })
}
