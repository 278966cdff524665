use anyhow::Context;
use axum::routing::{get, post, put};
use axum::Router;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use tutor_api::handlers::{admin, auth, student, teacher, webhooks};
use tutor_api::middleware::{
    jwt_auth_middleware, permission_middleware, service_key_middleware, ServiceKind,
};
use tutor_api::{config, database, policy};

#[derive(Parser)]
#[command(name = "tutor-api", about = "Online tutoring platform backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting tutor-api in {:?} mode", config.environment);

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve { port: None }) {
        Command::Serve { port } => serve(port).await?,
        Command::Migrate => {
            database::manager::run_migrations()
                .await
                .context("migration failed")?;
            tracing::info!("Migrations applied");
        }
    }

    Ok(())
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let app = app();

    // Allow tests or deployments to override port via env
    let port = port
        .or_else(|| std::env::var("TUTOR_API_PORT").ok().and_then(|s| s.parse().ok()))
        .or_else(|| std::env::var("PORT").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("tutor-api listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_auth_routes())
        // Token-gated surfaces
        .merge(protected_auth_routes())
        .merge(admin_routes())
        .merge(student_routes())
        .merge(teacher_routes())
        // Service-key-gated webhooks
        .merge(webhook_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_auth_routes() -> Router {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

fn protected_auth_routes() -> Router {
    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

/// Attach the policy-table requirements for a route group
fn gated(router: Router, group: &str) -> Router {
    router.layer(axum::middleware::from_fn_with_state(
        policy::required(group),
        permission_middleware,
    ))
}

fn admin_routes() -> Router {
    let users_view = Router::new()
        .route("/admin/users", get(admin::users::list))
        .route("/admin/users/:id", get(admin::users::get));

    let users_manage = Router::new()
        .route("/admin/users", post(admin::users::create))
        .route(
            "/admin/users/:id",
            put(admin::users::update).delete(admin::users::disable),
        );

    // POST takes a user id and creates the profile for that account; the
    // other verbs take the profile id
    let students = Router::new()
        .route("/admin/students", get(admin::students::list))
        .route(
            "/admin/students/:id",
            get(admin::students::get)
                .post(admin::students::create)
                .put(admin::students::update),
        );

    let teachers = Router::new()
        .route("/admin/teachers", get(admin::teachers::list))
        .route(
            "/admin/teachers/:id",
            get(admin::teachers::get)
                .post(admin::teachers::create)
                .put(admin::teachers::update),
        );

    let courses = Router::new()
        .route("/admin/courses", get(admin::courses::list).post(admin::courses::create))
        .route(
            "/admin/courses/:id",
            put(admin::courses::update).delete(admin::courses::remove),
        );

    let packages = Router::new()
        .route(
            "/admin/packages",
            get(admin::packages::list).post(admin::packages::create),
        )
        .route(
            "/admin/packages/:id",
            put(admin::packages::update).delete(admin::packages::remove),
        );

    let orders = Router::new()
        .route("/admin/orders", get(admin::orders::list).post(admin::orders::create))
        .route("/admin/orders/:id", get(admin::orders::get));

    let bookings_view = Router::new()
        .route("/admin/bookings", get(admin::bookings::list))
        .route("/admin/bookings/:id", get(admin::bookings::get));

    let bookings_manage = Router::new()
        .route("/admin/bookings", post(admin::bookings::create))
        .route("/admin/bookings/:id/confirm", put(admin::bookings::confirm))
        .route("/admin/bookings/:id/start", put(admin::bookings::start_teaching))
        .route("/admin/bookings/:id/complete", put(admin::bookings::complete))
        .route("/admin/bookings/:id/absent", put(admin::bookings::absent))
        .route("/admin/bookings/:id/cancel", put(admin::bookings::cancel))
        .route("/admin/trial-bookings", post(admin::bookings::create_trial))
        .route(
            "/admin/trial-bookings/:id/confirm",
            put(admin::bookings::confirm_trial),
        )
        .route(
            "/admin/trial-bookings/:id/cancel",
            put(admin::bookings::cancel_trial),
        );

    let reports = Router::new()
        .route("/admin/reports/bookings", get(admin::reports::bookings))
        .route("/admin/reports/revenue", get(admin::reports::revenue));

    let notify = Router::new()
        .route("/admin/notifications/send", post(admin::notify::send))
        .route(
            "/admin/notifications/broadcast",
            post(admin::notify::broadcast),
        );

    Router::new()
        .merge(gated(users_view, "admin.users.view"))
        .merge(gated(users_manage, "admin.users"))
        .merge(gated(students, "admin.students"))
        .merge(gated(teachers, "admin.teachers"))
        .merge(gated(courses, "admin.courses"))
        .merge(gated(packages, "admin.packages"))
        .merge(gated(orders, "admin.orders"))
        .merge(gated(bookings_view, "admin.bookings.view"))
        .merge(gated(bookings_manage, "admin.bookings"))
        .merge(gated(reports, "admin.reports"))
        .merge(gated(notify, "admin.notify"))
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn student_routes() -> Router {
    let routes = Router::new()
        .route("/student/profile", get(student::profile))
        .route("/student/packages", get(student::packages))
        .route("/student/bookings", get(student::bookings).post(student::book))
        .route("/student/bookings/:id/cancel", put(student::cancel));

    gated(routes, "student").layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn teacher_routes() -> Router {
    let routes = Router::new()
        .route("/teacher/profile", get(teacher::profile))
        .route("/teacher/schedule", get(teacher::schedule))
        .route("/teacher/bookings/:id/confirm", put(teacher::confirm))
        .route("/teacher/bookings/:id/start", put(teacher::start_teaching))
        .route("/teacher/bookings/:id/complete", put(teacher::complete));

    gated(routes, "teacher").layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn webhook_routes() -> Router {
    let keyed = |router: Router, service: ServiceKind| -> Router {
        router.layer(axum::middleware::from_fn_with_state(
            service,
            service_key_middleware,
        ))
    };

    Router::new()
        .merge(keyed(
            Router::new().route("/meet/webhook", post(webhooks::meet)),
            ServiceKind::Meet,
        ))
        .merge(keyed(
            Router::new().route("/crm/webhook", post(webhooks::crm)),
            ServiceKind::Crm,
        ))
        .merge(keyed(
            Router::new().route("/payment/webhook", post(webhooks::payment)),
            ServiceKind::Payment,
        ))
        .merge(keyed(
            Router::new().route("/zalo/webhook", post(webhooks::zalo)),
            ServiceKind::Zalo,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "message": "Success",
        "data": {
            "name": "tutor-api",
            "version": version,
            "description": "Online tutoring platform backend",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public), /api/auth/whoami (protected)",
                "admin": "/admin/* (protected, permission-gated)",
                "student": "/student/* (protected)",
                "teacher": "/teacher/* (protected)",
                "webhooks": "/meet/webhook, /crm/webhook, /payment/webhook, /zalo/webhook (api-key)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "message": "Success",
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            // Detail goes to the log, not the client
            tracing::warn!("Health check database failure: {}", e);
            (
                axum::http::StatusCode::SERVICE_UNAVAILABLE,
                axum::response::Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": "unreachable"
                    }
                })),
            )
        }
    }
}
