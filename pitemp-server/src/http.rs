use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use pitemp_observability::{CONTENT_TYPE, TemperatureGauge};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the scrape router: one `GET` route at `metrics_path`.
///
/// The path is matched literally: `:x`, `*` and `{x}` segments are not
/// treated as captures. With `debug` set every request is logged through
/// `TraceLayer`.
pub fn build_router(metrics_path: &str, gauge: TemperatureGauge, debug: bool) -> Router {
    let router = Router::new()
        .without_v07_checks()
        .route(&literal_route(metrics_path), get(metrics_handler))
        .with_state(gauge);

    if debug {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Escape route syntax so `path` only matches itself.
fn literal_route(path: &str) -> String {
    path.replace('{', "{{").replace('}', "}}")
}

/// Prometheus metrics endpoint handler.
async fn metrics_handler(State(gauge): State<TemperatureGauge>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, CONTENT_TYPE)], gauge.render())
}

/// Serve `router` on `listener` until Ctrl-C or SIGTERM.
pub async fn serve(listener: TcpListener, router: Router) -> anyhow::Result<()> {
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("Shutdown signal received, stopping...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braces_are_escaped() {
        assert_eq!(literal_route("/metrics"), "/metrics");
        assert_eq!(literal_route("/{x}"), "/{{x}}");
    }
}
