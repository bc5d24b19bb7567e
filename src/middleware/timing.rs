use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;
use tokio::time::Instant;

use super::Authenticated;

/// When handling of this request started.
#[derive(Clone, Copy, Debug)]
pub struct RequestStart(pub Instant);

/// Log `METHOD "path" (status) seconds [AUTH|ANON]` for every request.
///
/// The request counts as authenticated when the response carries
/// [`Authenticated`]; this layer runs before any authentication does.
pub async fn timing(mut request: Request, next: Next) -> Response {
    let start = Instant::now();
    request.extensions_mut().insert(RequestStart(start));

    let method = request.method().clone();
    let url = request.uri().path().to_string();

    let response = next.run(request).await;

    let auth = if response.extensions().get::<Authenticated>().is_some() {
        "AUTH"
    } else {
        "ANON"
    };
    let code = response.status().as_u16();
    let secs = start.elapsed().as_secs_f64();
    tracing::info!(
        target: "timer",
        %method,
        url = %url,
        code,
        time = secs,
        auth,
        "{method} \"{url}\" ({code}) {secs:.2} [{auth}]"
    );
    response
}
