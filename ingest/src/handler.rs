use std::sync::Arc;
use std::time::Instant;

use metrics::counter;
use tracing::instrument;

use crate::api::{GatewayResponse, IngestError};
use crate::envelope::Envelope;
use crate::ip::resolve_client_ip;
use crate::request::IngressRequest;
use crate::sink::MessageSink;

/// Runs one request through the ingress pipeline:
/// preflight short-circuit, IP resolution, validation, body parsing,
/// enveloping, queue submission. Never returns an error; every outcome maps
/// to a gateway response.
pub struct Handler {
    sink: Arc<dyn MessageSink + Send + Sync>,
}

impl Handler {
    pub fn new(sink: Arc<dyn MessageSink + Send + Sync>) -> Handler {
        Handler { sink }
    }

    #[instrument(skip_all, fields(request_id = request_id, client_ip))]
    pub async fn handle(&self, request: IngressRequest, request_id: &str) -> GatewayResponse {
        let started = Instant::now();

        if request.is_preflight() {
            return GatewayResponse::preflight();
        }

        counter!("ingest_requests_received_total").increment(1);

        // Resolved before validation so failure responses carry it too
        let client_ip = resolve_client_ip(&request);
        tracing::Span::current().record("client_ip", client_ip.as_str());

        match self.process(&request, &client_ip, request_id).await {
            Ok(message_id) => {
                let processing_time = format!("{:.3}s", started.elapsed().as_secs_f64());
                tracing::info!(
                    message_id = %message_id,
                    processing_time = %processing_time,
                    "message queued"
                );
                GatewayResponse::success(&message_id, &client_ip, &processing_time)
            }
            Err(err) => {
                counter!("ingest_requests_rejected_total").increment(1);
                tracing::warn!(status = err.status_code(), "request rejected: {}", err);
                GatewayResponse::error(&err, Some(&client_ip))
            }
        }
    }

    async fn process(
        &self,
        request: &IngressRequest,
        client_ip: &str,
        request_id: &str,
    ) -> Result<String, IngestError> {
        request.validate()?;

        let message = request.parse_body();
        let envelope = Envelope::build(message, client_ip, request_id)?;

        tracing::debug!(size = envelope.body.len(), "built envelope");
        self.sink.submit(&envelope).await
    }
}
