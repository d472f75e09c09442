use std::sync::Arc;

use envconfig::Envconfig;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

use ingest::api::GatewayResponse;
use ingest::config::Config;
use ingest::handler::Handler;
use ingest::request::IngressRequest;
use ingest::sink::{MessageSink, PrintSink, SqsSink};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // The runtime log pipeline adds its own timestamps
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .without_time()
        .init();

    let config = Config::init_from_env().expect("invalid configuration:");

    let sink: Arc<dyn MessageSink + Send + Sync> = if config.print_sink {
        Arc::new(PrintSink {})
    } else {
        let queue_url = config
            .sqs_queue_url
            .clone()
            .expect("SQS_QUEUE_URL is required");
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Arc::new(SqsSink::new(aws_sdk_sqs::Client::new(&aws_config), queue_url))
    };

    let handler = Arc::new(Handler::new(sink));

    run(service_fn(move |event: LambdaEvent<IngressRequest>| {
        let handler = handler.clone();
        async move {
            let (request, context) = event.into_parts();
            Ok::<GatewayResponse, Error>(handler.handle(request, &context.request_id).await)
        }
    }))
    .await
}
