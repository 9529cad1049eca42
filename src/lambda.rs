use lambda_runtime::{service_fn, Error, LambdaEvent};
use tracing::Instrument;

use crate::dispatcher::Dispatcher;
use crate::models::{GatewayEvent, ResponseEnvelope};

/// Serve invocations from the Lambda runtime API until the process is stopped
pub async fn run(dispatcher: &Dispatcher) -> Result<(), Error> {
    tracing::info!("Starting Lambda runtime loop");
    lambda_runtime::run(service_fn(|event| handle_invocation(dispatcher, event))).await
}

/// One invocation: a gateway event in, an envelope out
///
/// Requests the dispatcher rejects surface as function errors.
pub async fn handle_invocation(
    dispatcher: &Dispatcher,
    event: LambdaEvent<GatewayEvent>,
) -> Result<ResponseEnvelope, Error> {
    let (payload, context) = event.into_parts();
    let span = tracing::info_span!("invocation", request_id = %context.request_id);

    let envelope = dispatcher.handle(payload).instrument(span).await?;
    Ok(envelope)
}
