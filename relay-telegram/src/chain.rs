use relay_core::{Handler, HandlerResponse, InboundMessage, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Ordered command router. Every handler's `before` runs first and any may veto, with a reply
/// or silently. Then `handle` runs in order until one returns `Stop` or `Reply`.
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerChain {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    #[instrument(skip(self, message))]
    pub async fn handle(&self, message: &InboundMessage) -> Result<HandlerResponse> {
        info!(
            user_id = message.user_id,
            chat_id = message.chat_id,
            message_id = %message.id,
            "step: handler_chain started"
        );

        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            if let Some(reply) = handler.before(message).await? {
                info!(
                    user_id = message.user_id,
                    handler = %handler_name,
                    "step: before vetoed, chain stopped"
                );
                if reply.is_empty() {
                    return Ok(HandlerResponse::Stop);
                }
                return Ok(HandlerResponse::Reply(reply));
            }
        }

        let mut final_response = HandlerResponse::Continue;
        for handler in &self.handlers {
            let handler_name = std::any::type_name_of_val(handler.as_ref());
            let response = handler.handle(message).await?;
            debug!(handler = %handler_name, response = ?response, "Handler processed");

            match response {
                HandlerResponse::Continue => continue,
                HandlerResponse::Stop | HandlerResponse::Reply(_) => {
                    info!(
                        user_id = message.user_id,
                        handler = %handler_name,
                        "step: handler chain stopped by handler"
                    );
                    final_response = response;
                    break;
                }
            }
        }

        info!(
            user_id = message.user_id,
            chat_id = message.chat_id,
            message_id = %message.id,
            "step: handler_chain finished"
        );

        Ok(final_response)
    }
}
