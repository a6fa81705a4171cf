//! REPL: converts teloxide messages to [`InboundMessage`] and runs them through the chain.

use crate::adapters::TelegramMessageWrapper;
use crate::chain::HandlerChain;
use crate::components::{build_components, build_handler_chain, build_teloxide_bot};
use crate::config::AppConfig;
use anyhow::Result;
use relay_core::{init_tracing, Bot as CoreBot, HandlerResponse, InboundMessage, ToInbound};
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

/// Runs one message through the chain and sends a `Reply` back to its chat.
pub async fn dispatch(chain: &HandlerChain, bot: &dyn CoreBot, message: &InboundMessage) {
    let reply = match chain.handle(message).await {
        Ok(HandlerResponse::Reply(text)) => text,
        Ok(_) => return,
        Err(e) => {
            error!(error = %e, user_id = message.user_id, "Handler chain failed");
            format!("❌ Error: {}", e)
        }
    };
    if let Err(e) = bot.send_message(message.chat_id, &reply).await {
        error!(error = %e, chat_id = message.chat_id, "Failed to send reply");
    }
}

/// Starts the REPL. Only private chats are handled; each message gets its own task so a
/// long handler never blocks the update stream.
#[instrument(skip(bot, handler_chain, reply_bot))]
pub async fn run_repl(
    bot: teloxide::Bot,
    handler_chain: HandlerChain,
    reply_bot: Arc<dyn CoreBot>,
) -> Result<()> {
    if let Ok(me) = bot.get_me().await {
        if let Some(username) = &me.user.username {
            info!(username = %username, "Bot username resolved before repl");
        }
    }

    let chain = handler_chain;
    teloxide::repl(bot, move |_bot: Bot, msg: teloxide::types::Message| {
        let chain = chain.clone();
        let reply_bot = Arc::clone(&reply_bot);

        async move {
            if !msg.chat.is_private() || msg.text().is_none() {
                return Ok(());
            }
            let inbound = TelegramMessageWrapper(&msg).to_inbound();

            tokio::spawn(async move {
                info!(
                    user_id = inbound.user_id,
                    chat_id = inbound.chat_id,
                    message_id = %inbound.id,
                    "step: processing message (handler chain started)"
                );
                dispatch(&chain, reply_bot.as_ref(), &inbound).await;
            });

            Ok(())
        }
    })
    .await;

    Ok(())
}

/// Main entry: validate config, init logging, build components and chain, then run the REPL.
#[instrument(skip(config))]
pub async fn run_bot(config: AppConfig) -> Result<()> {
    config.validate()?;
    init_tracing(&config.log_file)?;

    info!(database_url = %config.database_url, "Initializing bot");

    let teloxide_bot = build_teloxide_bot(&config);
    let components = build_components(&config, teloxide_bot.clone()).await?;
    let chain = build_handler_chain(&components);

    info!("Bot started successfully");
    run_repl(teloxide_bot, chain, components.bot.clone()).await
}
