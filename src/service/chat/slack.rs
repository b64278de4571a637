//! Slack integration for thread-bot.
//!
//! This module provides the Slack implementation of `GenericChatClient`:
//! - Authenticating the bot token (`auth.test`)
//! - Posting threaded replies (`chat.postMessage`)
//! - Receiving events, either as Events API webhooks or over Socket Mode

use crate::{
    base::{
        config::{Config, Transport},
        types::{PostedMessage, Res, Void},
    },
    interaction::{self, dispatcher::Dispatcher},
    service::chat::events::decode_event,
};
use async_trait::async_trait;
use axum::{Extension, http::StatusCode, response::IntoResponse};
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use slack_morphism::prelude::*;
use tokio::net::TcpListener;
use tracing::{debug, info, instrument, warn};

use std::sync::Arc;

use super::{ChatClient, GenericChatClient};

// Type aliases.

type FullClient = slack_morphism::SlackClient<SlackClientHyperConnector<HttpsConnector<HttpConnector>>>;

// Extra methods on `ChatClient` applied by the slack implementation.

impl ChatClient {
    /// Creates a new Slack chat client.
    pub fn slack(config: &Config) -> Res<Self> {
        let client = SlackChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Structs.

/// User state for the slack socket client.
struct SlackUserState {
    dispatcher: Dispatcher,
}

/// Slack client implementation.
#[derive(Clone)]
struct SlackChatClient {
    config: Config,
    bot_token: SlackApiToken,
    client: Arc<FullClient>,
}

impl SlackChatClient {
    /// Create a new Slack chat client.
    #[instrument(name = "SlackChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let bot_token = SlackApiToken::new(SlackApiTokenValue(config.slack_bot_token.clone()));

        // Initialize the Slack client.

        let https_connector = HttpsConnector::<HttpConnector>::builder().with_native_roots()?.https_only().enable_all_versions().build();
        let connector = SlackClientHyperConnector::with_connector(https_connector);
        let client = Arc::new(slack_morphism::SlackClient::new(connector));

        Ok(Self {
            config: config.clone(),
            bot_token,
            client,
        })
    }

    /// Serve Events API webhooks until the process is interrupted.
    async fn start_http(&self, dispatcher: Dispatcher) -> Void {
        let signing_secret: SlackSigningSecret = self
            .config
            .slack_signing_secret
            .clone()
            .ok_or(anyhow::anyhow!("The `http` transport requires a Slack signing secret."))?
            .into();

        let listener_environment: Arc<SlackHyperListenerEnvironment> = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()));
        let events_listener: SlackEventsAxumListener<SlackHyperHttpsConnector> = SlackEventsAxumListener::new(listener_environment);

        // The events layer verifies the request signature before the handler runs.

        let app = axum::Router::new()
            .route(
                &self.config.events_path,
                axum::routing::post(handle_http_push_event).layer(
                    events_listener
                        .events_layer(&signing_secret)
                        .with_event_extractor(SlackEventsExtractors::push_event()),
                ),
            )
            .layer(Extension(dispatcher));

        let listener = TcpListener::bind(&self.config.listen_address).await?;

        info!("Listening for Slack events on {}{}", self.config.listen_address, self.config.events_path);

        axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

        Ok(())
    }

    /// Listen over Socket Mode until the process is interrupted.
    async fn start_socket(&self, dispatcher: Dispatcher) -> Void {
        let app_token = self.config.slack_app_token.clone().ok_or(anyhow::anyhow!("The `socket` transport requires a Slack app token."))?;
        let app_token = SlackApiToken::new(SlackApiTokenValue(app_token));

        // Initialize the socket mode listener.

        let socket_mode_callbacks = SlackSocketModeListenerCallbacks::new().with_push_events(handle_socket_push_event);

        // Initialize the socket mode listener environment.

        let listener_environment = Arc::new(SlackClientEventsListenerEnvironment::new(self.client.clone()).with_user_state(SlackUserState { dispatcher }));

        let socket_mode_listener = Arc::new(SlackClientSocketModeListener::new(
            &SlackClientSocketModeConfig::new(),
            listener_environment.clone(),
            socket_mode_callbacks,
        ));

        // Register an app token to listen for events,
        socket_mode_listener.listen_for(&app_token).await?;

        // Start WS connections calling Slack API to get WS url for the token,
        // and wait for Ctrl-C to shutdown.
        socket_mode_listener.serve().await;

        Ok(())
    }
}

#[async_trait]
impl GenericChatClient for SlackChatClient {
    #[instrument(skip(self))]
    async fn auth_test(&self) -> Res<String> {
        let session = self.client.open_session(&self.bot_token);
        let bot_user = session.auth_test().await?;

        Ok(bot_user.user_id.0)
    }

    #[instrument(skip(self, text))]
    async fn post_message(&self, channel_id: &str, thread_ts: &str, text: &str) -> Res<PostedMessage> {
        let message = SlackMessageContent::new().with_text(text.to_string());

        let request = SlackApiChatPostMessageRequest::new(SlackChannelId(channel_id.to_string()), message).with_thread_ts(SlackTs(thread_ts.to_string()));

        let session = self.client.open_session(&self.bot_token);

        let response = session.chat_post_message(&request).await.map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;

        Ok(PostedMessage {
            channel: response.channel.0,
            ts: response.ts.0,
        })
    }

    async fn start(&self, dispatcher: Dispatcher) -> Void {
        match self.config.transport {
            Transport::Http => self.start_http(dispatcher).await,
            Transport::Socket => self.start_socket(dispatcher).await,
        }
    }
}

// Event callbacks for Slack.

/// Routes a verified push event to the dispatcher.
fn route_push_event(event: SlackPushEventCallback, dispatcher: &Dispatcher) {
    let inbound = decode_event(&event.event);

    debug!("Received push event: {:?}", inbound);

    interaction::chat_event::handle_chat_event(inbound, dispatcher.clone());
}

/// Handles Events API deliveries over HTTP.
///
/// Slack expects an acknowledgement within a few seconds, so dispatching is
/// spawned and the response goes out immediately.
async fn handle_http_push_event(Extension(dispatcher): Extension<Dispatcher>, Extension(event): Extension<SlackPushEvent>) -> impl IntoResponse {
    match event {
        SlackPushEvent::UrlVerification(verification) => {
            info!("Answering URL verification challenge.");
            verification.challenge.into_response()
        }
        SlackPushEvent::EventCallback(callback) => {
            route_push_event(callback, &dispatcher);
            StatusCode::OK.into_response()
        }
        _ => {
            warn!("Received unhandled push event.");
            StatusCode::OK.into_response()
        }
    }
}

/// Handles push events delivered over Socket Mode.
#[instrument(skip_all)]
async fn handle_socket_push_event(event_callback: SlackPushEventCallback, _client: Arc<SlackHyperClient>, states: SlackClientEventsUserState) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let states = states.read().await;
    let user_state = states.get_user_state::<SlackUserState>().ok_or(anyhow::anyhow!("Failed to get user state"))?;

    route_push_event(event_callback, &user_state.dispatcher);

    Ok(())
}

/// Resolves once the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down ...");
}
