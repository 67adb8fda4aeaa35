//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use huddle_shared::time::SystemClock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    domain::{MessagePusher, RoomRepository},
    usecase::{
        ConnectionUseCase, CreateRoomUseCase, GetRoomDetailUseCase, GetRoomsUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, ReapRoomsUseCase, SyncStateUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// Idle room reaper settings
#[derive(Debug, Clone, Copy)]
struct ReaperConfig {
    ttl: Duration,
    interval: Duration,
}

/// Collaborative session server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(repository, message_pusher);
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 空き Room の回収（未設定なら Room は無期限に保持）
    reaper: Option<ReaperConfig>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            reaper: None,
        }
    }

    /// Delete empty rooms idle for longer than `ttl`, checking every `interval`
    pub fn with_reaper(mut self, ttl: Duration, interval: Duration) -> Self {
        self.reaper = Some(ReaperConfig { ttl, interval });
        self
    }

    /// Build the router with all endpoints
    pub fn router(&self) -> Router {
        let repository = self.repository.clone();
        let message_pusher = self.message_pusher.clone();

        let app_state = Arc::new(AppState {
            connection_usecase: Arc::new(ConnectionUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            create_room_usecase: Arc::new(CreateRoomUseCase::new(repository.clone())),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
            )),
            sync_state_usecase: Arc::new(SyncStateUseCase::new(
                repository.clone(),
                message_pusher,
            )),
            get_rooms_usecase: Arc::new(GetRoomsUseCase::new(repository.clone())),
            get_room_detail_usecase: Arc::new(GetRoomDetailUseCase::new(repository)),
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails during server execution.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();

        let reaper_task = self.reaper.map(|config| {
            tracing::info!(
                "Reaping empty rooms idle for {:?} (every {:?})",
                config.ttl,
                config.interval
            );
            let usecase =
                ReapRoomsUseCase::new(self.repository.clone(), Arc::new(SystemClock), config.ttl);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(config.interval);
                loop {
                    ticker.tick().await;
                    if let Err(e) = usecase.execute().await {
                        tracing::error!("Failed to reap idle rooms: {}", e);
                    }
                }
            })
        });

        tracing::info!("Session server listening on {}", listener.local_addr()?);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        if let Some(task) = reaper_task {
            task.abort();
        }
        result?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Run the session server until Ctrl+C or SIGTERM
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(
        self,
        host: String,
        port: u16,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }
}
