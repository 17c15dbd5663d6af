//! Application context and the panel shell that wires everything together.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

use crate::api::{ApiClient, ApiError, StatCounters};
use crate::bridge::{EventBridge, SseTransport};
use crate::config::{Config, ConfigError};
use crate::feed::{FeedHub, FeedKind, RemoteFeedEntry};
use crate::notify::Notifier;
use crate::shutdown::{SessionHandle, SessionLifecycle, SessionPhase};
use crate::views::{render_alerts, ALERTS_SECTION};
use crate::view::{
    ActionError, ActionTable, ActionTarget, ModuleCatalog, Mount, NavigationState, RenderOutcome,
    Router, ViewLoader,
};

pub const ACTIVITY_PATH: &str = "/api/dashboard/actividad";
pub const ALERTS_PATH: &str = "/api/dashboard/alertas";
pub const INITIAL_LOAD_FAILED_NOTICE: &str = "Error al cargar datos iniciales";

const TASK_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// State shared by the router, view modules and the event bridge.
pub struct AppContext {
    config: Config,
    pub api: ApiClient,
    pub feeds: FeedHub,
    pub counters: StatCounters,
    notifier: Arc<dyn Notifier>,
    nav: RwLock<NavigationState>,
    session: SessionHandle,
}

impl AppContext {
    pub fn new(config: Config, api: ApiClient, notifier: Arc<dyn Notifier>, session: SessionHandle) -> Self {
        let nav = NavigationState::new(&config.views.initial);
        Self {
            feeds: FeedHub::new(&config.feeds),
            counters: StatCounters::new(),
            nav: RwLock::new(nav),
            config,
            api,
            notifier,
            session,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn active_view(&self) -> String {
        self.nav.read().active_view.clone()
    }

    pub fn navigation(&self) -> NavigationState {
        self.nav.read().clone()
    }

    pub(crate) fn set_navigation(&self, state: NavigationState) {
        *self.nav.write() = state;
    }

    /// Refresh the header counters, keeping the old values on failure.
    pub async fn refresh_counters(&self) -> bool {
        match self.counters.refresh(&self.api).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Stat counters refresh failed");
                false
            }
        }
    }

    /// Seed the activity and panel alert feeds from the server.
    pub async fn load_initial_data(&self) -> Result<(), ApiError> {
        let activity: Vec<RemoteFeedEntry> = self.api.get(ACTIVITY_PATH).await?;
        tracing::debug!(entries = activity.len(), "Activity feed loaded");
        self.feeds.seed_activity(activity);

        let alerts: Vec<RemoteFeedEntry> = self.api.get(ALERTS_PATH).await?;
        tracing::info!(alerts = alerts.len(), "Initial feed data loaded");
        self.feeds.seed_panel_alerts(alerts);
        Ok(())
    }
}

/// The running panel: context, router, event bridge and background tasks.
pub struct Shell {
    app: Arc<AppContext>,
    router: Arc<Router>,
    bridge: Arc<EventBridge>,
    actions: ActionTable,
    lifecycle: SessionLifecycle,
    tasks: Vec<JoinHandle<()>>,
}

impl Shell {
    pub fn new(config: Config, catalog: ModuleCatalog, notifier: Arc<dyn Notifier>) -> Result<Self, ShellError> {
        config.validate()?;

        let lifecycle = SessionLifecycle::new();
        let http = ApiClient::build_http(&config.server)?;
        let api = ApiClient::new(http.clone(), &config.server);

        let loader = ViewLoader::new(
            http,
            config.server.clone(),
            config.views.clone(),
            catalog,
            Mount::new(),
        );
        let navigation = config.views.navigation.clone();
        let app = Arc::new(AppContext::new(config, api, notifier, lifecycle.handle()));
        let router = Arc::new(Router::new(Arc::clone(&app), loader, &navigation));
        let bridge = Arc::new(EventBridge::new(Arc::clone(&app), Arc::clone(&router)));
        let actions = default_actions(&app, &router);

        Ok(Self {
            app,
            router,
            bridge,
            actions,
            lifecycle,
            tasks: Vec::new(),
        })
    }

    /// Shell with the built-in view modules.
    pub fn with_builtin_views(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self, ShellError> {
        Self::new(config, crate::views::builtin_catalog(), notifier)
    }

    pub fn app(&self) -> &Arc<AppContext> {
        &self.app
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn bridge(&self) -> &Arc<EventBridge> {
        &self.bridge
    }

    pub fn mount(&self) -> &Mount {
        self.router.loader().mount()
    }

    pub fn actions_mut(&mut self) -> &mut ActionTable {
        &mut self.actions
    }

    /// Load initial data, start the counters timer and render the initial
    /// view.
    pub async fn start(&mut self) -> RenderOutcome {
        if let Err(e) = self.app.load_initial_data().await {
            tracing::warn!(error = %e, "Initial data load failed");
            self.app.notifier().show(INITIAL_LOAD_FAILED_NOTICE, FeedKind::Error);
        }
        self.app.refresh_counters().await;

        let interval = self.app.config().refresh.stats_interval();
        self.tasks.push(spawn_counter_refresh(Arc::clone(&self.app), interval));

        let initial = self.app.config().views.initial.clone();
        self.router.set_active_view(&initial).await
    }

    /// Open the push channel when enabled. Returns whether it was started.
    pub fn connect_realtime(&mut self) -> Result<bool, ShellError> {
        let config = self.app.config();
        if !config.realtime.enabled {
            tracing::info!("Push channel disabled");
            return Ok(false);
        }

        let transport = SseTransport::new(&config.server, &config.realtime)?;
        tracing::info!(url = %transport.stream_url(), "Opening push channel");
        let channels = transport.spawn(self.lifecycle.handle());
        self.bridge.attach_outbound(channels.outbound);
        self.tasks.extend(channels.tasks);
        self.tasks.push(tokio::spawn(Arc::clone(&self.bridge).run(channels.events)));
        Ok(true)
    }

    pub async fn dispatch(&self, target: ActionTarget) -> Result<(), ActionError> {
        self.actions.dispatch(target).await
    }

    /// Stop timers and the push channel, then wait for the tasks to exit.
    pub async fn shutdown(mut self) {
        self.lifecycle.signal();
        self.lifecycle.advance(SessionPhase::StoppingTimers);
        self.lifecycle.advance(SessionPhase::ClosingChannel);

        for task in self.tasks.drain(..) {
            let abort = task.abort_handle();
            if tokio::time::timeout(TASK_JOIN_TIMEOUT, task).await.is_err() {
                tracing::warn!("Background task did not stop in time; aborting");
                abort.abort();
            }
        }

        self.lifecycle.advance(SessionPhase::Complete);
        tracing::info!("Session closed");
    }
}

fn default_actions(app: &Arc<AppContext>, router: &Arc<Router>) -> ActionTable {
    let mut actions = ActionTable::new();

    let nav_router = Arc::clone(router);
    actions.register("navigate", move |target: ActionTarget| {
        let router = Arc::clone(&nav_router);
        async move {
            match target.id {
                Some(view) => {
                    router.set_active_view(&view).await;
                }
                None => tracing::warn!("navigate action without a target view"),
            }
        }
    });

    let clear_app = Arc::clone(app);
    let clear_router = Arc::clone(router);
    actions.register("clear-alerts", move |_target: ActionTarget| {
        let app = Arc::clone(&clear_app);
        let router = Arc::clone(&clear_router);
        async move {
            app.feeds.alerts.clear();
            router
                .loader()
                .mount()
                .replace_section(ALERTS_SECTION, &render_alerts(&app.feeds));
        }
    });

    actions
}

/// Refresh the header counters every `interval` until the session ends.
fn spawn_counter_refresh(app: Arc<AppContext>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let session = app.session().clone();
        let mut ticker = interval_at(Instant::now() + interval, interval);
        loop {
            tokio::select! {
                _ = session.wait() => break,
                _ = ticker.tick() => {
                    app.refresh_counters().await;
                }
            }
        }
        tracing::debug!("Counter refresh timer stopped");
    })
}
