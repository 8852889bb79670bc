//! Driver session fixture.
//!
//! A scenario borrows exactly one [`PageDriver`] for its whole run. The
//! session comes from a [`SessionFactory`] and is closed by [`with_session`]
//! whatever the scenario outcome.
//!
//! ```text
//! factory.open() ──► body(Arc<dyn PageDriver>) ──► session.close()
//!                          │                         ▲
//!                          └──── Ok / Err ───────────┘  (always)
//! ```

use crate::browser::ChromiumDriver;
use crate::driver::{DriverConfig, PageDriver};
use crate::result::E2eResult;
use crate::sim::{SimOptions, SimulatedApp};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Source of fresh, independent driver sessions
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Open a new session positioned on a blank page
    async fn open(&self) -> E2eResult<Box<dyn PageDriver>>;

    /// Short label used in log lines
    fn label(&self) -> &'static str;
}

/// Sessions against the in-process simulated application
#[derive(Debug, Clone)]
pub struct SimulatedFactory {
    app: SimulatedApp,
}

impl SimulatedFactory {
    /// Simulate the application at `base_url` with default options
    pub fn new(base_url: &str) -> E2eResult<Self> {
        Ok(Self {
            app: SimulatedApp::new(base_url)?,
        })
    }

    /// Simulate the application with explicit options
    pub fn with_options(base_url: &str, options: SimOptions) -> E2eResult<Self> {
        Ok(Self {
            app: SimulatedApp::with_options(base_url, options)?,
        })
    }

    /// Wrap an existing application so that tests can inspect its state
    #[must_use]
    pub const fn from_app(app: SimulatedApp) -> Self {
        Self { app }
    }

    /// The shared application behind every session
    #[must_use]
    pub const fn app(&self) -> &SimulatedApp {
        &self.app
    }
}

#[async_trait]
impl SessionFactory for SimulatedFactory {
    async fn open(&self) -> E2eResult<Box<dyn PageDriver>> {
        Ok(Box::new(self.app.open_session()))
    }

    fn label(&self) -> &'static str {
        "simulated"
    }
}

/// Sessions in a real Chromium browser
#[derive(Clone)]
pub struct ChromiumFactory {
    config: DriverConfig,
}

impl ChromiumFactory {
    /// Launch browsers with the given configuration
    #[must_use]
    pub const fn new(config: DriverConfig) -> Self {
        Self { config }
    }
}

impl fmt::Debug for ChromiumFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChromiumFactory")
            .field("headless", &self.config.headless)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionFactory for ChromiumFactory {
    async fn open(&self) -> E2eResult<Box<dyn PageDriver>> {
        let driver = ChromiumDriver::launch(self.config.clone()).await?;
        Ok(Box::new(driver))
    }

    fn label(&self) -> &'static str {
        "chromium"
    }
}

/// Run `body` with a fresh session, then close the session.
///
/// The body's error wins over a close error; a close error after a
/// successful body is returned.
pub async fn with_session<T, F, Fut>(factory: &dyn SessionFactory, body: F) -> E2eResult<T>
where
    F: FnOnce(Arc<dyn PageDriver>) -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let session: Arc<dyn PageDriver> = Arc::from(factory.open().await?);
    tracing::debug!(factory = factory.label(), "session opened");

    let outcome = body(Arc::clone(&session)).await;
    let closed = session.close().await;

    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => {
            tracing::warn!(error = %e, "session close failed");
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            tracing::warn!(error = %close_err, "session close failed after scenario error");
            Err(e)
        }
    }
}
