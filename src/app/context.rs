use std::sync::Arc;

use anyhow::Result;

use crate::cancel::CancelToken;
use crate::error::ApiResult;
use crate::model::{ClientConfig, Identity};
use crate::remote::ApiClient;
use crate::session::Session;
use crate::store::SharedStore;
use crate::ui::{LoadingIndicator, MessageQueue};

/// Toast shown whenever a request gets no response at all.
pub const SERVER_DOWN_MESSAGE: &str = "Server is down, please contact admin.";

/// Everything a view needs, injected rather than reached for globally.
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct AppContext {
    config: Arc<ClientConfig>,
    client: ApiClient,
    messages: MessageQueue,
    loading: LoadingIndicator,
}

impl AppContext {
    pub fn new(config: ClientConfig, store: SharedStore) -> Result<Self> {
        let session = Session::new(store);
        let client = ApiClient::new(&config, session)?;
        Ok(Self {
            config: Arc::new(config),
            client,
            messages: MessageQueue::new(),
            loading: LoadingIndicator::new(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    pub fn store(&self) -> &SharedStore {
        self.session().store()
    }

    pub fn messages(&self) -> &MessageQueue {
        &self.messages
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    pub fn identity(&self) -> Option<Identity> {
        self.session().identity()
    }

    /// Runs one API call unless `token` already fired. A call that got no
    /// response raises the "server down" toast before the error reaches the
    /// view.
    pub fn call<T>(
        &self,
        token: &CancelToken,
        f: impl FnOnce(&ApiClient) -> ApiResult<T>,
    ) -> ApiResult<T> {
        token.check()?;
        let result = f(&self.client);
        if let Err(err) = &result
            && err.is_transport()
        {
            self.messages.error(SERVER_DOWN_MESSAGE);
        }
        result
    }
}
