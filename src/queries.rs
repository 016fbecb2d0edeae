//! Typed query bindings for each dashboard resource
//!
//! A [`Query`] pairs a cache key with the API call that fills it and the
//! freshness policy of that resource.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::cache::{
    Fetcher, QueryCache, QueryObserver, QueryOptions, ResourceKey, StaleAfter, fetcher,
};
use crate::client::DashboardApi;
use crate::client::models::{DashboardSummary, Document, Message, Task, TaskList, TaskStatus, User};
use crate::error::ApiResult;

pub struct Query<T> {
    pub key: ResourceKey,
    pub fetcher: Fetcher,
    pub options: QueryOptions,
    _data: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Query<T> {
    fn new(key: ResourceKey, fetcher: Fetcher, options: QueryOptions) -> Self {
        Self {
            key,
            fetcher,
            options,
            _data: PhantomData,
        }
    }

    /// Adjust the default policy
    pub fn with_options(mut self, adjust: impl FnOnce(QueryOptions) -> QueryOptions) -> Self {
        self.options = adjust(self.options);
        self
    }

    pub async fn get(&self, cache: &QueryCache) -> ApiResult<T> {
        cache.get_as(&self.key, &self.fetcher, &self.options).await
    }

    pub fn observe(&self, cache: &QueryCache) -> QueryObserver {
        cache.observe(self.key.clone(), Arc::clone(&self.fetcher), self.options)
    }
}

pub fn tasks<C: DashboardApi + 'static>(
    client: &Arc<C>,
    filter: Option<TaskStatus>,
) -> Query<TaskList> {
    let client = Arc::clone(client);
    Query::new(
        ResourceKey::tasks(filter),
        fetcher(move || {
            let client = Arc::clone(&client);
            async move { client.list_tasks(filter).await }
        }),
        QueryOptions::new().stale_after(StaleAfter::TASKS),
    )
}

pub fn task<C: DashboardApi + 'static>(client: &Arc<C>, task_id: &str) -> Query<Task> {
    let client = Arc::clone(client);
    let id = task_id.to_string();
    Query::new(
        ResourceKey::task(task_id),
        fetcher(move || {
            let client = Arc::clone(&client);
            let id = id.clone();
            async move { client.get_task(&id).await }
        }),
        QueryOptions::new()
            .stale_after(StaleAfter::TASK_DETAIL)
            .enabled(!task_id.is_empty()),
    )
}

pub fn dashboard<C: DashboardApi + 'static>(client: &Arc<C>) -> Query<DashboardSummary> {
    let client = Arc::clone(client);
    Query::new(
        ResourceKey::dashboard(),
        fetcher(move || {
            let client = Arc::clone(&client);
            async move { client.dashboard_summary().await }
        }),
        QueryOptions::new().stale_after(StaleAfter::DASHBOARD),
    )
}

pub fn chat_users<C: DashboardApi + 'static>(client: &Arc<C>) -> Query<Vec<User>> {
    let client = Arc::clone(client);
    Query::new(
        ResourceKey::chat_users(),
        fetcher(move || {
            let client = Arc::clone(&client);
            async move { client.list_chat_users().await }
        }),
        QueryOptions::new().stale_after(StaleAfter::CHAT_USERS),
    )
}

/// Conversation with one counterpart. Disabled until a counterpart is selected.
pub fn messages<C: DashboardApi + 'static>(client: &Arc<C>, user_id: &str) -> Query<Vec<Message>> {
    let client = Arc::clone(client);
    let id = user_id.to_string();
    Query::new(
        ResourceKey::messages(user_id),
        fetcher(move || {
            let client = Arc::clone(&client);
            let id = id.clone();
            async move { client.list_messages(&id).await }
        }),
        QueryOptions::new()
            .stale_after(StaleAfter::MESSAGES)
            .refetch_on_focus()
            .enabled(!user_id.trim().is_empty()),
    )
}

pub fn documents<C: DashboardApi + 'static>(client: &Arc<C>) -> Query<Vec<Document>> {
    let client = Arc::clone(client);
    Query::new(
        ResourceKey::documents(),
        fetcher(move || {
            let client = Arc::clone(&client);
            async move { client.list_documents().await }
        }),
        QueryOptions::new().stale_after(StaleAfter::DOCUMENTS),
    )
}
