use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Request};
use axum::routing::any;
use axum::Router;

use crate::endpoint::Endpoint;
use crate::request::INSTANCE_ID;

/// A named REST resource: a collection endpoint and an instance endpoint.
///
/// Routes:
///   *  /{name}                collection endpoint (list, create, ...)
///   *  /{name}/{instance_id}  instance endpoint (get, update, delete, ...)
///
/// Every verb is routed to the endpoint's dispatcher, which answers 405
/// for verbs the endpoint does not implement.
pub struct RestResource<S> {
    name: String,
    collection: Endpoint<S>,
    instance: Endpoint<S>,
}

impl<S: Send + Sync + 'static> RestResource<S> {
    pub fn new(name: &str, collection: Endpoint<S>, instance: Endpoint<S>) -> Self {
        Self {
            name: name.trim_matches('/').to_string(),
            collection,
            instance,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection_path(&self) -> String {
        format!("/{}", self.name)
    }

    pub fn instance_path(&self) -> String {
        format!("/{}/{{{}}}", self.name, INSTANCE_ID)
    }

    /// Add both routes to `router`.
    pub fn register<T>(self, router: Router<T>) -> Router<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let collection_path = self.collection_path();
        let instance_path = self.instance_path();
        tracing::debug!(
            resource = %self.name,
            collection = ?self.collection.methods(),
            instance = ?self.instance.methods(),
            "registering resource routes"
        );

        let collection = Arc::new(self.collection);
        let instance = Arc::new(self.instance);

        router
            .route(
                &collection_path,
                any(move |request: Request| {
                    let endpoint = Arc::clone(&collection);
                    async move { endpoint.dispatch(HashMap::new(), request).await }
                }),
            )
            .route(
                &instance_path,
                any(
                    move |Path(params): Path<HashMap<String, String>>, request: Request| {
                        let endpoint = Arc::clone(&instance);
                        async move { endpoint.dispatch(params, request).await }
                    },
                ),
            )
    }
}
