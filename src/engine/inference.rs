// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scoped access to model-inference resources.
//!
//! Metrics that need a model acquire a lease through their context. The lease
//! hands the session back to the provider when it is dropped, so a session
//! never outlives the invocation that acquired it, including invocations that
//! return early, time out or panic.

use std::sync::Arc;

use crate::errors::InferenceError;

/// A handle to an inference session owned by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceSession {
    pub model: String,
    pub handle: u64,
}

pub trait InferenceProvider: Send + Sync {
    fn acquire(&self, model: &str) -> Result<InferenceSession, InferenceError>;

    fn release(&self, session: InferenceSession);
}

/// An acquired session, released on drop.
pub struct InferenceLease {
    provider: Arc<dyn InferenceProvider>,
    session: Option<InferenceSession>,
}

impl InferenceLease {
    pub fn acquire(provider: Arc<dyn InferenceProvider>, model: &str) -> Result<Self, InferenceError> {
        let session = provider.acquire(model)?;
        Ok(Self {
            provider,
            session: Some(session),
        })
    }

    pub fn session(&self) -> Option<&InferenceSession> {
        self.session.as_ref()
    }
}

impl Drop for InferenceLease {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::debug!(model = %session.model, handle = session.handle, "Releasing inference session");
            self.provider.release(session);
        }
    }
}

impl std::fmt::Debug for InferenceLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceLease")
            .field("session", &self.session)
            .finish()
    }
}
