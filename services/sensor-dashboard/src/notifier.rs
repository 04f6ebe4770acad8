//! Toast notifications shown to the dashboard user

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::state::StateHandle;

/// Severity of a toast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Error,
}

/// A short message for the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Trait for presenting toasts
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    async fn notify(&self, toast: Toast);
}

/// Queues toasts in the shared state so the next rendered page shows them
#[derive(Debug, Clone)]
pub struct FlashNotifier {
    state: StateHandle,
}

impl FlashNotifier {
    pub fn new(state: StateHandle) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Notifier for FlashNotifier {
    async fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success => tracing::info!("{}", toast.message),
            ToastLevel::Error => tracing::warn!("{}", toast.message),
        }
        self.state.write().await.push_toast(toast);
    }
}
