//! Copyright © 2025-2026 Wenze Wei. All Rights Reserved.
//!
//! This file is part of Zi.
//! The Zi project belongs to the Dunimd Team.
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! You may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//!     http://www.apache.org/licenses/LICENSE-2.0
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.

//! Cancellable call context threaded through every runtime call.
//!
//! Components that block (streaming extractors, background loops) are expected
//! to observe [`ZiCContext::ZiFCancelled`]. The runtime itself only checks for
//! cancellation on entry to a lifecycle call.

use tokio_util::sync::CancellationToken;

use crate::errors::{Result, ZiError};

#[derive(Clone, Debug, Default)]
pub struct ZiCContext {
    token: CancellationToken,
}

impl ZiCContext {
    /// A fresh, never-cancelled root context.
    #[allow(non_snake_case)]
    pub fn ZiFBackground() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFFromToken(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Derives a context that is cancelled together with its parent but can
    /// also be cancelled on its own.
    #[allow(non_snake_case)]
    pub fn ZiFChild(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    #[allow(non_snake_case)]
    pub fn ZiFCancel(&self) {
        self.token.cancel();
    }

    #[allow(non_snake_case)]
    pub fn ZiFIsCancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context is cancelled.
    #[allow(non_snake_case)]
    pub async fn ZiFCancelled(&self) {
        self.token.cancelled().await
    }

    /// Fails with [`ZiError::Cancelled`] when the context is already cancelled.
    #[allow(non_snake_case)]
    pub fn ZiFCheck(&self) -> Result<()> {
        if self.token.is_cancelled() {
            return Err(ZiError::Cancelled);
        }
        Ok(())
    }

    #[allow(non_snake_case)]
    pub fn ZiFToken(&self) -> &CancellationToken {
        &self.token
    }
}
