// SPDX-FileCopyrightText: 2026 Firsat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asset store collaborator trait.

use async_trait::async_trait;

use crate::error::FirsatError;

/// Durable blob storage for resolved deal images.
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Uploads `bytes` under `path` and returns a public URL.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
        make_public: bool,
    ) -> Result<String, FirsatError>;
}
