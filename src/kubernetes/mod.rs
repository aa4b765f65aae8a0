// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation and untyped object access.

pub mod client;
pub mod dynamic;

pub use client::create_client;
pub use dynamic::DynamicClient;
