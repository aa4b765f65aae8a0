// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resource kinds exposed by the provider.

pub mod keycloak;
pub mod kms;
