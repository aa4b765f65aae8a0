// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod cli;
pub mod config;
pub mod constants;
pub mod crds;
pub mod datasource;
pub mod error;
pub mod kubernetes;
pub mod manifest;
pub mod model;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod validators;
pub mod wait;

#[cfg(test)]
pub mod test_utils;
