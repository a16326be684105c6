// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared application services for stunt tools (config, prefs).
//! Keeps CLI and other front ends thin and storage-agnostic.

pub mod config;
pub mod config_port;
pub mod prefs;
