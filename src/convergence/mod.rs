// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The convergence engine: one fetch-compare-act pass per Application.

pub mod engine;

pub use engine::{Engine, KindChange, Outcome};
