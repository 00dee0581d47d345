// SPDX-License-Identifier: GPL-3.0-or-later

pub mod app;
pub mod chain;
pub mod consts;
pub mod dashboard;
pub mod extractors;
pub mod handlers;
pub mod logging;
pub mod routes;
pub mod state;
pub mod wallet;

#[cfg(test)]
pub mod test_fixtures;
