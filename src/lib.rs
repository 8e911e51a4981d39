pub mod aggregate;
pub mod config;
pub mod fake_api;
pub mod http_client;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod players;
pub mod report;
pub mod rosters;
pub mod sleeper_api;
