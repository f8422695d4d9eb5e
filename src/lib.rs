pub mod classify;
pub mod extract;
pub mod http_client;
pub mod match_table;
pub mod normalize;
pub mod persist;
pub mod state;
pub mod team_fetch;
