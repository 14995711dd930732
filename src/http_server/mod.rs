pub mod app;
pub mod http_routes;
pub mod state;
