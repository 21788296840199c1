// Application layer - use cases over the AQI API port
pub mod aqi_api;
pub mod fetch_view;
pub mod panel_service;
pub mod session;
pub mod streaming_service;
