// Domain layer - AQI classification, readings and panel view models
pub mod classifier;
pub mod panel;
pub mod reading;
