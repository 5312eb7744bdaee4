pub mod analytics;
pub mod impact_scoring;
pub mod trend_analysis;
