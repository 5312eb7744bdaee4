pub mod collection_worker;
pub mod realtime_analysis_worker;
