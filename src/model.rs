pub mod departure;
pub mod stop_summary;
pub mod vasttrafik_api_model;
