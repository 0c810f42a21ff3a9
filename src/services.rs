pub mod departures;
pub mod stops;
