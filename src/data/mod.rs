//! Widget data providers
//!
//! HTTP clients for the weather and GitHub widgets. Each client can fetch
//! directly or through the [`CacheManager`](crate::cache::CacheManager), with
//! cache parameters taken from the widget's settings section.

pub mod github;
pub mod weather;

pub use github::{github_cache_key, GithubClient, GithubData, GithubError, GithubUser};
pub use weather::{
    weather_cache_key, DayForecast, HourlyForecast, WeatherClient, WeatherCondition, WeatherError,
    WeatherReport,
};
