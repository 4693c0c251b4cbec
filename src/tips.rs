//! Weather tips shown under the dashboard

use crate::models::WeatherType;

const SUNNY: &[&str] = &[
    "Stay hydrated and drink plenty of water",
    "Apply sunscreen with high SPF",
    "Wear light, breathable clothing",
    "Seek shade during peak hours (10am-4pm)",
];

const CLEAR: &[&str] = &[
    "Perfect evening for stargazing",
    "Great time for outdoor activities",
    "Temperature drops at night, bring a jacket",
];

const CLOUDY: &[&str] = &[
    "Good day for outdoor activities",
    "UV rays can still penetrate clouds",
    "Comfortable temperature expected",
];

const RAINY: &[&str] = &[
    "Carry an umbrella or raincoat",
    "Drive carefully, roads may be slippery",
    "Perfect weather to stay cozy indoors",
    "Watch for puddles and flooded areas",
];

const SNOWY: &[&str] = &[
    "Bundle up in warm, layered clothing",
    "Watch for icy roads and sidewalks",
    "Keep emergency supplies in your car",
    "Perfect day for winter activities",
];

const STORMY: &[&str] = &[
    "Stay indoors if possible",
    "Avoid using electrical appliances",
    "Keep away from windows",
    "Have emergency supplies ready",
];

/// Advice for the given weather
#[must_use]
pub fn tips_for(weather_type: WeatherType) -> &'static [&'static str] {
    match weather_type {
        WeatherType::Sunny => SUNNY,
        WeatherType::Clear => CLEAR,
        WeatherType::Cloudy => CLOUDY,
        WeatherType::Rainy => RAINY,
        WeatherType::Snowy => SNOWY,
        WeatherType::Stormy => STORMY,
    }
}
