use serde::{Deserialize, Serialize};

/// A single geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What a single fetch asks the weather API for.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherQuery {
    ByName(String),
    ByPosition { lat: f64, lon: f64 },
}

impl std::fmt::Display for WeatherQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherQuery::ByName(city) => write!(f, "city '{city}'"),
            WeatherQuery::ByPosition { lat, lon } => write!(f, "position ({lat}, {lon})"),
        }
    }
}

/// Current-weather payload as returned by the OpenWeather API.
///
/// Only `visibility` and `timezone` are required; everything else may be
/// missing upstream and maps to an unset display field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResponse {
    pub name: Option<String>,
    pub weather: Option<Vec<Condition>>,
    pub coord: Option<Coord>,
    pub main: Option<MainReadings>,
    pub visibility: f64,
    pub wind: Option<Wind>,
    /// Offset from UTC in seconds.
    pub timezone: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

/// Temperatures are in Kelvin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
}

/// Display record: the latest weather, flattened for rendering.
///
/// `city_name` doubles as the explicit search city: callers set it before
/// asking the coordinator to load, and a successful load overwrites it with
/// the name the API resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherInfo {
    pub city_name: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
    pub icon: Option<String>,
    /// Kelvin.
    pub temp: Option<f64>,
    /// Kelvin.
    pub feels_like: Option<f64>,
    pub main: Option<String>,
    pub description: Option<String>,
    pub wind_speed: Option<f64>,
    pub wind_degree: Option<f64>,
    pub pressure: Option<f64>,
    pub humidity: Option<f64>,
    pub visibility: Option<f64>,
    pub timezone: Option<f64>,
}

impl WeatherInfo {
    /// Overwrite every field from `response`. Missing upstream values clear
    /// the corresponding field.
    pub fn apply(&mut self, response: &WeatherResponse) {
        let condition = response.weather.as_ref().and_then(|w| w.first());

        self.city_name = response.name.clone();
        self.lat = response.coord.map(|c| c.lat);
        self.lon = response.coord.map(|c| c.lon);
        self.temp = response.main.map(|m| m.temp);
        self.feels_like = response.main.map(|m| m.feels_like);
        self.main = condition.map(|c| c.main.clone());
        self.description = condition.map(|c| c.description.clone());
        self.icon = condition.map(|c| c.icon.clone());
        self.wind_speed = response.wind.map(|w| w.speed);
        self.wind_degree = response.wind.map(|w| w.deg);
        self.pressure = response.main.map(|m| m.pressure);
        self.humidity = response.main.map(|m| m.humidity);
        self.visibility = Some(response.visibility);
        self.timezone = Some(response.timezone);
    }
}

impl From<&WeatherResponse> for WeatherInfo {
    fn from(response: &WeatherResponse) -> Self {
        let mut info = WeatherInfo::default();
        info.apply(response);
        info
    }
}
