use chrono::{DateTime, TimeZone};
use skyglass_core::{WeatherCoordinator, WeatherInfo};
use std::fmt::{self, Display, Write};

const DATE_FORMAT: &str = "%b %-d, %-I:%M %p";

/// Human-readable report of the display record, dated now plus its offset.
pub fn render(info: &WeatherInfo) -> Result<String, fmt::Error> {
    render_at(info, WeatherCoordinator::get_date_time(info.timezone))
}

pub fn render_at<Tz>(info: &WeatherInfo, when: DateTime<Tz>) -> Result<String, fmt::Error>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::new();

    writeln!(out, "{}", when.format(DATE_FORMAT))?;
    writeln!(out, "{}", info.city_name.as_deref().unwrap_or(""))?;

    match (&info.main, &info.description) {
        (Some(main), Some(desc)) => {
            writeln!(out, "{main} ({desc})")?;
        }
        (Some(text), None) | (None, Some(text)) => {
            writeln!(out, "{text}")?;
        }
        (None, None) => {}
    }

    let temps: Vec<String> = [
        info.temp.map(|t| format!("Real temperature: {}F", fahrenheit(t))),
        info.feels_like.map(|t| format!("but feels like: {}F", fahrenheit(t))),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !temps.is_empty() {
        writeln!(out, "{}", temps.join("   "))?;
    }

    if let Some(speed) = info.wind_speed {
        match info.wind_degree {
            Some(deg) => {
                writeln!(out, "Wind: {speed:.1} m/s at {deg:.0}°")?;
            }
            None => {
                writeln!(out, "Wind: {speed:.1} m/s")?;
            }
        }
    }

    let readings: Vec<String> = [
        info.pressure.map(|p| format!("Pressure: {p:.0} hPa")),
        info.humidity.map(|h| format!("Humidity: {h:.0}%")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !readings.is_empty() {
        writeln!(out, "{}", readings.join("   "))?;
    }

    if let Some(visibility) = info.visibility {
        writeln!(out, "Visibility: {:.1} km", visibility / 1000.0)?;
    }

    Ok(out)
}

/// Whole degrees, truncated toward zero.
fn fahrenheit(kelvin: f64) -> i64 {
    WeatherCoordinator::convert_to_f(kelvin) as i64
}
